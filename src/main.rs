//! Safegate demo assistant
//!
//! Interactive loop exercising the full gate: admission limiter, input
//! validation, a canned knowledge-base "generation" step, and output
//! validation with grounding against the retrieved context.

use anyhow::{Context as _, Result};
use clap::Parser;
use safegate::config::GateConfig;
use safegate::gate::GatePipeline;
use safegate::limiter::RateLimiter;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "safegate")]
#[command(version)]
#[command(about = "Safety-gate pipeline demo assistant")]
struct Cli {
    /// Configuration file path (.yaml)
    #[arg(short, long, env = "SAFEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Caller identity for the rate limiter
    #[arg(short, long, default_value = "local")]
    key: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Canned knowledge base standing in for retrieval.
const KNOWLEDGE: &[(&str, &str)] = &[
    (
        "refund",
        "Refunds are processed within 14 days of purchase. \
         No refunds for digital goods after download.",
    ),
    (
        "shipping",
        "Standard shipping takes 3-5 business days. Express shipping is 1-2 days.",
    ),
    (
        "contact",
        "Support can be reached through the help center. \
         Phone support is available 9-5 EST.",
    ),
    (
        "pricing",
        "Basic plan is $10/mo. Pro plan is $29/mo. Enterprise is custom pricing.",
    ),
];

fn retrieve(query: &str) -> Option<&'static str> {
    let query = query.to_lowercase();
    KNOWLEDGE
        .iter()
        .find(|(topic, _)| query.contains(topic))
        .map(|(_, answer)| *answer)
}

/// Mock generation step: answer from the retrieved context, or punt.
fn generate(context: Option<&str>) -> String {
    match context {
        Some(context) => context.to_string(),
        None => "I'm not sure about that. I can help with refund policy, shipping, \
                 contact options, or pricing."
            .to_string(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => GateConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GateConfig::default(),
    };

    let limiter = RateLimiter::new(&config.rate_limit);
    let pipeline = GatePipeline::new(&config).context("building pipeline")?;

    println!("Safegate assistant (type 'quit' to exit)");
    println!("Ask about: refund policy, shipping, contact, pricing\n");

    let stdin = io::stdin();
    loop {
        print!("you: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        if limiter.check(&cli.key).is_err() {
            println!("bot: You're sending requests too quickly. Please wait a moment.\n");
            continue;
        }

        let input = pipeline.validate_input(line);
        if input.blocked {
            println!(
                "bot: I can't process that request. ({})\n",
                input.reason.as_deref().unwrap_or("blocked")
            );
            continue;
        }
        let sanitized = input.text.as_deref().unwrap_or(line);

        let context = retrieve(sanitized);
        let draft = generate(context);

        let output = pipeline.validate_output(&draft, context, Some(sanitized));
        match output.text {
            Some(text) if !output.blocked => println!("bot: {}\n", text),
            _ => println!(
                "bot: I generated a response but it failed safety checks. ({})\n",
                output.reason.as_deref().unwrap_or("blocked")
            ),
        }
    }

    println!("Goodbye!");
    Ok(())
}
