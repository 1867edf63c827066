//! Safegate - safety-gate pipeline for LLM input and output
//!
//! Safegate sits between a caller and a text-generation step. It inspects,
//! sanitizes, and either passes through or blocks text in both directions:
//! user input before generation, model output after generation.
//!
//! ```text
//! caller ──► RateLimiter ──► validate_input ──► generation ──► validate_output ──► caller
//!                                │                                  │
//!                sanitize → structure → injection      structure → toxicity
//!                        → toxicity → pii            → grounding → relevance
//! ```
//!
//! Each direction is an ordered chain of stages. A stage wraps one detector
//! and declares, as explicit configuration, what a hit does (block, redact,
//! or warn) and what a fault does (fail closed for required stages, fail
//! open for optional ones). Stages that redact rewrite the working text for
//! every stage after them; execution always stops at the first block.
//!
//! Stages whose backing detector may be unavailable (a model dependency
//! that failed to load) are wrapped in a [`DegradableStage`]: if the
//! detector factory fails at construction, the stage is permanently inert
//! and every call reports `Skipped` in the trace rather than passing or
//! blocking.
//!
//! ## Quick start
//!
//! ```no_run
//! use safegate::{GateConfig, GatePipeline};
//!
//! let pipeline = GatePipeline::new(&GateConfig::default())?;
//!
//! let input = pipeline.validate_input("My email is a@b.com, what is the refund policy?");
//! assert!(!input.blocked);
//! // PII is redacted, not blocked: the working text now carries a placeholder
//! assert!(input.text.as_deref().unwrap().contains("<REDACTED_EMAIL>"));
//!
//! let output = pipeline.validate_output(
//!     "Refunds are processed within 14 days.",
//!     Some("Refunds are processed within 14 days of purchase."),
//!     Some("what is the refund policy"),
//! );
//! assert!(!output.blocked);
//! # Ok::<(), safegate::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`gate`]: orchestration core (verdicts, stages, degradation, chain,
//!   pipeline)
//! - [`detect`]: default detectors behind the stages
//! - [`limiter`]: keyed sliding-window admission gate
//! - [`config`]: construction-time configuration

pub mod config;
pub mod detect;
pub mod error;
pub mod gate;
pub mod limiter;

pub use config::GateConfig;
pub use error::{Error, Result};
pub use gate::{
    Chain, Context, DegradableStage, Detector, GatePipeline, GateStage, Hit, PipelineResult,
    Stage, StageKind, StageOutcome, StagePolicy, StopPolicy, Verdict,
};
pub use limiter::RateLimiter;
