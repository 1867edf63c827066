//! Generic ordered validator chain
//!
//! [`Chain`] executes capability-compatible links in list order, threading a
//! working text value from link to link and stopping per its [`StopPolicy`].
//! The pipeline reuses it for both directional passes; it is equally usable
//! for standalone validator compositions that don't fit the input/output
//! split (chained syntactic checks, field validation).

use std::collections::HashMap;

/// Keyword context threaded through a chain run.
///
/// Links that name a required key via [`Link::applies`] only execute when the
/// caller supplied that key.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Stop policy for a chain run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// Stop at the first non-passing result; later links never execute
    #[default]
    StopOnFirstFail,
    /// Execute every link regardless of earlier failures
    CollectAll,
}

/// Result contract a chain link's output must satisfy.
pub trait ChainOutcome {
    /// False for a failing (blocking) result.
    fn is_passing(&self) -> bool;

    /// Rewritten working text, when this result mutates it.
    fn rewritten(&self) -> Option<&str> {
        None
    }
}

/// One executable unit in a chain.
pub trait Link: Send + Sync {
    type Output: ChainOutcome;

    /// Whether this link participates in a run with the given context.
    /// Non-applicable links are skipped entirely: no execution, no result.
    fn applies(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute against the current working text.
    fn execute(&self, text: &str, ctx: &Context) -> Self::Output;
}

/// Outcome of one chain run: the ordered results (insertion order =
/// execution order) and the final working text.
#[derive(Debug, Clone)]
pub struct ChainRun<O> {
    /// Per-link results in execution order
    pub results: Vec<O>,
    /// Working text after all mutations
    pub text: String,
}

impl<O: ChainOutcome> ChainRun<O> {
    /// First failing result, if any.
    pub fn first_failure(&self) -> Option<&O> {
        self.results.iter().find(|r| !r.is_passing())
    }

    /// True iff every collected result passes.
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|r| r.is_passing())
    }
}

/// Ordered executor over a list of links.
#[derive(Debug, Clone)]
pub struct Chain<L> {
    links: Vec<L>,
    policy: StopPolicy,
}

impl<L: Link> Chain<L> {
    /// Create a chain with the default stop-on-first-fail policy.
    pub fn new(links: Vec<L>) -> Self {
        Self {
            links,
            policy: StopPolicy::StopOnFirstFail,
        }
    }

    /// Create a chain with an explicit stop policy.
    pub fn with_policy(links: Vec<L>, policy: StopPolicy) -> Self {
        Self { links, policy }
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    pub fn links(&self) -> &[L] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Execute the chain, threading the working text.
    ///
    /// Each link sees the text as rewritten by its predecessors. Under
    /// `StopOnFirstFail` the run stops at the first non-passing result and
    /// returns the partial result list.
    pub fn run(&self, text: &str, ctx: &Context) -> ChainRun<L::Output> {
        let mut working = text.to_string();
        let mut results = Vec::with_capacity(self.links.len());

        for link in &self.links {
            if !link.applies(ctx) {
                continue;
            }
            let outcome = link.execute(&working, ctx);
            if let Some(next) = outcome.rewritten() {
                working = next.to_string();
            }
            let failed = !outcome.is_passing();
            results.push(outcome);
            if failed && self.policy == StopPolicy::StopOnFirstFail {
                break;
            }
        }

        ChainRun {
            results,
            text: working,
        }
    }

    /// Convenience: true iff every collected result is valid.
    pub fn is_valid(&self, text: &str, ctx: &Context) -> bool {
        self.run(text, ctx).is_valid()
    }
}
