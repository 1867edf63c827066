//! Detector capability contract
//!
//! Every check behind a stage implements [`Detector`]. The pipeline never
//! inspects a detector's internals; it only consumes this contract, so any
//! component can be swapped without touching the orchestration core.

use crate::error::Result;
use crate::gate::chain::Context;

/// A detector's signal that its check condition was triggered.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Human-readable description of what was detected; never empty
    pub description: String,
}

impl Hit {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Detector — the one seam between the pipeline and the individual checks
// ---------------------------------------------------------------------------

/// One independent check, consumed by a stage.
///
/// Implementations must be side-effect-free and deterministic for a given
/// text and configuration, hold no per-call mutable state, and tolerate
/// concurrent invocation.
pub trait Detector: Send + Sync {
    /// Scan the text. `Ok(None)` means no hit. Context-dependent detectors
    /// read their reference material (e.g. `context`, `query`) from `ctx`.
    ///
    /// A returned error is a runtime fault: the owning stage maps it to
    /// `Blocked` (required) or `Skipped` (optional); it never propagates.
    fn detect(&self, text: &str, ctx: &Context) -> Result<Option<Hit>>;

    /// Rewrite the text to remove whatever `detect` hits on. Only invoked by
    /// redact-on-hit stages. Must be idempotent:
    /// `redact(redact(t)) == redact(t)`.
    fn redact(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}
