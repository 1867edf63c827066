//! Per-stage verdict model
//!
//! A [`Verdict`] is the immutable outcome of one stage invocation. Stages
//! produce verdicts; the pipeline collects them into an ordered trace and
//! derives the final pass/block decision from the first non-passing entry.

use crate::gate::chain::ChainOutcome;
use serde::{Deserialize, Serialize};

/// Outcome of one stage invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// No hit; text flows through unchanged
    Pass,
    /// Hit redacted; the rewritten text replaces the working text
    Redacted,
    /// Hit blocked; processing stops, no text is propagated
    Blocked,
    /// Stage did not run (degraded or faulting optional stage)
    Skipped,
}

/// Immutable outcome of one stage's execution.
///
/// `Blocked` verdicts never carry text: blocked content must not propagate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Name of the stage that produced this verdict
    pub stage: String,
    /// Outcome
    pub outcome: StageOutcome,
    /// Output text for `Pass`/`Redacted`/`Skipped` (input echoed for
    /// `Pass`/`Skipped`)
    pub text: Option<String>,
    /// Cause for `Blocked`/`Redacted`; non-empty when present
    pub reason: Option<String>,
    /// Advisory hit from a warn-only stage; recorded in the trace only
    pub warning: Option<String>,
}

impl Verdict {
    /// Clean pass: text flows through unchanged.
    pub fn pass(stage: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Pass,
            text: Some(text.into()),
            reason: None,
            warning: None,
        }
    }

    /// Pass with an advisory warning (warn-only stage hit).
    pub fn pass_with_warning(
        stage: impl Into<String>,
        text: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Pass,
            text: Some(text.into()),
            reason: None,
            warning: Some(warning.into()),
        }
    }

    /// Hit redacted; `text` is the rewritten working text.
    pub fn redacted(
        stage: impl Into<String>,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Redacted,
            text: Some(text.into()),
            reason: Some(reason.into()),
            warning: None,
        }
    }

    /// Hit blocked; the input text is discarded.
    pub fn blocked(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Blocked,
            text: None,
            reason: Some(reason.into()),
            warning: None,
        }
    }

    /// Stage did not run; text flows through unchanged.
    pub fn skipped(stage: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Skipped,
            text: Some(text.into()),
            reason: None,
            warning: None,
        }
    }

    /// True unless this verdict is `Blocked`.
    pub fn is_passing(&self) -> bool {
        self.outcome != StageOutcome::Blocked
    }
}

impl ChainOutcome for Verdict {
    fn is_passing(&self) -> bool {
        Verdict::is_passing(self)
    }

    fn rewritten(&self) -> Option<&str> {
        match self.outcome {
            StageOutcome::Redacted => self.text.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_carries_no_text() {
        let v = Verdict::blocked("injection", "prompt injection detected");
        assert_eq!(v.outcome, StageOutcome::Blocked);
        assert!(v.text.is_none());
        assert!(!v.is_passing());
    }

    #[test]
    fn test_pass_echoes_text() {
        let v = Verdict::pass("toxicity", "hello");
        assert_eq!(v.text.as_deref(), Some("hello"));
        assert!(v.is_passing());
        assert!(v.reason.is_none());
    }

    #[test]
    fn test_redacted_rewrites_working_text() {
        let v = Verdict::redacted("pii", "mail <REDACTED_EMAIL>", "redacted email");
        assert_eq!(ChainOutcome::rewritten(&v), Some("mail <REDACTED_EMAIL>"));
        assert!(v.is_passing());
    }

    #[test]
    fn test_pass_does_not_rewrite() {
        let v = Verdict::pass("toxicity", "hello");
        assert_eq!(ChainOutcome::rewritten(&v), None);
        let v = Verdict::skipped("entailment", "hello");
        assert_eq!(ChainOutcome::rewritten(&v), None);
    }

    #[test]
    fn test_warning_recorded_outside_reason() {
        let v = Verdict::pass_with_warning("relevance", "hello", "similarity 0.1 below 0.5");
        assert!(v.reason.is_none());
        assert!(v.warning.is_some());
        assert!(v.is_passing());
    }

    #[test]
    fn test_serialization_round_trip() {
        let v = Verdict::blocked("structure", "Input too long");
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"blocked\""));
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.outcome, StageOutcome::Blocked);
    }
}
