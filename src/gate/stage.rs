//! Stage — one configured check in a pipeline
//!
//! A [`Stage`] binds a detector to its action policy (block / redact / warn)
//! and its kind (required / optional). Both are declared once, at
//! construction, as explicit per-stage configuration data.

use crate::gate::chain::{Context, Link};
use crate::gate::traits::Detector;
use crate::gate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether a stage's failure blocks the pipeline or degrades to a skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// An unverifiable check must not pass: faults become `Blocked`
    Required,
    /// An unverifiable advisory check must not halt: faults become `Skipped`
    Optional,
}

/// Action taken when the detector reports a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicy {
    /// Terminate with `Blocked`
    BlockOnHit,
    /// Rewrite the working text via `Detector::redact` and continue
    RedactOnHit,
    /// Record the hit in the trace and continue; never alters flow
    WarnOnly,
}

/// One configured check: a detector plus its action policy.
///
/// Constructed at pipeline build time, immutable thereafter, safe for
/// concurrent reuse across calls.
#[derive(Clone)]
pub struct Stage {
    name: String,
    kind: StageKind,
    policy: StagePolicy,
    detector: Arc<dyn Detector>,
    requires: Option<&'static str>,
}

impl Stage {
    pub fn new(
        name: impl Into<String>,
        kind: StageKind,
        policy: StagePolicy,
        detector: Arc<dyn Detector>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            policy,
            detector,
            requires: None,
        }
    }

    /// Restrict this stage to calls that supply the given context key.
    /// Without the key the stage does not execute and leaves no trace entry.
    pub fn requires(mut self, key: &'static str) -> Self {
        self.requires = Some(key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn policy(&self) -> StagePolicy {
        self.policy
    }

    pub fn required_key(&self) -> Option<&'static str> {
        self.requires
    }

    /// Execute the stage against the working text.
    ///
    /// All detector faults are contained here: a required stage fails closed
    /// (`Blocked`), an optional stage fails open (`Skipped`). Nothing
    /// escapes as an error.
    pub fn run(&self, text: &str, ctx: &Context) -> Verdict {
        let hit = match self.detector.detect(text, ctx) {
            Ok(hit) => hit,
            Err(e) => return self.fault(text, &e.to_string()),
        };

        let hit = match hit {
            None => return Verdict::pass(&self.name, text),
            Some(hit) => hit,
        };

        match self.policy {
            StagePolicy::BlockOnHit => {
                tracing::warn!(stage = %self.name, reason = %hit.description, "stage blocked");
                Verdict::blocked(&self.name, hit.description)
            }
            StagePolicy::RedactOnHit => match self.detector.redact(text) {
                Ok(rewritten) => {
                    tracing::debug!(stage = %self.name, "stage redacted working text");
                    Verdict::redacted(&self.name, rewritten, hit.description)
                }
                Err(e) => self.fault(text, &e.to_string()),
            },
            StagePolicy::WarnOnly => {
                tracing::info!(stage = %self.name, hit = %hit.description, "advisory hit");
                Verdict::pass_with_warning(&self.name, text, hit.description)
            }
        }
    }

    fn fault(&self, text: &str, detail: &str) -> Verdict {
        match self.kind {
            StageKind::Required => {
                tracing::warn!(stage = %self.name, error = detail, "required stage failed");
                Verdict::blocked(&self.name, format!("stage {} failed: {}", self.name, detail))
            }
            StageKind::Optional => {
                tracing::warn!(stage = %self.name, error = detail, "optional stage skipped");
                Verdict::skipped(&self.name, text)
            }
        }
    }
}

impl Link for Stage {
    type Output = Verdict;

    fn applies(&self, ctx: &Context) -> bool {
        self.requires.map_or(true, |key| ctx.contains(key))
    }

    fn execute(&self, text: &str, ctx: &Context) -> Verdict {
        self.run(text, ctx)
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gate::traits::Hit;
    use crate::gate::verdict::StageOutcome;

    /// Test detector: hits on a trigger word, redacts by masking it,
    /// optionally always errors.
    struct WordDetector {
        word: &'static str,
        fail: bool,
    }

    impl Detector for WordDetector {
        fn detect(&self, text: &str, _ctx: &Context) -> crate::error::Result<Option<Hit>> {
            if self.fail {
                return Err(Error::Detector("backend unavailable".into()));
            }
            if text.contains(self.word) {
                Ok(Some(Hit::new(format!("found '{}'", self.word))))
            } else {
                Ok(None)
            }
        }

        fn redact(&self, text: &str) -> crate::error::Result<String> {
            Ok(text.replace(self.word, "***"))
        }
    }

    fn detector(word: &'static str) -> Arc<dyn Detector> {
        Arc::new(WordDetector { word, fail: false })
    }

    fn failing_detector() -> Arc<dyn Detector> {
        Arc::new(WordDetector {
            word: "x",
            fail: true,
        })
    }

    // ---- Policy dispatch ----

    #[test]
    fn test_no_hit_passes() {
        let s = Stage::new("t", StageKind::Required, StagePolicy::BlockOnHit, detector("bad"));
        let v = s.run("clean text", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Pass);
        assert_eq!(v.text.as_deref(), Some("clean text"));
    }

    #[test]
    fn test_block_on_hit() {
        let s = Stage::new("t", StageKind::Required, StagePolicy::BlockOnHit, detector("bad"));
        let v = s.run("bad text", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Blocked);
        assert!(v.text.is_none());
        assert_eq!(v.reason.as_deref(), Some("found 'bad'"));
    }

    #[test]
    fn test_redact_on_hit() {
        let s = Stage::new("t", StageKind::Required, StagePolicy::RedactOnHit, detector("bad"));
        let v = s.run("bad text", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Redacted);
        assert_eq!(v.text.as_deref(), Some("*** text"));
        assert!(v.reason.is_some());
    }

    #[test]
    fn test_warn_only_never_alters_flow() {
        let s = Stage::new("t", StageKind::Optional, StagePolicy::WarnOnly, detector("bad"));
        let v = s.run("bad text", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Pass);
        assert_eq!(v.text.as_deref(), Some("bad text"));
        assert!(v.reason.is_none());
        assert_eq!(v.warning.as_deref(), Some("found 'bad'"));
    }

    // ---- Fault containment ----

    #[test]
    fn test_required_stage_fails_closed() {
        let s = Stage::new(
            "ground",
            StageKind::Required,
            StagePolicy::BlockOnHit,
            failing_detector(),
        );
        let v = s.run("anything", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Blocked);
        assert!(v.reason.as_deref().unwrap().contains("stage ground failed"));
    }

    #[test]
    fn test_optional_stage_fails_open() {
        let s = Stage::new(
            "ground",
            StageKind::Optional,
            StagePolicy::BlockOnHit,
            failing_detector(),
        );
        let v = s.run("anything", &Context::new());
        assert_eq!(v.outcome, StageOutcome::Skipped);
        assert_eq!(v.text.as_deref(), Some("anything"));
    }

    // ---- Context gating ----

    #[test]
    fn test_requires_key_gates_applicability() {
        let s = Stage::new("t", StageKind::Optional, StagePolicy::BlockOnHit, detector("bad"))
            .requires("context");
        assert!(!s.applies(&Context::new()));
        assert!(s.applies(&Context::new().with("context", "c")));
    }
}
