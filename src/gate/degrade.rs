//! Graceful degradation for stages with fallible backends
//!
//! A [`DegradableStage`] wraps a stage whose detector may fail to construct
//! (a model dependency absent, a resource missing). The decision is made
//! once, from the factory result: a failed factory leaves the stage
//! permanently inert for this pipeline instance, and every run reports
//! `Skipped` without touching any detector. The degraded status is an
//! inspectable field and appears in the trace as `Skipped` entries; the
//! factory is never retried.

use crate::error::Result;
use crate::gate::chain::{Context, Link};
use crate::gate::stage::{Stage, StageKind, StagePolicy};
use crate::gate::traits::Detector;
use crate::gate::verdict::Verdict;
use std::sync::Arc;

/// Decorator over a stage whose backing detector may be unavailable.
#[derive(Debug, Clone)]
pub struct DegradableStage {
    name: String,
    requires: Option<&'static str>,
    /// `None` = degraded at construction, fixed for the pipeline's lifetime
    inner: Option<Stage>,
}

impl DegradableStage {
    /// Build the stage from a detector factory.
    ///
    /// A factory error degrades the stage instead of failing pipeline
    /// construction.
    pub fn from_factory<F>(
        name: impl Into<String>,
        kind: StageKind,
        policy: StagePolicy,
        factory: F,
    ) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn Detector>>,
    {
        let name = name.into();
        let inner = match factory() {
            Ok(detector) => Some(Stage::new(name.clone(), kind, policy, detector)),
            Err(e) => {
                tracing::warn!(stage = %name, error = %e, "stage degraded: detector unavailable");
                None
            }
        };
        Self {
            name,
            requires: None,
            inner,
        }
    }

    /// Restrict this stage to calls that supply the given context key.
    pub fn requires(mut self, key: &'static str) -> Self {
        self.requires = Some(key);
        self.inner = self.inner.map(|s| s.requires(key));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the backing detector failed to construct.
    pub fn is_degraded(&self) -> bool {
        self.inner.is_none()
    }

    /// Execute the stage, or report `Skipped` when degraded.
    pub fn run(&self, text: &str, ctx: &Context) -> Verdict {
        match &self.inner {
            Some(stage) => stage.run(text, ctx),
            None => Verdict::skipped(&self.name, text),
        }
    }
}

impl Link for DegradableStage {
    type Output = Verdict;

    fn applies(&self, ctx: &Context) -> bool {
        self.requires.map_or(true, |key| ctx.contains(key))
    }

    fn execute(&self, text: &str, ctx: &Context) -> Verdict {
        self.run(text, ctx)
    }
}
