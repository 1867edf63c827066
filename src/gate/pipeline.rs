//! Two-directional safety-gate pipeline
//!
//! [`GatePipeline`] composes an ordered input chain and an ordered output
//! chain over the generic executor. Each call is strictly sequential: every
//! stage sees the working text as rewritten by its predecessors, and both
//! directions stop at the first block. Later stages assume sanitized,
//! non-malicious text; execution never continues past a failure.
//!
//! Stage ordering puts cheap, purely-local checks (length, format) ahead of
//! dependency-bearing ones (grounding, relevance), failing fast on the
//! cheapest signal.

use crate::config::GateConfig;
use crate::detect::{
    EntailmentDetector, InjectionDetector, PiiDetector, RelevanceDetector, SanitizeDetector,
    StructureDetector, ToxicityDetector,
};
use crate::error::Result;
use crate::gate::chain::{Chain, Context, Link};
use crate::gate::degrade::DegradableStage;
use crate::gate::stage::{Stage, StageKind, StagePolicy};
use crate::gate::traits::Detector;
use crate::gate::verdict::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Context key under which `validate_output` exposes the grounding context.
pub const CONTEXT_KEY: &str = "context";

/// Context key under which `validate_output` exposes the originating query.
pub const QUERY_KEY: &str = "query";

/// Factory producing a stage's detector; failure degrades the stage.
pub type DetectorFactory = Box<dyn FnOnce() -> Result<Arc<dyn Detector>>>;

/// One entry in a pipeline chain: a fixed stage or a degradable one.
#[derive(Debug, Clone)]
pub enum GateStage {
    Fixed(Stage),
    Degradable(DegradableStage),
}

impl GateStage {
    pub fn name(&self) -> &str {
        match self {
            Self::Fixed(s) => s.name(),
            Self::Degradable(s) => s.name(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        match self {
            Self::Fixed(_) => false,
            Self::Degradable(s) => s.is_degraded(),
        }
    }
}

impl From<Stage> for GateStage {
    fn from(stage: Stage) -> Self {
        Self::Fixed(stage)
    }
}

impl From<DegradableStage> for GateStage {
    fn from(stage: DegradableStage) -> Self {
        Self::Degradable(stage)
    }
}

impl Link for GateStage {
    type Output = Verdict;

    fn applies(&self, ctx: &Context) -> bool {
        match self {
            Self::Fixed(s) => s.applies(ctx),
            Self::Degradable(s) => s.applies(ctx),
        }
    }

    fn execute(&self, text: &str, ctx: &Context) -> Verdict {
        match self {
            Self::Fixed(s) => s.execute(text, ctx),
            Self::Degradable(s) => s.execute(text, ctx),
        }
    }
}

/// Final outcome of one `validate_input`/`validate_output` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Final text after all stage mutations; absent when blocked
    pub text: Option<String>,
    /// Whether any stage blocked
    pub blocked: bool,
    /// Stage-attributed cause, when blocked
    pub reason: Option<String>,
    /// Ordered per-stage verdicts; insertion order = execution order
    pub trace: Vec<Verdict>,
}

impl PipelineResult {
    fn from_run(results: Vec<Verdict>, text: String) -> Self {
        match results.iter().find(|v| !v.is_passing()) {
            Some(verdict) => Self {
                text: None,
                blocked: true,
                reason: Some(format!(
                    "{}: {}",
                    verdict.stage,
                    verdict.reason.as_deref().unwrap_or("blocked")
                )),
                trace: results,
            },
            None => Self {
                text: Some(text),
                blocked: false,
                reason: None,
                trace: results,
            },
        }
    }
}

/// The concrete two-directional orchestrator.
///
/// Construction is the only fallible step; a built pipeline is immutable,
/// holds no per-call state, and is safe to share across threads.
pub struct GatePipeline {
    input_chain: Chain<GateStage>,
    output_chain: Chain<GateStage>,
}

impl GatePipeline {
    /// Build the default pipeline for a configuration.
    pub fn new(config: &GateConfig) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    /// Builder allowing detector-factory overrides for the degradable
    /// stages.
    pub fn builder(config: GateConfig) -> PipelineBuilder {
        PipelineBuilder {
            config,
            grounding: None,
            relevance: None,
        }
    }

    /// Assemble a pipeline from explicit stage lists. Both chains always
    /// run stop-on-first-block; that policy is not configurable here.
    pub fn from_stages(input: Vec<GateStage>, output: Vec<GateStage>) -> Self {
        Self {
            input_chain: Chain::new(input),
            output_chain: Chain::new(output),
        }
    }

    /// Run the input-side chain over user text.
    pub fn validate_input(&self, text: &str) -> PipelineResult {
        let run = self.input_chain.run(text, &Context::new());
        let result = PipelineResult::from_run(run.results, run.text);
        if result.blocked {
            tracing::warn!(reason = result.reason.as_deref().unwrap_or(""), "input blocked");
        }
        result
    }

    /// Run the output-side chain over generated text. The grounding stage
    /// participates only when `context` is supplied, the relevance stage
    /// only when `query` is.
    pub fn validate_output(
        &self,
        text: &str,
        context: Option<&str>,
        query: Option<&str>,
    ) -> PipelineResult {
        let mut ctx = Context::new();
        if let Some(context) = context {
            ctx = ctx.with(CONTEXT_KEY, context);
        }
        if let Some(query) = query {
            ctx = ctx.with(QUERY_KEY, query);
        }
        let run = self.output_chain.run(text, &ctx);
        let result = PipelineResult::from_run(run.results, run.text);
        if result.blocked {
            tracing::warn!(reason = result.reason.as_deref().unwrap_or(""), "output blocked");
        }
        result
    }

    /// Names of stages whose backing detector failed to construct.
    pub fn degraded_stages(&self) -> Vec<&str> {
        self.input_chain
            .links()
            .iter()
            .chain(self.output_chain.links())
            .filter(|s| s.is_degraded())
            .map(GateStage::name)
            .collect()
    }
}

/// Builds the default stage lists, with factory overrides for the stages
/// whose backends may be unavailable.
pub struct PipelineBuilder {
    config: GateConfig,
    grounding: Option<DetectorFactory>,
    relevance: Option<DetectorFactory>,
}

impl PipelineBuilder {
    /// Override the grounding (entailment) detector factory.
    pub fn grounding_factory(mut self, factory: DetectorFactory) -> Self {
        self.grounding = Some(factory);
        self
    }

    /// Override the relevance detector factory.
    pub fn relevance_factory(mut self, factory: DetectorFactory) -> Self {
        self.relevance = Some(factory);
        self
    }

    /// Construct the pipeline. Required-stage detectors fail loudly here;
    /// degradable-stage factories degrade their stage instead.
    pub fn build(self) -> Result<GatePipeline> {
        let config = self.config;
        config.validate()?;

        let toxicity: Arc<dyn Detector> = Arc::new(ToxicityDetector::new(&config.toxicity)?);

        let input = vec![
            Stage::new(
                "sanitize",
                StageKind::Required,
                StagePolicy::RedactOnHit,
                Arc::new(SanitizeDetector::new()?),
            )
            .into(),
            Stage::new(
                "structure",
                StageKind::Required,
                StagePolicy::BlockOnHit,
                Arc::new(StructureDetector::for_input(&config.input)?),
            )
            .into(),
            Stage::new(
                "injection",
                StageKind::Required,
                StagePolicy::BlockOnHit,
                Arc::new(InjectionDetector::new(&config.injection)?),
            )
            .into(),
            Stage::new(
                "toxicity",
                StageKind::Required,
                StagePolicy::BlockOnHit,
                Arc::clone(&toxicity),
            )
            .into(),
            Stage::new(
                "pii",
                StageKind::Required,
                StagePolicy::RedactOnHit,
                Arc::new(PiiDetector::new()?),
            )
            .into(),
        ];

        let grounding_factory = self.grounding.unwrap_or_else(|| {
            let grounding_config = config.grounding.clone();
            Box::new(move || {
                Ok(Arc::new(EntailmentDetector::new(&grounding_config)?) as Arc<dyn Detector>)
            })
        });
        let relevance_factory = self.relevance.unwrap_or_else(|| {
            let relevance_config = config.relevance.clone();
            Box::new(move || {
                Ok(Arc::new(RelevanceDetector::new(&relevance_config)?) as Arc<dyn Detector>)
            })
        });

        let output = vec![
            Stage::new(
                "structure",
                StageKind::Required,
                StagePolicy::BlockOnHit,
                Arc::new(StructureDetector::for_output(&config.output)?),
            )
            .into(),
            Stage::new(
                "toxicity",
                StageKind::Required,
                StagePolicy::BlockOnHit,
                toxicity,
            )
            .into(),
            DegradableStage::from_factory(
                "grounding",
                StageKind::Optional,
                StagePolicy::BlockOnHit,
                grounding_factory,
            )
            .requires(CONTEXT_KEY)
            .into(),
            DegradableStage::from_factory(
                "relevance",
                StageKind::Optional,
                StagePolicy::WarnOnly,
                relevance_factory,
            )
            .requires(QUERY_KEY)
            .into(),
        ];

        Ok(GatePipeline {
            input_chain: Chain::new(input),
            output_chain: Chain::new(output),
        })
    }
}
