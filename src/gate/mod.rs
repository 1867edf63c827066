//! Core orchestration — verdicts, stages, degradation, the generic chain,
//! and the two-directional pipeline.

pub mod chain;
pub mod check;
pub mod degrade;
pub mod pipeline;
pub mod stage;
pub mod traits;
pub mod verdict;

pub use chain::{Chain, ChainOutcome, ChainRun, Context, Link, StopPolicy};
pub use check::{Check, KeywordValidator, RegexValidator};
pub use degrade::DegradableStage;
pub use pipeline::{
    DetectorFactory, GatePipeline, GateStage, PipelineBuilder, PipelineResult, CONTEXT_KEY,
    QUERY_KEY,
};
pub use stage::{Stage, StageKind, StagePolicy};
pub use traits::{Detector, Hit};
pub use verdict::{StageOutcome, Verdict};
