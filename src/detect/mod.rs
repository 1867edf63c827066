//! Default detectors behind the pipeline's stages
//!
//! Each detector is a swappable implementation of the [`Detector`]
//! capability contract; the pipeline never depends on anything here beyond
//! construction. Heuristic scorers (entailment, relevance) stand in for
//! model-backed implementations behind the same seam.
//!
//! [`Detector`]: crate::gate::Detector

pub mod entailment;
pub mod injection;
pub mod pii;
pub mod relevance;
pub mod sanitize;
pub mod structure;
pub mod tokens;
pub mod toxicity;

pub use entailment::{EntailmentDetector, EntailmentLabel};
pub use injection::{InjectionCategory, InjectionDetector, InjectionMatch};
pub use pii::PiiDetector;
pub use relevance::RelevanceDetector;
pub use sanitize::SanitizeDetector;
pub use structure::StructureDetector;
pub use toxicity::ToxicityDetector;
