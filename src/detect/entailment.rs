//! Grounding check: does the output follow from the supplied context?
//!
//! Classifies the relationship between a premise (retrieved context) and a
//! hypothesis (generated output) as entailment, neutral, or contradiction.
//! The built-in scorer is a lexical-overlap heuristic standing in for a
//! model-backed NLI cross-encoder; the pipeline consumes it through the
//! detector factory seam, so a model-backed replacement plugs in without
//! touching the orchestration. Only a contradiction is a hit: neutral
//! content is unverifiable, not wrong.

use crate::config::GroundingConfig;
use crate::detect::tokens::content_words;
use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit, CONTEXT_KEY};
use serde::{Deserialize, Serialize};

/// Relationship between premise and hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntailmentLabel {
    /// Every content claim in the hypothesis is supported by the premise
    Entailment,
    /// The hypothesis is unrelated to the premise
    Neutral,
    /// The hypothesis overlaps the premise's topic but asserts specifics
    /// the premise does not support
    Contradiction,
}

/// Heuristic entailment scorer; block-on-hit for contradictions.
#[derive(Debug)]
pub struct EntailmentDetector {
    contradiction_overlap: f64,
}

impl EntailmentDetector {
    pub fn new(config: &GroundingConfig) -> Result<Self> {
        if !(config.contradiction_overlap > 0.0 && config.contradiction_overlap <= 1.0) {
            return Err(Error::Config(format!(
                "contradiction_overlap must be within (0, 1], got {}",
                config.contradiction_overlap
            )));
        }
        Ok(Self {
            contradiction_overlap: config.contradiction_overlap,
        })
    }

    /// Classify the premise/hypothesis relationship.
    ///
    /// A hypothesis whose content words are all present in the premise is
    /// entailed. One that shares enough of the premise's topic while
    /// asserting unsupported terms contradicts it. Anything else is neutral.
    pub fn classify(&self, premise: &str, hypothesis: &str) -> EntailmentLabel {
        let premise_words = content_words(premise);
        let hypothesis_words = content_words(hypothesis);
        if hypothesis_words.is_empty() {
            return EntailmentLabel::Neutral;
        }

        let supported = hypothesis_words
            .iter()
            .filter(|w| premise_words.contains(*w))
            .count();
        let overlap = supported as f64 / hypothesis_words.len() as f64;

        if supported == hypothesis_words.len() {
            EntailmentLabel::Entailment
        } else if overlap >= self.contradiction_overlap {
            EntailmentLabel::Contradiction
        } else {
            EntailmentLabel::Neutral
        }
    }
}

impl Detector for EntailmentDetector {
    fn detect(&self, text: &str, ctx: &Context) -> Result<Option<Hit>> {
        let Some(premise) = ctx.get(CONTEXT_KEY) else {
            return Ok(None);
        };
        match self.classify(premise, text) {
            EntailmentLabel::Contradiction => Ok(Some(Hit::new(
                "output contradicts the supplied context",
            ))),
            EntailmentLabel::Entailment | EntailmentLabel::Neutral => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREMISE: &str = "The Apollo 11 mission landed on the Moon in 1969. \
                           Neil Armstrong was the first man to walk on the surface.";

    fn detector() -> EntailmentDetector {
        EntailmentDetector::new(&GroundingConfig::default()).unwrap()
    }

    // ---- Classification ----

    #[test]
    fn test_supported_claim_entailed() {
        let label = detector().classify(PREMISE, "Neil Armstrong walked on the Moon in 1969.");
        assert_eq!(label, EntailmentLabel::Entailment);
    }

    #[test]
    fn test_conflicting_claim_contradicts() {
        let label = detector().classify(PREMISE, "The mission landed on Mars.");
        assert_eq!(label, EntailmentLabel::Contradiction);
    }

    #[test]
    fn test_unrelated_claim_neutral() {
        let label = detector().classify(PREMISE, "Neil Armstrong liked to eat cheese.");
        assert_eq!(label, EntailmentLabel::Neutral);
    }

    #[test]
    fn test_empty_hypothesis_neutral() {
        assert_eq!(detector().classify(PREMISE, ""), EntailmentLabel::Neutral);
    }

    // ---- Detector contract ----

    #[test]
    fn test_no_context_no_hit() {
        let d = detector();
        let hit = d.detect("The mission landed on Mars.", &Context::new()).unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_contradiction_is_a_hit() {
        let d = detector();
        let ctx = Context::new().with(CONTEXT_KEY, PREMISE);
        let hit = d.detect("The mission landed on Mars.", &ctx).unwrap();
        assert!(hit.unwrap().description.contains("contradicts"));
    }

    #[test]
    fn test_entailed_output_is_not_a_hit() {
        let d = detector();
        let ctx = Context::new().with(CONTEXT_KEY, PREMISE);
        let hit = d
            .detect("Neil Armstrong walked on the Moon in 1969.", &ctx)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_bad_threshold_fails_construction() {
        let result = EntailmentDetector::new(&GroundingConfig {
            contradiction_overlap: 0.0,
        });
        assert!(result.is_err());
    }
}
