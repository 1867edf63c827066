//! Topical relevance check between query and output
//!
//! Scores query/output similarity with a term-frequency cosine, standing in
//! for an embedding model behind the same factory seam. Below-threshold
//! similarity is advisory in the default pipeline: the stage is warn-only
//! and the hit surfaces as a trace warning the caller may act on.

use crate::config::RelevanceConfig;
use crate::detect::tokens::{cosine_similarity, term_counts};
use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit, QUERY_KEY};

/// Query/output similarity scorer; warn-only in the default pipeline.
#[derive(Debug)]
pub struct RelevanceDetector {
    threshold: f64,
}

impl RelevanceDetector {
    pub fn new(config: &RelevanceConfig) -> Result<Self> {
        if !(config.threshold > 0.0 && config.threshold <= 1.0) {
            return Err(Error::Config(format!(
                "relevance threshold must be within (0, 1], got {}",
                config.threshold
            )));
        }
        Ok(Self {
            threshold: config.threshold,
        })
    }

    /// Cosine similarity between the two texts' term-frequency vectors,
    /// in [0, 1].
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        cosine_similarity(&term_counts(a), &term_counts(b))
    }
}

impl Detector for RelevanceDetector {
    fn detect(&self, text: &str, ctx: &Context) -> Result<Option<Hit>> {
        let Some(query) = ctx.get(QUERY_KEY) else {
            return Ok(None);
        };
        let similarity = self.similarity(text, query);
        if similarity < self.threshold {
            Ok(Some(Hit::new(format!(
                "output similarity {:.2} to the query is below threshold {:.2}",
                similarity, self.threshold
            ))))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> RelevanceDetector {
        RelevanceDetector::new(&RelevanceConfig::default()).unwrap()
    }

    #[test]
    fn test_identical_texts_fully_similar() {
        let d = detector();
        assert!((d.similarity("refund policy details", "refund policy details") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_related_texts_score_above_unrelated() {
        let d = detector();
        let related = d.similarity(
            "Refunds are processed within 14 days of purchase.",
            "What is the refund processing time?",
        );
        let unrelated = d.similarity(
            "Refunds are processed within 14 days of purchase.",
            "I like to eat pizza.",
        );
        assert!(related > unrelated);
    }

    #[test]
    fn test_no_query_no_hit() {
        let d = detector();
        assert!(d.detect("anything", &Context::new()).unwrap().is_none());
    }

    #[test]
    fn test_off_topic_output_is_a_hit() {
        let d = detector();
        let ctx = Context::new().with(QUERY_KEY, "what is the refund policy");
        let hit = d.detect("I like to eat pizza.", &ctx).unwrap();
        assert!(hit.unwrap().description.contains("below threshold"));
    }

    #[test]
    fn test_on_topic_output_is_not_a_hit() {
        let d = detector();
        let ctx = Context::new().with(QUERY_KEY, "what is the refund policy");
        let hit = d
            .detect("The refund policy is: refunds are processed in 14 days.", &ctx)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_bad_threshold_fails_construction() {
        assert!(RelevanceDetector::new(&RelevanceConfig { threshold: 2.0 }).is_err());
    }
}
