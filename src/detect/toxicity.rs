//! Toxic-content detection
//!
//! Keyword/regex scan standing in for a model-based classifier. Block-on-hit
//! in the default pipeline, with a mask-redaction capability for deployments
//! that prefer a redact-on-hit toxicity stage.

use crate::config::ToxicityConfig;
use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit};
use regex::Regex;

const BUILTIN_PATTERNS: &[&str] = &[
    r"(?i)\b(?:fuck|shit|bitch|cunt)\b",
    r"(?i)\b(?:kill|murder|rape|terrorist)\b",
    r"(?i)\b(?:hate|racist|bigot)\b",
];

const MASK: &str = "***";

/// Toxic-language detector.
#[derive(Debug)]
pub struct ToxicityDetector {
    patterns: Vec<Regex>,
}

impl ToxicityDetector {
    pub fn new(config: &ToxicityConfig) -> Result<Self> {
        let patterns = BUILTIN_PATTERNS
            .iter()
            .copied()
            .chain(config.custom_patterns.iter().map(String::as_str))
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| Error::Config(format!("invalid toxicity pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_toxic(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Replace every toxic match with a mask. Idempotent: the mask matches
    /// no pattern.
    pub fn mask(&self, text: &str) -> String {
        let mut masked = text.to_string();
        for pattern in &self.patterns {
            masked = pattern.replace_all(&masked, MASK).into_owned();
        }
        masked
    }
}

impl Detector for ToxicityDetector {
    fn detect(&self, text: &str, _ctx: &Context) -> Result<Option<Hit>> {
        if self.is_toxic(text) {
            Ok(Some(Hit::new("toxic content detected")))
        } else {
            Ok(None)
        }
    }

    fn redact(&self, text: &str) -> Result<String> {
        Ok(self.mask(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ToxicityDetector {
        ToxicityDetector::new(&ToxicityConfig::default()).unwrap()
    }

    #[test]
    fn test_clean_text() {
        assert!(!detector().is_toxic("You are a wonderful person."));
        assert!(!detector().is_toxic("Let's discuss politics."));
    }

    #[test]
    fn test_profanity_detected() {
        assert!(detector().is_toxic("I hate you, you are a bitch."));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(detector().is_toxic("KILL the messenger"));
    }

    #[test]
    fn test_word_boundaries_respected() {
        // "skill" and "hated" must not match the kill/hate keywords
        assert!(!detector().is_toxic("that takes real skill"));
        assert!(!detector().is_toxic("shiitake mushrooms"));
    }

    #[test]
    fn test_mask_replaces_matches() {
        let masked = detector().mask("I hate you, you bigot");
        assert!(!masked.contains("hate"));
        assert!(!masked.contains("bigot"));
        assert!(masked.contains(MASK));
    }

    #[test]
    fn test_mask_idempotent() {
        let d = detector();
        let once = d.mask("kill it with hate");
        assert_eq!(d.mask(&once), once);
    }

    #[test]
    fn test_custom_pattern() {
        let d = ToxicityDetector::new(&ToxicityConfig {
            custom_patterns: vec![r"(?i)\bdolt\b".to_string()],
        })
        .unwrap();
        assert!(d.is_toxic("what a dolt"));
    }
}
