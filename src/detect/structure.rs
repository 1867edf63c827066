//! Structural validity checks
//!
//! Length bounds, optional whole-text format, forbidden patterns, and (for
//! outputs) required JSON keys. Purely local and cheap; both pipeline
//! directions run a structure stage before anything dependency-bearing.

use crate::config::{InputLimits, OutputLimits};
use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit};
use regex::Regex;

/// Forbidden by default on the input side: common injection carriers.
const INPUT_FORBIDDEN: &[&str] = &[
    r"(?is)<script.*?>.*?</script>",
    r"(?i)javascript:",
    r"(?i)\bon\w+\s*=",
    r"(?i)\beval\s*\(",
    r"(?i)\bexec\s*\(",
];

/// Forbidden by default on the output side: content the generator must
/// never surface regardless of toxicity-stage configuration.
const OUTPUT_FORBIDDEN: &[&str] = &[
    r"(?i)\b(?:fuck|shit|bitch|cunt)\b",
    r"(?i)\b(?:terrorist|kill|murder)\b",
];

/// Structural validator; block-on-hit.
#[derive(Debug)]
pub struct StructureDetector {
    label: &'static str,
    min_length: usize,
    max_length: usize,
    allowed_format: Option<Regex>,
    forbidden: Vec<Regex>,
    required_json_keys: Vec<String>,
}

impl StructureDetector {
    /// Input-side variant: length, format, forbidden carriers.
    pub fn for_input(limits: &InputLimits) -> Result<Self> {
        Ok(Self {
            label: "input",
            min_length: limits.min_length,
            max_length: limits.max_length,
            allowed_format: limits
                .allowed_format
                .as_deref()
                .map(compile)
                .transpose()?,
            forbidden: compile_all(INPUT_FORBIDDEN, &limits.forbidden_patterns)?,
            required_json_keys: Vec::new(),
        })
    }

    /// Output-side variant: length, forbidden content, JSON schema keys.
    pub fn for_output(limits: &OutputLimits) -> Result<Self> {
        Ok(Self {
            label: "output",
            min_length: limits.min_length,
            max_length: limits.max_length,
            allowed_format: None,
            forbidden: compile_all(OUTPUT_FORBIDDEN, &limits.forbidden_patterns)?,
            required_json_keys: limits.required_json_keys.clone(),
        })
    }

    /// First structural violation, if any.
    fn violation(&self, text: &str) -> Option<String> {
        let length = text.chars().count();
        if length < self.min_length {
            return Some(format!(
                "{} too short: {} characters, minimum {}",
                self.label, length, self.min_length
            ));
        }
        if length > self.max_length {
            return Some(format!(
                "{} too long: {} characters, maximum {}",
                self.label, length, self.max_length
            ));
        }
        if let Some(ref format) = self.allowed_format {
            if !format.is_match(text) {
                return Some(format!("{} contains characters outside the allowed format", self.label));
            }
        }
        for pattern in &self.forbidden {
            if pattern.is_match(text) {
                return Some(format!(
                    "{} matches forbidden pattern '{}'",
                    self.label,
                    pattern.as_str()
                ));
            }
        }
        if !self.required_json_keys.is_empty() {
            return self.json_violation(text);
        }
        None
    }

    fn json_violation(&self, text: &str) -> Option<String> {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(_) => return Some(format!("{} is not valid JSON", self.label)),
        };
        let object = match value.as_object() {
            Some(o) => o,
            None => return Some(format!("{} is not a JSON object", self.label)),
        };
        let missing: Vec<&str> = self
            .required_json_keys
            .iter()
            .filter(|k| !object.contains_key(*k))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            None
        } else {
            Some(format!(
                "{} missing required keys: {}",
                self.label,
                missing.join(", ")
            ))
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Config(format!("invalid structure pattern '{}': {}", pattern, e)))
}

fn compile_all(builtin: &[&str], custom: &[String]) -> Result<Vec<Regex>> {
    builtin
        .iter()
        .copied()
        .chain(custom.iter().map(String::as_str))
        .map(compile)
        .collect()
}

impl Detector for StructureDetector {
    fn detect(&self, text: &str, _ctx: &Context) -> Result<Option<Hit>> {
        Ok(self.violation(text).map(Hit::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_detector(min: usize, max: usize) -> StructureDetector {
        StructureDetector::for_input(&InputLimits {
            min_length: min,
            max_length: max,
            ..Default::default()
        })
        .unwrap()
    }

    // ---- Length bounds ----

    #[test]
    fn test_length_within_bounds() {
        let d = input_detector(5, 100);
        assert!(d.detect("hello there", &Context::new()).unwrap().is_none());
    }

    #[test]
    fn test_too_short() {
        let d = input_detector(5, 100);
        let hit = d.detect("hi", &Context::new()).unwrap().unwrap();
        assert!(hit.description.contains("too short"));
    }

    #[test]
    fn test_too_long() {
        let d = input_detector(1, 10);
        let hit = d.detect(&"a".repeat(11), &Context::new()).unwrap().unwrap();
        assert!(hit.description.contains("too long"));
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let d = input_detector(1, 4);
        // four multibyte chars, more than four bytes
        assert!(d.detect("žžžž", &Context::new()).unwrap().is_none());
    }

    // ---- Format and forbidden patterns ----

    #[test]
    fn test_allowed_format_enforced() {
        let d = StructureDetector::for_input(&InputLimits {
            allowed_format: Some(r"^[a-zA-Z0-9\s]+$".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(d.detect("plain words 123", &Context::new()).unwrap().is_none());
        assert!(d.detect("special #$% chars", &Context::new()).unwrap().is_some());
    }

    #[test]
    fn test_builtin_forbidden_input_patterns() {
        let d = input_detector(1, 1000);
        for bad in [
            "<script>alert(1)</script>",
            "click javascript:void(0)",
            "eval (payload)",
        ] {
            assert!(d.detect(bad, &Context::new()).unwrap().is_some(), "{}", bad);
        }
    }

    #[test]
    fn test_custom_forbidden_pattern() {
        let d = StructureDetector::for_input(&InputLimits {
            forbidden_patterns: vec![r"(?i)\bpassword\b".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert!(d.detect("my password is hunter2", &Context::new()).unwrap().is_some());
    }

    // ---- Output variant ----

    #[test]
    fn test_output_forbidden_content() {
        let d = StructureDetector::for_output(&OutputLimits::default()).unwrap();
        assert!(d.detect("this is fine", &Context::new()).unwrap().is_none());
        assert!(d.detect("I will kill the process", &Context::new()).unwrap().is_some());
    }

    #[test]
    fn test_required_json_keys() {
        let d = StructureDetector::for_output(&OutputLimits {
            required_json_keys: vec!["answer".to_string(), "confidence".to_string()],
            ..Default::default()
        })
        .unwrap();

        assert!(d
            .detect(r#"{"answer": "42", "confidence": 0.9}"#, &Context::new())
            .unwrap()
            .is_none());

        let hit = d.detect(r#"{"answer": "42"}"#, &Context::new()).unwrap().unwrap();
        assert!(hit.description.contains("confidence"));

        let hit = d.detect("not json at all", &Context::new()).unwrap().unwrap();
        assert!(hit.description.contains("not valid JSON"));
    }

    #[test]
    fn test_bad_config_regex_fails_construction() {
        let result = StructureDetector::for_input(&InputLimits {
            forbidden_patterns: vec!["[unclosed".to_string()],
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
