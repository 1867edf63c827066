//! PII detection and redaction
//!
//! Regex patterns for contact details and identifiers, each redacted to a
//! typed placeholder. PII is never a hard block in the default pipeline:
//! matches are rewritten and processing continues.

use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit};
use regex::Regex;

/// Built-in PII kinds; the placeholder is `<REDACTED_{NAME}>`.
const PATTERNS: &[(&str, &str)] = &[
    ("email", r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"),
    ("ssn", r"\b\d{3}-\d{2}-\d{4}\b"),
    ("phone", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"),
    ("credit_card", r"\b(?:\d[ -]?){13,16}\b"),
];

/// PII detector; redact-on-hit.
#[derive(Debug)]
pub struct PiiDetector {
    patterns: Vec<(&'static str, Regex)>,
}

impl PiiDetector {
    pub fn new() -> Result<Self> {
        let patterns = PATTERNS
            .iter()
            .map(|(name, pattern)| {
                Regex::new(pattern)
                    .map(|re| (*name, re))
                    .map_err(|e| Error::Config(format!("pii pattern '{}' failed: {}", name, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Names of the PII kinds present in the text, in pattern order.
    pub fn kinds_found(&self, text: &str) -> Vec<&'static str> {
        self.patterns
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(name, _)| *name)
            .collect()
    }

    /// Replace every match with its typed placeholder. Idempotent: the
    /// placeholders match no pattern.
    pub fn redact_all(&self, text: &str) -> String {
        let mut redacted = text.to_string();
        for (name, re) in &self.patterns {
            let placeholder = format!("<REDACTED_{}>", name.to_uppercase());
            redacted = re.replace_all(&redacted, placeholder.as_str()).into_owned();
        }
        redacted
    }
}

impl Detector for PiiDetector {
    fn detect(&self, text: &str, _ctx: &Context) -> Result<Option<Hit>> {
        let kinds = self.kinds_found(text);
        if kinds.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Hit::new(format!("pii detected: {}", kinds.join(", ")))))
        }
    }

    fn redact(&self, text: &str) -> Result<String> {
        Ok(self.redact_all(text))
    }
}
