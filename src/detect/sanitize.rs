//! Markup sanitizer for user input
//!
//! Strips script blocks, inline event handlers, and remaining HTML tags,
//! then normalizes whitespace. Runs first on the input side so every later
//! stage sees cleaned text.

use crate::error::{Error, Result};
use crate::gate::{Context, Detector, Hit};
use regex::Regex;

/// Input sanitizer; redact-on-hit.
#[derive(Debug)]
pub struct SanitizeDetector {
    script_blocks: Regex,
    event_handlers: Regex,
    html_tags: Regex,
}

impl SanitizeDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // (?s) so a script body spanning lines is still stripped whole
            script_blocks: compile(r"(?is)<script.*?</script>")?,
            event_handlers: compile(r#"(?i)\bon\w+\s*=\s*["'][^"']*["']"#)?,
            // Tag names are alphanumeric only; redaction placeholders like
            // <REDACTED_EMAIL> contain underscores and must survive a re-run
            html_tags: compile(r"</?[A-Za-z][A-Za-z0-9]*(?:\s[^>]*)?>")?,
        })
    }

    /// Strip markup and collapse whitespace. Idempotent: sanitized text
    /// contains no tags and is already whitespace-normalized.
    pub fn sanitize(&self, text: &str) -> String {
        let stripped = self.script_blocks.replace_all(text, "");
        let stripped = self.event_handlers.replace_all(&stripped, "");
        let stripped = self.html_tags.replace_all(&stripped, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("sanitizer pattern failed: {}", e)))
}

impl Detector for SanitizeDetector {
    fn detect(&self, text: &str, _ctx: &Context) -> Result<Option<Hit>> {
        if self.sanitize(text) != text {
            Ok(Some(Hit::new("input contained markup or irregular whitespace")))
        } else {
            Ok(None)
        }
    }

    fn redact(&self, text: &str) -> Result<String> {
        Ok(self.sanitize(text))
    }
}
