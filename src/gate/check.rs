//! Standalone validators for the generic chain
//!
//! Small syntactic validators usable on a [`Chain`] without the full
//! pipeline: field validation, pre-flight checks on structured values,
//! test fixtures. Their [`Check`] output carries no text mutation.
//!
//! [`Chain`]: crate::gate::chain::Chain

use crate::error::{Error, Result};
use crate::gate::chain::{ChainOutcome, Context, Link};
use regex::Regex;

/// Outcome of one standalone validator.
#[derive(Debug, Clone)]
pub struct Check {
    /// False when the validator rejected the value
    pub valid: bool,
    /// Rejection cause; present iff `valid` is false
    pub message: Option<String>,
}

impl Check {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

impl ChainOutcome for Check {
    fn is_passing(&self) -> bool {
        self.valid
    }
}

/// Validator requiring the whole value to match a pattern.
#[derive(Debug)]
pub struct RegexValidator {
    pattern: Regex,
    message: String,
}

impl RegexValidator {
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| Error::Config(format!("invalid validator regex: {}", e)))?,
            message: message.into(),
        })
    }
}

impl Link for RegexValidator {
    type Output = Check;

    fn execute(&self, text: &str, _ctx: &Context) -> Check {
        if self.pattern.is_match(text) {
            Check::ok()
        } else {
            Check::fail(self.message.clone())
        }
    }
}

/// Validator requiring the presence (or absence) of any of a keyword set.
#[derive(Debug)]
pub struct KeywordValidator {
    keywords: Vec<String>,
    must_contain: bool,
}

impl KeywordValidator {
    pub fn require_any(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            must_contain: true,
        }
    }

    pub fn forbid_all(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            must_contain: false,
        }
    }
}

impl Link for KeywordValidator {
    type Output = Check;

    fn execute(&self, text: &str, _ctx: &Context) -> Check {
        let found = self.keywords.iter().any(|k| text.contains(k.as_str()));
        match (self.must_contain, found) {
            (true, false) => Check::fail(format!(
                "must contain one of: {}",
                self.keywords.join(", ")
            )),
            (false, true) => Check::fail(format!("must not contain: {}", self.keywords.join(", "))),
            _ => Check::ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::chain::{Chain, StopPolicy};

    enum AnyValidator {
        Pattern(RegexValidator),
        Keyword(KeywordValidator),
    }

    impl Link for AnyValidator {
        type Output = Check;

        fn execute(&self, text: &str, ctx: &Context) -> Check {
            match self {
                Self::Pattern(v) => v.execute(text, ctx),
                Self::Keyword(v) => v.execute(text, ctx),
            }
        }
    }

    /// Digits-only AND must not contain "666" — the canonical two-step
    /// syntactic chain.
    fn digits_chain() -> Chain<AnyValidator> {
        Chain::new(vec![
            AnyValidator::Pattern(RegexValidator::new(r"^\d+$", "must be digits").unwrap()),
            AnyValidator::Keyword(KeywordValidator::forbid_all(["666"])),
        ])
    }

    #[test]
    fn test_chain_accepts_valid_value() {
        assert!(digits_chain().is_valid("12345", &Context::new()));
    }

    #[test]
    fn test_chain_rejects_non_digits() {
        let run = digits_chain().run("abc", &Context::new());
        assert!(!run.is_valid());
        // stop-on-first-fail: the keyword validator never ran
        assert_eq!(run.results.len(), 1);
        assert_eq!(run.results[0].message.as_deref(), Some("must be digits"));
    }

    #[test]
    fn test_chain_rejects_forbidden_keyword() {
        let run = digits_chain().run("123666", &Context::new());
        assert!(!run.is_valid());
        assert_eq!(run.results.len(), 2);
    }

    #[test]
    fn test_collect_all_gathers_every_failure() {
        let chain = Chain::with_policy(
            vec![
                AnyValidator::Pattern(RegexValidator::new(r"^\d+$", "must be digits").unwrap()),
                AnyValidator::Keyword(KeywordValidator::require_any(["urgent"])),
            ],
            StopPolicy::CollectAll,
        );
        let run = chain.run("abc", &Context::new());
        assert_eq!(run.results.iter().filter(|c| !c.valid).count(), 2);
    }

    #[test]
    fn test_require_any_keyword() {
        let v = KeywordValidator::require_any(["urgent", "asap"]);
        assert!(v.execute("please do this asap", &Context::new()).valid);
        assert!(!v.execute("whenever you like", &Context::new()).valid);
    }
}
