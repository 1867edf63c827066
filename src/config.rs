//! Safegate configuration management
//!
//! All knobs are construction-time: stage thresholds, pattern extensions,
//! and the admission-gate window. Every section is serde-defaulted so a
//! partial YAML file overrides only what it names. Invalid values fail
//! loudly at startup via [`GateConfig::validate`]; nothing is re-checked
//! per call.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main safegate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Input-side limits and patterns
    pub input: InputLimits,

    /// Output-side limits and patterns
    pub output: OutputLimits,

    /// Prompt-injection detection
    pub injection: InjectionConfig,

    /// Toxic-content detection
    pub toxicity: ToxicityConfig,

    /// Output grounding (entailment) check
    pub grounding: GroundingConfig,

    /// Query/output topical relevance check
    pub relevance: RelevanceConfig,

    /// Admission-gate sliding window
    pub rate_limit: RateLimitConfig,
}

impl GateConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: GateConfig = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Check all thresholds and user-supplied patterns.
    ///
    /// The pipeline constructor calls this; a failure here is the only way
    /// a configuration problem surfaces, and it surfaces before any text is
    /// processed.
    pub fn validate(&self) -> Result<()> {
        if self.input.min_length > self.input.max_length {
            return Err(Error::Config(format!(
                "input min_length {} exceeds max_length {}",
                self.input.min_length, self.input.max_length
            )));
        }
        if self.output.min_length > self.output.max_length {
            return Err(Error::Config(format!(
                "output min_length {} exceeds max_length {}",
                self.output.min_length, self.output.max_length
            )));
        }
        check_unit_interval("relevance.threshold", self.relevance.threshold)?;
        check_unit_interval(
            "grounding.contradiction_overlap",
            self.grounding.contradiction_overlap,
        )?;
        if self.rate_limit.max_calls == 0 {
            return Err(Error::Config("rate_limit.max_calls must be at least 1".into()));
        }
        if self.rate_limit.period_seconds == 0 {
            return Err(Error::Config(
                "rate_limit.period_seconds must be at least 1".into(),
            ));
        }

        if let Some(ref pattern) = self.input.allowed_format {
            compile_check("input.allowed_format", pattern)?;
        }
        for pattern in self
            .input
            .forbidden_patterns
            .iter()
            .chain(&self.output.forbidden_patterns)
            .chain(&self.injection.custom_patterns)
            .chain(&self.toxicity.custom_patterns)
        {
            compile_check("pattern", pattern)?;
        }
        Ok(())
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(Error::Config(format!(
            "{} must be within (0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn compile_check(name: &str, pattern: &str) -> Result<()> {
    regex::Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| Error::Config(format!("invalid {} regex '{}': {}", name, pattern, e)))
}

/// Input-side limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    /// Minimum accepted input length (characters)
    pub min_length: usize,
    /// Maximum accepted input length (characters)
    pub max_length: usize,
    /// Optional regex the whole input must match
    pub allowed_format: Option<String>,
    /// Additional forbidden patterns beyond the built-ins
    pub forbidden_patterns: Vec<String>,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 1000,
            allowed_format: None,
            forbidden_patterns: Vec::new(),
        }
    }
}

/// Output-side limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLimits {
    /// Minimum accepted output length (characters)
    pub min_length: usize,
    /// Maximum accepted output length (characters)
    pub max_length: usize,
    /// Additional forbidden patterns beyond the built-ins
    pub forbidden_patterns: Vec<String>,
    /// When non-empty, the output must be a JSON object containing these keys
    pub required_json_keys: Vec<String>,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 2000,
            forbidden_patterns: Vec::new(),
            required_json_keys: Vec::new(),
        }
    }
}

/// Prompt-injection detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Additional blocking patterns beyond the built-ins
    pub custom_patterns: Vec<String>,
    /// Scan base64 blocks for encoded injection payloads
    pub detect_encoded: bool,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            custom_patterns: Vec::new(),
            detect_encoded: true,
        }
    }
}

/// Toxic-content detection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToxicityConfig {
    /// Additional patterns beyond the built-ins
    pub custom_patterns: Vec<String>,
}

/// Grounding (entailment) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Minimum content-word overlap for an unsupported claim to count as a
    /// contradiction rather than merely neutral
    pub contradiction_overlap: f64,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            contradiction_overlap: 0.5,
        }
    }
}

/// Relevance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    /// Minimum query/output similarity before an advisory warning is raised
    pub threshold: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

/// Admission-gate sliding window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum calls per key within the window
    pub max_calls: usize,
    /// Window duration in seconds
    pub period_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 10,
            period_seconds: 60,
        }
    }
}
