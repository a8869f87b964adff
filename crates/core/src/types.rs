use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn rank(self) -> u8 {
        match self {
            Severity::Ok => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
            Severity::Critical => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranslationEntry {
    pub key: String,
    pub source: String,
    pub translated: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

impl TranslationEntry {
    pub fn new(key: impl Into<String>, source: impl Into<String>, translated: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: source.into(),
            translated: translated.into(),
            context: None,
            max_length: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// False only for an empty source.
    pub checkable: bool,
    pub severity: Severity,
    pub source_length: usize,
    pub translated_length: usize,
    pub ratio: f64,
    pub overflow_percentage: u32,
    pub recommendation: String,
    pub suggested_fixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LengthIssue {
    pub key: String,
    pub source_text: String,
    pub translated_text: String,
    pub source_length: usize,
    pub translated_length: usize,
    pub overflow_percentage: u32,
    pub locale: String,
    pub severity: Severity,
    pub context: Option<String>,
    pub max_length: Option<usize>,
}
