use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Severity;

pub mod context {
    pub const BUTTON: &str = "button";
    pub const MENU_ITEM: &str = "menu_item";
    pub const DIALOG_TITLE: &str = "dialog_title";
    pub const NOTIFICATION: &str = "notification";
    pub const DESCRIPTION: &str = "description";
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthRule {
    pub max_length_ratio: f64,
    pub warning_threshold: f64,
    pub error_threshold: f64,
    pub critical_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    #[error("thresholds must be finite numbers")]
    NotFinite,
    #[error("warning_threshold {0} must be at least 1.0")]
    WarningBelowOne(f64),
    #[error(
        "thresholds must be strictly increasing: warning {warning} < error {error} < critical {critical}"
    )]
    NotIncreasing {
        warning: f64,
        error: f64,
        critical: f64,
    },
    #[error("critical_threshold {critical} exceeds max_length_ratio {max}")]
    CriticalAboveMax { critical: f64, max: f64 },
    #[error("rule `{context}`: {source}")]
    InContext {
        context: String,
        source: Box<RuleError>,
    },
}

impl LengthRule {
    pub const fn new(
        max_length_ratio: f64,
        warning_threshold: f64,
        error_threshold: f64,
        critical_threshold: f64,
    ) -> Self {
        Self {
            max_length_ratio,
            warning_threshold,
            error_threshold,
            critical_threshold,
        }
    }

    /// Checks `1.0 <= warning < error < critical <= max`.
    pub fn validate(&self) -> Result<(), RuleError> {
        let all = [
            self.max_length_ratio,
            self.warning_threshold,
            self.error_threshold,
            self.critical_threshold,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(RuleError::NotFinite);
        }
        if self.warning_threshold < 1.0 {
            return Err(RuleError::WarningBelowOne(self.warning_threshold));
        }
        if !(self.warning_threshold < self.error_threshold
            && self.error_threshold < self.critical_threshold)
        {
            return Err(RuleError::NotIncreasing {
                warning: self.warning_threshold,
                error: self.error_threshold,
                critical: self.critical_threshold,
            });
        }
        if self.critical_threshold > self.max_length_ratio {
            return Err(RuleError::CriticalAboveMax {
                critical: self.critical_threshold,
                max: self.max_length_ratio,
            });
        }
        Ok(())
    }

    /// Lower bounds are inclusive and checked from the highest tier down.
    pub fn classify(&self, ratio: f64) -> Severity {
        if ratio >= self.critical_threshold {
            Severity::Critical
        } else if ratio >= self.error_threshold {
            Severity::Error
        } else if ratio >= self.warning_threshold {
            Severity::Warning
        } else {
            Severity::Ok
        }
    }

    pub fn merged(self, overrides: &RuleOverrides) -> Self {
        Self {
            max_length_ratio: overrides.max_length_ratio.unwrap_or(self.max_length_ratio),
            warning_threshold: overrides.warning_threshold.unwrap_or(self.warning_threshold),
            error_threshold: overrides.error_threshold.unwrap_or(self.error_threshold),
            critical_threshold: overrides
                .critical_threshold
                .unwrap_or(self.critical_threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOverrides {
    pub max_length_ratio: Option<f64>,
    pub warning_threshold: Option<f64>,
    pub error_threshold: Option<f64>,
    pub critical_threshold: Option<f64>,
}

pub const DEFAULT_RULE: LengthRule = LengthRule::new(1.5, 1.2, 1.35, 1.5);

const BUILTIN_CONTEXT_RULES: &[(&str, LengthRule)] = &[
    (context::BUTTON, LengthRule::new(1.3, 1.1, 1.15, 1.3)),
    (context::MENU_ITEM, LengthRule::new(1.4, 1.15, 1.25, 1.4)),
    (context::DIALOG_TITLE, LengthRule::new(1.4, 1.2, 1.3, 1.4)),
    (context::NOTIFICATION, LengthRule::new(1.6, 1.25, 1.4, 1.6)),
    (context::DESCRIPTION, LengthRule::new(2.0, 1.3, 1.6, 2.0)),
];

#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    default: LengthRule,
    contexts: BTreeMap<String, LengthRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleSet {
    pub fn builtin() -> Self {
        Self {
            default: DEFAULT_RULE,
            contexts: BUILTIN_CONTEXT_RULES
                .iter()
                .map(|(name, rule)| (name.to_string(), *rule))
                .collect(),
        }
    }

    pub fn with_default(mut self, rule: LengthRule) -> Self {
        self.default = rule;
        self
    }

    pub fn with_context(mut self, name: impl Into<String>, rule: LengthRule) -> Self {
        self.contexts.insert(name.into(), rule);
        self
    }

    pub fn default_rule(&self) -> LengthRule {
        self.default
    }

    pub fn get(&self, context: &str) -> Option<LengthRule> {
        self.contexts.get(context).copied()
    }

    pub fn resolve(&self, context: Option<&str>, overrides: Option<&RuleOverrides>) -> LengthRule {
        let base = context
            .and_then(|c| self.get(c))
            .unwrap_or(self.default);
        match overrides {
            Some(o) => base.merged(o),
            None => base,
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        self.default.validate().map_err(|e| RuleError::InContext {
            context: "default".to_string(),
            source: Box::new(e),
        })?;
        for (name, rule) in &self.contexts {
            rule.validate().map_err(|e| RuleError::InContext {
                context: name.clone(),
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}
