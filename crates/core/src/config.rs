use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::{
    abbreviations::{AbbreviationScope, AbbreviationTable},
    bundle::ContextPrefix,
    detector::Detector,
    rules::{RuleOverrides, RuleSet},
    strategies::{StrategyEngine, DEFAULT_TRUNCATE_RATIO},
    types::Severity,
};

pub const CONFIG_FILE_NAME: &str = "lengthguard.toml";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub truncate_ratio: Option<f64>,
    pub abbreviation_scope: Option<AbbreviationScope>,
    pub fail_on: Option<Severity>,
    pub rules: RulesConfig,
    pub context_prefixes: Vec<ContextPrefix>,
    pub max_lengths: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    pub default: Option<RuleOverrides>,
    pub contexts: BTreeMap<String, RuleOverrides>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    pub fn discover() -> Option<Self> {
        Config::discover_in(Path::new("."))
    }

    /// `None` when `dir` has no config file or it cannot be loaded.
    pub fn discover_in(dir: &Path) -> Option<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return None;
        }
        match Config::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), "ignoring unreadable config: {e:#}");
                None
            }
        }
    }

    /// New context names start from the (possibly overridden) default rule.
    pub fn rule_set(&self) -> anyhow::Result<RuleSet> {
        let builtin = RuleSet::builtin();
        let default = match &self.rules.default {
            Some(o) => builtin.default_rule().merged(o),
            None => builtin.default_rule(),
        };

        let mut rules = builtin.clone().with_default(default);
        for (name, overrides) in &self.rules.contexts {
            let base = builtin.get(name).unwrap_or(default);
            rules = rules.with_context(name.clone(), base.merged(overrides));
        }

        rules.validate().context("invalid length rules in config")?;
        Ok(rules)
    }

    pub fn detector(&self) -> anyhow::Result<Detector> {
        Ok(Detector::new(self.rule_set()?))
    }

    pub fn strategy_engine(&self) -> anyhow::Result<StrategyEngine> {
        let ratio = self.truncate_ratio.unwrap_or(DEFAULT_TRUNCATE_RATIO);
        if !ratio.is_finite() || ratio <= 0.0 {
            anyhow::bail!("truncate_ratio must be a positive number, got {ratio}");
        }
        let scope = self.abbreviation_scope.unwrap_or_default();
        Ok(StrategyEngine::new(AbbreviationTable::new(scope), ratio))
    }

    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}
