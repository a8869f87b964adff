use tracing::{debug, info};

use crate::{
    metrics::text_len,
    rules::{context, RuleOverrides, RuleSet},
    types::{LengthIssue, Severity, TranslationEntry, ValidationResult},
};

const BUTTON_ADVICE_RATIO: f64 = 1.1;
const MENU_ADVICE_RATIO: f64 = 1.15;

#[derive(Debug, Clone, Default)]
pub struct Detector {
    rules: RuleSet,
}

/// `max(0, round((ratio - 1) * 100))`
pub fn overflow_percentage(ratio: f64) -> u32 {
    let pct = ((ratio - 1.0) * 100.0).round();
    if pct > 0.0 {
        pct as u32
    } else {
        0
    }
}

impl Detector {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate(
        &self,
        source: &str,
        translated: &str,
        context: Option<&str>,
        overrides: Option<&RuleOverrides>,
    ) -> ValidationResult {
        let source_length = text_len(source);
        let translated_length = text_len(translated);

        // Nothing to compare against; report as ok but mark it unchecked.
        if source_length == 0 {
            return ValidationResult {
                is_valid: true,
                checkable: false,
                severity: Severity::Ok,
                source_length,
                translated_length,
                ratio: 0.0,
                overflow_percentage: 0,
                recommendation: recommendation(Severity::Ok).to_string(),
                suggested_fixes: Vec::new(),
            };
        }

        let rule = self.rules.resolve(context, overrides);
        let ratio = translated_length as f64 / source_length as f64;
        let severity = rule.classify(ratio);

        ValidationResult {
            is_valid: !severity.is_failure(),
            checkable: true,
            severity,
            source_length,
            translated_length,
            ratio,
            overflow_percentage: overflow_percentage(ratio),
            recommendation: recommendation(severity).to_string(),
            suggested_fixes: suggested_fixes(severity, context, ratio),
        }
    }

    /// Non-ok entries, worst first. The sort is stable.
    pub fn detect_issues(&self, entries: &[TranslationEntry], locale: &str) -> Vec<LengthIssue> {
        let mut issues: Vec<LengthIssue> = Vec::new();

        for entry in entries {
            let result = self.validate(
                &entry.source,
                &entry.translated,
                entry.context.as_deref(),
                None,
            );

            let mut severity = result.severity;
            // An empty source stays unchecked even under an explicit limit.
            if let Some(max) = entry.max_length.filter(|_| result.checkable) {
                if result.translated_length > max && severity < Severity::Error {
                    debug!(
                        key = %entry.key,
                        max,
                        length = result.translated_length,
                        "translation exceeds explicit max length"
                    );
                    severity = Severity::Error;
                }
            }

            if severity == Severity::Ok {
                continue;
            }

            debug!(
                key = %entry.key,
                locale,
                %severity,
                ratio = result.ratio,
                "length issue"
            );

            issues.push(LengthIssue {
                key: entry.key.clone(),
                source_text: entry.source.clone(),
                translated_text: entry.translated.clone(),
                source_length: result.source_length,
                translated_length: result.translated_length,
                overflow_percentage: result.overflow_percentage,
                locale: locale.to_string(),
                severity,
                context: entry.context.clone(),
                max_length: entry.max_length,
            });
        }

        issues.sort_by(|a, b| {
            b.severity
                .rank()
                .cmp(&a.severity.rank())
                .then_with(|| b.overflow_percentage.cmp(&a.overflow_percentage))
        });

        info!(
            locale,
            entries = entries.len(),
            issues = issues.len(),
            "length check finished"
        );

        issues
    }
}

fn recommendation(severity: Severity) -> &'static str {
    match severity {
        Severity::Ok => "Translation length is within acceptable limits.",
        Severity::Warning => {
            "Translation is somewhat longer than the source; check that it still fits."
        }
        Severity::Error => {
            "Translation is significantly longer than the source and is likely to overflow; shorten it."
        }
        Severity::Critical => {
            "Translation far exceeds the source length and will break the layout; it must be shortened."
        }
    }
}

fn suggested_fixes(severity: Severity, ctx: Option<&str>, ratio: f64) -> Vec<String> {
    let mut fixes: Vec<&str> = Vec::new();

    match ctx {
        Some(context::BUTTON) if ratio > BUTTON_ADVICE_RATIO => {
            fixes.push("Use a single imperative verb without articles");
            fixes.push("Replace the label with an icon and a tooltip");
        }
        Some(context::MENU_ITEM) if ratio > MENU_ADVICE_RATIO => {
            fixes.push("Use a single noun where possible");
            fixes.push("Move details into a submenu or tooltip");
        }
        _ => {}
    }

    match severity {
        Severity::Ok => {}
        Severity::Warning => {
            fixes.push("Review the translation in its UI context");
            fixes.push("Consider a more concise wording");
        }
        Severity::Error => {
            fixes.push("Use a shorter synonym or a standard abbreviation");
            fixes.push("Remove non-essential words");
            fixes.push("Allow the text to wrap onto multiple lines");
        }
        Severity::Critical => {
            fixes.push("Rewrite the translation to be substantially shorter");
            fixes.push("Use a standard abbreviation");
            fixes.push("Increase the space available in the layout");
            fixes.push("Reduce the font size for this element");
        }
    }

    fixes.into_iter().map(str::to_string).collect()
}
