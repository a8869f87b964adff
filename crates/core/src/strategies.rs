use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    abbreviations::AbbreviationTable,
    metrics::text_len,
    types::LengthIssue,
};

const ELLIPSIS: &str = "...";
const ELLIPSIS_LEN: usize = 3;

pub const DEFAULT_TRUNCATE_RATIO: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    Truncate,
    Abbreviate,
    Rephrase,
    MultiLine,
    FontAdjust,
}

impl ResolutionStrategy {
    pub const ALL: [ResolutionStrategy; 5] = [
        ResolutionStrategy::Truncate,
        ResolutionStrategy::Abbreviate,
        ResolutionStrategy::Rephrase,
        ResolutionStrategy::MultiLine,
        ResolutionStrategy::FontAdjust,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ResolutionStrategy::Truncate => "truncate",
            ResolutionStrategy::Abbreviate => "abbreviate",
            ResolutionStrategy::Rephrase => "rephrase",
            ResolutionStrategy::MultiLine => "multi-line",
            ResolutionStrategy::FontAdjust => "font-adjust",
        }
    }

    pub fn alters_text(self) -> bool {
        !matches!(
            self,
            ResolutionStrategy::MultiLine | ResolutionStrategy::FontAdjust
        )
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resolution strategy `{0}`")]
pub struct ParseStrategyError(pub String);

impl FromStr for ResolutionStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResolutionStrategy::ALL
            .into_iter()
            .find(|st| st.id() == s)
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

/// Shortens `text` to at most `max_len` code units, preferring sentence and
/// then word boundaries, and marks the cut with `...`.
pub fn smart_truncate(text: &str, max_len: usize) -> String {
    if text_len(text) <= max_len {
        return text.to_string();
    }
    if max_len <= ELLIPSIS_LEN {
        return take_units(text, max_len);
    }

    let budget = max_len - ELLIPSIS_LEN;
    if let Some(cut) = truncate_at_sentence(text, budget) {
        return format!("{cut}{ELLIPSIS}");
    }
    format!("{}{ELLIPSIS}", truncate_at_word(text, budget))
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_terminator = false;

    for (i, ch) in text.char_indices() {
        let is_terminator = matches!(ch, '.' | '!' | '?');
        if in_terminator && !is_terminator {
            pieces.push(&text[start..i]);
            start = i;
        }
        in_terminator = is_terminator;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn truncate_at_sentence(text: &str, budget: usize) -> Option<String> {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return None;
    }

    let mut acc = String::new();
    let mut taken = 0;
    for sentence in &sentences {
        if text_len(&acc) + text_len(sentence) > budget {
            break;
        }
        acc.push_str(sentence);
        taken += 1;
    }
    if taken == 0 || taken == sentences.len() {
        return None;
    }

    let cut = acc.trim().trim_end_matches(['.', '!', '?']).trim_end();
    if cut.is_empty() {
        None
    } else {
        Some(cut.to_string())
    }
}

fn truncate_at_word(text: &str, budget: usize) -> String {
    let mut acc = String::new();
    for word in text.split_whitespace() {
        let sep = usize::from(!acc.is_empty());
        if text_len(&acc) + sep + text_len(word) > budget {
            break;
        }
        if sep == 1 {
            acc.push(' ');
        }
        acc.push_str(word);
    }

    // Not even the first word fits.
    if acc.is_empty() {
        return take_units(text.trim_start(), budget).trim_end().to_string();
    }
    acc.trim_end_matches([',', ';', ':']).to_string()
}

fn take_units(text: &str, units: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        used += ch.len_utf16();
        if used > units {
            break;
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone)]
pub struct StrategyEngine {
    abbreviations: AbbreviationTable,
    truncate_ratio: f64,
}

impl Default for StrategyEngine {
    fn default() -> Self {
        Self::new(AbbreviationTable::default(), DEFAULT_TRUNCATE_RATIO)
    }
}

impl StrategyEngine {
    pub fn new(abbreviations: AbbreviationTable, truncate_ratio: f64) -> Self {
        Self {
            abbreviations,
            truncate_ratio,
        }
    }

    pub fn truncate_ratio(&self) -> f64 {
        self.truncate_ratio
    }

    /// Explicit max length when present, else `floor(source_length * truncate_ratio)`.
    pub fn target_length(&self, issue: &LengthIssue) -> usize {
        issue
            .max_length
            .unwrap_or_else(|| (issue.source_length as f64 * self.truncate_ratio).floor() as usize)
    }

    pub fn abbreviate(&self, text: &str, locale: &str, target: usize) -> String {
        let shortened = self.abbreviations.apply(text, locale);
        if text_len(&shortened) > target {
            smart_truncate(&shortened, target)
        } else {
            shortened
        }
    }

    /// `edited_text` is only read for rephrase.
    pub fn compute_preview(
        &self,
        issue: &LengthIssue,
        strategy: ResolutionStrategy,
        edited_text: &str,
    ) -> String {
        match strategy {
            ResolutionStrategy::Truncate => {
                smart_truncate(&issue.translated_text, self.target_length(issue))
            }
            ResolutionStrategy::Abbreviate => self.abbreviate(
                &issue.translated_text,
                &issue.locale,
                self.target_length(issue),
            ),
            ResolutionStrategy::Rephrase => edited_text.to_string(),
            ResolutionStrategy::MultiLine | ResolutionStrategy::FontAdjust => {
                issue.translated_text.clone()
            }
        }
    }
}
