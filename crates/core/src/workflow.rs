use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    strategies::{ResolutionStrategy, StrategyEngine},
    types::LengthIssue,
};

pub trait ResolveSink {
    fn resolve(&mut self, key: &str, locale: &str, new_text: &str, strategy: ResolutionStrategy);
}

impl<F> ResolveSink for F
where
    F: FnMut(&str, &str, &str, ResolutionStrategy),
{
    fn resolve(&mut self, key: &str, locale: &str, new_text: &str, strategy: ResolutionStrategy) {
        self(key, locale, new_text, strategy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogState {
    Closed,
    IssueSelected,
    StrategySelected,
    PreviewGenerated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("no issue for key `{key}` in locale `{locale}`")]
    UnknownIssue { key: String, locale: String },
    #[error("no issue is selected")]
    NoIssueSelected,
    #[error("no resolution strategy is selected")]
    NoStrategySelected,
    #[error("rephrase needs non-empty replacement text")]
    EmptyRephrase,
    #[error("rephrase cannot be applied in batch; it needs operator text per issue")]
    BatchRephrase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFix {
    pub key: String,
    pub locale: String,
    pub original_text: String,
    pub new_text: String,
    pub strategy: ResolutionStrategy,
}

pub struct ResolutionSession<'e, S> {
    engine: &'e StrategyEngine,
    sink: S,
    issues: Vec<LengthIssue>,
    state: DialogState,
    selected: Option<usize>,
    strategy: Option<ResolutionStrategy>,
    edited_text: String,
    preview: Option<String>,
}

impl<'e, S: ResolveSink> ResolutionSession<'e, S> {
    pub fn new(engine: &'e StrategyEngine, sink: S, issues: Vec<LengthIssue>) -> Self {
        Self {
            engine,
            sink,
            issues,
            state: DialogState::Closed,
            selected: None,
            strategy: None,
            edited_text: String::new(),
            preview: None,
        }
    }

    pub fn issues(&self) -> &[LengthIssue] {
        &self.issues
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn selected_issue(&self) -> Option<&LengthIssue> {
        self.selected.map(|i| &self.issues[i])
    }

    pub fn selected_strategy(&self) -> Option<ResolutionStrategy> {
        self.strategy
    }

    pub fn edited_text(&self) -> &str {
        &self.edited_text
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn select_issue(&mut self, key: &str, locale: &str) -> Result<(), WorkflowError> {
        let idx = self
            .issues
            .iter()
            .position(|i| i.key == key && i.locale == locale)
            .ok_or_else(|| WorkflowError::UnknownIssue {
                key: key.to_string(),
                locale: locale.to_string(),
            })?;
        self.select_index(idx);
        Ok(())
    }

    fn select_index(&mut self, idx: usize) {
        self.selected = Some(idx);
        self.edited_text.clear();
        self.refresh_preview();
    }

    pub fn select_strategy(&mut self, strategy: ResolutionStrategy) -> Result<(), WorkflowError> {
        if self.selected.is_none() {
            return Err(WorkflowError::NoIssueSelected);
        }
        self.strategy = Some(strategy);
        self.refresh_preview();
        Ok(())
    }

    pub fn edit_text(&mut self, text: impl Into<String>) -> Result<(), WorkflowError> {
        if self.selected.is_none() {
            return Err(WorkflowError::NoIssueSelected);
        }
        self.edited_text = text.into();
        self.refresh_preview();
        Ok(())
    }

    pub fn can_apply(&self) -> bool {
        self.check_apply().is_ok()
    }

    fn check_apply(&self) -> Result<(usize, ResolutionStrategy), WorkflowError> {
        let idx = self.selected.ok_or(WorkflowError::NoIssueSelected)?;
        let strategy = self.strategy.ok_or(WorkflowError::NoStrategySelected)?;
        if strategy == ResolutionStrategy::Rephrase && self.edited_text.trim().is_empty() {
            return Err(WorkflowError::EmptyRephrase);
        }
        Ok((idx, strategy))
    }

    /// Commits the current preview through the sink and closes the dialog.
    pub fn apply(&mut self) -> Result<AppliedFix, WorkflowError> {
        let (idx, strategy) = self.check_apply()?;
        let new_text = match self.preview.take() {
            Some(text) => text,
            None => self
                .engine
                .compute_preview(&self.issues[idx], strategy, &self.edited_text),
        };

        let issue = self.issues.remove(idx);
        self.sink
            .resolve(&issue.key, &issue.locale, &new_text, strategy);

        info!(
            key = %issue.key,
            locale = %issue.locale,
            %strategy,
            "length issue resolved"
        );

        self.close();
        Ok(AppliedFix {
            key: issue.key,
            locale: issue.locale,
            original_text: issue.translated_text,
            new_text,
            strategy,
        })
    }

    pub fn cancel(&mut self) {
        if self.state != DialogState::Closed {
            debug!("resolution dialog cancelled");
        }
        self.close();
    }

    pub fn resolve_all(
        &mut self,
        strategy: ResolutionStrategy,
    ) -> Result<Vec<AppliedFix>, WorkflowError> {
        if strategy == ResolutionStrategy::Rephrase {
            return Err(WorkflowError::BatchRephrase);
        }
        let mut applied = Vec::with_capacity(self.issues.len());
        while !self.issues.is_empty() {
            self.select_index(0);
            self.select_strategy(strategy)?;
            applied.push(self.apply()?);
        }
        Ok(applied)
    }

    fn close(&mut self) {
        self.state = DialogState::Closed;
        self.selected = None;
        self.strategy = None;
        self.edited_text.clear();
        self.preview = None;
    }

    fn refresh_preview(&mut self) {
        self.preview = None;
        let Some(idx) = self.selected else {
            self.state = DialogState::Closed;
            return;
        };
        let Some(strategy) = self.strategy else {
            self.state = DialogState::IssueSelected;
            return;
        };
        if strategy == ResolutionStrategy::Rephrase && self.edited_text.trim().is_empty() {
            self.state = DialogState::StrategySelected;
            return;
        }
        self.preview = Some(
            self.engine
                .compute_preview(&self.issues[idx], strategy, &self.edited_text),
        );
        self.state = DialogState::PreviewGenerated;
    }
}
