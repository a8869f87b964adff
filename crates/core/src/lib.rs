pub mod abbreviations;
pub mod bundle;
pub mod config;
pub mod detector;
pub mod metrics;
pub mod report;
pub mod rules;
pub mod strategies;
pub mod types;
pub mod workflow;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{
    bundle::{pair_entries, TranslationBundle},
    config::Config,
    report::{LocaleReport, Report},
    strategies::ResolutionStrategy,
    types::{LengthIssue, Severity},
    workflow::{AppliedFix, ResolutionSession},
};

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Locale of a single target file. Defaults to the file stem.
    pub locale: Option<String>,
    pub fail_on: Option<Severity>,
    pub config: Config,
}

pub fn locale_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// A single target file, or every `.json` file under a directory except the source.
pub fn collect_targets(source: &Path, target: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !target.is_dir() {
        if !target.exists() {
            anyhow::bail!("target {} does not exist", target.display());
        }
        return Ok(vec![target.to_path_buf()]);
    }

    let source_canon = source.canonicalize().ok();
    let mut targets = Vec::new();
    for entry in WalkDir::new(target).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            continue;
        }
        if source_canon.is_some() && path.canonicalize().ok() == source_canon {
            debug!(path = %path.display(), "skipping source bundle in target dir");
            continue;
        }
        targets.push(path.to_path_buf());
    }

    if targets.is_empty() {
        anyhow::bail!("no .json translation bundles found under {}", target.display());
    }
    Ok(targets)
}

pub fn check(source: &Path, target: &Path, opts: &CheckOptions) -> anyhow::Result<Report> {
    let detector = opts.config.detector()?;
    let fail_on = opts.fail_on.unwrap_or_else(|| opts.config.fail_on());

    let source_bundle = TranslationBundle::load(source)
        .with_context(|| format!("failed to load source bundle {}", source.display()))?;

    let targets = collect_targets(source, target)?;
    if opts.locale.is_some() && targets.len() > 1 {
        anyhow::bail!("--locale needs a single target file, found {} bundles", targets.len());
    }

    let mut locales = Vec::with_capacity(targets.len());
    for path in &targets {
        let locale = opts
            .locale
            .clone()
            .unwrap_or_else(|| locale_from_path(path));
        let target_bundle = TranslationBundle::load(path)
            .with_context(|| format!("failed to load target bundle {}", path.display()))?;

        let paired = pair_entries(
            &source_bundle,
            &target_bundle,
            &opts.config.context_prefixes,
            &opts.config.max_lengths,
        );
        let issues = detector.detect_issues(&paired.entries, &locale);
        locales.push(LocaleReport::new(
            &locale,
            &path.display().to_string(),
            &paired,
            issues,
        ));
    }

    let report = Report::new(&source.display().to_string(), locales, fail_on);
    info!(
        locales = report.locales.len(),
        issues = report.issue_count(),
        pass = report.gate.pass,
        "check finished"
    );
    Ok(report)
}

#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub applied: Vec<AppliedFix>,
    pub bundle: TranslationBundle,
    pub remaining: Vec<LengthIssue>,
}

pub fn fix_bundle(
    source: &TranslationBundle,
    target: TranslationBundle,
    locale: &str,
    strategy: ResolutionStrategy,
    config: &Config,
) -> anyhow::Result<FixOutcome> {
    let detector = config.detector()?;
    let engine = config.strategy_engine()?;

    let paired = pair_entries(source, &target, &config.context_prefixes, &config.max_lengths);
    let issues = detector.detect_issues(&paired.entries, locale);

    let mut session = ResolutionSession::new(&engine, target, issues);
    let applied = session.resolve_all(strategy)?;
    let bundle = session.into_sink();

    let paired = pair_entries(source, &bundle, &config.context_prefixes, &config.max_lengths);
    let remaining = detector.detect_issues(&paired.entries, locale);

    info!(
        locale,
        %strategy,
        applied = applied.len(),
        remaining = remaining.len(),
        "fix finished"
    );

    Ok(FixOutcome {
        applied,
        bundle,
        remaining,
    })
}
