use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lengthguard_core::bundle::TranslationBundle;
use lengthguard_core::config::Config;
use lengthguard_core::metrics::{FontDescriptor, LengthMetrics, RenderContext};
use lengthguard_core::report::Report;
use lengthguard_core::strategies::ResolutionStrategy;
use lengthguard_core::types::Severity;
use lengthguard_core::{check, fix_bundle, locale_from_path, CheckOptions};

#[derive(Parser, Debug)]
#[command(
    name = "lengthguard",
    version,
    about = "Translation length overflow checker"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a target bundle (or a directory of bundles) against the source.
    Check {
        #[arg(long)]
        source: PathBuf,

        #[arg(long)]
        target: PathBuf,

        #[arg(long)]
        locale: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "lengthguard-out")]
        out: PathBuf,

        #[arg(long, default_value = "json")]
        output_format: OutputFormat,

        #[arg(long)]
        fail_on: Option<FailOn>,
    },
    /// Apply one resolution strategy to every issue and write the fixed bundle.
    Fix {
        #[arg(long)]
        source: PathBuf,

        #[arg(long)]
        target: PathBuf,

        #[arg(long)]
        strategy: FixStrategy,

        #[arg(long)]
        locale: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Defaults to overwriting the target.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print character, word and width estimates for a string.
    Measure {
        text: String,

        #[arg(long)]
        font_size: Option<f64>,

        #[arg(long)]
        container_width: Option<f64>,
    },
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
    Junit,
    All,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FailOn {
    Warning,
    Error,
    Critical,
}

impl From<FailOn> for Severity {
    fn from(f: FailOn) -> Self {
        match f {
            FailOn::Warning => Severity::Warning,
            FailOn::Error => Severity::Error,
            FailOn::Critical => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FixStrategy {
    Truncate,
    Abbreviate,
    MultiLine,
    FontAdjust,
}

impl From<FixStrategy> for ResolutionStrategy {
    fn from(s: FixStrategy) -> Self {
        match s {
            FixStrategy::Truncate => ResolutionStrategy::Truncate,
            FixStrategy::Abbreviate => ResolutionStrategy::Abbreviate,
            FixStrategy::MultiLine => ResolutionStrategy::MultiLine,
            FixStrategy::FontAdjust => ResolutionStrategy::FontAdjust,
        }
    }
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    magenta: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    magenta: "\x1b[35m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    magenta: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lengthguard=warn,lengthguard_core=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> std::process::ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let res = match cli.cmd {
        Commands::Check {
            source,
            target,
            locale,
            config,
            out,
            output_format,
            fail_on,
        } => {
            let opts = CheckOptions {
                locale,
                fail_on: fail_on.map(Severity::from),
                config: load_config(config.as_deref()),
            };
            run_check(&source, &target, &opts, &out, &output_format)
        }
        Commands::Fix {
            source,
            target,
            strategy,
            locale,
            config,
            output,
        } => {
            let cfg = load_config(config.as_deref());
            run_fix(
                &source,
                &target,
                strategy.into(),
                locale,
                &cfg,
                output.as_deref(),
            )
        }
        Commands::Measure {
            text,
            font_size,
            container_width,
        } => run_measure(&text, font_size, container_width),
    };

    match res {
        Ok(code) => code,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            std::process::ExitCode::from(1)
        }
    }
}

fn print_banner() {
    let s = style();
    eprintln!(
        "\n  {bold}length{reset}{magenta}|{reset}{dim}guard{reset}  {dim}translation overflow check{reset}\n",
        bold = s.bold,
        magenta = s.magenta,
        dim = s.dim,
        reset = s.reset,
    );
}

fn severity_color(sev: Severity) -> &'static str {
    let s = style();
    match sev {
        Severity::Critical => s.red,
        Severity::Error => s.magenta,
        Severity::Warning => s.yellow,
        Severity::Ok => s.dim,
    }
}

fn print_report(report: &Report, written: &[PathBuf]) {
    let s = style();

    for l in &report.locales {
        eprintln!(
            "  {bold}{}{reset}  {dim}{} entries, {} missing, {} unchecked{reset}",
            l.locale,
            l.summary.entries,
            l.summary.missing_keys,
            l.summary.unchecked_empty_source,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset
        );
        for i in &l.issues {
            eprintln!(
                "    {sc}{:<8}{reset} {:>5}%  {}",
                i.severity.as_str(),
                format!("+{}", i.overflow_percentage),
                i.key,
                sc = severity_color(i.severity),
                reset = s.reset
            );
        }
    }

    if !written.is_empty() {
        eprintln!();
        for p in written {
            eprintln!(
                "  {dim}\u{2192} {}{reset}",
                p.display(),
                dim = s.dim,
                reset = s.reset
            );
        }
    }
    eprintln!();
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => Config::load(p).unwrap_or_else(|e| {
            eprintln!(
                "{}{}warning:{} failed to load config {}: {:#}",
                style().bold,
                style().yellow,
                style().reset,
                p.display(),
                e
            );
            Config::default()
        }),
        None => Config::discover().unwrap_or_default(),
    }
}

fn run_check(
    source: &Path,
    target: &Path,
    opts: &CheckOptions,
    out: &Path,
    output_format: &OutputFormat,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    print_banner();

    let report = check(source, target, opts)?;

    std::fs::create_dir_all(out).with_context(|| format!("create out dir {}", out.display()))?;

    let write_json = matches!(output_format, OutputFormat::Json | OutputFormat::All);
    let write_md = matches!(output_format, OutputFormat::Markdown | OutputFormat::All);
    let write_junit = matches!(output_format, OutputFormat::Junit | OutputFormat::All);

    let mut written = Vec::new();

    if write_json {
        let json_path = out.join("report.json");
        let json = serde_json::to_vec_pretty(&report).context("serialize report json")?;
        std::fs::write(&json_path, json)
            .with_context(|| format!("write {}", json_path.display()))?;
        written.push(json_path);
    }

    if write_md {
        let md_path = out.join("report.md");
        std::fs::write(&md_path, report.to_markdown())
            .with_context(|| format!("write {}", md_path.display()))?;
        written.push(md_path);
    }

    if write_junit {
        let xml_path = out.join("report.xml");
        std::fs::write(&xml_path, report.to_junit_xml())
            .with_context(|| format!("write {}", xml_path.display()))?;
        written.push(xml_path);
    }

    // Machine-parseable line on stdout
    println!(
        "locales={} entries={} warnings={} errors={} critical={}",
        report.locales.len(),
        report.summary.entries,
        report.summary.warnings,
        report.summary.errors,
        report.summary.critical
    );

    // Human-readable output on stderr
    print_report(&report, &written);

    let exit = if report.gate.pass {
        eprintln!(
            "  {green}{bold}PASS{reset}",
            green = s.green,
            bold = s.bold,
            reset = s.reset
        );
        std::process::ExitCode::from(0)
    } else {
        eprintln!(
            "  {red}{bold}LENGTH CHECK FAILED{reset}  {dim}({}){reset}",
            report.gate.reason,
            red = s.red,
            bold = s.bold,
            dim = s.dim,
            reset = s.reset,
        );
        std::process::ExitCode::from(2)
    };

    eprintln!();

    Ok(exit)
}

fn run_fix(
    source: &Path,
    target: &Path,
    strategy: ResolutionStrategy,
    locale: Option<String>,
    config: &Config,
    output: Option<&Path>,
) -> anyhow::Result<std::process::ExitCode> {
    let s = style();

    print_banner();

    let locale = locale.unwrap_or_else(|| locale_from_path(target));
    let source_bundle = TranslationBundle::load(source)
        .with_context(|| format!("failed to load source bundle {}", source.display()))?;
    let target_bundle = TranslationBundle::load(target)
        .with_context(|| format!("failed to load target bundle {}", target.display()))?;

    let outcome = fix_bundle(&source_bundle, target_bundle, &locale, strategy, config)?;

    let output = output.unwrap_or(target);
    outcome.bundle.save(output)?;
    debug!(path = %output.display(), "wrote fixed bundle");

    println!(
        "locale={} strategy={} applied={} remaining={}",
        locale,
        strategy,
        outcome.applied.len(),
        outcome.remaining.len()
    );

    for fix in &outcome.applied {
        if fix.new_text == fix.original_text {
            continue;
        }
        eprintln!(
            "  {dim}{}{reset}  {} {dim}\u{2192}{reset} {bold}{}{reset}",
            fix.key,
            fix.original_text,
            fix.new_text,
            dim = s.dim,
            bold = s.bold,
            reset = s.reset
        );
    }
    eprintln!();
    eprintln!(
        "  {dim}\u{2192} {}{reset}",
        output.display(),
        dim = s.dim,
        reset = s.reset
    );
    eprintln!();

    Ok(std::process::ExitCode::from(0))
}

fn run_measure(
    text: &str,
    font_size: Option<f64>,
    container_width: Option<f64>,
) -> anyhow::Result<std::process::ExitCode> {
    let ctx = if font_size.is_some() || container_width.is_some() {
        Some(RenderContext {
            font: FontDescriptor {
                size_px: font_size.unwrap_or(FontDescriptor::default().size_px),
                ..FontDescriptor::default()
            },
            container_width: container_width.unwrap_or(0.0),
        })
    } else {
        None
    };

    let metrics = LengthMetrics::new().measure(text, ctx.as_ref());
    let json = serde_json::to_string_pretty(&metrics).context("serialize metrics json")?;
    println!("{json}");
    Ok(std::process::ExitCode::from(0))
}
