use serde::{Deserialize, Serialize};

use crate::{
    bundle::PairedEntries,
    metrics::text_len,
    types::{LengthIssue, Severity},
};

pub const REPORT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub report_version: String,
    pub inputs: Inputs,
    pub summary: Summary,
    pub locales: Vec<LocaleReport>,
    pub gate: GateResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inputs {
    pub source_path: String,
    pub target_paths: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub entries: usize,
    pub unchecked_empty_source: usize,
    pub missing_keys: usize,
    pub warnings: usize,
    pub errors: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleReport {
    pub locale: String,
    pub target_path: String,
    pub summary: Summary,
    pub missing_keys: Vec<String>,
    pub issues: Vec<LengthIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateResult {
    pub fail_on: Severity,
    pub pass: bool,
    pub reason: String,
}

impl Summary {
    pub fn new(paired: &PairedEntries, issues: &[LengthIssue]) -> Self {
        let mut s = Summary {
            entries: paired.entries.len(),
            unchecked_empty_source: paired
                .entries
                .iter()
                .filter(|e| text_len(&e.source) == 0)
                .count(),
            missing_keys: paired.missing_keys.len(),
            ..Summary::default()
        };
        for issue in issues {
            match issue.severity {
                Severity::Ok => {}
                Severity::Warning => s.warnings += 1,
                Severity::Error => s.errors += 1,
                Severity::Critical => s.critical += 1,
            }
        }
        s
    }

    pub fn add(&mut self, other: &Summary) {
        self.entries += other.entries;
        self.unchecked_empty_source += other.unchecked_empty_source;
        self.missing_keys += other.missing_keys;
        self.warnings += other.warnings;
        self.errors += other.errors;
        self.critical += other.critical;
    }

    pub fn at_or_above(&self, severity: Severity) -> usize {
        let mut n = 0;
        if severity <= Severity::Warning {
            n += self.warnings;
        }
        if severity <= Severity::Error {
            n += self.errors;
        }
        n + self.critical
    }
}

impl LocaleReport {
    pub fn new(
        locale: &str,
        target_path: &str,
        paired: &PairedEntries,
        issues: Vec<LengthIssue>,
    ) -> Self {
        Self {
            locale: locale.to_string(),
            target_path: target_path.to_string(),
            summary: Summary::new(paired, &issues),
            missing_keys: paired.missing_keys.clone(),
            issues,
        }
    }
}

pub fn evaluate_gate(summary: &Summary, fail_on: Severity) -> GateResult {
    let failing = summary.at_or_above(fail_on);
    let pass = failing == 0;
    GateResult {
        fail_on,
        pass,
        reason: if pass {
            format!("no issues at or above {fail_on}")
        } else {
            format!("{failing} issue(s) at or above {fail_on}")
        },
    }
}

impl Report {
    pub fn new(
        source_path: &str,
        locales: Vec<LocaleReport>,
        fail_on: Severity,
    ) -> Self {
        let mut summary = Summary::default();
        for l in &locales {
            summary.add(&l.summary);
        }
        let gate = evaluate_gate(&summary, fail_on);

        Self {
            report_version: REPORT_VERSION.to_string(),
            inputs: Inputs {
                source_path: source_path.to_string(),
                target_paths: locales.iter().map(|l| l.target_path.clone()).collect(),
            },
            summary,
            locales,
            gate,
        }
    }

    pub fn issue_count(&self) -> usize {
        self.locales.iter().map(|l| l.issues.len()).sum()
    }

    pub fn to_markdown(&self) -> String {
        let mut s = String::new();
        s.push_str("# lengthguard report\n\n");
        s.push_str(&format!("- report_version: `{}`\n", self.report_version));
        s.push_str(&format!("- source_path: `{}`\n", self.inputs.source_path));
        s.push('\n');

        s.push_str("## Summary\n\n");
        push_summary(&mut s, &self.summary);
        s.push('\n');

        s.push_str("## Gate\n\n");
        s.push_str(&format!("- fail_on: `{}`\n", self.gate.fail_on));
        s.push_str(&format!("- pass: `{}`\n", self.gate.pass));
        s.push_str(&format!("- reason: `{}`\n", self.gate.reason));
        s.push('\n');

        for l in &self.locales {
            s.push_str(&format!("## Locale `{}`\n\n", l.locale));
            s.push_str(&format!("- target_path: `{}`\n", l.target_path));
            push_summary(&mut s, &l.summary);
            s.push('\n');

            if !l.missing_keys.is_empty() {
                s.push_str("### Missing keys\n\n");
                for k in &l.missing_keys {
                    s.push_str(&format!("- `{}`\n", k));
                }
                s.push('\n');
            }

            s.push_str("### Issues\n\n");
            if l.issues.is_empty() {
                s.push_str("- (none)\n\n");
                continue;
            }
            s.push_str("| key | severity | context | overflow | source | translation |\n");
            s.push_str("|---|---|---|---|---|---|\n");
            for i in &l.issues {
                s.push_str(&format!(
                    "| `{}` | {} | {} | +{}% | {} | {} |\n",
                    i.key,
                    i.severity,
                    i.context.as_deref().unwrap_or("-"),
                    i.overflow_percentage,
                    md_cell(&i.source_text),
                    md_cell(&i.translated_text),
                ));
            }
            s.push('\n');
        }

        s
    }

    pub fn to_junit_xml(&self) -> String {
        let mut s = String::new();
        s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failures: usize = self
            .locales
            .iter()
            .flat_map(|l| &l.issues)
            .filter(|i| i.severity.is_failure())
            .count()
            + usize::from(!self.gate.pass);
        let tests = self.issue_count() + 1;

        s.push_str(&format!(
            "<testsuites name=\"lengthguard\" tests=\"{tests}\" failures=\"{failures}\">\n"
        ));

        for l in &self.locales {
            let locale_failures = l.issues.iter().filter(|i| i.severity.is_failure()).count();
            s.push_str(&format!(
                "  <testsuite name=\"lengthguard.{}\" tests=\"{}\" failures=\"{}\">\n",
                xml_escape(&l.locale),
                l.issues.len(),
                locale_failures
            ));
            for i in &l.issues {
                s.push_str(&format!(
                    "    <testcase classname=\"lengthguard.{}\" name=\"{}\">\n",
                    xml_escape(&l.locale),
                    xml_escape(&i.key)
                ));
                let detail = format!(
                    "{} chars vs {} in source (+{}%): {}",
                    i.translated_length,
                    i.source_length,
                    i.overflow_percentage,
                    i.translated_text
                );
                if i.severity.is_failure() {
                    s.push_str(&format!(
                        "      <failure type=\"{}\" message=\"{}\"/>\n",
                        i.severity,
                        xml_escape(&detail)
                    ));
                } else {
                    s.push_str(&format!(
                        "      <system-out>{}: {}</system-out>\n",
                        i.severity,
                        xml_escape(&detail)
                    ));
                }
                s.push_str("    </testcase>\n");
            }
            s.push_str("  </testsuite>\n");
        }

        s.push_str(&format!(
            "  <testsuite name=\"lengthguard.gate\" tests=\"1\" failures=\"{}\">\n",
            usize::from(!self.gate.pass)
        ));
        s.push_str("    <testcase classname=\"lengthguard\" name=\"length_gate\">\n");
        if !self.gate.pass {
            s.push_str(&format!(
                "      <failure type=\"gate\" message=\"{}\"/>\n",
                xml_escape(&self.gate.reason)
            ));
        }
        s.push_str("    </testcase>\n");
        s.push_str("  </testsuite>\n");
        s.push_str("</testsuites>\n");
        s
    }
}

fn push_summary(s: &mut String, summary: &Summary) {
    s.push_str(&format!("- entries: `{}`\n", summary.entries));
    s.push_str(&format!(
        "- unchecked_empty_source: `{}`\n",
        summary.unchecked_empty_source
    ));
    s.push_str(&format!("- missing_keys: `{}`\n", summary.missing_keys));
    s.push_str(&format!("- warnings: `{}`\n", summary.warnings));
    s.push_str(&format!("- errors: `{}`\n", summary.errors));
    s.push_str(&format!("- critical: `{}`\n", summary.critical));
}

fn md_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
