//! Rendering helpers (status lines, markdown, JSON) for human- and machine-readable artifacts.

use anyhow::Context;
use graft_types::outcome::{ChainReport, StepOutcome, StepReport};

/// One line per step, suitable for a terminal.
///
/// `[ok] environment-config: object field `firebase` at ObjectLiteralClose (src/environments/environment.ts)`
pub fn render_status_line(report: &StepReport) -> String {
    let mut line = format!(
        "{} {}: {}",
        marker(report.outcome),
        report.step,
        report.message
    );
    if let Some(target) = &report.target {
        line.push_str(&format!(" ({})", target));
    }
    line
}

pub fn render_report_md(report: &ChainReport) -> String {
    let mut out = String::new();
    out.push_str("# graft setup\n\n");
    out.push_str(&format!(
        "- Steps: {}\n- Applied: {}\n- Skipped: {}\n- Warned: {}\n- Failed: {}\n",
        report.summary.steps_total,
        report.summary.applied,
        report.summary.skipped,
        report.summary.warned,
        report.summary.failed
    ));
    if let Some(step) = &report.aborted_by {
        out.push_str(&format!("- Aborted by: `{}`\n", step));
    }
    out.push('\n');

    out.push_str("## Steps\n\n");
    if report.steps.is_empty() {
        out.push_str("_No steps ran._\n");
        return out;
    }

    out.push_str("| # | Step | Outcome | Target | Message |\n");
    out.push_str("|---|------|---------|--------|---------|\n");
    for (i, step) in report.steps.iter().enumerate() {
        let target = step
            .target
            .as_ref()
            .map(|t| format!("`{}`", t))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "| {} | `{}` | {} | {} | {} |\n",
            i + 1,
            step.step,
            step.outcome.label(),
            target,
            escape_cell(&step.message)
        ));
    }

    if !report.files.is_empty() {
        out.push_str("\n## Files changed\n\n");
        for fc in &report.files {
            out.push_str(&format!(
                "- `{}` {} → {} ({} edit{})\n",
                fc.path,
                short_sha(&fc.before_sha256),
                short_sha(&fc.after_sha256),
                fc.edits,
                if fc.edits == 1 { "" } else { "s" }
            ));
        }
    }

    out
}

pub fn render_report_json(report: &ChainReport) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(report).context("serialize run report")?;
    json.push('\n');
    Ok(json)
}

fn marker(outcome: StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Success => "[ok]",
        StepOutcome::SkippedAlreadyPresent | StepOutcome::SkippedMissingTarget => "[skip]",
        StepOutcome::Suppressed => "[quiet]",
        StepOutcome::Warned => "[warn]",
        StepOutcome::Failed => "[fail]",
    }
}

fn short_sha(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
