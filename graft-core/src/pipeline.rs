//! Setup pipeline, extracted from the CLI.
//!
//! `run_setup` only reads through a [`SourceView`] and stages edits in memory. Writing is a
//! separate, explicit step through a [`WritePort`].

use crate::ports::WritePort;
use crate::recipe::firebase_chain;
use crate::settings::SetupSettings;
use crate::sink::StatusSink;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use graft_domain::SourceView;
use graft_edit::StagedTree;
use graft_render::{render_report_json, render_report_md};
use graft_types::outcome::{ChainReport, ToolInfo};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Error type for pipeline results. Exit code 2 = aborted run, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("setup aborted by step `{0}`")]
    Aborted(String),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Aborted(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_setup`.
#[derive(Debug, Clone)]
pub struct SetupOutcome {
    pub report: ChainReport,
    pub patch: String,
    /// Final text of every changed file, keyed by project-relative path.
    pub staged: BTreeMap<Utf8PathBuf, String>,
}

impl SetupOutcome {
    /// `Err(ToolError::Aborted)` when an `Abort` step failed.
    pub fn check(&self) -> Result<(), ToolError> {
        match &self.report.aborted_by {
            Some(step) => Err(ToolError::Aborted(step.clone())),
            None => Ok(()),
        }
    }
}

/// Run the Firebase setup chain against `view`. Nothing is written.
pub fn run_setup(
    settings: &SetupSettings,
    view: &dyn SourceView,
    sink: &mut dyn StatusSink,
    tool: ToolInfo,
) -> SetupOutcome {
    let chain = firebase_chain(&settings.project, &settings.firebase, &settings.versions);
    let mut tree = StagedTree::new(view);

    let mut report = chain.run(&mut tree, sink);
    report.tool = Some(tool);

    let staged: BTreeMap<Utf8PathBuf, String> = tree
        .staged()
        .map(|(path, text)| (path.to_path_buf(), text.to_string()))
        .collect();
    debug!(files = staged.len(), "setup staged");

    SetupOutcome {
        report,
        patch: tree.render_patch(),
        staged,
    }
}

/// Write every staged file under `project_root`. Returns the number of files written.
pub fn write_staged(
    outcome: &SetupOutcome,
    project_root: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<usize> {
    for (path, text) in &outcome.staged {
        let abs = if path.is_absolute() {
            path.clone()
        } else {
            project_root.join(path)
        };
        writer
            .write_file(&abs, text.as_bytes())
            .with_context(|| format!("write staged {}", path))?;
        info!(path = path.as_str(), "wrote");
    }
    Ok(outcome.staged.len())
}

/// Write `report.json`, `report.md` and `patch.diff` to `out_dir`.
pub fn write_report_artifacts(
    outcome: &SetupOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = render_report_json(&outcome.report)?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;

    let md = render_report_md(&outcome.report);
    writer.write_file(&out_dir.join("report.md"), md.as_bytes())?;

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}
