use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of applying one `EditPlan` to staged content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchResult {
    pub target: Utf8PathBuf,
    pub applied: bool,
    pub final_text: String,
}

/// Per-step status reported by the rule chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Success,
    SkippedAlreadyPresent,
    SkippedMissingTarget,
    /// Failed under `WarnAndContinue`.
    Warned,
    /// Failed under `SkipSilently`.
    Suppressed,
    /// Failed under `Abort`; the chain stopped here.
    Failed,
}

impl StepOutcome {
    pub fn is_failure(self) -> bool {
        matches!(self, StepOutcome::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            StepOutcome::Success => "success",
            StepOutcome::SkippedAlreadyPresent => "already present",
            StepOutcome::SkippedMissingTarget => "missing target",
            StepOutcome::Warned => "warned",
            StepOutcome::Suppressed => "suppressed",
            StepOutcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Utf8PathBuf>,

    pub outcome: StepOutcome,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Before/after digest of one staged file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: Utf8PathBuf,
    pub before_sha256: String,
    pub after_sha256: String,
    pub before_bytes: u64,
    pub after_bytes: u64,
    pub edits: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub steps_total: u64,
    pub applied: u64,
    pub skipped: u64,
    pub warned: u64,
    pub failed: u64,
}

/// Aggregated outcome of one rule chain run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainReport {
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInfo>,

    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub steps: Vec<StepReport>,

    /// Name of the `Abort` step that stopped the run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted_by: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileChange>,

    #[serde(default)]
    pub summary: ChainSummary,
}

impl ChainReport {
    pub fn new() -> Self {
        Self {
            schema: crate::schema::GRAFT_REPORT_V1.to_string(),
            tool: None,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
            steps: vec![],
            aborted_by: None,
            files: vec![],
            summary: ChainSummary::default(),
        }
    }

    pub fn push(&mut self, report: StepReport) {
        self.summary.steps_total += 1;
        match report.outcome {
            StepOutcome::Success => self.summary.applied += 1,
            StepOutcome::SkippedAlreadyPresent
            | StepOutcome::SkippedMissingTarget
            | StepOutcome::Suppressed => self.summary.skipped += 1,
            StepOutcome::Warned => self.summary.warned += 1,
            StepOutcome::Failed => self.summary.failed += 1,
        }
        self.steps.push(report);
    }

    /// A run fails only when an `Abort` step failed.
    pub fn is_failure(&self) -> bool {
        self.aborted_by.is_some()
    }

    pub fn outcome_of(&self, step: &str) -> Option<StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| s.outcome)
    }
}

impl Default for ChainReport {
    fn default() -> Self {
        Self::new()
    }
}
