//! Ordered patch pipeline with per-step failure policy.

use crate::sink::StatusSink;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use graft_domain::module_path::{module_specifier, resolve_root_module};
use graft_domain::presence::binds_value;
use graft_domain::{PlanError, is_present, plan_change};
use graft_edit::{EditError, StagedTree};
use graft_types::change::{Change, FailurePolicy};
use graft_types::outcome::{ChainReport, StepOutcome, StepReport};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The file is well-formed but not in the shape the step expects.
    #[error("{path}: {message}")]
    Shape { path: Utf8PathBuf, message: String },

    /// The change refers to a name the target does not bind.
    #[error("{path}: `{identifier}` is not bound here")]
    Unbound {
        path: Utf8PathBuf,
        identifier: String,
    },
}

impl From<PlanError> for StepError {
    fn from(err: PlanError) -> Self {
        StepError::Edit(err.into())
    }
}

impl StepError {
    pub fn is_target_missing(&self) -> bool {
        matches!(self, StepError::Edit(err) if err.is_target_missing())
    }

    /// Skips regardless of policy: the target is missing, or a name the change needs was never
    /// brought into scope.
    pub fn skips_step(&self) -> bool {
        self.is_target_missing() || matches!(self, StepError::Unbound { .. })
    }
}

/// What a step did to the staged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub target: Utf8PathBuf,
    /// False when the change was already present.
    pub applied: bool,
    pub detail: String,
}

/// One unit of the pipeline.
pub trait Step {
    fn name(&self) -> &str;

    fn policy(&self) -> FailurePolicy;

    /// Stage this step's edit, if any.
    fn run(&self, tree: &mut StagedTree<'_>) -> Result<StepOutput, StepError>;
}

/// How a step finds the file it patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFile {
    /// A file that may not be configured at all.
    Path(Option<Utf8PathBuf>),
    /// The root module bootstrapped by this entry file, or the entry file itself when it does not
    /// bootstrap a module.
    RootModuleOf(Utf8PathBuf),
}

impl TargetFile {
    pub fn resolve(&self, tree: &mut StagedTree<'_>) -> Result<Utf8PathBuf, StepError> {
        match self {
            TargetFile::Path(Some(path)) => Ok(path.clone()),
            TargetFile::Path(None) => Err(PlanError::TargetMissing { path: None }.into()),
            TargetFile::RootModuleOf(main) => {
                let unit = tree.unit(main)?;
                Ok(resolve_root_module(unit).unwrap_or_else(|| main.clone()))
            }
        }
    }
}

/// The change a [`PatchStep`] makes, possibly depending on where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSpec {
    Fixed(Change),
    /// Import `identifier` from `file`, with the specifier computed relative to the target.
    ///
    /// Resolves to a missing target when `file` is unconfigured or absent from the tree.
    ImportFromFile {
        identifier: String,
        file: Option<Utf8PathBuf>,
    },
}

impl ChangeSpec {
    pub fn resolve(&self, target: &Utf8Path, tree: &StagedTree<'_>) -> Result<Change, StepError> {
        match self {
            ChangeSpec::Fixed(change) => Ok(change.clone()),
            ChangeSpec::ImportFromFile { identifier, file } => {
                let file = file
                    .as_deref()
                    .ok_or(PlanError::TargetMissing { path: None })?;
                if !tree.exists(file) {
                    return Err(PlanError::TargetMissing {
                        path: Some(file.to_path_buf()),
                    }
                    .into());
                }
                Ok(Change::InsertImport {
                    identifier: identifier.clone(),
                    module: module_specifier(target, file),
                })
            }
        }
    }
}

/// Locate, guard, plan and stage one source change.
#[derive(Debug, Clone)]
pub struct PatchStep {
    name: String,
    policy: FailurePolicy,
    target: TargetFile,
    change: ChangeSpec,
    requires: Option<String>,
}

impl PatchStep {
    pub fn new(
        name: impl Into<String>,
        policy: FailurePolicy,
        target: TargetFile,
        change: ChangeSpec,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            target,
            change,
            requires: None,
        }
    }

    /// Skip the step unless the target already binds `identifier` as a value.
    pub fn requiring_binding(mut self, identifier: impl Into<String>) -> Self {
        self.requires = Some(identifier.into());
        self
    }
}

impl Step for PatchStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn run(&self, tree: &mut StagedTree<'_>) -> Result<StepOutput, StepError> {
        let target = self.target.resolve(tree)?;
        let change = self.change.resolve(&target, tree)?;
        let unit = tree.unit(&target)?;
        if let Some(identifier) = &self.requires
            && !is_present(unit, &change)
            && !binds_value(unit, identifier)
        {
            return Err(StepError::Unbound {
                path: target,
                identifier: identifier.clone(),
            });
        }
        let plan = plan_change(unit, &change)?;
        let result = tree.apply(&plan)?;
        Ok(StepOutput {
            target,
            applied: result.applied,
            detail: plan.rationale().to_string(),
        })
    }
}

/// Strictly ordered, single-threaded sequence of steps.
///
/// Each file's edits are independently idempotent. There is no cross-file rollback: when an
/// `Abort` step fails, edits staged by earlier steps stay staged, and the caller decides whether
/// to write them.
#[derive(Default)]
pub struct RuleChain {
    steps: Vec<Box<dyn Step>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: impl Step + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn push(&mut self, step: impl Step + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name())
    }

    /// Step names with their failure policies, in execution order.
    pub fn policies(&self) -> impl Iterator<Item = (&str, FailurePolicy)> {
        self.steps.iter().map(|s| (s.name(), s.policy()))
    }

    pub fn run(&self, tree: &mut StagedTree<'_>, sink: &mut dyn StatusSink) -> ChainReport {
        let mut report = ChainReport::new();

        for step in &self.steps {
            let step_report = run_step(step.as_ref(), tree);
            sink.report(&step_report);

            let halted = step_report.outcome.is_failure();
            report.push(step_report);
            if halted {
                debug!(step = step.name(), "chain halted");
                report.aborted_by = Some(step.name().to_string());
                break;
            }
        }

        report.files = tree.changes();
        report.ended_at = Some(Utc::now());
        report
    }
}

fn run_step(step: &dyn Step, tree: &mut StagedTree<'_>) -> StepReport {
    match step.run(tree) {
        Ok(output) => StepReport {
            step: step.name().to_string(),
            target: Some(output.target),
            outcome: if output.applied {
                StepOutcome::Success
            } else {
                StepOutcome::SkippedAlreadyPresent
            },
            message: output.detail,
        },
        Err(err) => {
            let outcome = if err.skips_step() {
                StepOutcome::SkippedMissingTarget
            } else {
                match step.policy() {
                    FailurePolicy::Abort => StepOutcome::Failed,
                    FailurePolicy::WarnAndContinue => StepOutcome::Warned,
                    FailurePolicy::SkipSilently => StepOutcome::Suppressed,
                }
            };
            StepReport {
                step: step.name().to_string(),
                target: None,
                outcome,
                message: err.to_string(),
            }
        }
    }
}
