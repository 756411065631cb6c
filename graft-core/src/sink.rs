//! Where step status goes.

use graft_render::render_status_line;
use graft_types::outcome::{StepOutcome, StepReport};
use tracing::{debug, error, info, warn};

/// Receives one report per executed step, in execution order.
pub trait StatusSink {
    fn report(&mut self, report: &StepReport);
}

/// Emits each report as a `tracing` event at a level matching its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn report(&mut self, report: &StepReport) {
        let line = render_status_line(report);
        match report.outcome {
            StepOutcome::Success
            | StepOutcome::SkippedAlreadyPresent
            | StepOutcome::SkippedMissingTarget => info!(step = report.step.as_str(), "{}", line),
            StepOutcome::Warned => warn!(step = report.step.as_str(), "{}", line),
            StepOutcome::Suppressed => debug!(step = report.step.as_str(), "{}", line),
            StepOutcome::Failed => error!(step = report.step.as_str(), "{}", line),
        }
    }
}

/// Collects reports, for embedding and tests.
impl StatusSink for Vec<StepReport> {
    fn report(&mut self, report: &StepReport) {
        self.push(report.clone());
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn report(&mut self, _report: &StepReport) {}
}
