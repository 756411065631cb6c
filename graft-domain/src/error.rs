//! Error types for graft-domain.
//!
//! These distinguish between:
//! - Recoverable shape mismatches (the file lacks the expected landmark).
//! - Missing optional targets (always non-fatal to a run).
//! - Malformed sources (fatal to the step that touched the file).

use camino::Utf8PathBuf;
use graft_types::change::AnchorPattern;
use graft_types::plan::AnchorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The file parsed but has no node matching the pattern.
    #[error("{path}: no {pattern}")]
    AnchorNotFound {
        path: Utf8PathBuf,
        pattern: AnchorPattern,
    },

    /// The file that should receive the change does not exist or was not configured.
    #[error("target file missing: {}", .path.as_ref().map(|p| p.as_str()).unwrap_or("<not configured>"))]
    TargetMissing { path: Option<Utf8PathBuf> },

    /// The anchor cannot host this kind of change.
    #[error("{path}: a {change} change cannot attach at {anchor:?}")]
    IncompatibleAnchor {
        path: Utf8PathBuf,
        change: &'static str,
        anchor: AnchorKind,
    },

    /// The identifier an import would introduce is already bound in the file by something else.
    #[error("{path}: `{identifier}` is already bound; refusing to import it again from '{module}'")]
    NameTaken {
        path: Utf8PathBuf,
        identifier: String,
        module: String,
    },

    #[error(transparent)]
    Parse(#[from] graft_syntax::ParseError),
}

impl PlanError {
    /// Missing targets degrade to a skip regardless of step policy.
    pub fn is_target_missing(&self) -> bool {
        matches!(self, PlanError::TargetMissing { .. })
    }
}
