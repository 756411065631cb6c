//! Error types for graft-edit.
//!
//! This module defines error types that distinguish between:
//! - Structural refusals (exit code 2): the file lacks a landmark, or an edit would corrupt it
//! - Runtime errors (exit code 1): I/O errors while reading the project

use camino::Utf8PathBuf;
use graft_domain::PlanError;
use graft_syntax::ParseError;
use thiserror::Error;

/// The top-level error type for graft-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// The staged file does not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Committing would leave the file unparseable. Staged content is unchanged.
    #[error("{path}: edit refused, result would not parse: {source}")]
    WouldCorrupt {
        path: Utf8PathBuf,
        #[source]
        source: ParseError,
    },

    /// A plan offset outside the staged text or not on a character boundary.
    #[error("{path}: offset {offset} is not a valid position in {len} bytes of staged text")]
    OffsetOutOfBounds {
        path: Utf8PathBuf,
        offset: usize,
        len: usize,
    },

    #[error("runtime error: {0}")]
    Io(#[from] anyhow::Error),
}

impl EditError {
    /// Missing optional targets degrade to a skip regardless of step policy.
    pub fn is_target_missing(&self) -> bool {
        matches!(self, EditError::Plan(err) if err.is_target_missing())
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::Io(_) => 1,
            _ => 2,
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
