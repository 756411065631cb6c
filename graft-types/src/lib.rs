//! Shared DTOs for the graft workspace.
//!
//! # Design constraints
//! - Run reports built from these types are serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod change;
pub mod outcome;
pub mod plan;

/// Schema identifiers.
pub mod schema {
    pub const GRAFT_REPORT_V1: &str = "graft.report.v1";
}
