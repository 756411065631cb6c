//! Domain logic: decide *where* a change lands, *whether* it is already there, and *what* text to
//! insert.
//!
//! This crate owns the three pure stages of a patch step:
//! - [`anchor`]: locate a syntactic landmark in a [`SourceUnit`](graft_syntax::SourceUnit).
//! - [`presence`]: decide whether a change is already applied.
//! - [`planner`]: turn an anchor and a presence verdict into at most one insertion.
//!
//! It does not own *how* edits are committed; that is the `graft-edit` crate.

pub mod anchor;
mod error;
mod layout;
pub mod module_path;
pub mod planner;
mod ports;
pub mod presence;

pub use anchor::find_anchor;
pub use error::PlanError;
pub use planner::{locate, plan, plan_change, render_import_statement, render_object_field};
pub use ports::{FsSourceView, MemorySourceView, SourceView};
pub use presence::is_present;
