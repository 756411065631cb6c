//! Embeddable core library for graft.
//!
//! Provides a clap-free, I/O-abstracted entry point for wiring Firebase into an Angular project.
//!
//! # Port traits
//!
//! Reads go through [`SourceView`](graft_domain::SourceView); writes go through
//! [`WritePort`](ports::WritePort). The [`adapters`] module provides the filesystem-backed write
//! port.
//!
//! # Entry points
//!
//! - [`run_setup`](pipeline::run_setup): stage every edit and produce a report and patch
//! - [`write_staged`](pipeline::write_staged): commit staged text to disk

pub mod adapters;
pub mod chain;
pub mod package;
pub mod pipeline;
pub mod ports;
pub mod recipe;
pub mod settings;
pub mod sink;

// Re-export the read ports so callers don't need graft-domain directly.
pub use graft_domain::{FsSourceView, MemorySourceView, SourceView};
