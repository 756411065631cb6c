//! Structural parsing for graft.
//!
//! Turns TypeScript/JavaScript source text into an owned tree of [`SyntaxNode`]s tagged with a
//! closed [`NodeKind`] set. The tree is a snapshot: it owns no reference to the tree-sitter parse
//! and is rebuilt from scratch whenever the text changes.
//!
//! Parsing is deterministic. Identical text always yields identical kinds and spans, which the
//! presence checks in `graft-domain` rely on.

mod language;
mod node;
mod parser;
mod unit;

pub use language::Language;
pub use node::{Descendants, NodeKind, SyntaxNode};
pub use parser::{ParseError, parse, parse_as};
pub use unit::SourceUnit;
