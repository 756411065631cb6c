use crate::language::Language;
use crate::node::SyntaxNode;
use camino::{Utf8Path, Utf8PathBuf};

/// A parsed file: its path, the exact text that was parsed, and the tree derived from it.
///
/// Spans in the tree are byte offsets into `text`. A unit never changes in place; an edit produces
/// new text and therefore a new unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: Utf8PathBuf,
    language: Language,
    text: String,
    root: SyntaxNode,
}

impl SourceUnit {
    pub(crate) fn new(path: Utf8PathBuf, language: Language, text: String, root: SyntaxNode) -> Self {
        Self {
            path,
            language,
            text,
            root,
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn node_text(&self, node: &SyntaxNode) -> &str {
        node.text(&self.text)
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
