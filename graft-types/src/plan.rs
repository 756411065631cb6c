use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// The landmark that justified an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    ObjectLiteralClose,
    AfterLastImport,
    DocumentStart,
    NamedImportsClose,
    ArrayLiteralClose,
    CallArgumentListClose,
}

/// A located insertion point. Only valid for the exact text it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    /// Byte offset where text is inserted.
    pub offset: usize,
    pub kind: AnchorKind,
    /// True when the container already has an element that the insertion must be separated from
    /// with a comma.
    pub needs_separator: bool,
}

impl Anchor {
    pub fn new(offset: usize, kind: AnchorKind) -> Self {
        Self {
            offset,
            kind,
            needs_separator: false,
        }
    }

    pub fn with_separator(mut self, needs_separator: bool) -> Self {
        self.needs_separator = needs_separator;
        self
    }
}

/// Zero or one textual edit against one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditPlan {
    /// The change is already present.
    NoOp {
        target: Utf8PathBuf,
        rationale: String,
    },
    Insert {
        target: Utf8PathBuf,
        offset: usize,
        insert_text: String,
        rationale: String,
    },
}

impl EditPlan {
    pub fn target(&self) -> &Utf8PathBuf {
        match self {
            EditPlan::NoOp { target, .. } | EditPlan::Insert { target, .. } => target,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            EditPlan::NoOp { rationale, .. } | EditPlan::Insert { rationale, .. } => rationale,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, EditPlan::NoOp { .. })
    }
}

/// One committed splice in a file's linear edit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRecord {
    pub offset: usize,
    /// Bytes replaced at `offset`; zero for a pure insertion.
    #[serde(default)]
    pub removed: usize,
    pub inserted: String,
    pub rationale: String,
}
