//! Staged edit engine for graft.
//!
//! Responsibilities:
//! - Load files through a [`SourceView`] into an in-memory staging area.
//! - Apply [`EditPlan`]s with begin/commit semantics, refusing any edit whose result no longer
//!   parses.
//! - Keep a linear edit history per file and generate a unified diff preview.
//!
//! Nothing here writes to disk.

mod error;

pub use error::{EditError, EditResult};

use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use graft_domain::{PlanError, SourceView};
use graft_syntax::{Language, ParseError, SourceUnit, parse_as};
use graft_types::outcome::{FileChange, PatchResult};
use graft_types::plan::{EditPlan, EditRecord};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::debug;

#[derive(Debug)]
struct StagedFile {
    original: String,
    text: String,
    /// Present for files in a supported source language.
    unit: Option<SourceUnit>,
    history: Vec<EditRecord>,
}

impl StagedFile {
    fn load(path: &Utf8Path, text: String) -> Result<Self, ParseError> {
        let unit = analyze(path, &text)?;
        Ok(Self {
            original: text.clone(),
            text,
            unit,
            history: Vec::new(),
        })
    }

    fn is_changed(&self) -> bool {
        self.original != self.text
    }
}

/// Parse source files, check JSON files for well-formedness, accept anything else as text.
fn analyze(path: &Utf8Path, text: &str) -> Result<Option<SourceUnit>, ParseError> {
    if let Some(language) = Language::from_path(path) {
        return parse_as(path, text, language).map(Some);
    }
    if path.extension() == Some("json") {
        serde_json::from_str::<serde_json::Value>(text).map_err(|e| ParseError::Malformed {
            path: path.to_path_buf(),
            line: e.line(),
            column: e.column(),
            found: e.to_string(),
        })?;
    }
    Ok(None)
}

/// In-memory staging area over a read-only project view.
///
/// Files are loaded on first access and stay staged for the lifetime of the tree. Each file's
/// edits form a linear history; there is no cross-file transaction.
pub struct StagedTree<'v> {
    view: &'v dyn SourceView,
    files: BTreeMap<Utf8PathBuf, StagedFile>,
}

impl<'v> StagedTree<'v> {
    pub fn new(view: &'v dyn SourceView) -> Self {
        Self {
            view,
            files: BTreeMap::new(),
        }
    }

    fn load(&mut self, path: &Utf8Path) -> EditResult<&mut StagedFile> {
        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let text = self
                    .view
                    .read(path)?
                    .ok_or_else(|| PlanError::TargetMissing {
                        path: Some(path.to_path_buf()),
                    })?;
                debug!(path = path.as_str(), bytes = text.len(), "staged file");
                Ok(entry.insert(StagedFile::load(path, text)?))
            }
        }
    }

    /// Whether `path` is staged or exists in the underlying view.
    pub fn exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(path) || self.view.exists(path)
    }

    /// Current staged text of `path`.
    pub fn text(&mut self, path: &Utf8Path) -> EditResult<&str> {
        Ok(&self.load(path)?.text)
    }

    /// Current structural view of `path`.
    pub fn unit(&mut self, path: &Utf8Path) -> EditResult<&SourceUnit> {
        let file = self.load(path)?;
        file.unit.as_ref().ok_or_else(|| {
            EditError::Parse(ParseError::UnsupportedLanguage {
                path: path.to_path_buf(),
            })
        })
    }

    /// Open a scoped buffer on `path`. Edits become visible only on [`Recorder::commit`].
    pub fn begin(&mut self, path: &Utf8Path) -> EditResult<Recorder<'_>> {
        let file = self.load(path)?;
        Ok(Recorder {
            path: path.to_path_buf(),
            buffer: file.text.clone(),
            edits: Vec::new(),
            file,
        })
    }

    /// Apply one plan. `NoOp` leaves the staged text untouched and reports `applied = false`.
    pub fn apply(&mut self, plan: &EditPlan) -> EditResult<PatchResult> {
        match plan {
            EditPlan::NoOp { target, rationale } => {
                debug!(path = target.as_str(), rationale = rationale.as_str(), "no-op plan");
                Ok(PatchResult {
                    target: target.clone(),
                    applied: false,
                    final_text: self.text(target)?.to_string(),
                })
            }
            EditPlan::Insert {
                target,
                offset,
                insert_text,
                rationale,
            } => {
                let mut recorder = self.begin(target)?;
                recorder.insert(*offset, insert_text, rationale)?;
                recorder.commit()
            }
        }
    }

    /// Committed edits of `path`, oldest first.
    pub fn history(&self, path: &Utf8Path) -> &[EditRecord] {
        self.files
            .get(path)
            .map(|f| f.history.as_slice())
            .unwrap_or_default()
    }

    /// Staged files whose text differs from what was loaded.
    pub fn staged(&self) -> impl Iterator<Item = (&Utf8Path, &str)> {
        self.files
            .iter()
            .filter(|(_, f)| f.is_changed())
            .map(|(p, f)| (p.as_path(), f.text.as_str()))
    }

    pub fn changes(&self) -> Vec<FileChange> {
        self.files
            .iter()
            .filter(|(_, f)| f.is_changed())
            .map(|(path, f)| FileChange {
                path: path.clone(),
                before_sha256: sha256_hex(f.original.as_bytes()),
                after_sha256: sha256_hex(f.text.as_bytes()),
                before_bytes: f.original.len() as u64,
                after_bytes: f.text.len() as u64,
                edits: f.history.len() as u64,
            })
            .collect()
    }

    /// Unified diff of every changed file, in path order.
    pub fn render_patch(&self) -> String {
        let mut out = String::new();
        let formatter = PatchFormatter::new();

        for (path, file) in &self.files {
            if !file.is_changed() {
                continue;
            }

            out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
            out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

            let patch = diffy::create_patch(&file.original, &file.text);
            out.push_str(&formatter.fmt_patch(&patch).to_string());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }

        out
    }
}

/// A scoped text buffer over one staged file.
///
/// Dropping a recorder without committing discards its edits.
pub struct Recorder<'t> {
    path: Utf8PathBuf,
    buffer: String,
    edits: Vec<EditRecord>,
    file: &'t mut StagedFile,
}

impl Recorder<'_> {
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The buffer including uncommitted edits.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn insert(&mut self, offset: usize, text: &str, rationale: &str) -> EditResult<()> {
        if offset > self.buffer.len() || !self.buffer.is_char_boundary(offset) {
            return Err(EditError::OffsetOutOfBounds {
                path: self.path.clone(),
                offset,
                len: self.buffer.len(),
            });
        }
        self.buffer.insert_str(offset, text);
        self.edits.push(EditRecord {
            offset,
            removed: 0,
            inserted: text.to_string(),
            rationale: rationale.to_string(),
        });
        Ok(())
    }

    /// Replace the whole buffer, recording only the differing middle section.
    pub fn replace_all(&mut self, text: &str, rationale: &str) {
        if text == self.buffer {
            return;
        }
        let (offset, removed, inserted) = splice_between(&self.buffer, text);
        self.edits.push(EditRecord {
            offset,
            removed,
            inserted: inserted.to_string(),
            rationale: rationale.to_string(),
        });
        self.buffer = text.to_string();
    }

    /// Re-parse the buffer and make it the staged text.
    ///
    /// Refuses with [`EditError::WouldCorrupt`] when the result no longer parses; the staged file
    /// is left exactly as it was.
    pub fn commit(self) -> EditResult<PatchResult> {
        let Recorder {
            path,
            buffer,
            edits,
            file,
        } = self;

        if edits.is_empty() {
            return Ok(PatchResult {
                target: path,
                applied: false,
                final_text: file.text.clone(),
            });
        }

        let unit = analyze(&path, &buffer).map_err(|source| EditError::WouldCorrupt {
            path: path.clone(),
            source,
        })?;

        debug!(path = path.as_str(), edits = edits.len(), "committed edits");
        file.text = buffer;
        file.unit = unit;
        file.history.extend(edits);

        Ok(PatchResult {
            target: path,
            applied: true,
            final_text: file.text.clone(),
        })
    }
}

/// Byte range that turns `old` into `new`: `(offset, removed, inserted)`.
fn splice_between<'a>(old: &str, new: &'a str) -> (usize, usize, &'a str) {
    let mut prefix = old
        .bytes()
        .zip(new.bytes())
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old
        .bytes()
        .rev()
        .zip(new.bytes().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix) {
        suffix -= 1;
    }

    (
        prefix,
        old.len() - suffix - prefix,
        &new[prefix..new.len() - suffix],
    )
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
