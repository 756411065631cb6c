use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;

/// Read-only access to the project being patched.
///
/// The engine reads through this port only; writes are the caller's job.
pub trait SourceView {
    /// Returns `Ok(None)` when the file does not exist.
    fn read(&self, rel: &Utf8Path) -> anyhow::Result<Option<String>>;

    fn exists(&self, rel: &Utf8Path) -> bool;
}

/// File-system backed `SourceView`.
#[derive(Debug, Clone)]
pub struct FsSourceView {
    root: Utf8PathBuf,
}

impl FsSourceView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl SourceView for FsSourceView {
    fn read(&self, rel: &Utf8Path) -> anyhow::Result<Option<String>> {
        let abs = self.abs(rel);
        if !abs.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&abs)
            .map(Some)
            .with_context(|| format!("read {}", abs))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_file()
    }
}

/// In-memory `SourceView` for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceView {
    files: BTreeMap<Utf8PathBuf, String>,
}

impl MemorySourceView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    pub fn insert(&mut self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl SourceView for MemorySourceView {
    fn read(&self, rel: &Utf8Path) -> anyhow::Result<Option<String>> {
        Ok(self.files.get(rel).cloned())
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.files.contains_key(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_view_reports_missing_files_as_none() {
        let td = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
        std::fs::write(td.path().join("main.ts"), "console.log(1);\n").unwrap();

        let view = FsSourceView::new(root);
        assert!(view.exists(Utf8Path::new("main.ts")));
        assert_eq!(
            view.read(Utf8Path::new("main.ts")).unwrap().as_deref(),
            Some("console.log(1);\n")
        );
        assert!(view.read(Utf8Path::new("missing.ts")).unwrap().is_none());
    }

    #[test]
    fn memory_view_round_trips_contents() {
        let view = MemorySourceView::new().with_file("a.ts", "export {};\n");
        assert!(view.exists(Utf8Path::new("a.ts")));
        assert!(!view.exists(Utf8Path::new("b.ts")));
        assert_eq!(
            view.read(Utf8Path::new("a.ts")).unwrap().as_deref(),
            Some("export {};\n")
        );
    }
}
