//! `package.json` dependency step.
//!
//! Existing entries are never overwritten. New entries are inserted in key order when the table is
//! already sorted, and appended otherwise. The manifest keeps its indentation unit.

use crate::chain::{Step, StepError, StepOutput};
use camino::{Utf8Path, Utf8PathBuf};
use graft_domain::PlanError;
use graft_edit::StagedTree;
use graft_types::change::FailurePolicy;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};

const DEPENDENCIES: &str = "dependencies";
const DEFAULT_INDENT: &str = "  ";

/// A dependency the project should declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDependency {
    pub name: String,
    pub version: String,
}

impl NodeDependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Add each missing dependency to the manifest's `dependencies` table.
///
/// Returns `Ok(None)` when every dependency is already declared.
pub fn ensure_package_dependencies(
    path: &Utf8Path,
    manifest: &str,
    deps: &[NodeDependency],
) -> Result<Option<String>, StepError> {
    let shape = |message: &str| StepError::Shape {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let mut root: Value = serde_json::from_str(manifest)
        .map_err(|e| shape(&format!("invalid JSON: {}", e)))?;
    let root_obj = root
        .as_object_mut()
        .ok_or_else(|| shape("manifest is not a JSON object"))?;

    let table = root_obj
        .entry(DEPENDENCIES)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| shape("`dependencies` is not an object"))?;

    let mut changed = false;
    for dep in deps {
        if table.contains_key(&dep.name) {
            continue;
        }
        insert_in_order(table, &dep.name, Value::String(dep.version.clone()));
        changed = true;
    }

    if !changed {
        return Ok(None);
    }

    let indent = detect_indent(manifest);
    let mut buf = Vec::with_capacity(manifest.len() + 64);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    root.serialize(&mut Serializer::with_formatter(&mut buf, formatter))
        .map_err(|e| shape(&format!("serialize manifest: {}", e)))?;
    let mut out =
        String::from_utf8(buf).map_err(|e| shape(&format!("serialize manifest: {}", e)))?;
    if manifest.ends_with('\n') {
        out.push('\n');
    }
    Ok(Some(out))
}

/// Leading whitespace of the first indented line, or two spaces for a single-line manifest.
fn detect_indent(manifest: &str) -> &str {
    manifest
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let body = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - body.len()]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or(DEFAULT_INDENT)
}

fn insert_in_order(table: &mut Map<String, Value>, key: &str, value: Value) {
    let sorted = table.keys().zip(table.keys().skip(1)).all(|(a, b)| a <= b);
    if !sorted {
        table.insert(key.to_string(), value);
        return;
    }

    let entries: Vec<(String, Value)> = std::mem::take(table).into_iter().collect();
    let mut pending = Some((key.to_string(), value));
    for (k, v) in entries {
        let due = matches!(&pending, Some((p, _)) if p.as_str() < k.as_str());
        if due && let Some((p, pv)) = pending.take() {
            table.insert(p, pv);
        }
        table.insert(k, v);
    }
    if let Some((p, pv)) = pending {
        table.insert(p, pv);
    }
}

/// Declares dependencies in `package.json`.
#[derive(Debug, Clone)]
pub struct PackageDependencyStep {
    name: String,
    policy: FailurePolicy,
    manifest: Option<Utf8PathBuf>,
    deps: Vec<NodeDependency>,
}

impl PackageDependencyStep {
    pub fn new(
        name: impl Into<String>,
        policy: FailurePolicy,
        manifest: Option<Utf8PathBuf>,
        deps: Vec<NodeDependency>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            manifest,
            deps,
        }
    }
}

impl Step for PackageDependencyStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn run(&self, tree: &mut StagedTree<'_>) -> Result<StepOutput, StepError> {
        let path = self
            .manifest
            .clone()
            .ok_or(PlanError::TargetMissing { path: None })?;
        let names = self
            .deps
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let current = tree.text(&path)?.to_string();
        let Some(updated) = ensure_package_dependencies(&path, &current, &self.deps)? else {
            return Ok(StepOutput {
                target: path,
                applied: false,
                detail: format!("dependencies {} already declared", names),
            });
        };

        let detail = format!("declared dependencies {}", names);
        let mut recorder = tree.begin(&path)?;
        recorder.replace_all(&updated, &detail);
        let result = recorder.commit()?;
        Ok(StepOutput {
            target: path,
            applied: result.applied,
            detail,
        })
    }
}
