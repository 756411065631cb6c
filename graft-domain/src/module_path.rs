//! Module specifiers and root-module resolution.

use crate::anchor::{import_source, is_type_only, top_level_imports};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use graft_syntax::{NodeKind, SourceUnit, SyntaxNode};
use tracing::debug;

const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".mts", ".cts", ".js", ".jsx", ".mjs", ".cjs"];

/// Compare two module specifiers, ignoring a trailing source extension.
pub fn same_module(a: &str, b: &str) -> bool {
    strip_source_extension(a) == strip_source_extension(b)
}

pub fn strip_source_extension(specifier: &str) -> &str {
    SOURCE_EXTENSIONS
        .iter()
        .find_map(|ext| specifier.strip_suffix(ext))
        .unwrap_or(specifier)
}

/// Lexically normalize `.` and `..` components.
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match out.last() {
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_str()).collect()
}

/// Relative import specifier that reaches `to` from a file at `from`, without extension.
///
/// Both paths are interpreted relative to the same root.
/// `module_specifier("src/app/app.module.ts", "src/environments/environment.ts")` is
/// `"../environments/environment"`.
pub fn module_specifier(from: &Utf8Path, to: &Utf8Path) -> String {
    let from_dir = normalize(from.parent().unwrap_or(Utf8Path::new("")));
    let to = normalize(to);

    let from_parts: Vec<&str> = from_dir.components().map(|c| c.as_str()).collect();
    let to_parts: Vec<&str> = to.components().map(|c| c.as_str()).collect();
    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    let joined = parts.join("/");
    let joined = strip_source_extension(&joined);

    if joined.starts_with("../") {
        joined.to_string()
    } else {
        format!("./{}", joined)
    }
}

/// Follow `bootstrapModule(X)` in the main entry file to the file that declares `X`.
///
/// Returns `None` when the entry does not bootstrap a module through a relative import; callers
/// then treat the entry file itself as the bootstrap file.
pub fn resolve_root_module(main: &SourceUnit) -> Option<Utf8PathBuf> {
    let module_name = bootstrapped_module(main)?;
    let specifier = top_level_imports(main).find_map(|import| {
        let binds = import
            .first_child_of(NodeKind::ImportClause)
            .is_some_and(|clause| clause_binds(main, clause, module_name));
        if binds {
            import_source(main, import)
        } else {
            None
        }
    })?;

    if !specifier.starts_with('.') {
        debug!(specifier, "root module is not a relative import");
        return None;
    }

    let dir = main.path().parent().unwrap_or(Utf8Path::new(""));
    let stem = normalize(&dir.join(strip_source_extension(specifier)));
    let ext = main.path().extension().unwrap_or("ts");
    let resolved = Utf8PathBuf::from(format!("{}.{}", stem, ext));
    debug!(main = main.path().as_str(), root_module = resolved.as_str(), "resolved root module");
    Some(resolved)
}

fn bootstrapped_module(main: &SourceUnit) -> Option<&str> {
    let call = main.root().descendants().find(|n| {
        n.is(NodeKind::Call)
            && n
                .child_by_field("function")
                .filter(|f| f.is(NodeKind::MemberExpression))
                .and_then(|f| f.child_by_field("property"))
                .is_some_and(|p| main.node_text(p) == "bootstrapModule")
    })?;
    call.child_by_field("arguments")?
        .significant_children()
        .next()
        .filter(|arg| arg.is(NodeKind::Identifier))
        .map(|arg| main.node_text(arg))
}

/// Whether an import clause introduces the local value binding `identifier`.
///
/// `type`-modified specifiers bind only a type and do not count.
pub(crate) fn clause_binds(unit: &SourceUnit, clause: &SyntaxNode, identifier: &str) -> bool {
    clause_introduces(unit, clause, identifier, false)
}

/// Whether an import clause introduces `identifier` at all, as a value or as a type.
pub(crate) fn clause_names(unit: &SourceUnit, clause: &SyntaxNode, identifier: &str) -> bool {
    clause_introduces(unit, clause, identifier, true)
}

fn clause_introduces(
    unit: &SourceUnit,
    clause: &SyntaxNode,
    identifier: &str,
    with_types: bool,
) -> bool {
    clause.children().iter().any(|child| match child.kind() {
        NodeKind::Identifier => unit.node_text(child) == identifier,
        NodeKind::NamespaceImport => child
            .first_child_of(NodeKind::Identifier)
            .is_some_and(|id| unit.node_text(id) == identifier),
        NodeKind::NamedImports => child
            .children_of(NodeKind::ImportSpecifier)
            .filter(|spec| with_types || !is_type_only(spec))
            .any(|spec| {
                spec.child_by_field("alias")
                    .or_else(|| spec.child_by_field("name"))
                    .is_some_and(|id| unit.node_text(id) == identifier)
            }),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_syntax::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn specifier_between_sibling_directories() {
        assert_eq!(
            module_specifier(
                Utf8Path::new("src/app/app.module.ts"),
                Utf8Path::new("src/environments/environment.ts")
            ),
            "../environments/environment"
        );
    }

    #[test]
    fn specifier_in_same_directory() {
        assert_eq!(
            module_specifier(Utf8Path::new("src/main.ts"), Utf8Path::new("src/env.ts")),
            "./env"
        );
        assert_eq!(
            module_specifier(Utf8Path::new("main.ts"), Utf8Path::new("./env/prod.ts")),
            "./env/prod"
        );
    }

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(
            normalize(Utf8Path::new("src/./app/../environments/environment.ts")),
            Utf8PathBuf::from("src/environments/environment.ts")
        );
        assert_eq!(normalize(Utf8Path::new("../a")), Utf8PathBuf::from("../a"));
    }

    #[test]
    fn same_module_ignores_extension() {
        assert!(same_module("./environment.ts", "./environment"));
        assert!(!same_module("./environment", "environment"));
    }

    #[test]
    fn resolves_root_module_from_bootstrap_call() {
        let main = parse(
            Utf8Path::new("src/main.ts"),
            "\
import { enableProdMode } from '@angular/core';
import { platformBrowserDynamic } from '@angular/platform-browser-dynamic';
import { AppModule } from './app/app.module';

platformBrowserDynamic()
  .bootstrapModule(AppModule)
  .catch(err => console.error(err));
",
        )
        .unwrap();

        assert_eq!(
            resolve_root_module(&main),
            Some(Utf8PathBuf::from("src/app/app.module.ts"))
        );
    }

    #[test]
    fn standalone_bootstrap_has_no_root_module() {
        let main = parse(
            Utf8Path::new("src/main.ts"),
            "import { bootstrapApplication } from '@angular/platform-browser';\nbootstrapApplication(App);\n",
        )
        .unwrap();
        assert_eq!(resolve_root_module(&main), None);
    }

    #[test]
    fn clause_binds_aliases_and_namespaces() {
        let unit = parse(
            Utf8Path::new("a.ts"),
            "import def, { x as env } from './m';\nimport * as ns from './n';\n",
        )
        .unwrap();
        let clauses: Vec<_> = unit
            .root()
            .descendants()
            .filter(|n| n.is(NodeKind::ImportClause))
            .collect();
        assert!(clause_binds(&unit, clauses[0], "def"));
        assert!(clause_binds(&unit, clauses[0], "env"));
        assert!(!clause_binds(&unit, clauses[0], "x"));
        assert!(clause_binds(&unit, clauses[1], "ns"));
    }

    #[test]
    fn type_specifiers_name_but_do_not_bind() {
        let unit = parse(
            Utf8Path::new("a.ts"),
            "import { type environment, value } from './m';\n",
        )
        .unwrap();
        let clause = unit
            .root()
            .descendants()
            .find(|n| n.is(NodeKind::ImportClause))
            .unwrap();
        assert!(!clause_binds(&unit, clause, "environment"));
        assert!(clause_names(&unit, clause, "environment"));
        assert!(clause_binds(&unit, clause, "value"));
    }
}
