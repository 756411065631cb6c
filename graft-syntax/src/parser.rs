use crate::language::Language;
use crate::node::{NodeKind, SyntaxNode};
use crate::unit::SourceUnit;
use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Parser, TreeCursor};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported source language: {path}")]
    UnsupportedLanguage { path: Utf8PathBuf },

    #[error("failed to initialize {language} grammar: {message}")]
    LanguageInit { language: String, message: String },

    #[error("tree-sitter produced no tree for {path}")]
    NoTree { path: Utf8PathBuf },

    #[error("{path}:{line}:{column}: malformed source ({found})")]
    Malformed {
        path: Utf8PathBuf,
        line: usize,
        column: usize,
        found: String,
    },
}

/// Parse `text` using the language implied by `path`'s extension.
pub fn parse(path: &Utf8Path, text: &str) -> Result<SourceUnit, ParseError> {
    let language = Language::from_path(path).ok_or_else(|| ParseError::UnsupportedLanguage {
        path: path.to_path_buf(),
    })?;
    parse_as(path, text, language)
}

/// Parse `text` as `language`, rejecting any input tree-sitter had to recover from.
pub fn parse_as(
    path: &Utf8Path,
    text: &str,
    language: Language,
) -> Result<SourceUnit, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| ParseError::LanguageInit {
            language: language.display_name().to_string(),
            message: e.to_string(),
        })?;

    let tree = parser.parse(text, None).ok_or_else(|| ParseError::NoTree {
        path: path.to_path_buf(),
    })?;
    let root = tree.root_node();

    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let pos = bad.start_position();
        return Err(ParseError::Malformed {
            path: path.to_path_buf(),
            line: pos.row + 1,
            column: pos.column + 1,
            found: if bad.is_missing() {
                format!("missing `{}`", bad.kind())
            } else {
                "unexpected input".to_string()
            },
        });
    }

    let mut cursor = root.walk();
    let root = convert(&mut cursor);
    debug!(
        path = path.as_str(),
        language = language.display_name(),
        bytes = text.len(),
        "parsed source unit"
    );

    Ok(SourceUnit::new(path.to_path_buf(), language, text.to_string(), root))
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

fn convert(cursor: &mut TreeCursor<'_>) -> SyntaxNode {
    let node = cursor.node();
    let mut children = Vec::with_capacity(node.child_count());

    if cursor.goto_first_child() {
        loop {
            let field = cursor.field_name();
            let mut child = convert(cursor);
            child.field = field;
            children.push(child);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    SyntaxNode {
        kind: NodeKind::from_grammar(node.kind()),
        grammar_kind: node.kind(),
        span: node.start_byte()..node.end_byte(),
        field: None,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_environment_file() {
        let text = "export const environment = { production: false };\n";
        let unit = parse(Utf8Path::new("environment.ts"), text).unwrap();

        assert_eq!(unit.root().kind(), NodeKind::Program);
        let object = unit
            .root()
            .descendants()
            .find(|n| n.is(NodeKind::ObjectLiteral))
            .unwrap();
        assert_eq!(unit.node_text(object), "{ production: false }");
        assert_eq!(
            object.first_child_of(NodeKind::CloseBrace).unwrap().start(),
            text.find('}').unwrap()
        );
    }

    #[test]
    fn test_fields_are_recorded() {
        let text = "import { a } from './a';";
        let unit = parse(Utf8Path::new("main.ts"), text).unwrap();
        let import = unit.root().first_child_of(NodeKind::ImportDeclaration).unwrap();
        let source = import.child_by_field("source").unwrap();
        assert_eq!(source.kind(), NodeKind::StringLiteral);
        assert_eq!(unit.node_text(source), "'./a'");
    }

    #[test]
    fn test_malformed_source_is_rejected() {
        let err = parse(Utf8Path::new("broken.ts"), "export const x = { a: ;\n").unwrap_err();
        match err {
            ParseError::Malformed { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let err = parse(Utf8Path::new("package.json"), "{}").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn test_decorator_call_is_a_call() {
        let text = "@NgModule({ imports: [] })\nexport class AppModule {}\n";
        let unit = parse(Utf8Path::new("app.module.ts"), text).unwrap();
        let call = unit
            .root()
            .descendants()
            .find(|n| n.is(NodeKind::Call))
            .unwrap();
        let callee = call.child_by_field("function").unwrap();
        assert_eq!(unit.node_text(callee), "NgModule");
    }
}
