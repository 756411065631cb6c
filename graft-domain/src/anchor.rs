//! Anchor location.
//!
//! Every pattern selects the first match in document order, except [`AnchorPattern::AfterLastImport`],
//! which selects the position after the *last* top-level import so new imports land below existing
//! ones.
//!
//! Offsets for "before the closing delimiter" anchors point at the end of the last significant
//! child before the delimiter, not at the delimiter itself. Whitespace and comments in front of the
//! delimiter stay behind the inserted text.

use crate::error::PlanError;
use crate::module_path::same_module;
use graft_syntax::{NodeKind, SourceUnit, SyntaxNode};
use graft_types::change::AnchorPattern;
use graft_types::plan::{Anchor, AnchorKind};

/// Locate `pattern` in `unit`.
pub fn find_anchor(unit: &SourceUnit, pattern: &AnchorPattern) -> Result<Anchor, PlanError> {
    let found = match pattern {
        AnchorPattern::ObjectLiteralOf { declarator } => {
            declared_object(unit, declarator.as_deref()).and_then(|object| {
                close_anchor(object, NodeKind::CloseBrace, AnchorKind::ObjectLiteralClose)
            })
        }
        AnchorPattern::AfterLastImport => Some(after_last_import(unit)),
        AnchorPattern::NamedImportsOf { module } => named_imports_from(unit, module)
            .and_then(|named| {
                close_anchor(named, NodeKind::CloseBrace, AnchorKind::NamedImportsClose)
            }),
        AnchorPattern::CallArgumentList { callee } => find_call(unit, callee)
            .and_then(|call| call.child_by_field("arguments"))
            .and_then(|args| {
                close_anchor(args, NodeKind::CloseParen, AnchorKind::CallArgumentListClose)
            }),
        AnchorPattern::CallObjectProperty { callee, property } => find_call(unit, callee)
            .and_then(object_argument)
            .and_then(|object| match object_property(unit, object, property) {
                Some(prop) => prop
                    .child_by_field("value")
                    .filter(|v| v.is(NodeKind::ArrayLiteral))
                    .and_then(|array| {
                        close_anchor(array, NodeKind::CloseBracket, AnchorKind::ArrayLiteralClose)
                    }),
                None => close_anchor(object, NodeKind::CloseBrace, AnchorKind::ObjectLiteralClose),
            }),
    };

    found.ok_or_else(|| PlanError::AnchorNotFound {
        path: unit.path().to_path_buf(),
        pattern: pattern.clone(),
    })
}

fn after_last_import(unit: &SourceUnit) -> Anchor {
    match top_level_imports(unit).last() {
        Some(import) => Anchor::new(import.end(), AnchorKind::AfterLastImport),
        None => Anchor::new(0, AnchorKind::DocumentStart),
    }
}

/// Anchor just past the last non-comment child in front of the container's closing delimiter.
fn close_anchor(container: &SyntaxNode, close: NodeKind, kind: AnchorKind) -> Option<Anchor> {
    let close_node = container.last_child_of(close)?;
    let prev = container
        .children()
        .iter()
        .take_while(|c| c.start() < close_node.start())
        .filter(|c| !c.is(NodeKind::Comment))
        .last()?;

    let needs_separator = !matches!(
        prev.kind(),
        NodeKind::OpenBrace | NodeKind::OpenBracket | NodeKind::OpenParen | NodeKind::Comma
    );
    Some(Anchor::new(prev.end(), kind).with_separator(needs_separator))
}

pub(crate) fn top_level_imports(unit: &SourceUnit) -> impl Iterator<Item = &SyntaxNode> {
    unit.root().children_of(NodeKind::ImportDeclaration)
}

/// Top-level imports that can bind values. `import type` declarations are left out.
pub(crate) fn value_imports(unit: &SourceUnit) -> impl Iterator<Item = &SyntaxNode> {
    top_level_imports(unit).filter(|import| !is_type_only(import))
}

/// An import declaration or specifier carrying a `type`/`typeof` modifier.
pub(crate) fn is_type_only(node: &SyntaxNode) -> bool {
    node.children()
        .iter()
        .any(|c| matches!(c.grammar_kind(), "type" | "typeof"))
}

/// Module specifier of an import declaration, without quotes.
pub(crate) fn import_source<'a>(unit: &'a SourceUnit, import: &SyntaxNode) -> Option<&'a str> {
    import
        .child_by_field("source")
        .map(|s| unquote(unit.node_text(s)))
}

pub(crate) fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    let quoted = trimmed.len() >= 2
        && matches!(trimmed.as_bytes()[0], b'\'' | b'"' | b'`')
        && trimmed.as_bytes()[0] == trimmed.as_bytes()[trimmed.len() - 1];
    if quoted {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

fn named_imports_from<'a>(unit: &'a SourceUnit, module: &str) -> Option<&'a SyntaxNode> {
    value_imports(unit)
        .filter(|import| import_source(unit, import).is_some_and(|s| same_module(s, module)))
        .find_map(|import| {
            import
                .first_child_of(NodeKind::ImportClause)
                .and_then(|clause| clause.first_child_of(NodeKind::NamedImports))
        })
}

/// The object literal initializing a top-level `const`/`let`/`var` declarator.
///
/// Only the declaration's own initializer counts; object literals nested elsewhere in the file
/// (function bodies, other initializers' children) are never selected.
pub(crate) fn declared_object<'a>(
    unit: &'a SourceUnit,
    declarator: Option<&str>,
) -> Option<&'a SyntaxNode> {
    top_level_declarators(unit)
        .filter(|d| match declarator {
            Some(name) => d
                .child_by_field("name")
                .is_some_and(|n| unit.node_text(n) == name),
            None => true,
        })
        .find_map(|d| d.child_by_field("value").and_then(unwrap_object))
}

/// Declarators of top-level `const`/`let`/`var` statements, exported or not.
pub(crate) fn top_level_declarators(unit: &SourceUnit) -> impl Iterator<Item = &SyntaxNode> {
    unit.root()
        .children()
        .iter()
        .filter_map(|stmt| match stmt.kind() {
            NodeKind::ExportStatement => stmt
                .child_by_field("declaration")
                .filter(|d| d.is(NodeKind::VariableStatement)),
            NodeKind::VariableStatement => Some(stmt),
            _ => None,
        })
        .flat_map(|decl| decl.children_of(NodeKind::VariableDeclarator))
}

/// See through `{...} as const`, `{...} satisfies T` and parentheses.
fn unwrap_object(expr: &SyntaxNode) -> Option<&SyntaxNode> {
    match expr.kind() {
        NodeKind::ObjectLiteral => Some(expr),
        NodeKind::Other
            if matches!(
                expr.grammar_kind(),
                "as_expression" | "satisfies_expression" | "parenthesized_expression"
            ) =>
        {
            expr.significant_children().next().and_then(unwrap_object)
        }
        _ => None,
    }
}

/// First call (document order) whose callee text equals `callee`, ignoring whitespace.
pub(crate) fn find_call<'a>(unit: &'a SourceUnit, callee: &str) -> Option<&'a SyntaxNode> {
    let wanted = squash(callee);
    unit.root().descendants().find(|n| {
        n.is(NodeKind::Call)
            && n
                .child_by_field("function")
                .is_some_and(|f| squash(unit.node_text(f)) == wanted)
    })
}

pub(crate) fn object_argument(call: &SyntaxNode) -> Option<&SyntaxNode> {
    call.child_by_field("arguments")?
        .significant_children()
        .find(|a| a.is(NodeKind::ObjectLiteral))
}

pub(crate) fn object_property<'a>(
    unit: &SourceUnit,
    object: &'a SyntaxNode,
    key: &str,
) -> Option<&'a SyntaxNode> {
    object.children().iter().find(|member| match member.kind() {
        NodeKind::Property => member
            .child_by_field("key")
            .is_some_and(|k| unquote(unit.node_text(k)) == key),
        NodeKind::ShorthandProperty => unit.node_text(member) == key,
        _ => false,
    })
}

/// Text with all whitespace removed, for formatting-independent comparison.
pub(crate) fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
