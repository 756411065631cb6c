//! Presence guards.
//!
//! Every check here is a pure function of the unit and the change. Structural checks are preferred
//! because they survive reformatting; the verbatim text check only backs up the configuration block,
//! which graft emits as a fixed literal.

use crate::anchor::{
    declared_object, find_call, import_source, object_argument, object_property, squash,
    top_level_declarators, top_level_imports, value_imports,
};
use crate::module_path::{clause_binds, clause_names, same_module};
use crate::planner::render_object_field;
use graft_syntax::{NodeKind, SourceUnit, SyntaxNode};
use graft_types::change::Change;

/// Whether `change` is already applied to `unit`.
pub fn is_present(unit: &SourceUnit, change: &Change) -> bool {
    match change {
        Change::AppendObjectField {
            declarator,
            key,
            entries,
        } => {
            object_has_key(unit, declarator.as_deref(), key)
                || contains_text(unit, &render_object_field(key, entries))
        }
        Change::InsertImport { identifier, module } => import_binds(unit, identifier, module),
        Change::RegisterInCall {
            callee,
            property,
            token,
        } => call_registers(unit, callee, property.as_deref(), token),
    }
}

/// Verbatim containment.
pub fn contains_text(unit: &SourceUnit, snippet: &str) -> bool {
    !snippet.is_empty() && unit.text().contains(snippet)
}

/// The declared object literal already has `key` (as a pair or shorthand property).
pub fn object_has_key(unit: &SourceUnit, declarator: Option<&str>, key: &str) -> bool {
    declared_object(unit, declarator).is_some_and(|object| object_property(unit, object, key).is_some())
}

/// Some top-level value import binds `identifier` from `module`.
pub fn import_binds(unit: &SourceUnit, identifier: &str, module: &str) -> bool {
    value_imports(unit).any(|import| {
        import_source(unit, import).is_some_and(|source| same_module(source, module))
            && import
                .first_child_of(NodeKind::ImportClause)
                .is_some_and(|clause| clause_binds(unit, clause, identifier))
    })
}

/// `identifier` is usable as a value at the top level: imported as a value from any module, or
/// declared by a top-level variable statement.
pub fn binds_value(unit: &SourceUnit, identifier: &str) -> bool {
    value_imports(unit).any(|import| {
        import
            .first_child_of(NodeKind::ImportClause)
            .is_some_and(|clause| clause_binds(unit, clause, identifier))
    }) || declares(unit, identifier)
}

/// `identifier` is already taken at the top level, by any import (type-only included) or a
/// variable declaration.
pub fn name_taken(unit: &SourceUnit, identifier: &str) -> bool {
    top_level_imports(unit).any(|import| {
        import
            .first_child_of(NodeKind::ImportClause)
            .is_some_and(|clause| clause_names(unit, clause, identifier))
    }) || declares(unit, identifier)
}

fn declares(unit: &SourceUnit, identifier: &str) -> bool {
    top_level_declarators(unit).any(|d| {
        d.child_by_field("name")
            .is_some_and(|name| unit.node_text(name) == identifier)
    })
}

/// The first call to `callee` already lists `token` (in `property` when given).
pub fn call_registers(
    unit: &SourceUnit,
    callee: &str,
    property: Option<&str>,
    token: &str,
) -> bool {
    let Some(call) = find_call(unit, callee) else {
        return false;
    };

    let elements: Option<&SyntaxNode> = match property {
        Some(property) => object_argument(call)
            .and_then(|object| object_property(unit, object, property))
            .and_then(|prop| prop.child_by_field("value"))
            .filter(|value| value.is(NodeKind::ArrayLiteral)),
        None => call.child_by_field("arguments"),
    };

    let wanted = squash(token);
    elements.is_some_and(|list| {
        list.significant_children()
            .any(|element| squash(unit.node_text(element)) == wanted)
    })
}
