//! Turn an anchor and a presence verdict into at most one insertion.
//!
//! Planning never mutates anything. A present change always becomes [`EditPlan::NoOp`], so a
//! duplicate edit is unrepresentable.

use crate::anchor::find_anchor;
use crate::error::PlanError;
use crate::layout::layout_at;
use crate::presence::{is_present, name_taken};
use graft_syntax::SourceUnit;
use graft_types::change::{AnchorPattern, Change, ConfigEntry};
use graft_types::plan::{Anchor, AnchorKind, EditPlan};
use tracing::debug;

/// Locate, guard and plan `change` against `unit`.
///
/// An import whose identifier is already bound from another module, or only as a type, is
/// refused with [`PlanError::NameTaken`].
pub fn plan_change(unit: &SourceUnit, change: &Change) -> Result<EditPlan, PlanError> {
    if is_present(unit, change) {
        return plan_noop(unit, change);
    }
    if let Change::InsertImport { identifier, module } = change
        && name_taken(unit, identifier)
    {
        return Err(PlanError::NameTaken {
            path: unit.path().to_path_buf(),
            identifier: identifier.clone(),
            module: module.clone(),
        });
    }
    let anchor = locate(unit, change)?;
    plan(unit, &anchor, change, false)
}

/// Plan `change` at a previously located `anchor`.
///
/// `present` short-circuits to a no-op regardless of the anchor.
pub fn plan(
    unit: &SourceUnit,
    anchor: &Anchor,
    change: &Change,
    present: bool,
) -> Result<EditPlan, PlanError> {
    if present {
        return plan_noop(unit, change);
    }

    let insert_text = match change {
        Change::AppendObjectField { key, entries, .. } => {
            require(unit, change, anchor, &[AnchorKind::ObjectLiteralClose])?;
            let comma = if anchor.needs_separator { "," } else { "" };
            format!("{}\n{}", comma, render_object_field(key, entries))
        }
        Change::InsertImport { identifier, module } => match anchor.kind {
            AnchorKind::NamedImportsClose if anchor.needs_separator => format!(", {}", identifier),
            AnchorKind::NamedImportsClose => format!(" {}", identifier),
            AnchorKind::AfterLastImport => {
                format!("\n{}", render_import_statement(identifier, module))
            }
            AnchorKind::DocumentStart => {
                format!("{}\n", render_import_statement(identifier, module))
            }
            other => return Err(incompatible(unit, change, other)),
        },
        Change::RegisterInCall {
            property, token, ..
        } => match (anchor.kind, property) {
            (AnchorKind::ArrayLiteralClose | AnchorKind::CallArgumentListClose, _) => {
                element_insertion(unit.text(), anchor, token)
            }
            (AnchorKind::ObjectLiteralClose, Some(property)) => element_insertion(
                unit.text(),
                anchor,
                &format!("{}: [{}]", property, token),
            ),
            (other, _) => return Err(incompatible(unit, change, other)),
        },
    };

    let rationale = format!("{} at {:?}", describe(change), anchor.kind);
    debug!(
        path = unit.path().as_str(),
        offset = anchor.offset,
        change = change.label(),
        "planned insertion"
    );
    Ok(EditPlan::Insert {
        target: unit.path().to_path_buf(),
        offset: anchor.offset,
        insert_text,
        rationale,
    })
}

/// The anchor a change lands at.
///
/// Imports prefer an existing named-import list from the same module and fall back to the
/// position after the last import.
pub fn locate(unit: &SourceUnit, change: &Change) -> Result<Anchor, PlanError> {
    match change {
        Change::AppendObjectField { declarator, .. } => find_anchor(
            unit,
            &AnchorPattern::ObjectLiteralOf {
                declarator: declarator.clone(),
            },
        ),
        Change::InsertImport { module, .. } => find_anchor(
            unit,
            &AnchorPattern::NamedImportsOf {
                module: module.clone(),
            },
        )
        .or_else(|_| find_anchor(unit, &AnchorPattern::AfterLastImport)),
        Change::RegisterInCall {
            callee,
            property: Some(property),
            ..
        } => find_anchor(
            unit,
            &AnchorPattern::CallObjectProperty {
                callee: callee.clone(),
                property: property.clone(),
            },
        ),
        Change::RegisterInCall {
            callee,
            property: None,
            ..
        } => find_anchor(
            unit,
            &AnchorPattern::CallArgumentList {
                callee: callee.clone(),
            },
        ),
    }
}

/// `  key: {\n    k: 'v',\n  }`
pub fn render_object_field(key: &str, entries: &[ConfigEntry]) -> String {
    let mut out = format!("  {}: {{\n", render_key(key));
    for entry in entries {
        out.push_str(&format!(
            "    {}: '{}',\n",
            render_key(&entry.key),
            escape_single_quoted(&entry.value)
        ));
    }
    out.push_str("  }");
    out
}

/// `import { identifier } from 'module';`
pub fn render_import_statement(identifier: &str, module: &str) -> String {
    format!(
        "import {{ {} }} from '{}';",
        identifier,
        escape_single_quoted(module)
    )
}

fn plan_noop(unit: &SourceUnit, change: &Change) -> Result<EditPlan, PlanError> {
    debug!(path = unit.path().as_str(), change = change.label(), "already present");
    Ok(EditPlan::NoOp {
        target: unit.path().to_path_buf(),
        rationale: format!("{} already present", describe(change)),
    })
}

fn element_insertion(text: &str, anchor: &Anchor, element: &str) -> String {
    let layout = layout_at(text, anchor.offset);
    let comma = if anchor.needs_separator { "," } else { "" };
    if layout.multiline {
        format!("{}\n{}{}", comma, layout.indent, element)
    } else if anchor.needs_separator {
        format!(", {}", element)
    } else if text[..anchor.offset].ends_with(',') {
        format!(" {}", element)
    } else {
        element.to_string()
    }
}

fn require(
    unit: &SourceUnit,
    change: &Change,
    anchor: &Anchor,
    allowed: &[AnchorKind],
) -> Result<(), PlanError> {
    if allowed.contains(&anchor.kind) {
        Ok(())
    } else {
        Err(incompatible(unit, change, anchor.kind))
    }
}

fn incompatible(unit: &SourceUnit, change: &Change, anchor: AnchorKind) -> PlanError {
    PlanError::IncompatibleAnchor {
        path: unit.path().to_path_buf(),
        change: change.label(),
        anchor,
    }
}

fn describe(change: &Change) -> String {
    match change {
        Change::AppendObjectField { key, .. } => format!("object field `{}`", key),
        Change::InsertImport { identifier, module } => {
            format!("import of `{}` from '{}'", identifier, module)
        }
        Change::RegisterInCall { callee, token, .. } => {
            format!("`{}` in `{}`", token, callee)
        }
    }
}

fn render_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        format!("'{}'", escape_single_quoted(key))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}
