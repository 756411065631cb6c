use serde::{Deserialize, Serialize};

/// What a step should do when it fails.
///
/// Missing optional targets never count as failures; see `StepOutcome::SkippedMissingTarget`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the chain and surface the error as a run-level failure.
    #[default]
    Abort,
    /// Log a warning and continue with the next step.
    WarnAndContinue,
    /// Record the failure without logging above debug and continue.
    SkipSilently,
}

/// A single `key: 'value'` entry of an injected configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A logical source change, independent of where it lands in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    /// Add `key: { entries }` as the last field of a top-level object literal.
    AppendObjectField {
        /// Restrict to the declarator with this name (e.g. `environment`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declarator: Option<String>,
        key: String,
        entries: Vec<ConfigEntry>,
    },

    /// Bind `identifier` from `module` with a named import.
    InsertImport { identifier: String, module: String },

    /// Register `token` inside the first call to `callee`.
    ///
    /// With `property`, the token goes into that array property of the call's object argument
    /// (e.g. `NgModule({ imports: [...] })`); otherwise it is appended to the argument list.
    RegisterInCall {
        callee: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
        token: String,
    },
}

impl Change {
    /// Short machine label used in reports and rationales.
    pub fn label(&self) -> &'static str {
        match self {
            Change::AppendObjectField { .. } => "append_object_field",
            Change::InsertImport { .. } => "insert_import",
            Change::RegisterInCall { .. } => "register_in_call",
        }
    }
}

/// Declarative description of a syntactic landmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnchorPattern {
    /// The object literal initializing a top-level variable declarator. First match wins.
    ObjectLiteralOf {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declarator: Option<String>,
    },
    /// The point after the last top-level import, or the document start without imports.
    AfterLastImport,
    /// The closing brace of the named imports of the first import from `module`.
    NamedImportsOf { module: String },
    /// The closing paren of the first call to `callee`.
    CallArgumentList { callee: String },
    /// The closing bracket of `property: [...]` in the first call to `callee`.
    ///
    /// Falls back to the closing brace of the object argument when the property is absent.
    CallObjectProperty { callee: String, property: String },
}

impl std::fmt::Display for AnchorPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorPattern::ObjectLiteralOf { declarator: Some(name) } => {
                write!(f, "object literal of `{}`", name)
            }
            AnchorPattern::ObjectLiteralOf { declarator: None } => {
                write!(f, "first top-level object literal")
            }
            AnchorPattern::AfterLastImport => write!(f, "after last import"),
            AnchorPattern::NamedImportsOf { module } => {
                write!(f, "named imports from '{}'", module)
            }
            AnchorPattern::CallArgumentList { callee } => {
                write!(f, "argument list of `{}(...)`", callee)
            }
            AnchorPattern::CallObjectProperty { callee, property } => {
                write!(f, "`{}` array of `{}({{...}})`", property, callee)
            }
        }
    }
}
