//! Template definitions and variable values.

use crate::error::{DocsmithError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A named, reusable document skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Unique identifier (e.g., "prd").
    pub id: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Body text containing `{{name}}` placeholders.
    #[serde(default)]
    pub body: String,

    /// Declared variables, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<VariableSpec>,

    /// Front-matter fields; string values may contain placeholders.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub front_matter: BTreeMap<String, serde_yaml::Value>,

    /// Agents allowed to work with this template. `None` permits every agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<BTreeSet<String>>,

    /// Declared document sections. When empty, sections are derived from the
    /// body's headings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionSpec>,
}

impl TemplateDefinition {
    /// Look up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Whether `agent` may use this template.
    pub fn permits_agent(&self, agent: &str) -> bool {
        self.agents
            .as_ref()
            .is_none_or(|agents| agents.contains(agent))
    }

    /// Check identifiers and variable declarations.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_token(&self.id.replace('-', "_")) {
            return Err(DocsmithError::UserError(format!(
                "invalid template id '{}': use letters, digits, '-' or '_'",
                self.id
            )));
        }

        let mut seen = BTreeSet::new();
        for variable in &self.variables {
            if !is_valid_token(&variable.name) {
                return Err(DocsmithError::UserError(format!(
                    "template '{}': invalid variable name '{}'",
                    self.id, variable.name
                )));
            }
            if !seen.insert(variable.name.as_str()) {
                return Err(DocsmithError::UserError(format!(
                    "template '{}': variable '{}' is declared more than once",
                    self.id, variable.name
                )));
            }
            if let Some(default) = &variable.default
                && !default.conforms_to(variable.kind)
            {
                return Err(DocsmithError::UserError(format!(
                    "template '{}': default for '{}' is not a {}",
                    self.id, variable.name, variable.kind
                )));
            }
        }

        Ok(())
    }
}

/// Placeholder names are identifiers: letters, digits, `_` and `.`.
pub(crate) fn is_valid_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// A declared template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<VariableValue>,

    #[serde(default, rename = "type")]
    pub kind: VariableKind,
}

impl VariableSpec {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            default: None,
            kind: VariableKind::String,
        }
    }

    pub fn optional(name: &str, description: &str, default: impl Into<VariableValue>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            default: Some(default.into()),
            kind: VariableKind::String,
        }
    }

    pub fn with_kind(mut self, kind: VariableKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Semantic type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    String,
    Number,
    Boolean,
    Date,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::String => write!(f, "string"),
            VariableKind::Number => write!(f, "number"),
            VariableKind::Boolean => write!(f, "boolean"),
            VariableKind::Date => write!(f, "date"),
        }
    }
}

/// A bound variable value. Converted to text only at substitution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Boolean(bool),
    Number(f64),
    Date(NaiveDate),
    String(String),
}

impl VariableValue {
    /// Parse raw text (e.g., from a `--var key=value` flag) as `kind`.
    pub fn parse_as(kind: VariableKind, raw: &str) -> Result<Self> {
        let invalid = || {
            DocsmithError::UserError(format!("'{}' is not a valid {} value", raw, kind))
        };

        match kind {
            VariableKind::String => Ok(VariableValue::String(raw.to_string())),
            VariableKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(VariableValue::Number)
                .ok_or_else(invalid),
            VariableKind::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(VariableValue::Boolean(true)),
                "false" | "no" | "0" => Ok(VariableValue::Boolean(false)),
                _ => Err(invalid()),
            },
            VariableKind::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(VariableValue::Date)
                .map_err(|_| invalid()),
        }
    }

    /// Whether the value is acceptable for a variable of `kind`.
    ///
    /// Strings are accepted everywhere; they are rendered verbatim.
    pub fn conforms_to(&self, kind: VariableKind) -> bool {
        matches!(
            (self, kind),
            (VariableValue::String(_), _)
                | (VariableValue::Number(_), VariableKind::Number)
                | (VariableValue::Boolean(_), VariableKind::Boolean)
                | (VariableValue::Date(_), VariableKind::Date)
        )
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Boolean(b) => write!(f, "{}", b),
            VariableValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::String(value.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(value: String) -> Self {
        VariableValue::String(value)
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        VariableValue::Number(value)
    }
}

impl From<bool> for VariableValue {
    fn from(value: bool) -> Self {
        VariableValue::Boolean(value)
    }
}

impl From<NaiveDate> for VariableValue {
    fn from(value: NaiveDate) -> Self {
        VariableValue::Date(value)
    }
}

/// A section declared by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,

    #[serde(default = "default_true")]
    pub required: bool,

    /// Heading as it appears in the rendered document (defaults to `## {name}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl SectionSpec {
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: true,
            heading: None,
        }
    }

    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required: false,
            heading: None,
        }
    }
}

fn default_true() -> bool {
    true
}
