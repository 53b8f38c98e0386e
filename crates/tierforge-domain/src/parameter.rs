//! Typed parameters attached to categories
//!
//! A parameter declares its kind up front; product values are tagged
//! variants of that kind rather than free-form JSON.

use crate::record::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when defining parameters or validating values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Value variant does not match the parameter kind
    #[error("Parameter '{parameter}' expects a {expected} value")]
    KindMismatch {
        /// Parameter name
        parameter: String,
        /// Expected kind name
        expected: &'static str,
    },

    /// Input could not be read as a number
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// Input could not be read as yes/no
    #[error("'{0}' is not a yes/no value")]
    NotABoolean(String),

    /// Choice is not among the select options
    #[error("'{value}' is not one of the options of '{parameter}'")]
    UnknownOption {
        /// Parameter name
        parameter: String,
        /// Offending choice
        value: String,
    },

    /// Select parameter declared without options
    #[error("Select parameter '{0}' needs at least one option")]
    NoOptions(String),

    /// Unrecognised parameter type name
    #[error("Unknown parameter type: {0}")]
    UnknownKind(String),
}

/// Declared type of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text
    Text,
    /// Numeric value
    Number,
    /// Yes/no
    Boolean,
    /// One of a fixed list of options
    Select {
        /// Allowed choices, in display order
        options: Vec<String>,
    },
}

impl ParameterKind {
    /// Stored type name: `text`, `number`, `boolean` or `select`
    pub fn type_name(&self) -> &'static str {
        match self {
            ParameterKind::Text => "text",
            ParameterKind::Number => "number",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Select { .. } => "select",
        }
    }

    /// Rebuild a kind from its stored type name and options
    ///
    /// Options are ignored for every kind but `select`.
    pub fn from_parts(type_name: &str, options: Vec<String>) -> Result<Self, ParameterError> {
        match type_name.trim().to_lowercase().as_str() {
            "text" => Ok(ParameterKind::Text),
            "number" => Ok(ParameterKind::Number),
            "boolean" => Ok(ParameterKind::Boolean),
            "select" => Ok(ParameterKind::Select { options }),
            other => Err(ParameterError::UnknownKind(other.to_string())),
        }
    }

    /// Select options, empty for other kinds
    pub fn options(&self) -> &[String] {
        match self {
            ParameterKind::Select { options } => options,
            _ => &[],
        }
    }
}

/// Split a comma-separated option list, trimming and dropping empties
pub fn parse_options(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// A product's value for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    /// Free text
    Text(String),
    /// Numeric value
    Number(f64),
    /// Yes/no
    Boolean(bool),
    /// Selected option
    Choice(String),
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Text(s) | ParameterValue::Choice(s) => f.write_str(s),
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Boolean(true) => f.write_str("yes"),
            ParameterValue::Boolean(false) => f.write_str("no"),
        }
    }
}

/// A user-defined parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    /// Unique identifier
    pub id: RecordId,
    /// Owning user
    pub owner: RecordId,
    /// Display name, unique per owner
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Declared kind
    pub kind: ParameterKind,
}

impl ParameterDefinition {
    /// Create a parameter definition
    ///
    /// # Errors
    /// A `select` parameter must declare at least one option.
    pub fn new(
        owner: RecordId,
        name: impl Into<String>,
        description: Option<String>,
        kind: ParameterKind,
    ) -> Result<Self, ParameterError> {
        let name = name.into();
        if matches!(&kind, ParameterKind::Select { options } if options.is_empty()) {
            return Err(ParameterError::NoOptions(name));
        }
        Ok(Self {
            id: RecordId::new(),
            owner,
            name,
            description,
            kind,
        })
    }

    /// Check that `value` fits this parameter
    pub fn validate(&self, value: &ParameterValue) -> Result<(), ParameterError> {
        match (&self.kind, value) {
            (ParameterKind::Text, ParameterValue::Text(_)) => Ok(()),
            (ParameterKind::Number, ParameterValue::Number(n)) if n.is_finite() => Ok(()),
            (ParameterKind::Number, ParameterValue::Number(n)) => {
                Err(ParameterError::NotANumber(n.to_string()))
            }
            (ParameterKind::Boolean, ParameterValue::Boolean(_)) => Ok(()),
            (ParameterKind::Select { options }, ParameterValue::Choice(choice)) => {
                if options.iter().any(|o| o == choice) {
                    Ok(())
                } else {
                    Err(ParameterError::UnknownOption {
                        parameter: self.name.clone(),
                        value: choice.clone(),
                    })
                }
            }
            (kind, _) => Err(ParameterError::KindMismatch {
                parameter: self.name.clone(),
                expected: kind.type_name(),
            }),
        }
    }

    /// Read user input as a value of this parameter's kind
    ///
    /// Booleans accept yes/no, true/false, sim/não, 1/0 (case-insensitive).
    /// Select choices match options case-insensitively and take the option's
    /// spelling.
    pub fn coerce(&self, raw: &str) -> Result<ParameterValue, ParameterError> {
        let input = raw.trim();
        let value = match &self.kind {
            ParameterKind::Text => ParameterValue::Text(input.to_string()),
            ParameterKind::Number => {
                let n: f64 = input
                    .parse()
                    .map_err(|_| ParameterError::NotANumber(input.to_string()))?;
                ParameterValue::Number(n)
            }
            ParameterKind::Boolean => match input.to_lowercase().as_str() {
                "yes" | "true" | "1" | "sim" | "y" => ParameterValue::Boolean(true),
                "no" | "false" | "0" | "não" | "nao" | "n" => ParameterValue::Boolean(false),
                _ => return Err(ParameterError::NotABoolean(input.to_string())),
            },
            ParameterKind::Select { options } => {
                let option = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(input))
                    .ok_or_else(|| ParameterError::UnknownOption {
                        parameter: self.name.clone(),
                        value: input.to_string(),
                    })?;
                ParameterValue::Choice(option.clone())
            }
        };
        self.validate(&value)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(kind: ParameterKind) -> ParameterDefinition {
        ParameterDefinition::new(RecordId::new(), "DPI", None, kind).unwrap()
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options("a, b,,c ,"), vec!["a", "b", "c"]);
        assert!(parse_options("  ,  ").is_empty());
    }

    #[test]
    fn test_select_requires_options() {
        let result = ParameterDefinition::new(
            RecordId::new(),
            "Switch",
            None,
            ParameterKind::Select { options: vec![] },
        );
        assert_eq!(result.unwrap_err(), ParameterError::NoOptions("Switch".to_string()));
    }

    #[test]
    fn test_coerce_number() {
        let p = definition(ParameterKind::Number);
        assert_eq!(p.coerce(" 26000 ").unwrap(), ParameterValue::Number(26000.0));
        assert!(matches!(p.coerce("fast"), Err(ParameterError::NotANumber(_))));
        assert!(p.coerce("NaN").is_err());
    }

    #[test]
    fn test_coerce_boolean() {
        let p = definition(ParameterKind::Boolean);
        assert_eq!(p.coerce("Yes").unwrap(), ParameterValue::Boolean(true));
        assert_eq!(p.coerce("não").unwrap(), ParameterValue::Boolean(false));
        assert!(p.coerce("maybe").is_err());
    }

    #[test]
    fn test_coerce_select() {
        let p = definition(ParameterKind::Select {
            options: vec!["Wired".to_string(), "Wireless".to_string()],
        });
        assert_eq!(
            p.coerce("wireless").unwrap(),
            ParameterValue::Choice("Wireless".to_string())
        );
        assert!(matches!(
            p.coerce("Bluetooth"),
            Err(ParameterError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_validate_kind_mismatch() {
        let p = definition(ParameterKind::Number);
        let err = p.validate(&ParameterValue::Text("fast".to_string())).unwrap_err();
        assert_eq!(
            err,
            ParameterError::KindMismatch {
                parameter: "DPI".to_string(),
                expected: "number"
            }
        );
    }

    #[test]
    fn test_kind_from_parts() {
        assert_eq!(
            ParameterKind::from_parts("NUMBER", vec![]).unwrap(),
            ParameterKind::Number
        );
        let select = ParameterKind::from_parts("select", vec!["a".to_string()]).unwrap();
        assert_eq!(select.options(), &["a".to_string()]);
        assert!(ParameterKind::from_parts("date", vec![]).is_err());
    }

    #[test]
    fn test_value_serialization_is_tagged() {
        let json = serde_json::to_string(&ParameterValue::Number(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"number","value":1.5}"#);
        let back: ParameterValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ParameterValue::Number(1.5));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ParameterValue::Boolean(true).to_string(), "yes");
        assert_eq!(ParameterValue::Number(121.0).to_string(), "121");
    }
}
