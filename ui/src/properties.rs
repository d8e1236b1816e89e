//! Typed parsing for user-defined video property values.
//!
//! Property definitions come from the backend; the form fields are plain
//! text, so every value is validated locally against its declared type
//! before anything is sent back.

use bridge::{PropertyDef, PropertyKind};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{name}: '{raw}' is not an integer")]
    NotAnInteger { name: String, raw: String },
    #[error("{name}: '{raw}' is not a number")]
    NotANumber { name: String, raw: String },
    #[error("{name}: '{raw}' is not a flag (use true/false)")]
    NotAFlag { name: String, raw: String },
    #[error("{name}: '{raw}' is not one of {allowed:?}")]
    NotInEnum {
        name: String,
        raw: String,
        allowed: Vec<String>,
    },
}

/// Parses one raw form value against its property definition. An empty
/// input clears the property.
pub fn parse_property_value(def: &PropertyDef, raw: &str) -> Result<Value, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    match &def.kind {
        PropertyKind::Text => Ok(json!(raw)),
        PropertyKind::Int => raw
            .parse::<i64>()
            .map(|n| json!(n))
            .map_err(|_| ValidationError::NotAnInteger {
                name: def.name.clone(),
                raw: raw.to_string(),
            }),
        PropertyKind::Float => raw
            .parse::<f64>()
            .map(|n| json!(n))
            .map_err(|_| ValidationError::NotANumber {
                name: def.name.clone(),
                raw: raw.to_string(),
            }),
        PropertyKind::Flag => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(json!(true)),
            "false" | "0" | "no" => Ok(json!(false)),
            _ => Err(ValidationError::NotAFlag {
                name: def.name.clone(),
                raw: raw.to_string(),
            }),
        },
        PropertyKind::Enum { values } => {
            if values.iter().any(|v| v == raw) {
                Ok(json!(raw))
            } else {
                Err(ValidationError::NotInEnum {
                    name: def.name.clone(),
                    raw: raw.to_string(),
                    allowed: values.clone(),
                })
            }
        }
    }
}

/// Renders a stored property value back into form text.
pub fn render_property_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, kind: PropertyKind) -> PropertyDef {
        PropertyDef {
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn integers_parse_and_reject() {
        let year = def("year", PropertyKind::Int);
        assert_eq!(parse_property_value(&year, " 2019 ").unwrap(), json!(2019));
        assert_eq!(
            parse_property_value(&year, "soon").unwrap_err(),
            ValidationError::NotAnInteger {
                name: "year".into(),
                raw: "soon".into()
            }
        );
    }

    #[test]
    fn floats_accept_integer_text() {
        let rating = def("rating", PropertyKind::Float);
        assert_eq!(parse_property_value(&rating, "4.5").unwrap(), json!(4.5));
        assert_eq!(parse_property_value(&rating, "4").unwrap(), json!(4.0));
        assert!(parse_property_value(&rating, "great").is_err());
    }

    #[test]
    fn flags_accept_the_usual_spellings() {
        let seen = def("seen", PropertyKind::Flag);
        assert_eq!(parse_property_value(&seen, "TRUE").unwrap(), json!(true));
        assert_eq!(parse_property_value(&seen, "0").unwrap(), json!(false));
        assert!(parse_property_value(&seen, "maybe").is_err());
    }

    #[test]
    fn enum_membership_is_exact() {
        let genre = def(
            "genre",
            PropertyKind::Enum {
                values: vec!["family".into(), "travel".into()],
            },
        );
        assert_eq!(parse_property_value(&genre, "travel").unwrap(), json!("travel"));
        let err = parse_property_value(&genre, "Travel").unwrap_err();
        assert!(matches!(err, ValidationError::NotInEnum { .. }));
    }

    #[test]
    fn empty_input_clears_the_property() {
        let year = def("year", PropertyKind::Int);
        assert_eq!(parse_property_value(&year, "  ").unwrap(), Value::Null);
    }

    #[test]
    fn stored_values_render_back_to_form_text() {
        assert_eq!(render_property_value(&json!("family")), "family");
        assert_eq!(render_property_value(&json!(true)), "true");
        assert_eq!(render_property_value(&json!(1984)), "1984");
        assert_eq!(render_property_value(&Value::Null), "");
    }
}
