//! Value enum for dynamic field values

use serde::Deserialize;
use serde::Serialize;

/// A dynamic value held by a record field.
///
/// The grid makes no assumption about the upstream schema, so values keep the
/// JSON shape they arrived in.
///
/// # Type Mapping
///
/// | JSON | Rust Variant |
/// |------|--------------|
/// | null | `Null` |
/// | true / false | `Bool` |
/// | integer | `Int` |
/// | other number | `Float` |
/// | string | `String` |
/// | array | `List` |
/// | object | `Json` |
///
/// # Example
///
/// ```
/// use odatagrid_lib::model::Value;
///
/// let name = Value::from("Russell");
/// let age = Value::from(30i64);
/// let emails = Value::from(vec!["a@example.com".to_string()]);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Multi-valued field.
    List(Vec<Value>),
    /// Nested object or anything else.
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string slice if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric interpretation of this value, if it has one.
    ///
    /// Strings count as numeric when their trimmed content parses as a finite
    /// number. Empty strings, lists and objects are never numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) if n.is_finite() => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    /// Coerces the value to display text.
    ///
    /// Null becomes the empty string, lists are joined with `,` and nested
    /// objects render as compact JSON.
    pub fn to_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::to_display)
                .collect::<Vec<_>>()
                .join(","),
            Value::Json(json) => match json {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_display())
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Value::String).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            other => Value::Json(other),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_coercion() {
        assert_eq!(Value::Null.to_display(), "");
        assert_eq!(Value::Int(30).to_display(), "30");
        assert_eq!(Value::Float(30.0).to_display(), "30");
        assert_eq!(Value::Float(1.5).to_display(), "1.5");
        assert_eq!(
            Value::from(vec!["a@x.com".to_string(), "b@x.com".to_string()]).to_display(),
            "a@x.com,b@x.com"
        );
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::from("10").as_number(), Some(10.0));
        assert_eq!(Value::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(Value::from("").as_number(), None);
        assert_eq!(Value::from("banana").as_number(), None);
        assert_eq!(Value::from("NaN").as_number(), None);
        assert_eq!(Value::Null.as_number(), None);
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(serde_json::json!(["x", 1]));
        assert_eq!(value, Value::List(vec![Value::from("x"), Value::Int(1)]));
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from(serde_json::json!(2.5)), Value::Float(2.5));
    }
}
