//! Dynamic field values for filters, cursors, and update maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dynamically typed value bound into a query as a parameter.
///
/// This is the only value representation the repository accepts from
/// callers; values are always bound, never interpolated into SQL text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// A UUID value.
    Uuid(Uuid),
    /// A UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// A text value.
    Text(String),
}

impl FieldValue {
    /// Whether this value is its type's zero value.
    ///
    /// Zero values are excluded from partial updates: `Null`, `false`,
    /// `0`, `0.0`, the empty string, the nil UUID, and the Unix epoch.
    /// Entity `Default` impls use the epoch as their timestamp zero, so
    /// a record built via struct update syntax does not drag default
    /// timestamps into a partial update's SET clause.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(v) => !v,
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Text(v) => v.is_empty(),
            Self::Uuid(v) => v.is_nil(),
            Self::Timestamp(v) => *v == DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Whether this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Recover a typed value from a serialized row field.
    ///
    /// Used to derive the next keyset cursor from the last row of a page:
    /// rows pass through `serde_json`, so integers, UUIDs, and RFC 3339
    /// timestamps must be mapped back to their bindable representation.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(v) => Self::Bool(*v),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => {
                if let Ok(id) = Uuid::parse_str(s) {
                    Self::Uuid(id)
                } else if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
                    Self::Timestamp(ts.with_timezone(&Utc))
                } else {
                    Self::Text(s.clone())
                }
            }
            other => Self::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert!(FieldValue::Null.is_zero());
        assert!(FieldValue::Bool(false).is_zero());
        assert!(FieldValue::Int(0).is_zero());
        assert!(FieldValue::Float(0.0).is_zero());
        assert!(FieldValue::Text(String::new()).is_zero());
        assert!(FieldValue::Uuid(Uuid::nil()).is_zero());
        assert!(FieldValue::Timestamp(DateTime::<Utc>::UNIX_EPOCH).is_zero());

        assert!(!FieldValue::Bool(true).is_zero());
        assert!(!FieldValue::Int(-1).is_zero());
        assert!(!FieldValue::Text("x".into()).is_zero());
        assert!(!FieldValue::Timestamp(Utc::now()).is_zero());
    }

    #[test]
    fn test_from_json_recovers_types() {
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(42)),
            FieldValue::Int(42)
        );
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(1.5)),
            FieldValue::Float(1.5)
        );
        assert_eq!(FieldValue::from_json(&serde_json::Value::Null), FieldValue::Null);

        let id = Uuid::new_v4();
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(id.to_string())),
            FieldValue::Uuid(id)
        );

        let ts = FieldValue::from_json(&serde_json::json!("2024-05-01T10:00:00Z"));
        assert!(matches!(ts, FieldValue::Timestamp(_)));

        assert_eq!(
            FieldValue::from_json(&serde_json::json!("plain text")),
            FieldValue::Text("plain text".into())
        );
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<i64> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3_i64)), FieldValue::Int(3));
    }
}
