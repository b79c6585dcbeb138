//! Decoded value tree for CBOR-like inscription metadata.
//!
//! The tree only exists to be displayed or re-serialized, so byte strings are
//! carried as lowercase hex text and map keys are already stringified.

use core::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UnsignedInt(u64),
    /// Full CBOR negative range, `-1 - u64::MAX ..= -1`.
    NegativeInt(i128),
    /// Lowercase hex of the raw bytes.
    ByteString(String),
    TextString(String),
    Array(Vec<Value>),
    Map(IndexMap<String, Value>),
    Tagged(u64, Box<Value>),
    Bool(bool),
    Null,
    Undefined,
    Float(f64),
    /// Encodings we recognise but deliberately do not decode (half floats).
    Unsupported(&'static str),
}

impl Value {
    pub fn bytes(raw: &[u8]) -> Self {
        Value::ByteString(hex::encode(raw))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::TextString(s.into())
    }

    pub fn tagged(tag: u64, inner: Value) -> Self {
        Value::Tagged(tag, Box::new(inner))
    }

    /// Label used when a scalar is shown on its own.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::UnsignedInt(_) => "uint",
            Value::NegativeInt(_) => "negint",
            Value::ByteString(_) => "bytes",
            Value::TextString(_) => "text",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Tagged(..) => "tag",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Float(_) => "float",
            Value::Unsupported(_) => "unsupported",
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    /// String form used when this value appears as a map key.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::TextString(s) | Value::ByteString(s) => s.clone(),
            Value::UnsignedInt(n) => n.to_string(),
            Value::NegativeInt(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Float(f) => f.to_string(),
            Value::Unsupported(what) => format!("<unsupported {what}>"),
            Value::Array(_) | Value::Map(_) | Value::Tagged(..) => self.to_json().to_string(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::UnsignedInt(n) => JsonValue::Number((*n).into()),
            Value::NegativeInt(n) => match i64::try_from(*n) {
                Ok(small) => JsonValue::Number(small.into()),
                Err(_) => JsonValue::String(n.to_string()),
            },
            Value::ByteString(hex) => JsonValue::String(hex.clone()),
            Value::TextString(s) => JsonValue::String(s.clone()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                let mut map = JsonMap::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                JsonValue::Object(map)
            }
            Value::Tagged(tag, inner) => {
                let mut map = JsonMap::with_capacity(2);
                map.insert("tag".to_string(), JsonValue::Number((*tag).into()));
                map.insert("value".to_string(), inner.to_json());
                JsonValue::Object(map)
            }
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Null | Value::Undefined => JsonValue::Null,
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Unsupported(what) => JsonValue::String(format!("<unsupported {what}>")),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::TextString(s) => write!(f, "{s}"),
            Value::Tagged(tag, inner) => write!(f, "{tag}({inner})"),
            Value::Array(_) | Value::Map(_) => write!(f, "{}", self.to_json()),
            other => write!(f, "{}", other.to_key_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_json_structured() {
        let mut map = IndexMap::new();
        map.insert("name".to_string(), Value::text("bitmap"));
        map.insert("raw".to_string(), Value::bytes(&[0xde, 0xad]));
        map.insert("tagged".to_string(), Value::tagged(1, Value::UnsignedInt(7)));
        let value = Value::Array(vec![Value::Map(map), Value::NegativeInt(-5), Value::Undefined]);
        assert_eq!(
            value.to_json(),
            json!([
                {"name": "bitmap", "raw": "dead", "tagged": {"tag": 1, "value": 7}},
                -5,
                null
            ])
        );
    }

    #[test]
    fn test_key_strings() {
        assert_eq!(Value::UnsignedInt(12).to_key_string(), "12");
        assert_eq!(Value::NegativeInt(-3).to_key_string(), "-3");
        assert_eq!(Value::Bool(true).to_key_string(), "true");
        assert_eq!(Value::Null.to_key_string(), "null");
        assert_eq!(
            Value::Array(vec![Value::UnsignedInt(1)]).to_key_string(),
            "[1]"
        );
    }

    #[test]
    fn test_huge_negative_is_kept_exact() {
        let value = Value::NegativeInt(-1 - u64::MAX as i128);
        assert_eq!(value.to_json(), json!("-18446744073709551616"));
    }

    #[test]
    fn test_non_finite_float_displays_as_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
        assert_eq!(Value::Float(1.5).to_json(), json!(1.5));
    }
}
