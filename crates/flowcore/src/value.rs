use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Dynamic value type carried by ports and parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

/// Type tag declared by ports and parameters.
///
/// `Any` is the wildcard: it is compatible with every other tag and admits
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Any,
    Bool,
    Number,
    String,
    Bytes,
    Json,
    Array,
    Object,
}

impl PortType {
    /// Whether an output of type `self` may feed an input of type `other`.
    pub fn is_compatible_with(self, other: PortType) -> bool {
        self == PortType::Any || other == PortType::Any || self == other
    }

    /// Whether a concrete value may be stored under this tag.
    pub fn admits(self, value: &Value) -> bool {
        match (self, value.port_type()) {
            (PortType::Any, _) => true,
            (_, None) => false,
            (expected, Some(actual)) => expected == actual,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortType::Any => "any",
            PortType::Bool => "bool",
            PortType::Number => "number",
            PortType::String => "string",
            PortType::Bytes => "bytes",
            PortType::Json => "json",
            PortType::Array => "array",
            PortType::Object => "object",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Type tag of this value, `None` for `Null`.
    pub fn port_type(&self) -> Option<PortType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(PortType::Bool),
            Value::Number(_) => Some(PortType::Number),
            Value::String(_) => Some(PortType::String),
            Value::Bytes(_) => Some(PortType::Bytes),
            Value::Json(_) => Some(PortType::Json),
            Value::Array(_) => Some(PortType::Array),
            Value::Object(_) => Some(PortType::Object),
        }
    }

    /// Human readable tag, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        self.port_type().map(PortType::as_str).unwrap_or("null")
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert plain JSON into the matching value variant, so that `3`
    /// becomes `Number` rather than an opaque `Json` blob.
    pub fn from_plain_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from_plain_json).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from_plain_json(v)))
                    .collect(),
            ),
        }
    }

    /// Inverse of [`Value::from_plain_json`]. Bytes become an array of numbers.
    pub fn to_plain_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::Array(
                b.iter().map(|byte| serde_json::Value::from(*byte)).collect(),
            ),
            Value::Json(j) => j.clone(),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_plain_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain_json()))
                    .collect(),
            ),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}
