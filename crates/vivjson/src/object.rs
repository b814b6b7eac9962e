//! Host value bridge: the public value type passed into and out of runs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    value::Value,
};

/// A value that can be passed to or returned from the interpreter.
///
/// This is the public-facing value type. It owns all its data and can be
/// freely cloned, serialized, or stored; the evaluator never sees host shapes
/// outside these seven kinds. Smaller host integers and floats widen to 64-bit
/// through the `From` impls.
///
/// # JSON Serialization
///
/// `Object` maps naturally onto JSON through [`Object::from_json`] and
/// [`Object::to_json_string`]:
///
/// - `Null` ↔ `null`
/// - `Bool` ↔ `true`/`false`
/// - `Int` ↔ integer
/// - `Float` ↔ float
/// - `String` ↔ string
/// - `Array` ↔ array
/// - `Map` ↔ object (insertion order preserved)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Object>),
    Map(IndexMap<String, Object>),
}

impl Object {
    /// Converts into a runtime value. This is the single host-to-core entry.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::Int(*n),
            Self::Float(f) => Value::Float(*f),
            Self::String(s) => Value::String(s.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Map(entries) => Value::Block(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    /// Converts a runtime value back to the host side.
    ///
    /// # Errors
    /// A callable has no host representation and is rejected at the boundary.
    pub(crate) fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Int(n) => Ok(Self::Int(*n)),
            Value::Float(f) => Ok(Self::Float(*f)),
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Array(items) => items.iter().map(Self::from_value).collect::<Result<_, _>>().map(Self::Array),
            Value::Block(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    out.insert(key.clone(), Self::from_value(value)?);
                }
                Ok(Self::Map(out))
            }
            Value::Function(_) | Value::Builtin(_) => Err(Error::evaluate_plain(
                "a function cannot cross the host boundary",
            )),
        }
    }

    /// Parses a JSON document into an `Object`, preserving object key order.
    ///
    /// # Errors
    /// Returns an error for malformed JSON or integers outside the i64 range.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|err| Error::evaluate_plain(format!("invalid JSON: {err}")))?;
        Self::from_json_value(&value)
    }

    fn from_json_value(value: &serde_json::Value) -> Result<Self, Error> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(Error::evaluate_plain("integer is out of the 64-bit range"))
                }
            }
            serde_json::Value::String(s) => Ok(Self::String(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Self::from_json_value)
                .collect::<Result<_, _>>()
                .map(Self::Array),
            serde_json::Value::Object(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    out.insert(key.clone(), Self::from_json_value(value)?);
                }
                Ok(Self::Map(out))
            }
        }
    }

    /// Serializes to a JSON string, preserving map key order.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.to_json_value()).unwrap_or_else(|_| "null".to_owned())
    }

    fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::Number((*n).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => serde_json::Value::Array(items.iter().map(Self::to_json_value).collect()),
            Self::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Object {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for Object {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Object {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
