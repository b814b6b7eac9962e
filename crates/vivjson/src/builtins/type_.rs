//! Implementation of the type() builtin.

use crate::value::Value;

/// type(x): the tag name of a value, e.g. "int" or "block".
pub(crate) fn builtin_type(value: &Value) -> Value {
    Value::String(value.kind().to_string())
}
