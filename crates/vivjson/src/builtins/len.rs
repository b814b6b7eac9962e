//! Implementation of the len() builtin.

use crate::{
    error::{CodeLoc, Error},
    value::Value,
};

/// len(x): length of a String (in code points), Array, or Block.
pub(crate) fn builtin_len(value: &Value, loc: CodeLoc) -> Result<Value, Error> {
    let length = match value {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Block(entries) => entries.len(),
        other => {
            return Err(Error::evaluate(
                format!("len() is not applicable to {}", other.kind()),
                loc,
            ));
        }
    };
    Ok(Value::Int(length as i64))
}
