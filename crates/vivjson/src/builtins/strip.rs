//! Implementation of the strip() builtin.

use crate::{
    error::{CodeLoc, Error},
    value::Value,
};

/// strip(s): trims Unicode whitespace from both ends.
pub(crate) fn builtin_strip(value: &Value, loc: CodeLoc) -> Result<Value, Error> {
    match value {
        Value::String(s) => Ok(Value::String(s.trim().to_owned())),
        other => Err(Error::evaluate(
            format!("strip() is not applicable to {}", other.kind()),
            loc,
        )),
    }
}
