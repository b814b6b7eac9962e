//! Implementation of the insert() builtin.

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    value::Value,
};

/// insert(array, index, value): returns the Array with `value` inserted.
///
/// A negative index counts from the end; any position outside the Array is an
/// error. When the first argument was an assignable variable, the evaluator
/// also writes the result back through it.
pub(crate) fn builtin_insert(
    array: &Value,
    index: &Value,
    value: &Value,
    config: &Config,
    loc: CodeLoc,
) -> Result<Value, Error> {
    let Value::Array(items) = array else {
        return Err(Error::evaluate(
            format!("insert() needs an array, not {}", array.kind()),
            loc,
        ));
    };
    let raw = match index {
        Value::Int(n) => *n,
        Value::Float(f) if f.fract() == 0.0 => *f as i64,
        other => {
            return Err(Error::evaluate(
                format!("insert() needs an integer index, not {}", other.kind()),
                loc,
            ));
        }
    };
    let len = items.len() as i64;
    let position = if raw < 0 { len + raw } else { raw };
    if position < 0 || position > len {
        return Err(Error::evaluate(format!("index {raw} is out of range"), loc));
    }
    config.check_size(items.len() + 1, loc)?;
    let mut out = items.clone();
    out.insert(position as usize, value.clone());
    Ok(Value::Array(out))
}
