//! Implementation of the int(), float(), and string() builtins.

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    value::Value,
};

/// int(x): parses a numeric string or truncates a float toward zero.
pub(crate) fn builtin_int(value: &Value, loc: CodeLoc) -> Result<Value, Error> {
    match value {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => float_to_int(*f, loc),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Int(n));
            }
            match text.parse::<f64>() {
                Ok(f) => float_to_int(f, loc),
                Err(_) => Err(Error::evaluate(format!("cannot convert {s:?} into int"), loc)),
            }
        }
        other => Err(Error::evaluate(
            format!("cannot convert {} into int", other.kind()),
            loc,
        )),
    }
}

fn float_to_int(f: f64, loc: CodeLoc) -> Result<Value, Error> {
    if f.is_nan() || f.is_infinite() {
        return Err(Error::evaluate("cannot convert a non-finite float into int", loc));
    }
    let truncated = f.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return Err(Error::evaluate("integer overflow", loc));
    }
    Ok(Value::Int(truncated as i64))
}

/// float(x): parses a numeric string or widens an int.
pub(crate) fn builtin_float(value: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match value {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::String(s) => {
            let text = s.trim();
            // The configured lexemes are accepted, mirroring serialization.
            if let Some(lexeme) = &config.infinity {
                if text == lexeme {
                    return Ok(Value::Float(f64::INFINITY));
                }
                if let Some(rest) = text.strip_prefix('-') {
                    if rest == lexeme {
                        return Ok(Value::Float(f64::NEG_INFINITY));
                    }
                }
            }
            if let Some(lexeme) = &config.nan {
                if text == lexeme {
                    return Ok(Value::Float(f64::NAN));
                }
            }
            match text.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Float(f)),
                _ => Err(Error::evaluate(format!("cannot convert {s:?} into float"), loc)),
            }
        }
        other => Err(Error::evaluate(
            format!("cannot convert {} into float", other.kind()),
            loc,
        )),
    }
}

/// string(x): canonical serialization.
pub(crate) fn builtin_string(value: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    value
        .to_display(config)
        .map(Value::String)
        .map_err(|err| match err.location() {
            Some(_) => err,
            None => Error::evaluate(err.message().to_owned(), loc),
        })
}
