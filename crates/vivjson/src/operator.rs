//! Binary and unary operator semantics.
//!
//! Each operator is a total function over value pairs with its own explicit
//! decision table; the rules differ per operator (`+` accepts Block + Null,
//! `%` does not), so there is deliberately no shared promotion helper.
//! Unspecified combinations are evaluate errors.

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    statements::{BinaryOp, UnaryOp},
    value::Value,
};

/// Applies a binary operator. `and`/`or` are included for completeness but the
/// evaluator short-circuits them before reaching this table.
pub(crate) fn binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    config: &Config,
    loc: CodeLoc,
) -> Result<Value, Error> {
    match op {
        BinaryOp::Add => add(left, right, config, loc),
        BinaryOp::Sub => sub(left, right, config, loc),
        BinaryOp::Mul => mul(left, right, config, loc),
        BinaryOp::Div => div(left, right, config, loc),
        BinaryOp::Rem => rem(left, right, config, loc),
        BinaryOp::Eq => Ok(Value::Bool(left.deep_equals(right))),
        BinaryOp::Ne => Ok(Value::Bool(!left.deep_equals(right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right, loc),
        BinaryOp::In => contains(left, right, loc),
        BinaryOp::And => Ok(Value::Bool(left.truthy() && right.truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.truthy() || right.truthy())),
    }
}

/// Applies a unary operator. `+` and `-` are numeric-only.
pub(crate) fn unary(op: UnaryOp, value: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy())),
        (UnaryOp::Minus, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Error::evaluate("integer overflow", loc)),
        (UnaryOp::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Plus, Value::Int(n)) => Ok(Value::Int(*n)),
        (UnaryOp::Plus, Value::Float(f)) => Ok(Value::Float(*f)),
        (_, v) => Err(type_error("unary operator", &[v], loc)),
    }
    .and_then(|v| match v {
        Value::Float(f) => Ok(Value::Float(config.check_float(f, loc)?)),
        other => Ok(other),
    })
}

fn type_error(op: &str, values: &[&Value], loc: CodeLoc) -> Error {
    let kinds: Vec<String> = values.iter().map(|v| v.kind().to_string()).collect();
    Error::evaluate(format!("'{op}' is not operable with {}", kinds.join(" and ")), loc)
}

fn int_overflow(loc: CodeLoc) -> Error {
    Error::evaluate("integer overflow", loc)
}

fn add(left: &Value, right: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        // Null is a no-op on scalars and Blocks, an element for Arrays.
        (Value::Null, Value::Null) => Ok(Value::Null),
        (Value::Null, Value::Array(items)) | (Value::Array(items), Value::Null) => {
            config.check_size(items.len() + 1, loc)?;
            let mut out = items.clone();
            out.push(Value::Null);
            Ok(Value::Array(out))
        }
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        // String concatenation stringifies the right-hand side.
        (Value::String(a), b) => {
            let mut out = a.clone();
            out.push_str(&b.to_display(config)?);
            Ok(Value::String(out))
        }
        // Blocks merge; matching keys sum recursively.
        (Value::Block(a), Value::Block(b)) => {
            let mut out = a.clone();
            for (key, value) in b {
                let merged = match out.get(key) {
                    Some(current) => add(current, value, config, loc)?,
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            config.check_size(out.len(), loc)?;
            Ok(Value::Block(out))
        }
        // In either order, the Block becomes the first element of a new Array.
        (Value::Block(b), Value::Array(items)) | (Value::Array(items), Value::Block(b)) => {
            config.check_size(items.len() + 1, loc)?;
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(Value::Block(b.clone()));
            out.extend(items.iter().cloned());
            Ok(Value::Array(out))
        }
        // Any other right-hand side appends as a single element; this is what
        // wraps Array + Array instead of concatenating.
        (Value::Array(items), other) => {
            config.check_size(items.len() + 1, loc)?;
            let mut out = items.clone();
            out.push(other.clone());
            Ok(Value::Array(out))
        }
        (Value::Int(a), Value::Int(b)) => a.checked_add(*b).map(Value::Int).ok_or_else(|| int_overflow(loc)),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(config.check_float(*a as f64 + b, loc)?)),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(config.check_float(a + *b as f64, loc)?)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(config.check_float(a + b, loc)?)),
        // Bool with Bool or a number is truthiness OR.
        (Value::Bool(_), Value::Bool(_) | Value::Int(_) | Value::Float(_))
        | (Value::Int(_) | Value::Float(_), Value::Bool(_)) => {
            Ok(Value::Bool(left.truthy() || right.truthy()))
        }
        _ => Err(type_error("+", &[left, right], loc)),
    }
}

fn sub(left: &Value, right: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(Value::Null),
        (Value::Null, _) => Err(type_error("-", &[left, right], loc)),
        // Blocks: pairs equal on both sides drop out, shared keys subtract,
        // right-only keys come in negated.
        (Value::Block(a), Value::Block(b)) => {
            let mut out = a.clone();
            for (key, value) in b {
                match out.get(key) {
                    Some(current) if current.deep_equals(value) => {
                        out.shift_remove(key);
                    }
                    Some(current) => {
                        let updated = sub(current, value, config, loc)?;
                        out.insert(key.clone(), updated);
                    }
                    None => {
                        let negated = match value {
                            Value::Int(n) => {
                                Value::Int(n.checked_neg().ok_or_else(|| int_overflow(loc))?)
                            }
                            Value::Float(f) => Value::Float(-f),
                            Value::Null => Value::Null,
                            other => return Err(type_error("-", &[&Value::Null, other], loc)),
                        };
                        out.insert(key.clone(), negated);
                    }
                }
            }
            Ok(Value::Block(out))
        }
        // Deleting keys by name list or single name.
        (Value::Block(a), Value::Array(keys)) => {
            let mut out = a.clone();
            for key in keys {
                match key {
                    Value::String(name) => {
                        out.shift_remove(name);
                    }
                    other => return Err(type_error("-", &[left, other], loc)),
                }
            }
            Ok(Value::Block(out))
        }
        (Value::Block(a), Value::String(key)) => {
            let mut out = a.clone();
            out.shift_remove(key);
            Ok(Value::Block(out))
        }
        // Arrays drop every element equal to the right-hand value, Null included.
        (Value::Array(items), _) => {
            let out: Vec<Value> = items.iter().filter(|v| !v.deep_equals(right)).cloned().collect();
            Ok(Value::Array(out))
        }
        (Value::String(a), Value::String(b)) => {
            if b.is_empty() {
                Ok(Value::String(a.clone()))
            } else {
                Ok(Value::String(a.replace(b.as_str(), "")))
            }
        }
        (Value::String(a), Value::Array(parts)) => {
            let mut out = a.clone();
            for part in parts {
                match part {
                    Value::String(s) if s.is_empty() => {}
                    Value::String(s) => out = out.replace(s.as_str(), ""),
                    other => return Err(type_error("-", &[left, other], loc)),
                }
            }
            Ok(Value::String(out))
        }
        (Value::Int(a), Value::Int(b)) => a.checked_sub(*b).map(Value::Int).ok_or_else(|| int_overflow(loc)),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(config.check_float(*a as f64 - b, loc)?)),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(config.check_float(a - *b as f64, loc)?)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(config.check_float(a - b, loc)?)),
        // Anything minus Null is a no-op.
        (other, Value::Null) => Ok(other.clone()),
        _ => Err(type_error("-", &[left, right], loc)),
    }
}

fn mul(left: &Value, right: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        // Null absorbs, and this precedes the Bool rejection.
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Bool(_), _) | (_, Value::Bool(_)) => Err(type_error("*", &[left, right], loc)),
        // Pointwise multiplication on shared keys; right-only keys become Null.
        (Value::Block(a), Value::Block(b)) => {
            let mut out = a.clone();
            for (key, value) in b {
                let updated = match a.get(key) {
                    Some(current) => mul(current, value, config, loc)?,
                    None => Value::Null,
                };
                out.insert(key.clone(), updated);
            }
            config.check_size(out.len(), loc)?;
            Ok(Value::Block(out))
        }
        (Value::Array(items), Value::Int(_) | Value::Float(_)) => {
            let count = repeat_count(right);
            config.check_size(items.len().saturating_mul(count), loc)?;
            let mut out = Vec::with_capacity(items.len() * count);
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Value::Array(out))
        }
        // Join with a String delimiter, in either order.
        (Value::Array(items), Value::String(sep)) | (Value::String(sep), Value::Array(items)) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(item.to_display(config)?);
            }
            Ok(Value::String(parts.join(sep)))
        }
        (Value::String(s), Value::Int(_) | Value::Float(_)) => {
            let count = repeat_count(right);
            config.check_size(s.chars().count().saturating_mul(count), loc)?;
            Ok(Value::String(s.repeat(count)))
        }
        (Value::Int(a), Value::Int(b)) => a.checked_mul(*b).map(Value::Int).ok_or_else(|| int_overflow(loc)),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(config.check_float(*a as f64 * b, loc)?)),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(config.check_float(a * *b as f64, loc)?)),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(config.check_float(a * b, loc)?)),
        _ => Err(type_error("*", &[left, right], loc)),
    }
}

/// Repetition count for `*`: floats truncate toward zero, negatives are empty.
fn repeat_count(value: &Value) -> usize {
    let n = match value {
        Value::Int(n) => *n,
        Value::Float(f) => f.trunc() as i64,
        _ => 0,
    };
    usize::try_from(n).unwrap_or(0)
}

fn is_zero_number(value: &Value) -> bool {
    matches!(value, Value::Int(0)) || matches!(value, Value::Float(f) if *f == 0.0)
}

fn div(left: &Value, right: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        (Value::Null, Value::Null) => Err(type_error("/", &[left, right], loc)),
        (Value::Null, divisor) => {
            if is_zero_number(divisor) {
                Err(Error::evaluate("division by zero", loc))
            } else {
                Ok(Value::Null)
            }
        }
        // Splitting: an empty delimiter splits into single code points.
        (Value::String(s), Value::String(sep)) => {
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|ch| Value::String(ch.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(|p| Value::String(p.to_owned())).collect()
            };
            config.check_size(parts.len(), loc)?;
            Ok(Value::Array(parts))
        }
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(Error::evaluate("division by zero", loc));
            }
            if a.checked_rem(*b).ok_or_else(|| int_overflow(loc))? == 0 {
                a.checked_div(*b).map(Value::Int).ok_or_else(|| int_overflow(loc))
            } else {
                Ok(Value::Float(config.check_float(*a as f64 / *b as f64, loc)?))
            }
        }
        (
            Value::Int(_) | Value::Float(_),
            Value::Int(_) | Value::Float(_),
        ) => {
            let a = as_f64(left);
            let b = as_f64(right);
            if b == 0.0 {
                return Err(Error::evaluate("division by zero", loc));
            }
            let quotient = config.check_float(a / b, loc)?;
            Ok(collapse_to_int(quotient))
        }
        _ => Err(type_error("/", &[left, right], loc)),
    }
}

fn rem(left: &Value, right: &Value, config: &Config, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        (Value::Null, Value::Null) => Err(type_error("%", &[left, right], loc)),
        (Value::Null, divisor) => {
            if is_zero_number(divisor) {
                Err(Error::evaluate("division by zero", loc))
            } else {
                Ok(Value::Null)
            }
        }
        // Sign of the result follows the divisor.
        (Value::Int(a), Value::Int(b)) => {
            if *b == 0 {
                return Err(Error::evaluate("division by zero", loc));
            }
            if *b == -1 {
                return Ok(Value::Int(0));
            }
            let r = a % b;
            let r = if r != 0 && (r < 0) != (*b < 0) { r + b } else { r };
            Ok(Value::Int(r))
        }
        (
            Value::Int(_) | Value::Float(_),
            Value::Int(_) | Value::Float(_),
        ) => {
            let a = as_f64(left);
            let b = as_f64(right);
            if b == 0.0 {
                return Err(Error::evaluate("division by zero", loc));
            }
            let r = config.check_float(a - b * (a / b).floor(), loc)?;
            Ok(collapse_to_int(r))
        }
        _ => Err(type_error("%", &[left, right], loc)),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

/// A float result that is an exact integer collapses to Int.
fn collapse_to_int(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Int(value as i64)
    } else {
        Value::Float(value)
    }
}

/// `<`, `<=`, `>`, `>=`: defined on numeric operands only.
fn compare(op: BinaryOp, left: &Value, right: &Value, loc: CodeLoc) -> Result<Value, Error> {
    let ordered = match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
        (
            Value::Int(_) | Value::Float(_),
            Value::Int(_) | Value::Float(_),
        ) => as_f64(left).partial_cmp(&as_f64(right)),
        _ => return Err(type_error(op.symbol(), &[left, right], loc)),
    };
    let Some(ordering) = ordered else {
        // NaN comparisons have no ordering.
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => unreachable!("compare is only called for ordering operators"),
    };
    Ok(Value::Bool(result))
}

/// `in`: membership of the left value within the right container.
fn contains(left: &Value, right: &Value, loc: CodeLoc) -> Result<Value, Error> {
    match (left, right) {
        (Value::String(needle), Value::String(haystack)) => {
            Ok(Value::Bool(haystack.contains(needle.as_str())))
        }
        (Value::Block(a), Value::Block(b)) => {
            let sub_map = a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.deep_equals(w)));
            Ok(Value::Bool(sub_map))
        }
        (Value::String(key), Value::Block(b)) => Ok(Value::Bool(b.contains_key(key))),
        (_, Value::Array(items)) => Ok(Value::Bool(items.iter().any(|v| v.deep_equals(left)))),
        (_, Value::Block(b)) => Ok(Value::Bool(b.values().any(|v| v.deep_equals(left)))),
        _ => Err(type_error("in", &[left, right], loc)),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    fn cfg() -> Config {
        Config::default()
    }

    fn at() -> CodeLoc {
        CodeLoc::new(1, 1)
    }

    fn block(pairs: &[(&str, Value)]) -> Value {
        let mut map = IndexMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_owned(), v.clone());
        }
        Value::Block(map)
    }

    #[test]
    fn array_plus_array_wraps_the_right_operand() {
        let a = Value::Array(vec![Value::Int(1)]);
        let b = Value::Array(vec![Value::Int(2), Value::Int(3)]);
        let out = add(&a, &b, &cfg(), at()).unwrap();
        let expected = Value::Array(vec![
            Value::Int(1),
            Value::Array(vec![Value::Int(2), Value::Int(3)]),
        ]);
        assert!(out.deep_equals(&expected));
    }

    #[test]
    fn block_plus_block_sums_matching_keys() {
        let a = block(&[("x", Value::Int(1)), ("y", Value::Int(2))]);
        let b = block(&[("y", Value::Int(5)), ("z", Value::Int(9))]);
        let out = add(&a, &b, &cfg(), at()).unwrap();
        let expected = block(&[("x", Value::Int(1)), ("y", Value::Int(7)), ("z", Value::Int(9))]);
        assert!(out.deep_equals(&expected));
    }

    #[test]
    fn block_minus_itself_is_empty() {
        let a = block(&[("x", Value::Int(1)), ("y", Value::String("s".into()))]);
        let out = sub(&a, &a, &cfg(), at()).unwrap();
        assert!(out.deep_equals(&block(&[])));
    }

    #[test]
    fn string_division_splits() {
        let out = div(
            &Value::String("a,b,c".into()),
            &Value::String(",".into()),
            &cfg(),
            at(),
        )
        .unwrap();
        let expected = Value::Array(vec![
            Value::String("a".into()),
            Value::String("b".into()),
            Value::String("c".into()),
        ]);
        assert!(out.deep_equals(&expected));
    }

    #[test]
    fn empty_delimiter_splits_into_code_points() {
        let out = div(&Value::String("αβγ".into()), &Value::String(String::new()), &cfg(), at()).unwrap();
        let expected = Value::Array(vec![
            Value::String("α".into()),
            Value::String("β".into()),
            Value::String("γ".into()),
        ]);
        assert!(out.deep_equals(&expected));
    }

    #[test]
    fn modulo_sign_follows_the_divisor() {
        assert!(rem(&Value::Int(-10), &Value::Int(3), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Int(2)));
        assert!(rem(&Value::Int(10), &Value::Int(-3), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Int(-2)));
    }

    #[test]
    fn exact_float_division_collapses_to_int() {
        assert!(div(&Value::Float(7.0), &Value::Float(3.5), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Int(2)));
        assert!(div(&Value::Int(7), &Value::Int(2), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Float(3.5)));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(div(&Value::Int(1), &Value::Int(0), &cfg(), at()).is_err());
        assert!(div(&Value::Float(1.0), &Value::Float(0.0), &cfg(), at()).is_err());
        assert!(rem(&Value::Int(1), &Value::Int(0), &cfg(), at()).is_err());
    }

    #[test]
    fn integer_overflow_is_an_error() {
        assert!(add(&Value::Int(i64::MAX), &Value::Int(1), &cfg(), at()).is_err());
        assert!(mul(&Value::Int(i64::MAX), &Value::Int(2), &cfg(), at()).is_err());
    }

    #[test]
    fn null_rules_differ_per_operator() {
        // + treats Null as a no-op on scalars.
        assert!(add(&Value::Null, &Value::Int(3), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Int(3)));
        // - rejects Null on the left unless both sides are Null.
        assert!(sub(&Value::Null, &Value::Int(3), &cfg(), at()).is_err());
        assert!(sub(&Value::Null, &Value::Null, &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Null));
        // * absorbs to Null even against Bool.
        assert!(mul(&Value::Null, &Value::Bool(true), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Null));
        // % propagates Null over a nonzero divisor.
        assert!(rem(&Value::Null, &Value::Int(3), &cfg(), at())
            .unwrap()
            .deep_equals(&Value::Null));
        assert!(rem(&Value::Null, &Value::Null, &cfg(), at()).is_err());
    }

    #[test]
    fn array_times_string_joins() {
        let items = Value::Array(vec![Value::Int(1), Value::String("a".into())]);
        let out = mul(&items, &Value::String("-".into()), &cfg(), at()).unwrap();
        assert!(out.deep_equals(&Value::String("1-a".into())));
    }

    #[test]
    fn comparisons_are_numeric_only() {
        assert!(compare(BinaryOp::Lt, &Value::Int(1), &Value::Float(1.5), at())
            .unwrap()
            .deep_equals(&Value::Bool(true)));
        assert!(compare(BinaryOp::Lt, &Value::String("a".into()), &Value::String("b".into()), at()).is_err());
    }

    #[test]
    fn membership_shapes() {
        let arr = Value::Array(vec![Value::Int(1), Value::Array(vec![Value::Int(2)])]);
        assert!(contains(&Value::Array(vec![Value::Int(2)]), &arr, at())
            .unwrap()
            .truthy());
        let b = block(&[("a", Value::Int(1)), ("b", Value::Int(2))]);
        assert!(contains(&block(&[("a", Value::Int(1))]), &b, at()).unwrap().truthy());
        assert!(contains(&Value::String("a".into()), &b, at()).unwrap().truthy());
        assert!(contains(&Value::Int(2), &b, at()).unwrap().truthy());
        assert!(contains(&Value::Int(3), &Value::Int(4), at()).is_err());
    }
}
