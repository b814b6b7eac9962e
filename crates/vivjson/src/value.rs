//! Runtime value model: the universe of values plus coercion, truthiness, and
//! canonical stringification.
//!
//! Values are plain owned data; `Clone` is the deep copy that assignment and
//! pass-by-value demand. The only shared interior is the immutable function
//! definition and the captured scope handle inside [`Function`].

use std::rc::Rc;

use indexmap::IndexMap;
use strum::Display;

use crate::{
    builtins::Builtins,
    config::Config,
    environment::Environment,
    error::Error,
    statements::FunctionDef,
};

/// The runtime tag of a value, as reported by the `type()` builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Type {
    Int,
    Float,
    String,
    Boolean,
    Null,
    Array,
    Block,
    Function,
}

/// A user function value: shared definition plus the captured defining scope.
#[derive(Debug)]
pub(crate) struct Function {
    pub def: Rc<FunctionDef>,
    pub scope: Rc<Environment>,
}

/// A runtime value.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    /// Ordered string→value map; doubles as object and as scope contents.
    Block(IndexMap<String, Value>),
    Function(Rc<Function>),
    Builtin(Builtins),
}

impl Value {
    pub fn kind(&self) -> Type {
        match self {
            Self::Null => Type::Null,
            Self::Bool(_) => Type::Boolean,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::Array(_) => Type::Array,
            Self::Block(_) => Type::Block,
            Self::Function(_) | Self::Builtin(_) => Type::Function,
        }
    }

    /// Truthiness: Null, false, zero, and empty containers are false.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Array(a) => !a.is_empty(),
            Self::Block(b) => !b.is_empty(),
            Self::Function(_) | Self::Builtin(_) => true,
        }
    }

    /// Language equality: deep structural comparison for same-tagged operands,
    /// truthiness equivalence otherwise. Block comparison ignores insertion
    /// order; callables compare by identity.
    pub fn deep_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.deep_equals(y))
            }
            (Self::Block(a), Self::Block(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.deep_equals(w)))
            }
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => a == b,
            _ => self.truthy() == other.truthy(),
        }
    }

    /// Stringifies for display: a String renders raw, containers render in
    /// JSON form, scalars use their canonical lexemes.
    pub fn to_display(&self, config: &Config) -> Result<String, Error> {
        match self {
            Self::String(s) => Ok(s.clone()),
            other => other.to_json(config),
        }
    }

    /// Canonical JSON-form serialization; Strings are quoted and escaped.
    pub fn to_json(&self, config: &Config) -> Result<String, Error> {
        match self {
            Self::Null => Ok("null".to_owned()),
            Self::Bool(true) => Ok("true".to_owned()),
            Self::Bool(false) => Ok("false".to_owned()),
            Self::Int(n) => Ok(n.to_string()),
            Self::Float(f) => float_repr(*f, config),
            Self::String(s) => Ok(quote_string(s)),
            Self::Array(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    parts.push(item.to_json(config)?);
                }
                Ok(format!("[{}]", parts.join(", ")))
            }
            Self::Block(entries) => {
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    parts.push(format!("{}: {}", quote_string(key), value.to_json(config)?));
                }
                Ok(format!("{{{}}}", parts.join(", ")))
            }
            Self::Function(_) | Self::Builtin(_) => {
                Err(Error::evaluate_plain("a function is not convertible into a string"))
            }
        }
    }
}

/// Formats a float in its canonical form.
///
/// Uses the `ryu` crate for the shortest decimal representation that
/// round-trips, which yields the documented forms ("1.0", "1000000.1").
/// Non-finite values render with the configured lexemes or error out.
pub(crate) fn float_repr(value: f64, config: &Config) -> Result<String, Error> {
    if value.is_nan() {
        return match &config.nan {
            Some(lexeme) => Ok(lexeme.clone()),
            None => Err(Error::evaluate_plain("NaN is not permitted")),
        };
    }
    if value.is_infinite() {
        return match &config.infinity {
            Some(lexeme) if value < 0.0 => Ok(format!("-{lexeme}")),
            Some(lexeme) => Ok(lexeme.clone()),
            None => Err(Error::evaluate_plain("Infinity is not permitted")),
        };
    }
    let mut buffer = ryu::Buffer::new();
    Ok(buffer.format_finite(value).to_owned())
}

/// Quotes and escapes a string for JSON-form output.
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04X}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_covers_every_tag() {
        assert!(!Value::Null.truthy());
        assert!(!Value::Int(0).truthy());
        assert!(!Value::Float(0.0).truthy());
        assert!(!Value::String(String::new()).truthy());
        assert!(!Value::Array(vec![]).truthy());
        assert!(!Value::Block(IndexMap::new()).truthy());
        assert!(Value::Bool(true).truthy());
        assert!(Value::Int(-1).truthy());
        assert!(Value::String("x".into()).truthy());
    }

    #[test]
    fn block_equality_ignores_insertion_order() {
        let mut a = IndexMap::new();
        a.insert("x".to_owned(), Value::Int(1));
        a.insert("y".to_owned(), Value::Int(2));
        let mut b = IndexMap::new();
        b.insert("y".to_owned(), Value::Int(2));
        b.insert("x".to_owned(), Value::Int(1));
        assert!(Value::Block(a).deep_equals(&Value::Block(b)));
    }

    #[test]
    fn float_repr_is_canonical() {
        let config = Config::default();
        assert_eq!(float_repr(1.0, &config).unwrap(), "1.0");
        assert_eq!(float_repr(1_000_000.1, &config).unwrap(), "1000000.1");
        assert!(float_repr(f64::INFINITY, &config).is_err());
        let permissive = Config {
            infinity: Some("Infinity".to_owned()),
            ..Config::default()
        };
        assert_eq!(float_repr(f64::NEG_INFINITY, &permissive).unwrap(), "-Infinity");
    }

    #[test]
    fn json_form_quotes_strings() {
        let config = Config::default();
        let value = Value::Array(vec![Value::String("a\"b".into()), Value::Int(3)]);
        assert_eq!(value.to_json(&config).unwrap(), r#"["a\"b", 3]"#);
    }
}
