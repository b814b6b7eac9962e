//! Built-in callables registered in the root scope.
//!
//! Each builtin has its own submodule. The registry is immutable after
//! startup: name lookup consults it only after the scope chain misses, so
//! builtins never appear in scope enumeration and can be shadowed by script
//! variables.

mod convert;
mod insert;
mod len;
mod print;
mod strip;
mod type_;

use std::str::FromStr;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    io::PrintWriter,
    value::Value,
};

/// Enumerates every built-in callable.
///
/// Uses strum derives for automatic `Display`/`FromStr`; all variants
/// serialize to lowercase, matching their script-visible names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Builtins {
    Int,
    Float,
    String,
    Len,
    Type,
    Insert,
    Strip,
    Print,
}

impl Builtins {
    /// Resolves a bare name to a builtin, if one exists.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }
}

/// Checks the argument count for a fixed-arity builtin.
fn check_arity(builtin: Builtins, args: &[Value], expected: usize, loc: CodeLoc) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::evaluate(
            format!("{builtin}() takes {expected} argument(s), {} given", args.len()),
            loc,
        ))
    }
}

/// Dispatches a builtin call with already-evaluated arguments.
pub(crate) fn call(
    builtin: Builtins,
    args: &[Value],
    config: &Config,
    print: &mut dyn PrintWriter,
    loc: CodeLoc,
) -> Result<Value, Error> {
    match builtin {
        Builtins::Int => {
            check_arity(builtin, args, 1, loc)?;
            convert::builtin_int(&args[0], loc)
        }
        Builtins::Float => {
            check_arity(builtin, args, 1, loc)?;
            convert::builtin_float(&args[0], config, loc)
        }
        Builtins::String => {
            check_arity(builtin, args, 1, loc)?;
            convert::builtin_string(&args[0], config, loc)
        }
        Builtins::Len => {
            check_arity(builtin, args, 1, loc)?;
            len::builtin_len(&args[0], loc)
        }
        Builtins::Type => {
            check_arity(builtin, args, 1, loc)?;
            Ok(type_::builtin_type(&args[0]))
        }
        Builtins::Insert => {
            check_arity(builtin, args, 3, loc)?;
            insert::builtin_insert(&args[0], &args[1], &args[2], config, loc)
        }
        Builtins::Strip => {
            check_arity(builtin, args, 1, loc)?;
            strip::builtin_strip(&args[0], loc)
        }
        Builtins::Print => print::builtin_print(args, config, print, loc),
    }
}
