#![doc = include_str!("../../../README.md")]

mod builtins;
mod config;
mod environment;
mod error;
mod evaluate;
mod io;
mod object;
mod operator;
mod parse;
mod run;
mod statements;
mod tokenize;
mod value;

pub use crate::{
    config::{Config, DEFAULT_MAX_ARRAY_SIZE, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LOOP_TIMES},
    error::{CodeLoc, Error, ErrorKind, VivResult},
    io::{CollectStringPrint, NoPrint, PrintWriter, StdPrint},
    object::Object,
    run::{Input, Instance, Parsed, run, run_with},
};

/// The language specification version this crate implements.
pub const SPEC_VERSION: &str = "1.0";

/// The interpreter version (the crate version).
pub const INTERPRETER_VERSION: &str = env!("CARGO_PKG_VERSION");
