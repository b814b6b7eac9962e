//! Public interface for parsing and running VivJson code.

use std::{fs, path::PathBuf, rc::Rc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    environment::Environment,
    error::{Error, VivResult},
    evaluate::Evaluator,
    io::{PrintWriter, StdPrint, write_stderr},
    object::Object,
    parse::{parse_json, parse_script, parse_source},
    statements::{Stmt, StmtKind},
    tokenize::{is_internal_marker, is_reserved_word},
    value::Value,
};

/// One input to a run: source code, a file path, or host variables.
///
/// Inputs are processed left to right; a variable mapping pre-populates the
/// scope at its position, so subsequent sources see those bindings. Two code
/// inputs separated by a literal `"+"` code input are concatenated before
/// parsing, mirroring the command-line form.
#[derive(Debug, Clone)]
pub enum Input {
    /// Source text, parsed in the mode the configuration selects.
    Code(String),
    /// Source text parsed in JSON-only mode regardless of the configuration.
    JsonCode(String),
    /// A file path; the extension selects the parse mode (see `load_file`).
    File(PathBuf),
    /// Host variables merged into the scope at this position.
    Variables(IndexMap<String, Object>),
}

impl Input {
    pub fn code(text: impl Into<String>) -> Self {
        Self::Code(text.into())
    }

    pub fn json(text: impl Into<String>) -> Self {
        Self::JsonCode(text.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn variables(variables: IndexMap<String, Object>) -> Self {
        Self::Variables(variables)
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Self::Code(text.to_owned())
    }
}

/// An immutable parsed program.
///
/// A `Parsed` may be executed any number of times; every run gets a fresh
/// top-level environment. It is plain data: safe to share between threads and
/// serializable, so hosts can cache the parse.
///
/// # Example
/// ```
/// use vivjson::{Config, Parsed};
///
/// let config = Config::default();
/// let parsed = Parsed::parse_text("return(1 + 2)", &config).unwrap();
/// let result = parsed.run(&config).unwrap();
/// assert_eq!(result, vivjson::Object::Int(3));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parsed {
    statements: Vec<Stmt>,
}

impl Parsed {
    /// Parses mixed inputs into one program.
    ///
    /// # Errors
    /// Returns the first lex or parse error, a file read failure, or a
    /// rejected variable name.
    pub fn parse(inputs: &[Input], config: &Config) -> VivResult<Self> {
        let inputs = concatenate_code(inputs);
        let mut statements = vec![];
        for input in inputs {
            match input {
                Input::Code(text) => statements.extend(parse_source(&text, config)?),
                Input::JsonCode(text) => statements.extend(parse_json(&text, config)?),
                Input::File(path) => statements.extend(load_file(&path, config)?),
                Input::Variables(variables) => {
                    for (name, value) in variables {
                        check_variable_name(&name)?;
                        statements.push(Stmt::new(
                            StmtKind::Inject { name, value },
                            crate::error::CodeLoc::default(),
                        ));
                    }
                }
            }
        }
        Ok(Self { statements })
    }

    /// Parses a single source string in the mode the configuration selects.
    pub fn parse_text(text: &str, config: &Config) -> VivResult<Self> {
        Ok(Self {
            statements: parse_source(text, config)?,
        })
    }

    /// Executes against a fresh environment, printing to stdout.
    pub fn run(&self, config: &Config) -> VivResult<Object> {
        self.run_with(config, &mut StdPrint)
    }

    /// Executes against a fresh environment with a custom print sink.
    pub fn run_with(&self, config: &Config, print: &mut impl PrintWriter) -> VivResult<Object> {
        let root = Environment::root();
        let result = report(
            Evaluator::new(config, print)
                .run_program(&self.statements, &root)
                .and_then(|value| Object::from_value(&value)),
            config,
        )?;
        Ok(result)
    }

    pub(crate) fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// Serializes the program to a binary format for caching.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn dump(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserializes a program produced by [`Parsed::dump`].
    ///
    /// # Errors
    /// Returns an error if deserialization fails.
    pub fn load(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

/// Parses and runs mixed inputs, printing to stdout.
///
/// # Errors
/// Returns the first error from any stage, rendered per the configuration.
pub fn run(inputs: &[Input], config: &Config) -> VivResult<Object> {
    run_with(inputs, config, &mut StdPrint)
}

/// Parses and runs mixed inputs with a custom print sink.
pub fn run_with(inputs: &[Input], config: &Config, print: &mut impl PrintWriter) -> VivResult<Object> {
    let parsed = report(Parsed::parse(inputs, config), config)?;
    parsed.run_with(config, print)
}

/// A parsed program bound to the long-lived environment produced by running it
/// once. Member reads, method calls, and further scripts reuse that
/// environment.
///
/// An `Instance` is single-threaded; give each thread its own.
#[derive(Debug)]
pub struct Instance {
    config: Config,
    root: Rc<Environment>,
}

impl Instance {
    /// Parses the inputs and runs the program once to populate the
    /// environment. Print output goes to stdout.
    ///
    /// # Errors
    /// Returns the first parse or evaluation error.
    pub fn make(inputs: &[Input], config: &Config) -> VivResult<Self> {
        Self::make_with(inputs, config, &mut StdPrint)
    }

    /// Like [`Instance::make`] with a custom print sink.
    pub fn make_with(
        inputs: &[Input],
        config: &Config,
        print: &mut impl PrintWriter,
    ) -> VivResult<Self> {
        let parsed = report(Parsed::parse(inputs, config), config)?;
        let root = Environment::root();
        report(
            Evaluator::new(config, print)
                .run_program(parsed.statements(), &root)
                .map(|_| ()),
            config,
        )?;
        Ok(Self {
            config: config.clone(),
            root,
        })
    }

    /// Reads a member by path, e.g. `&["a", "b", "2"]`; numeric path segments
    /// index Arrays.
    ///
    /// # Errors
    /// Returns an error when the path misses or the value cannot cross the
    /// host boundary.
    pub fn get(&self, path: &[&str]) -> VivResult<Object> {
        let Some((first, rest)) = path.split_first() else {
            return Err(Error::evaluate_plain("a member path must not be empty"));
        };
        let mut current = self
            .root
            .get(first)
            .ok_or_else(|| Error::evaluate_plain(format!("variable '{first}' is not defined")))?;
        for segment in rest {
            current = match &current {
                Value::Block(entries) => entries
                    .get(*segment)
                    .cloned()
                    .ok_or_else(|| Error::evaluate_plain(format!("member '{segment}' is not defined")))?,
                Value::Array(items) => {
                    let index: i64 = segment
                        .parse()
                        .map_err(|_| Error::evaluate_plain(format!("index '{segment}' is not a number")))?;
                    let len = items.len() as i64;
                    let resolved = if index < 0 { len + index } else { index };
                    if resolved < 0 || resolved >= len {
                        return Err(Error::evaluate_plain(format!("index {index} is out of range")));
                    }
                    items[resolved as usize].clone()
                }
                other => {
                    return Err(Error::evaluate_plain(format!("{} does not have members", other.kind())));
                }
            };
        }
        report(Object::from_value(&current), &self.config)
    }

    /// Calls a function defined in the environment, printing to stdout.
    pub fn call(&self, method: &str, args: &[Object]) -> VivResult<Object> {
        self.call_with(method, args, &mut StdPrint)
    }

    /// Like [`Instance::call`] with a custom print sink.
    ///
    /// # Errors
    /// Returns an error when the method is missing, not callable, or fails.
    pub fn call_with(
        &self,
        method: &str,
        args: &[Object],
        print: &mut impl PrintWriter,
    ) -> VivResult<Object> {
        let callee = self
            .root
            .get(method)
            .ok_or_else(|| Error::evaluate_plain(format!("function '{method}' is not defined")))?;
        let Value::Function(function) = callee else {
            return Err(report_error(
                Error::evaluate_plain(format!("'{method}' is not callable")),
                &self.config,
            ));
        };
        let values: Vec<Value> = args.iter().map(Object::to_value).collect();
        let mut evaluator = Evaluator::new(&self.config, print);
        let result = evaluator
            .execute_function(&function, values, crate::error::CodeLoc::default())
            .map(|(value, _frame)| value)
            .map_err(crate::error::Signal::into_error)
            .and_then(|value| Object::from_value(&value));
        report(result, &self.config)
    }

    /// Runs further source text against the instance's environment.
    ///
    /// # Errors
    /// Returns the first parse or evaluation error.
    pub fn run_text(&self, source: &str) -> VivResult<Object> {
        self.run_text_with(source, &mut StdPrint)
    }

    /// Like [`Instance::run_text`] with a custom print sink.
    pub fn run_text_with(&self, source: &str, print: &mut impl PrintWriter) -> VivResult<Object> {
        let statements = report(parse_source(source, &self.config), &self.config)?;
        let result = Evaluator::new(&self.config, print)
            .run_program(&statements, &self.root)
            .and_then(|value| Object::from_value(&value));
        report(result, &self.config)
    }
}

/// Joins code inputs separated by a literal `"+"` code input.
fn concatenate_code(inputs: &[Input]) -> Vec<Input> {
    let mut out: Vec<Input> = Vec::with_capacity(inputs.len());
    let mut i = 0;
    while i < inputs.len() {
        let is_plus = matches!(&inputs[i], Input::Code(text) if text == "+");
        if is_plus && i + 1 < inputs.len() {
            if let (Some(Input::Code(previous)), Input::Code(next)) = (out.last_mut(), &inputs[i + 1]) {
                previous.push_str(next);
                i += 2;
                continue;
            }
        }
        out.push(inputs[i].clone());
        i += 1;
    }
    out
}

/// Reads and parses one file.
///
/// `.json` parses in JSON-only mode and `.viv` in script mode; any other
/// extension parses in script mode, falling back to JSON-only mode when
/// script parsing fails. Content must be UTF-8.
fn load_file(path: &std::path::Path, config: &Config) -> VivResult<Vec<Stmt>> {
    let text = fs::read_to_string(path)
        .map_err(|err| Error::parser_plain(format!("cannot read file '{}': {err}", path.display())))?;
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    if config.enable_only_json || extension.eq_ignore_ascii_case("json") {
        return parse_json(&text, config);
    }
    if extension.eq_ignore_ascii_case("viv") {
        return parse_script(&text, config);
    }
    match parse_script(&text, config) {
        Ok(statements) => Ok(statements),
        Err(script_error) => parse_json(&text, config).map_err(|_| script_error),
    }
}

/// Validates a host-injected variable name at the boundary.
fn check_variable_name(name: &str) -> Result<(), Error> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_');
    let valid_tail = chars.all(|ch| ch.is_alphanumeric() || ch == '_');
    if !valid_head || !valid_tail || is_reserved_word(name) || is_internal_marker(name) {
        return Err(Error::evaluate_plain(format!(
            "'{name}' is not usable as a variable name"
        )));
    }
    Ok(())
}

/// Applies the configured failure reporting to an error before returning it.
fn report<T>(result: Result<T, Error>, config: &Config) -> Result<T, Error> {
    result.map_err(|err| report_error(err, config))
}

fn report_error(err: Error, config: &Config) -> Error {
    if config.enable_stderr {
        write_stderr(&err.render(config.enable_tag_detail));
    }
    err
}
