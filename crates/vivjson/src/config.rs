//! Per-run limits and toggles consumed by every stage.

use crate::error::{CodeLoc, Error};

/// Default ceiling for any operation that grows an Array, Block, or split String.
pub const DEFAULT_MAX_ARRAY_SIZE: usize = 1000;
/// Default ceiling for evaluator recursion.
pub const DEFAULT_MAX_DEPTH: usize = 200;
/// Default ceiling for iterations of a single loop.
pub const DEFAULT_MAX_LOOP_TIMES: usize = 1000;

/// Immutable per-run configuration.
///
/// A `Config` is consumed read-only by the lexer, parser, and evaluator. The
/// three ceilings convert otherwise unbounded computations into reported
/// errors; the sandbox has no other cancellation mechanism.
///
/// # Example
/// ```
/// use vivjson::Config;
///
/// let config = Config {
///     max_loop_times: 50,
///     ..Config::default()
/// };
/// assert_eq!(config.max_depth, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Additionally write failure messages to the process stderr sink.
    pub enable_stderr: bool,
    /// Prefix error messages with the reporting stage, e.g. `[Viv:Parser]`.
    pub enable_tag_detail: bool,
    /// Parse sources in JSON-only mode.
    pub enable_only_json: bool,
    /// Lexeme permitting ±infinity in literals and serialization.
    ///
    /// When `None`, any value that becomes ±infinity triggers an error.
    pub infinity: Option<String>,
    /// Lexeme permitting NaN in literals and serialization.
    ///
    /// When `None`, any value that becomes NaN triggers an error.
    pub nan: Option<String>,
    /// Ceiling for growing Arrays, Blocks, and split Strings.
    pub max_array_size: usize,
    /// Ceiling for evaluator recursion depth.
    pub max_depth: usize,
    /// Ceiling for iterations of each loop independently.
    pub max_loop_times: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_stderr: false,
            enable_tag_detail: false,
            enable_only_json: false,
            infinity: None,
            nan: None,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            max_loop_times: DEFAULT_MAX_LOOP_TIMES,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks a prospective container or string size against the ceiling.
    pub(crate) fn check_size(&self, size: usize, loc: CodeLoc) -> Result<(), Error> {
        if size > self.max_array_size {
            Err(Error::evaluate(
                format!("size limit exceeded: {size} > {}", self.max_array_size),
                loc,
            ))
        } else {
            Ok(())
        }
    }

    /// Checks a float produced by arithmetic or conversion.
    ///
    /// Non-finite values are only representable when the matching lexeme is
    /// configured.
    pub(crate) fn check_float(&self, value: f64, loc: CodeLoc) -> Result<f64, Error> {
        if value.is_nan() && self.nan.is_none() {
            Err(Error::evaluate("NaN is not permitted", loc))
        } else if value.is_infinite() && self.infinity.is_none() {
            Err(Error::evaluate("Infinity is not permitted", loc))
        } else {
            Ok(value)
        }
    }
}
