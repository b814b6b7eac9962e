//! Error taxonomy shared by every stage of the pipeline.
//!
//! Each stage produces either a value or a single [`Error`] carrying its kind,
//! a one-line reason, and the source position. Errors abort the current run;
//! there is no partial recovery inside the core.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Result type alias for operations that can produce a reported error.
pub type VivResult<T> = Result<T, Error>;

/// A position in the source text, 1-based for both line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    pub(crate) fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Which stage reported the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexer,
    Parser,
    Evaluator,
}

impl ErrorKind {
    /// Tag used in the message prefix when tag detail is enabled.
    fn tag(self) -> &'static str {
        match self {
            Self::Lexer => "Lexer",
            Self::Parser => "Parser",
            Self::Evaluator => "Evaluator",
        }
    }
}

/// A reported failure from lexing, parsing, or evaluation.
///
/// User-visible messages begin with `[Viv]` (or `[Viv:<stage>]` when tag detail
/// is enabled), followed by `Error: <one-line reason>`. When the offending
/// source line is known, a second line shows it together with a caret under the
/// offending column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    location: Option<CodeLoc>,
    source_line: Option<String>,
}

impl Error {
    pub(crate) fn lexer(message: impl Into<String>, loc: CodeLoc) -> Self {
        Self {
            kind: ErrorKind::Lexer,
            message: message.into(),
            location: Some(loc),
            source_line: None,
        }
    }

    pub(crate) fn parser(message: impl Into<String>, loc: CodeLoc) -> Self {
        Self {
            kind: ErrorKind::Parser,
            message: message.into(),
            location: Some(loc),
            source_line: None,
        }
    }

    /// A parser-stage error with no source position (file loading failures).
    pub(crate) fn parser_plain(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Parser,
            message: message.into(),
            location: None,
            source_line: None,
        }
    }

    pub(crate) fn evaluate(message: impl Into<String>, loc: CodeLoc) -> Self {
        Self {
            kind: ErrorKind::Evaluator,
            message: message.into(),
            location: Some(loc),
            source_line: None,
        }
    }

    /// An evaluator error with no useful source position (boundary failures).
    pub(crate) fn evaluate_plain(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Evaluator,
            message: message.into(),
            location: None,
            source_line: None,
        }
    }

    /// Attaches the offending source line for the caret rendering.
    #[must_use]
    pub(crate) fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The one-line reason, without the `[Viv]` prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn location(&self) -> Option<CodeLoc> {
        self.location
    }

    /// Renders the user-visible message.
    ///
    /// With `tag_detail` the prefix names the stage, e.g. `[Viv:Lexer]`;
    /// otherwise it is the plain `[Viv]` tag.
    #[must_use]
    pub fn render(&self, tag_detail: bool) -> String {
        let mut out = if tag_detail {
            format!("[Viv:{}] Error: {}", self.kind.tag(), self.message)
        } else {
            format!("[Viv] Error: {}", self.message)
        };
        if let Some(loc) = self.location.filter(|loc| loc.line > 0) {
            out.push_str(&format!(" ({loc})"));
        }
        if let (Some(line), Some(loc)) = (&self.source_line, self.location) {
            out.push('\n');
            out.push_str(line);
            out.push('\n');
            let caret_at = (loc.column as usize).saturating_sub(1);
            // Columns count code points, so pad by the displayed prefix width.
            for ch in line.chars().take(caret_at) {
                out.push(if ch == '\t' { '\t' } else { ' ' });
            }
            out.push('^');
        }
        out
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl std::error::Error for Error {}

/// Internal propagation channel for the evaluator.
///
/// `break`, `continue`, and `return` travel the same path as errors so a single
/// `?` unwinds statement evaluation. The evaluator converts stray loop signals
/// into reported errors at function and top-level boundaries.
#[derive(Debug, Clone)]
pub(crate) enum Signal {
    Error(Error),
    Break(CodeLoc),
    Continue(CodeLoc),
    Return(Value),
}

impl Signal {
    /// The reported error for a signal escaping to a place it has no meaning.
    pub(crate) fn into_error(self) -> Error {
        match self {
            Self::Error(err) => err,
            Self::Break(loc) => Error::evaluate("'break' is used outside of a loop", loc),
            Self::Continue(loc) => Error::evaluate("'continue' is used outside of a loop", loc),
            Self::Return(_) => Error::evaluate_plain("'return' is used outside of a function"),
        }
    }
}

impl From<Error> for Signal {
    fn from(err: Error) -> Self {
        Self::Error(err)
    }
}

/// Result type alias used throughout the evaluator.
pub(crate) type EvalResult<T> = Result<T, Signal>;
