//! Abstract syntax tree produced by the parser.
//!
//! A program is an ordered, finite list of statements. The tree is plain data
//! with serde derives so a parsed program can be dumped to a binary cache and
//! loaded back without re-parsing.

use serde::{Deserialize, Serialize};

use crate::{error::CodeLoc, object::Object};

/// A statement together with its source position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Stmt {
    pub node: StmtKind,
    pub loc: CodeLoc,
}

impl Stmt {
    pub fn new(node: StmtKind, loc: CodeLoc) -> Self {
        Self { node, loc }
    }
}

/// A literal scalar value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    And,
    Or,
}

impl BinaryOp {
    /// The operator as written in source, for error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::In => "in",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Assignment operators, including the JSON pair `:` and the yield `:=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum AssignOp {
    /// `=`
    Set,
    /// `:` with the same semantics as `=`; this is how JSON pairs parse.
    Pair,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `:=` with an explicit target: assign, then yield the assigned value.
    Yield,
}

/// Per-parameter calling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) enum ParamModifier {
    /// Pass-by-value via deep copy.
    #[default]
    Value,
    /// Pass-by-reference: the parameter's final value is written back to the
    /// caller's binding.
    Reference,
    /// The argument must be a callable.
    Function,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Param {
    pub name: String,
    pub modifier: ParamModifier,
}

/// A user function definition, named or anonymous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// One step of a member-access chain after the base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Segment {
    /// `.name` or a string-literal segment; Block key.
    Ident(String),
    /// `.0`, `.-1`, or an integer in brackets known at parse time.
    Index(i64),
    /// `[expr]` computed at evaluation time.
    Expr(Box<Stmt>),
}

/// An assignment target: a head name plus an optional member chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Lvalue {
    pub name: String,
    pub segments: Vec<Segment>,
    pub loc: CodeLoc,
}

/// One arm of an `if`/`elseif`/`else` chain; `cond` is `None` for `else`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Branch {
    pub cond: Option<Stmt>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum StmtKind {
    /// No-op produced for empty statements between separators.
    Blank,
    Literal(Literal),
    Identifier(String),
    /// The `.` expression: the current scope's public key-value pairs.
    /// Only valid as the right-hand side of `in`.
    ScopeDot,
    ArrayLit(Vec<Stmt>),
    /// `{ ... }`, both an object literal and a code block; assignments inside
    /// define its pairs and a `:=` designates its value.
    BlockLit(Vec<Stmt>),
    Binary {
        op: BinaryOp,
        left: Box<Stmt>,
        right: Box<Stmt>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Stmt>,
    },
    Assign {
        target: Lvalue,
        op: AssignOp,
        value: Box<Stmt>,
    },
    /// Bare `:= expr`: designates the enclosing block's value.
    Yield(Box<Stmt>),
    Get {
        base: Box<Stmt>,
        segments: Vec<Segment>,
    },
    Call {
        callee: Box<Stmt>,
        args: Vec<Stmt>,
    },
    Function(FunctionDef),
    If {
        branches: Vec<Branch>,
    },
    While {
        cond: Box<Stmt>,
        body: Vec<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Box<Stmt>>,
        step: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    ForIn {
        name: String,
        iterable: Box<Stmt>,
        body: Vec<Stmt>,
    },
    Do {
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    Return(Option<Box<Stmt>>),
    Remove(Lvalue),
    /// Host-provided variable binding inserted by the run API.
    Inject {
        name: String,
        value: Object,
    },
    /// Host value wrapper inserted by the run API.
    HostValue(Object),
}

impl StmtKind {
    /// Whether this statement is an expression whose top-level value takes
    /// part in the implicit result handling (Block merge or `_` binding).
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Self::Literal(_)
                | Self::Identifier(_)
                | Self::ScopeDot
                | Self::ArrayLit(_)
                | Self::BlockLit(_)
                | Self::Binary { .. }
                | Self::Unary { .. }
                | Self::Get { .. }
                | Self::Call { .. }
                | Self::HostValue(_)
        )
    }
}
