//! Parser: consumes tokens into an ordered sequence of statements.
//!
//! Two modes exist. Script mode (the default) implements the full expression
//! grammar with a fixed precedence ladder. JSON-only mode accepts exactly the
//! JSON grammar (plus the configured infinity/NaN lexemes and unary minus on
//! number literals) and rejects everything else.
//!
//! In both modes a top-level source starting with `"key": value` parses as
//! assignments into the enclosing scope; this is the documented "`{}` may be
//! omitted" behavior.

use ahash::AHashSet;

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    statements::{
        AssignOp, BinaryOp, Branch, FunctionDef, Literal, Lvalue, Param, ParamModifier, Segment, Stmt,
        StmtKind, UnaryOp,
    },
    tokenize::{Token, TokenKind, Tokenizer, is_internal_marker},
};

/// Parses one source in the mode selected by the configuration.
pub(crate) fn parse_source(source: &str, config: &Config) -> Result<Vec<Stmt>, Error> {
    if config.enable_only_json {
        parse_json(source, config)
    } else {
        parse_script(source, config)
    }
}

/// Parses one source in script mode.
pub(crate) fn parse_script(source: &str, config: &Config) -> Result<Vec<Stmt>, Error> {
    Parser::new(source, config)?.program()
}

/// Parses one source in JSON-only mode.
pub(crate) fn parse_json(source: &str, config: &Config) -> Result<Vec<Stmt>, Error> {
    Parser::new(source, config)?.json_program()
}

struct Parser<'a> {
    tokenizer: Tokenizer,
    config: &'a Config,
    /// Two-token lookahead buffer.
    buffer: Vec<Token>,
}

impl<'a> Parser<'a> {
    fn new(source: &str, config: &'a Config) -> Result<Self, Error> {
        Ok(Self {
            tokenizer: Tokenizer::new(source),
            config,
            buffer: Vec::with_capacity(2),
        })
    }

    fn fill(&mut self, count: usize) -> Result<(), Error> {
        while self.buffer.len() < count {
            let token = self.tokenizer.next_token()?;
            self.buffer.push(token);
        }
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, Error> {
        self.fill(1)?;
        Ok(&self.buffer[0])
    }

    fn peek_kind(&mut self) -> Result<TokenKind, Error> {
        Ok(self.peek()?.kind)
    }

    fn peek_second(&mut self) -> Result<&Token, Error> {
        self.fill(2)?;
        Ok(&self.buffer[1])
    }

    fn advance(&mut self) -> Result<Token, Error> {
        self.fill(1)?;
        Ok(self.buffer.remove(0))
    }

    fn error(&self, message: impl Into<String>, loc: CodeLoc) -> Error {
        let err = Error::parser(message, loc);
        match self.tokenizer.line_text(loc.line) {
            Some(text) => err.with_source_line(text),
            None => err,
        }
    }

    fn unexpected(&mut self, context: &str) -> Result<Error, Error> {
        let token = self.peek()?.clone();
        let shown = match token.kind {
            TokenKind::Eof => "end of input".to_owned(),
            TokenKind::Newline => "end of line".to_owned(),
            _ => format!("'{}'", token.lexeme),
        };
        Ok(self.error(format!("unexpected {shown} {context}"), token.loc))
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Error> {
        if self.peek_kind()? == kind {
            self.advance()
        } else {
            Err(self.unexpected(&format!("where {what} is needed"))?)
        }
    }

    fn is_separator(kind: TokenKind) -> bool {
        matches!(kind, TokenKind::Newline | TokenKind::Comma | TokenKind::Semicolon)
    }

    fn skip_separators(&mut self) -> Result<(), Error> {
        while Self::is_separator(self.peek_kind()?) {
            self.advance()?;
        }
        Ok(())
    }

    // === Script mode ===

    fn program(&mut self) -> Result<Vec<Stmt>, Error> {
        let stmts = self.statement_list(TokenKind::Eof)?;
        Ok(stmts)
    }

    /// Parses statements up to the closing token, which is consumed.
    fn statement_list(&mut self, end: TokenKind) -> Result<Vec<Stmt>, Error> {
        let mut stmts = vec![];
        self.skip_separators()?;
        while self.peek_kind()? != end {
            if self.peek_kind()? == TokenKind::Eof {
                return Err(self.unexpected("where the statement list is still open")?);
            }
            stmts.push(self.statement()?);
            let kind = self.peek_kind()?;
            if Self::is_separator(kind) {
                self.skip_separators()?;
            } else if kind != end {
                return Err(self.unexpected("after a statement")?);
            }
        }
        self.advance()?;
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt, Error> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Keyword => match token.lexeme.as_str() {
                "if" => self.if_chain(),
                "while" => self.while_stmt(),
                "for" => self.for_stmt(),
                "do" => self.do_stmt(),
                "break" => {
                    self.advance()?;
                    Ok(Stmt::new(StmtKind::Break, token.loc))
                }
                "continue" => {
                    self.advance()?;
                    Ok(Stmt::new(StmtKind::Continue, token.loc))
                }
                "return" => self.return_stmt(),
                "remove" => self.remove_stmt(),
                "function" | "true" | "false" | "null" | "not" => self.assignment_or_expression(),
                "elseif" | "else" => Err(self.unexpected("without a leading 'if'")?),
                word => Err(self.error(format!("'{word}' is a reserved word"), token.loc)),
            },
            TokenKind::YieldAssign => {
                self.advance()?;
                let value = self.expression()?;
                Ok(Stmt::new(StmtKind::Yield(Box::new(value)), token.loc))
            }
            _ => self.assignment_or_expression(),
        }
    }

    fn assignment_or_expression(&mut self) -> Result<Stmt, Error> {
        let expr = self.expression()?;
        let op = match self.peek_kind()? {
            TokenKind::Assign => AssignOp::Set,
            TokenKind::Colon => AssignOp::Pair,
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            TokenKind::StarAssign => AssignOp::Mul,
            TokenKind::SlashAssign => AssignOp::Div,
            TokenKind::PercentAssign => AssignOp::Rem,
            TokenKind::YieldAssign => AssignOp::Yield,
            _ => return Ok(expr),
        };
        let target = self.lvalue_from_expr(expr)?;
        self.advance()?;
        let value = self.expression()?;
        let loc = target.loc;
        Ok(Stmt::new(
            StmtKind::Assign {
                target,
                op,
                value: Box::new(value),
            },
            loc,
        ))
    }

    /// Reinterprets a parsed expression as an assignment target.
    fn lvalue_from_expr(&mut self, expr: Stmt) -> Result<Lvalue, Error> {
        let loc = expr.loc;
        match expr.node {
            StmtKind::Identifier(name) => Ok(Lvalue {
                name,
                segments: vec![],
                loc,
            }),
            // String and number tokens serve as Block keys.
            StmtKind::Literal(Literal::Str(name)) => {
                self.check_user_name(&name, loc)?;
                Ok(Lvalue {
                    name,
                    segments: vec![],
                    loc,
                })
            }
            StmtKind::Literal(Literal::Int(n)) => Ok(Lvalue {
                name: n.to_string(),
                segments: vec![],
                loc,
            }),
            StmtKind::Get { base, segments } => match base.node {
                StmtKind::Identifier(name) => Ok(Lvalue { name, segments, loc }),
                _ => Err(self.error("invalid assignment target", loc)),
            },
            _ => Err(self.error("invalid assignment target", loc)),
        }
    }

    fn if_chain(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc; // 'if'
        let mut branches = vec![self.condition_branch()?];
        loop {
            let token = self.peek()?.clone();
            if token.kind != TokenKind::Keyword {
                break;
            }
            match token.lexeme.as_str() {
                "elseif" => {
                    self.advance()?;
                    branches.push(self.condition_branch()?);
                }
                "else" => {
                    self.advance()?;
                    let body = self.brace_block()?;
                    branches.push(Branch { cond: None, body });
                    break;
                }
                _ => break,
            }
        }
        Ok(Stmt::new(StmtKind::If { branches }, loc))
    }

    fn condition_branch(&mut self) -> Result<Branch, Error> {
        self.expect(TokenKind::LeftParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        let body = self.brace_block()?;
        Ok(Branch {
            cond: Some(cond),
            body,
        })
    }

    fn brace_block(&mut self) -> Result<Vec<Stmt>, Error> {
        self.expect(TokenKind::LeftBrace, "'{'")?;
        self.statement_list(TokenKind::RightBrace)
    }

    fn while_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc;
        self.expect(TokenKind::LeftParen, "'('")?;
        let cond = self.expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        let body = self.brace_block()?;
        Ok(Stmt::new(
            StmtKind::While {
                cond: Box::new(cond),
                body,
            },
            loc,
        ))
    }

    fn for_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc;
        self.expect(TokenKind::LeftParen, "'('")?;
        // `for (name in iterable)` iteration form.
        if self.peek_kind()? == TokenKind::Identifier {
            let second = self.peek_second()?;
            if second.kind == TokenKind::Keyword && second.lexeme == "in" {
                let name_token = self.advance()?;
                self.check_user_name(&name_token.lexeme, name_token.loc)?;
                self.advance()?; // 'in'
                let iterable = if self.peek_kind()? == TokenKind::Dot {
                    let dot = self.advance()?;
                    Stmt::new(StmtKind::ScopeDot, dot.loc)
                } else {
                    self.expression()?
                };
                self.expect(TokenKind::RightParen, "')'")?;
                let body = self.brace_block()?;
                return Ok(Stmt::new(
                    StmtKind::ForIn {
                        name: name_token.lexeme,
                        iterable: Box::new(iterable),
                        body,
                    },
                    loc,
                ));
            }
        }
        // C-style header: 1-4 pieces, empties are no-ops or always-true.
        let mut pieces: Vec<Stmt> = vec![];
        let mut slot_open = true;
        while self.peek_kind()? != TokenKind::RightParen {
            let kind = self.peek_kind()?;
            if matches!(kind, TokenKind::Semicolon | TokenKind::Comma) {
                if slot_open {
                    pieces.push(Stmt::new(StmtKind::Blank, self.peek()?.loc));
                }
                self.advance()?;
                slot_open = true;
            } else if kind == TokenKind::Eof {
                return Err(self.unexpected("inside a for header")?);
            } else {
                pieces.push(self.statement()?);
                slot_open = false;
            }
        }
        if slot_open && !pieces.is_empty() {
            pieces.push(Stmt::new(StmtKind::Blank, loc));
        }
        self.expect(TokenKind::RightParen, "')'")?;
        if pieces.len() == 4 {
            let last = pieces.pop().expect("length checked");
            if !matches!(last.node, StmtKind::Blank) {
                return Err(self.error("a for header takes at most 3 statements", last.loc));
            }
        }
        if pieces.len() > 3 {
            return Err(self.error("a for header takes at most 3 statements", loc));
        }
        let not_blank = |stmt: Stmt| {
            if matches!(stmt.node, StmtKind::Blank) {
                None
            } else {
                Some(Box::new(stmt))
            }
        };
        let (init, cond, step) = match pieces.len() {
            0 => (None, None, None),
            1 => {
                let mut it = pieces.into_iter();
                (None, not_blank(it.next().expect("length checked")), None)
            }
            2 => {
                let mut it = pieces.into_iter();
                (
                    not_blank(it.next().expect("length checked")),
                    not_blank(it.next().expect("length checked")),
                    None,
                )
            }
            _ => {
                let mut it = pieces.into_iter();
                (
                    not_blank(it.next().expect("length checked")),
                    not_blank(it.next().expect("length checked")),
                    not_blank(it.next().expect("length checked")),
                )
            }
        };
        let body = self.brace_block()?;
        Ok(Stmt::new(StmtKind::For { init, cond, step, body }, loc))
    }

    fn do_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc;
        let body = self.brace_block()?;
        Ok(Stmt::new(StmtKind::Do { body }, loc))
    }

    fn return_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc;
        if self.peek_kind()? != TokenKind::LeftParen {
            return Ok(Stmt::new(StmtKind::Return(None), loc));
        }
        self.advance()?;
        if self.peek_kind()? == TokenKind::RightParen {
            self.advance()?;
            return Ok(Stmt::new(StmtKind::Return(None), loc));
        }
        let value = self.expression()?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Stmt::new(StmtKind::Return(Some(Box::new(value))), loc))
    }

    fn remove_stmt(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc;
        self.expect(TokenKind::LeftParen, "'('")?;
        let expr = self.expression()?;
        let target = self.lvalue_from_expr(expr)?;
        self.expect(TokenKind::RightParen, "')'")?;
        Ok(Stmt::new(StmtKind::Remove(target), loc))
    }

    fn check_user_name(&self, name: &str, loc: CodeLoc) -> Result<(), Error> {
        if is_internal_marker(name) {
            Err(self.error(
                format!("'{name}' is reserved for internal use"),
                loc,
            ))
        } else {
            Ok(())
        }
    }

    fn function_def(&mut self) -> Result<Stmt, Error> {
        let loc = self.advance()?.loc; // 'function'
        let name = if self.peek_kind()? == TokenKind::Identifier {
            let token = self.advance()?;
            self.check_user_name(&token.lexeme, token.loc)?;
            Some(token.lexeme)
        } else {
            None
        };
        self.expect(TokenKind::LeftParen, "'('")?;
        let mut params = vec![];
        let mut seen = AHashSet::new();
        while self.peek_kind()? != TokenKind::RightParen {
            let token = self.peek()?.clone();
            let modifier = if token.kind == TokenKind::Keyword {
                match token.lexeme.as_str() {
                    "reference" => {
                        self.advance()?;
                        ParamModifier::Reference
                    }
                    "function" => {
                        self.advance()?;
                        ParamModifier::Function
                    }
                    word => return Err(self.error(format!("'{word}' is a reserved word"), token.loc)),
                }
            } else {
                ParamModifier::Value
            };
            let name_token = self.expect(TokenKind::Identifier, "a parameter name")?;
            self.check_user_name(&name_token.lexeme, name_token.loc)?;
            if !seen.insert(name_token.lexeme.clone()) {
                return Err(self.error(
                    format!("duplicated parameter name '{}'", name_token.lexeme),
                    name_token.loc,
                ));
            }
            params.push(Param {
                name: name_token.lexeme,
                modifier,
            });
            match self.peek_kind()? {
                TokenKind::Comma | TokenKind::Semicolon => {
                    self.advance()?;
                }
                TokenKind::RightParen => {}
                _ => return Err(self.unexpected("inside a parameter list")?),
            }
        }
        self.advance()?; // ')'
        let body = self.brace_block()?;
        Ok(Stmt::new(
            StmtKind::Function(FunctionDef { name, params, body }),
            loc,
        ))
    }

    // === Expression ladder ===

    fn expression(&mut self) -> Result<Stmt, Error> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Stmt, Error> {
        let mut left = self.and_expr()?;
        while self.peek_is_keyword("or")? {
            let loc = self.advance()?.loc;
            let right = self.and_expr()?;
            left = Stmt::new(
                StmtKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                loc,
            );
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Stmt, Error> {
        let mut left = self.equality()?;
        while self.peek_is_keyword("and")? {
            let loc = self.advance()?.loc;
            let right = self.equality()?;
            left = Stmt::new(
                StmtKind::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                loc,
            );
        }
        Ok(left)
    }

    fn peek_is_keyword(&mut self, word: &str) -> Result<bool, Error> {
        let token = self.peek()?;
        Ok(token.kind == TokenKind::Keyword && token.lexeme == word)
    }

    fn equality(&mut self) -> Result<Stmt, Error> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.peek_kind()? {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::Ne => BinaryOp::Ne,
                _ => break,
            };
            let loc = self.advance()?.loc;
            let right = self.comparison()?;
            left = Stmt::new(
                StmtKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                loc,
            );
        }
        Ok(left)
    }

    fn comparison_op(&mut self) -> Result<Option<BinaryOp>, Error> {
        let token = self.peek()?;
        let op = match token.kind {
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::Keyword if token.lexeme == "in" => BinaryOp::In,
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn comparison(&mut self) -> Result<Stmt, Error> {
        let left = self.additive()?;
        let Some(op) = self.comparison_op()? else {
            return Ok(left);
        };
        let loc = self.advance()?.loc;
        // `.` denotes the current scope's pairs, only as the right side of `in`.
        let right = if op == BinaryOp::In && self.peek_kind()? == TokenKind::Dot {
            let dot = self.advance()?;
            Stmt::new(StmtKind::ScopeDot, dot.loc)
        } else {
            self.additive()?
        };
        if let Some(chained) = self.comparison_op()? {
            let next = self.peek()?.loc;
            return Err(self.error(
                format!("comparison operators cannot be chained ('{}')", chained.symbol()),
                next,
            ));
        }
        Ok(Stmt::new(
            StmtKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            loc,
        ))
    }

    fn additive(&mut self) -> Result<Stmt, Error> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek_kind()? {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let loc = self.advance()?.loc;
            let right = self.multiplicative()?;
            left = Stmt::new(
                StmtKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                loc,
            );
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Stmt, Error> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek_kind()? {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            let loc = self.advance()?.loc;
            let right = self.unary()?;
            left = Stmt::new(
                StmtKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                loc,
            );
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Stmt, Error> {
        let token = self.peek()?;
        let op = match token.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Keyword if token.lexeme == "not" => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let loc = self.advance()?.loc;
            let operand = self.unary()?;
            return Ok(Stmt::new(
                StmtKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                loc,
            ));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Stmt, Error> {
        let mut node = self.primary()?;
        loop {
            match self.peek_kind()? {
                TokenKind::LeftParen => {
                    let loc = self.advance()?.loc;
                    let mut args = vec![];
                    while self.peek_kind()? != TokenKind::RightParen {
                        args.push(self.expression()?);
                        match self.peek_kind()? {
                            TokenKind::Comma | TokenKind::Semicolon => {
                                self.advance()?;
                                if self.peek_kind()? == TokenKind::RightParen {
                                    return Err(self.unexpected("after ','")?);
                                }
                            }
                            TokenKind::RightParen => {}
                            _ => return Err(self.unexpected("inside an argument list")?),
                        }
                    }
                    self.advance()?;
                    node = Stmt::new(
                        StmtKind::Call {
                            callee: Box::new(node),
                            args,
                        },
                        loc,
                    );
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let segments = self.dot_segments()?;
                    node = Self::push_segments(node, segments);
                }
                TokenKind::LeftBracket => {
                    let loc = self.advance()?.loc;
                    let index = self.expression()?;
                    self.expect(TokenKind::RightBracket, "']'")?;
                    let segment = match index.node {
                        StmtKind::Literal(Literal::Int(n)) => Segment::Index(n),
                        StmtKind::Literal(Literal::Str(s)) => Segment::Ident(s),
                        node => Segment::Expr(Box::new(Stmt::new(node, loc))),
                    };
                    node = Self::push_segments(node, vec![segment]);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    /// Parses the segment(s) following a `.`; a float-shaped token like `0.1`
    /// after `x.` is two integer indices.
    fn dot_segments(&mut self) -> Result<Vec<Segment>, Error> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Identifier => {
                self.advance()?;
                Ok(vec![Segment::Ident(token.lexeme)])
            }
            TokenKind::Str => {
                self.advance()?;
                Ok(vec![Segment::Ident(token.lexeme)])
            }
            TokenKind::Int => {
                self.advance()?;
                let n = self.parse_int(&token)?;
                Ok(vec![Segment::Index(n)])
            }
            TokenKind::Float => {
                self.advance()?;
                self.split_float_segments(&token, false)
            }
            TokenKind::Minus => {
                self.advance()?;
                let number = self.advance()?;
                match number.kind {
                    TokenKind::Int => {
                        let n = self.parse_int(&number)?;
                        Ok(vec![Segment::Index(-n)])
                    }
                    TokenKind::Float => self.split_float_segments(&number, true),
                    _ => Err(self.error("invalid member access", number.loc)),
                }
            }
            _ => Err(self.unexpected("after '.'")?),
        }
    }

    /// `x.0.1` lexes its tail as the float `0.1`; split it back into indices.
    fn split_float_segments(&mut self, token: &Token, negate_first: bool) -> Result<Vec<Segment>, Error> {
        let (first, second) = token
            .lexeme
            .split_once('.')
            .filter(|_| !token.lexeme.contains(['e', 'E']))
            .ok_or_else(|| self.error("invalid member access", token.loc))?;
        let a: i64 = first
            .parse()
            .map_err(|_| self.error("index is out of the 64-bit range", token.loc))?;
        let b: i64 = second
            .parse()
            .map_err(|_| self.error("index is out of the 64-bit range", token.loc))?;
        Ok(vec![
            Segment::Index(if negate_first { -a } else { a }),
            Segment::Index(b),
        ])
    }

    fn push_segments(node: Stmt, new_segments: Vec<Segment>) -> Stmt {
        let loc = node.loc;
        match node.node {
            StmtKind::Get { base, mut segments } => {
                segments.extend(new_segments);
                Stmt::new(StmtKind::Get { base, segments }, loc)
            }
            other => Stmt::new(
                StmtKind::Get {
                    base: Box::new(Stmt::new(other, loc)),
                    segments: new_segments,
                },
                loc,
            ),
        }
    }

    fn parse_int(&self, token: &Token) -> Result<i64, Error> {
        token
            .lexeme
            .parse::<i64>()
            .map_err(|_| self.error("integer is out of the 64-bit range", token.loc))
    }

    fn primary(&mut self) -> Result<Stmt, Error> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Int => {
                self.advance()?;
                // Integers beyond the 64-bit range fall back to Float.
                match token.lexeme.parse::<i64>() {
                    Ok(n) => Ok(Stmt::new(StmtKind::Literal(Literal::Int(n)), token.loc)),
                    Err(_) => {
                        let f: f64 = token
                            .lexeme
                            .parse()
                            .map_err(|_| self.error("invalid number", token.loc))?;
                        Ok(Stmt::new(StmtKind::Literal(Literal::Float(f)), token.loc))
                    }
                }
            }
            TokenKind::Float => {
                self.advance()?;
                let f: f64 = token
                    .lexeme
                    .parse()
                    .map_err(|_| self.error("invalid number", token.loc))?;
                Ok(Stmt::new(StmtKind::Literal(Literal::Float(f)), token.loc))
            }
            TokenKind::Str => {
                self.advance()?;
                Ok(Stmt::new(StmtKind::Literal(Literal::Str(token.lexeme)), token.loc))
            }
            TokenKind::Keyword => match token.lexeme.as_str() {
                "true" => {
                    self.advance()?;
                    Ok(Stmt::new(StmtKind::Literal(Literal::Bool(true)), token.loc))
                }
                "false" => {
                    self.advance()?;
                    Ok(Stmt::new(StmtKind::Literal(Literal::Bool(false)), token.loc))
                }
                "null" => {
                    self.advance()?;
                    Ok(Stmt::new(StmtKind::Literal(Literal::Null), token.loc))
                }
                "function" => self.function_def(),
                word => Err(self.error(format!("'{word}' is a reserved word"), token.loc)),
            },
            TokenKind::Identifier => {
                self.advance()?;
                if let Some(value) = self.named_float(&token.lexeme) {
                    return Ok(Stmt::new(StmtKind::Literal(Literal::Float(value)), token.loc));
                }
                self.check_user_name(&token.lexeme, token.loc)?;
                Ok(Stmt::new(StmtKind::Identifier(token.lexeme), token.loc))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let inner = self.expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LeftBracket => {
                self.advance()?;
                let mut elements = vec![];
                while self.peek_kind()? != TokenKind::RightBracket {
                    elements.push(self.expression()?);
                    match self.peek_kind()? {
                        TokenKind::Comma | TokenKind::Semicolon => {
                            self.advance()?;
                            if self.peek_kind()? == TokenKind::RightBracket {
                                return Err(self.unexpected("after ','")?);
                            }
                        }
                        TokenKind::RightBracket => {}
                        _ => return Err(self.unexpected("inside an array")?),
                    }
                }
                self.advance()?;
                Ok(Stmt::new(StmtKind::ArrayLit(elements), token.loc))
            }
            TokenKind::LeftBrace => {
                self.advance()?;
                let stmts = self.statement_list(TokenKind::RightBrace)?;
                Ok(Stmt::new(StmtKind::BlockLit(stmts), token.loc))
            }
            _ => Err(self.unexpected("where a value is needed")?),
        }
    }

    /// The configured infinity/NaN lexemes read as float literals.
    fn named_float(&self, word: &str) -> Option<f64> {
        if self.config.infinity.as_deref() == Some(word) {
            return Some(f64::INFINITY);
        }
        if self.config.nan.as_deref() == Some(word) {
            return Some(f64::NAN);
        }
        None
    }

    // === JSON-only mode ===

    fn json_program(&mut self) -> Result<Vec<Stmt>, Error> {
        self.skip_separators()?;
        // A bare `"key": value` sequence wraps into the enclosing scope.
        let starts_with_pair =
            self.peek_kind()? == TokenKind::Str && self.peek_second()?.kind == TokenKind::Colon;
        let mut stmts = vec![];
        if starts_with_pair {
            while self.peek_kind()? != TokenKind::Eof {
                stmts.push(self.json_pair()?);
                let kind = self.peek_kind()?;
                if Self::is_separator(kind) {
                    self.skip_separators()?;
                } else if kind != TokenKind::Eof {
                    return Err(self.unexpected("after a key-value pair")?);
                }
            }
            return Ok(stmts);
        }
        let value = self.json_value()?;
        stmts.push(value);
        self.skip_separators()?;
        if self.peek_kind()? != TokenKind::Eof {
            return Err(self.unexpected("after the JSON document")?);
        }
        Ok(stmts)
    }

    fn json_pair(&mut self) -> Result<Stmt, Error> {
        let key = self.expect(TokenKind::Str, "a string key")?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.json_value()?;
        let loc = key.loc;
        Ok(Stmt::new(
            StmtKind::Assign {
                target: Lvalue {
                    name: key.lexeme,
                    segments: vec![],
                    loc,
                },
                op: AssignOp::Pair,
                value: Box::new(value),
            },
            loc,
        ))
    }

    fn json_value(&mut self) -> Result<Stmt, Error> {
        let token = self.peek()?.clone();
        match token.kind {
            TokenKind::Int | TokenKind::Float => self.primary(),
            TokenKind::Str => self.primary(),
            TokenKind::Minus => {
                self.advance()?;
                let number = self.json_value()?;
                match number.node {
                    StmtKind::Literal(Literal::Int(_) | Literal::Float(_)) => Ok(Stmt::new(
                        StmtKind::Unary {
                            op: UnaryOp::Minus,
                            operand: Box::new(number),
                        },
                        token.loc,
                    )),
                    _ => Err(self.error("'-' needs a number literal", token.loc)),
                }
            }
            TokenKind::Keyword if matches!(token.lexeme.as_str(), "true" | "false" | "null") => {
                self.primary()
            }
            TokenKind::Identifier if self.named_float(&token.lexeme).is_some() => {
                self.advance()?;
                let value = self.named_float(&token.lexeme).expect("checked");
                Ok(Stmt::new(StmtKind::Literal(Literal::Float(value)), token.loc))
            }
            TokenKind::LeftBracket => {
                self.advance()?;
                let mut elements = vec![];
                while self.peek_kind()? != TokenKind::RightBracket {
                    elements.push(self.json_value()?);
                    match self.peek_kind()? {
                        TokenKind::Comma => {
                            self.advance()?;
                            if self.peek_kind()? == TokenKind::RightBracket {
                                return Err(self.unexpected("after ','")?);
                            }
                        }
                        TokenKind::RightBracket => {}
                        _ => return Err(self.unexpected("inside an array")?),
                    }
                }
                self.advance()?;
                Ok(Stmt::new(StmtKind::ArrayLit(elements), token.loc))
            }
            TokenKind::LeftBrace => {
                self.advance()?;
                let mut stmts = vec![];
                while self.peek_kind()? != TokenKind::RightBrace {
                    stmts.push(self.json_pair()?);
                    match self.peek_kind()? {
                        TokenKind::Comma => {
                            self.advance()?;
                            if self.peek_kind()? == TokenKind::RightBrace {
                                return Err(self.unexpected("after ','")?);
                            }
                        }
                        TokenKind::RightBrace => {}
                        _ => return Err(self.unexpected("inside an object")?),
                    }
                }
                self.advance()?;
                Ok(Stmt::new(StmtKind::BlockLit(stmts), token.loc))
            }
            _ => Err(self.unexpected("where a JSON value is needed")?),
        }
    }
}
