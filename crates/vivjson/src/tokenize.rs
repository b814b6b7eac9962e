//! Lexer: turns source text into a lazy sequence of tokens.
//!
//! Tokens are pulled one at a time by the parser. Newlines inside `()`, `[]`,
//! and `{}` are treated as whitespace; outside brackets they become separator
//! tokens equivalent to `,` and `;`.

use crate::error::{CodeLoc, Error};

/// Reserved words that may not be used as names.
pub(crate) fn is_reserved_word(word: &str) -> bool {
    matches!(
        word,
        "if" | "elseif"
            | "else"
            | "for"
            | "while"
            | "do"
            | "break"
            | "continue"
            | "return"
            | "remove"
            | "function"
            | "reference"
            | "true"
            | "false"
            | "null"
            | "in"
            | "and"
            | "or"
            | "not"
            | "import"
            | "super"
            | "class"
            | "this"
    )
}

/// Names wrapped in three underscores on both sides are internal markers.
pub(crate) fn is_internal_marker(name: &str) -> bool {
    name.len() >= 6 && name.starts_with("___") && name.ends_with("___")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Integer literal; the lexeme holds the digits.
    Int,
    /// Float literal (has a fraction or an exponent).
    Float,
    /// String literal; the lexeme holds the decoded content.
    Str,
    Identifier,
    Keyword,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    YieldAssign,
    Bang,
    Ampersand,
    VerticalBar,
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub loc: CodeLoc,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, loc: CodeLoc) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            loc,
        }
    }
}

/// Streaming tokenizer over a source string.
#[derive(Debug)]
pub(crate) struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    /// Nesting depth of `()`/`[]`/`{}`; newlines inside brackets are whitespace.
    bracket_depth: usize,
    lines: Vec<String>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            bracket_depth: 0,
            lines: source.lines().map(str::to_owned).collect(),
        }
    }

    /// The text of a 1-based source line, used for caret diagnostics.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        self.lines.get(line as usize - 1).map(String::as_str)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn loc(&self) -> CodeLoc {
        CodeLoc::new(self.line, self.column)
    }

    fn error(&self, message: impl Into<String>, loc: CodeLoc) -> Error {
        let err = Error::lexer(message, loc);
        match self.line_text(loc.line) {
            Some(text) => err.with_source_line(text),
            None => err,
        }
    }

    /// Produces the next token, or `Eof` at the end of input.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            let Some(ch) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, "", self.loc()));
            };
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    let loc = self.loc();
                    self.advance();
                    if self.bracket_depth == 0 {
                        return Ok(Token::new(TokenKind::Newline, "\n", loc));
                    }
                }
                '#' => self.skip_line_comment(),
                '/' => match self.peek_at(1) {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => return self.lex_operator(),
                },
                '"' | '\'' => return self.lex_string(),
                '0'..='9' => return self.lex_number(),
                _ if ch.is_alphabetic() || ch == '_' => return Ok(self.lex_word()),
                _ => return self.lex_operator(),
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), Error> {
        let start = self.loc();
        self.advance(); // '/'
        self.advance(); // '*'
        loop {
            match self.peek() {
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some(_) => {
                    self.advance();
                }
                None => return Err(self.error("block comment is not terminated", start)),
            }
        }
    }

    fn lex_word(&mut self) -> Token {
        let loc = self.loc();
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if is_reserved_word(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, word, loc)
    }

    fn lex_number(&mut self) -> Result<Token, Error> {
        let loc = self.loc();
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            match self.peek_at(1) {
                Some(next) if next.is_ascii_digit() => {
                    is_float = true;
                    text.push('.');
                    self.advance();
                    while let Some(ch) = self.peek() {
                        if ch.is_ascii_digit() {
                            text.push(ch);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                // A dot followed by a name is member access on the literal.
                Some(next) if next.is_alphabetic() || next == '_' => {}
                _ => return Err(self.error("a number must not end with a dot", loc)),
            }
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut offset = 1;
            if matches!(self.peek_at(1), Some('+' | '-')) {
                offset = 2;
            }
            match self.peek_at(offset) {
                Some(digit) if digit.is_ascii_digit() => {
                    is_float = true;
                    for _ in 0..offset {
                        text.push(self.advance().expect("peeked"));
                    }
                    while let Some(ch) = self.peek() {
                        if ch.is_ascii_digit() {
                            text.push(ch);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                _ => return Err(self.error("an exponent needs digits", loc)),
            }
        }
        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        Ok(Token::new(kind, text, loc))
    }

    fn lex_string(&mut self) -> Result<Token, Error> {
        let loc = self.loc();
        let quote = self.advance().expect("peeked");
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("string is not terminated", loc)),
                Some('\n') => return Err(self.error("string is not terminated", loc)),
                Some('\\') => {
                    self.advance();
                    text.push(self.lex_escape(loc)?);
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(Token::new(TokenKind::Str, text, loc));
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn lex_escape(&mut self, string_loc: CodeLoc) -> Result<char, Error> {
        let escape_loc = self.loc();
        let Some(ch) = self.advance() else {
            return Err(self.error("string is not terminated", string_loc));
        };
        let decoded = match ch {
            '\\' => '\\',
            '/' => '/',
            '"' => '"',
            '\'' => '\'',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.lex_unicode_escape(escape_loc),
            other => {
                return Err(self.error(format!("invalid escape sequence '\\{other}'"), escape_loc));
            }
        };
        Ok(decoded)
    }

    fn lex_unicode_escape(&mut self, loc: CodeLoc) -> Result<char, Error> {
        let high = self.lex_hex4(loc)?;
        // Surrogate pairs arrive as two consecutive \uXXXX escapes.
        if (0xD800..=0xDBFF).contains(&high) {
            if self.peek() == Some('\\') && self.peek_at(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.lex_hex4(loc)?;
                if (0xDC00..=0xDFFF).contains(&low) {
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(combined)
                        .ok_or_else(|| self.error("invalid unicode escape", loc));
                }
            }
            return Err(self.error("unpaired surrogate in unicode escape", loc));
        }
        if (0xDC00..=0xDFFF).contains(&high) {
            return Err(self.error("unpaired surrogate in unicode escape", loc));
        }
        char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape", loc))
    }

    fn lex_hex4(&mut self, loc: CodeLoc) -> Result<u32, Error> {
        let mut value = 0u32;
        for _ in 0..4 {
            let Some(digit) = self.peek().and_then(|ch| ch.to_digit(16)) else {
                return Err(self.error("\\u needs exactly four hex digits", loc));
            };
            self.advance();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn lex_operator(&mut self) -> Result<Token, Error> {
        let loc = self.loc();
        let ch = self.advance().expect("peeked");
        let followed_by_eq = self.peek() == Some('=');
        let (kind, lexeme) = match ch {
            '{' => {
                self.bracket_depth += 1;
                (TokenKind::LeftBrace, "{")
            }
            '}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (TokenKind::RightBrace, "}")
            }
            '[' => {
                self.bracket_depth += 1;
                (TokenKind::LeftBracket, "[")
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (TokenKind::RightBracket, "]")
            }
            '(' => {
                self.bracket_depth += 1;
                (TokenKind::LeftParen, "(")
            }
            ')' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                (TokenKind::RightParen, ")")
            }
            ',' => (TokenKind::Comma, ","),
            ';' => (TokenKind::Semicolon, ";"),
            '.' => (TokenKind::Dot, "."),
            ':' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::YieldAssign, ":=")
                } else {
                    (TokenKind::Colon, ":")
                }
            }
            '=' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::Eq, "==")
                } else {
                    (TokenKind::Assign, "=")
                }
            }
            '!' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::Ne, "!=")
                } else {
                    (TokenKind::Bang, "!")
                }
            }
            '<' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::Le, "<=")
                } else {
                    (TokenKind::Lt, "<")
                }
            }
            '>' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::Ge, ">=")
                } else {
                    (TokenKind::Gt, ">")
                }
            }
            '+' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::PlusAssign, "+=")
                } else {
                    (TokenKind::Plus, "+")
                }
            }
            '-' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::MinusAssign, "-=")
                } else {
                    (TokenKind::Minus, "-")
                }
            }
            '*' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::StarAssign, "*=")
                } else {
                    (TokenKind::Star, "*")
                }
            }
            '/' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::SlashAssign, "/=")
                } else {
                    (TokenKind::Slash, "/")
                }
            }
            '%' => {
                if followed_by_eq {
                    self.advance();
                    (TokenKind::PercentAssign, "%=")
                } else {
                    (TokenKind::Percent, "%")
                }
            }
            '&' => (TokenKind::Ampersand, "&"),
            '|' => (TokenKind::VerticalBar, "|"),
            other => {
                return Err(self.error(format!("invalid character '{other}'"), loc));
            }
        };
        Ok(Token::new(kind, lexeme, loc))
    }
}
