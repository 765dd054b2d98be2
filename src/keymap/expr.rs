//! Context expressions: `drawerFocused && !modalOpen || pickerOpen`
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := or
//! or      := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | atom
//! atom    := IDENT | "(" expr ")"
//! ```
//!
//! Identifiers are resolved against [`ContextFlag`] while parsing, so a
//! parsed expression never references an unknown flag.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::context::{ActiveContextSet, ContextFlag};

/// Nesting limit for parentheses and `!` chains
const MAX_DEPTH: usize = 64;

/// Limit on `&&`/`||` operators in one expression
///
/// Bounds the height of the left-deep chains those operators build, so
/// evaluating or dropping a parsed expression cannot exhaust the stack.
const MAX_OPERATORS: usize = 256;

/// Errors produced while parsing a context expression
///
/// Positions are byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("unknown context flag `{name}` at position {position}")]
    UnknownFlag { name: String, position: usize },
}

impl ExprError {
    fn syntax(position: usize, message: impl Into<String>) -> Self {
        ExprError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            ExprError::Syntax { position, .. } | ExprError::UnknownFlag { position, .. } => {
                *position
            }
        }
    }
}

/// Parsed boolean expression over context flags
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextExpr {
    Flag(ContextFlag),
    Not(Box<ContextExpr>),
    And(Box<ContextExpr>, Box<ContextExpr>),
    Or(Box<ContextExpr>, Box<ContextExpr>),
}

impl ContextExpr {
    /// Parse an expression, rejecting malformed syntax and unknown flags
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::syntax(0, "empty expression"));
        }

        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
            depth: 0,
            operators: 0,
        };
        let expr = parser.parse_or()?;

        if let Some(token) = parser.peek() {
            let message = match token.kind {
                TokenKind::RParen => "unmatched `)`".to_string(),
                _ => format!("unexpected {} after complete expression", token.kind),
            };
            return Err(ExprError::syntax(token.position, message));
        }

        Ok(expr)
    }

    /// Evaluate against the active flags with short-circuit semantics
    pub fn eval(&self, active: &ActiveContextSet) -> bool {
        match self {
            ContextExpr::Flag(flag) => active.contains(*flag),
            ContextExpr::Not(inner) => !inner.eval(active),
            ContextExpr::And(lhs, rhs) => lhs.eval(active) && rhs.eval(active),
            ContextExpr::Or(lhs, rhs) => lhs.eval(active) || rhs.eval(active),
        }
    }

    /// Flags referenced by this expression, deduplicated, in first-seen order
    pub fn flags(&self) -> Vec<ContextFlag> {
        let mut flags = Vec::new();
        self.collect_flags(&mut flags);
        flags
    }

    fn collect_flags(&self, out: &mut Vec<ContextFlag>) {
        match self {
            ContextExpr::Flag(flag) => {
                if !out.contains(flag) {
                    out.push(*flag);
                }
            }
            ContextExpr::Not(inner) => inner.collect_flags(out),
            ContextExpr::And(lhs, rhs) | ContextExpr::Or(lhs, rhs) => {
                lhs.collect_flags(out);
                rhs.collect_flags(out);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            ContextExpr::Or(..) => 1,
            ContextExpr::And(..) => 2,
            ContextExpr::Not(_) => 3,
            ContextExpr::Flag(_) => 4,
        }
    }
}

/// Evaluate an optional expression; an absent expression is always true
pub fn evaluate(expr: Option<&ContextExpr>, active: &ActiveContextSet) -> bool {
    expr.map_or(true, |expr| expr.eval(active))
}

impl FromStr for ContextExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Writes the minimal-parenthesis form, which parses back to the same tree
impl fmt::Display for ContextExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand(
            f: &mut fmt::Formatter<'_>,
            expr: &ContextExpr,
            needs_parens: bool,
        ) -> fmt::Result {
            if needs_parens {
                write!(f, "({})", expr)
            } else {
                write!(f, "{}", expr)
            }
        }

        match self {
            ContextExpr::Flag(flag) => write!(f, "{}", flag),
            ContextExpr::Not(inner) => {
                f.write_str("!")?;
                operand(f, inner, inner.precedence() < self.precedence())
            }
            ContextExpr::And(lhs, rhs) | ContextExpr::Or(lhs, rhs) => {
                let op = if matches!(self, ContextExpr::And(..)) {
                    " && "
                } else {
                    " || "
                };
                operand(f, lhs, lhs.precedence() < self.precedence())?;
                f.write_str(op)?;
                operand(f, rhs, rhs.precedence() <= self.precedence())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind<'a> {
    Ident(&'a str),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "`{}`", name),
            TokenKind::Not => f.write_str("`!`"),
            TokenKind::And => f.write_str("`&&`"),
            TokenKind::Or => f.write_str("`||`"),
            TokenKind::LParen => f.write_str("`(`"),
            TokenKind::RParen => f.write_str("`)`"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind<'a>,
    position: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '!' => TokenKind::Not,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '&' | '|' => {
                if chars.next_if(|&(_, next)| next == c).is_none() {
                    return Err(ExprError::syntax(
                        position,
                        format!("expected `{c}{c}`, found single `{c}`"),
                    ));
                }
                if c == '&' {
                    TokenKind::And
                } else {
                    TokenKind::Or
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = position + c.len_utf8();
                while let Some((idx, next)) =
                    chars.next_if(|&(_, next)| next.is_ascii_alphanumeric())
                {
                    end = idx + next.len_utf8();
                }
                TokenKind::Ident(&source[position..end])
            }
            other => {
                return Err(ExprError::syntax(
                    position,
                    format!("unexpected character `{}`", other),
                ))
            }
        };
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Byte length of the source, reported for errors at end of input
    end: usize,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind<'a>) -> bool {
        if self.peek().is_some_and(|token| token.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self, position: usize) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::syntax(position, "expression nested too deeply"));
        }
        Ok(())
    }

    /// Consume a binary operator of `kind`, counting it against the limit
    fn eat_operator(&mut self, kind: TokenKind<'a>) -> Result<bool, ExprError> {
        let Some(token) = self.peek().filter(|token| token.kind == kind) else {
            return Ok(false);
        };
        self.pos += 1;
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ExprError::syntax(token.position, "too many operators in expression"));
        }
        Ok(true)
    }

    fn parse_or(&mut self) -> Result<ContextExpr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat_operator(TokenKind::Or)? {
            let rhs = self.parse_and()?;
            lhs = ContextExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<ContextExpr, ExprError> {
        let mut lhs = self.parse_unary()?;
        while self.eat_operator(TokenKind::And)? {
            let rhs = self.parse_unary()?;
            lhs = ContextExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<ContextExpr, ExprError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Not,
                position,
            }) => {
                self.pos += 1;
                self.descend(position)?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(ContextExpr::Not(Box::new(inner)))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<ContextExpr, ExprError> {
        let Some(token) = self.advance() else {
            return Err(ExprError::syntax(
                self.end,
                "expected flag name or `(`, found end of expression",
            ));
        };

        match token.kind {
            TokenKind::Ident(name) => name
                .parse::<ContextFlag>()
                .map(ContextExpr::Flag)
                .map_err(|_| ExprError::UnknownFlag {
                    name: name.to_string(),
                    position: token.position,
                }),
            TokenKind::LParen => {
                self.descend(token.position)?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                if !self.eat(TokenKind::RParen) {
                    return Err(ExprError::syntax(token.position, "unclosed `(`"));
                }
                Ok(inner)
            }
            other => Err(ExprError::syntax(
                token.position,
                format!("expected flag name or `(`, found {}", other),
            )),
        }
    }
}
