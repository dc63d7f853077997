//! Arithmetic expressions over named geometry quantities.
//!
//! Grammar:
//!   expr    := term (('+' | '-') term)*
//!   term    := unary (('*' | '/') unary)*
//!   unary   := ('+' | '-') unary | primary
//!   primary := number | identifier | '(' expr ')'
//!
//! Identifiers are restricted to the [`Quantity`] vocabulary; anything else is
//! rejected at parse time. Evaluation is a pure walk over the tree.

use std::fmt;

use crate::error::ExprError;

const MAX_DEPTH: usize = 64;
const MAX_OPERATORS: usize = 256;

/// Geometry-derived quantity an expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Viewport width.
    ScreenWidth,
    /// Viewport height.
    ScreenHeight,
    ElWidth,
    ElHeight,
    /// Scroll offset at which the element's top enters the bottom of the viewport.
    ElInBottom,
    /// Scroll offset at which the element's bottom leaves the top of the viewport.
    ElOutTop,
    /// Scroll offset at which the element is vertically centered.
    ElCenterVert,
    /// Horizontal offset at which the element's left edge enters from the right.
    ElInRight,
    /// Horizontal offset at which the element's right edge leaves on the left.
    ElOutLeft,
    /// Horizontal offset at which the element is horizontally centered.
    ElCenterHoriz,
    /// Position of the element within its selection.
    Index,
}

impl Quantity {
    pub const ALL: [Quantity; 11] = [
        Quantity::ScreenWidth,
        Quantity::ScreenHeight,
        Quantity::ElWidth,
        Quantity::ElHeight,
        Quantity::ElInBottom,
        Quantity::ElOutTop,
        Quantity::ElCenterVert,
        Quantity::ElInRight,
        Quantity::ElOutLeft,
        Quantity::ElCenterHoriz,
        Quantity::Index,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quantity::ScreenWidth => "screenWidth",
            Quantity::ScreenHeight => "screenHeight",
            Quantity::ElWidth => "elWidth",
            Quantity::ElHeight => "elHeight",
            Quantity::ElInBottom => "elInBottom",
            Quantity::ElOutTop => "elOutTop",
            Quantity::ElCenterVert => "elCenterVert",
            Quantity::ElInRight => "elInRight",
            Quantity::ElOutLeft => "elOutLeft",
            Quantity::ElCenterHoriz => "elCenterHoriz",
            Quantity::Index => "index",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Quantity::ALL.iter().copied().find(|q| q.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(Quantity),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn parse(src: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            operators: 0,
        };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(tok.unexpected()),
        }
    }

    /// Evaluate with `lookup` supplying every referenced quantity.
    pub fn eval(&self, lookup: &impl Fn(Quantity) -> f64) -> f64 {
        match self {
            Expr::Num(n) => *n,
            Expr::Var(q) => lookup(*q),
            Expr::Neg(inner) => -inner.eval(lookup),
            Expr::Binary(op, lhs, rhs) => {
                let a = lhs.eval(lookup);
                let b = rhs.eval(lookup);
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Num(f64),
    Ident(Quantity),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Num(n) => write!(f, "{n}"),
            TokenKind::Ident(q) => f.write_str(q.name()),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

impl Token {
    fn unexpected(&self) -> ExprError {
        ExprError::UnexpectedToken {
            pos: self.pos,
            found: self.kind.to_string(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ExprError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, i);
                let text = &src[start..i];
                let n = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.to_string()))?;
                tokens.push(Token {
                    kind: TokenKind::Num(n),
                    pos: start,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let name = &src[start..i];
                let q = Quantity::from_name(name)
                    .ok_or_else(|| ExprError::UnknownIdentifier(name.to_string()))?;
                tokens.push(Token {
                    kind: TokenKind::Ident(q),
                    pos: start,
                });
                continue;
            }
            _ => {
                // report the full (possibly multi-byte) character
                let ch = src[start..].chars().next().unwrap_or('?');
                return Err(ExprError::UnexpectedChar { pos: start, ch });
            }
        };
        tokens.push(Token { kind, pos: start });
        i += 1;
    }
    Ok(tokens)
}

/// Returns the end offset of the numeric literal starting at `i`.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    // binary operators parsed so far; bounds the height of left-deep chains
    operators: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), ExprError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn count_operator(&mut self) -> Result<(), ExprError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(ExprError::TooLong(MAX_OPERATORS));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat(&TokenKind::Plus) {
                BinOp::Add
            } else if self.eat(&TokenKind::Minus) {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            self.count_operator()?;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat(&TokenKind::Star) {
                BinOp::Mul
            } else if self.eat(&TokenKind::Slash) {
                BinOp::Div
            } else {
                return Ok(lhs);
            };
            self.count_operator()?;
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        self.enter()?;
        let out = if self.eat(&TokenKind::Minus) {
            self.unary().map(|e| Expr::Neg(Box::new(e)))
        } else if self.eat(&TokenKind::Plus) {
            self.unary()
        } else {
            self.primary()
        };
        self.depth -= 1;
        out
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let tok = self.next().cloned().ok_or(ExprError::UnexpectedEnd)?;
        match tok.kind {
            TokenKind::Num(n) => Ok(Expr::Num(n)),
            TokenKind::Ident(q) => Ok(Expr::Var(q)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                if self.eat(&TokenKind::RParen) {
                    Ok(inner)
                } else {
                    match self.peek() {
                        Some(t) => Err(t.unexpected()),
                        None => Err(ExprError::UnexpectedEnd),
                    }
                }
            }
            _ => Err(tok.unexpected()),
        }
    }
}
