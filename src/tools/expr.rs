//! Constrained arithmetic evaluator
//!
//! Numbers, `+ - * / ^`, unary signs and parentheses. `**` is read as `^`.
//! Anything else is rejected; nothing is ever handed to a general evaluator.

use thiserror::Error;

/// Why an expression could not be evaluated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("invalid number '{text}' at position {pos}")]
    InvalidNumber { text: String, pos: usize },

    #[error("unexpected '{token}' at position {pos}")]
    UnexpectedToken { token: String, pos: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unbalanced parenthesis at position {pos}")]
    UnbalancedParen { pos: usize },

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Num(n) => write!(f, "{}", n),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Token plus its byte offset in the source
type Spanned = (Token, usize);

fn tokenize(input: &str) -> Result<Vec<Spanned>, EvalError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let tok = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                let start = i;
                i = scan_number(bytes, i);
                let text = &input[start..i];
                let value = text.parse::<f64>().map_err(|_| EvalError::InvalidNumber {
                    text: text.to_string(),
                    pos: start,
                })?;
                tokens.push((Token::Num(value), start));
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                tokens.push((Token::Caret, i));
                i += 2;
                continue;
            }
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            _ => {
                // Report the full char, not a UTF-8 fragment
                let ch = input[i..].chars().next().unwrap_or('?');
                return Err(EvalError::UnexpectedChar { ch, pos: i });
            }
        };
        tokens.push((tok, i));
        i += 1;
    }

    Ok(tokens)
}

/// digits ['.' digits] [exponent]; returns the end offset
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

/// Nesting limit for parentheses, unary signs and exponent chains
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn next(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.pos).copied();
        self.pos += 1;
        tok
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == Token::Plus { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == Token::Star {
                acc * rhs
            } else {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                acc / rhs
            };
        }
        Ok(acc)
    }

    // unary := ('+' | '-') unary | power
    // Every nesting path (parens, signs, '^') recurses through here
    fn unary(&mut self) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, EvalError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := primary ('^' unary)?   -- right associative, binds tighter than unary minus on its left
    fn power(&mut self) -> Result<f64, EvalError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Caret) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    // primary := NUMBER | '(' expr ')'
    fn primary(&mut self) -> Result<f64, EvalError> {
        match self.next() {
            Some((Token::Num(n), _)) => Ok(n),
            Some((Token::LParen, open)) => {
                let value = self.expr()?;
                match self.next() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((tok, pos)) => Err(EvalError::UnexpectedToken {
                        token: tok.to_string(),
                        pos,
                    }),
                    None => Err(EvalError::UnbalancedParen { pos: open }),
                }
            }
            Some((tok, pos)) => Err(EvalError::UnexpectedToken {
                token: tok.to_string(),
                pos,
            }),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression
pub fn evaluate(input: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    if let Some((tok, pos)) = parser.next() {
        return Err(match tok {
            Token::RParen => EvalError::UnbalancedParen { pos },
            _ => EvalError::UnexpectedToken {
                token: tok.to_string(),
                pos,
            },
        });
    }

    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}
