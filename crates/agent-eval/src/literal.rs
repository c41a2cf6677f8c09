//! Reader for Python literal values
//!
//! Model answers and references are stored as Python reprs such as
//! `['Paris', 'Lyon']`. This module reads the literal subset those use:
//! strings, numbers, `True`/`False`/`None`, lists, tuples, sets and dicts.

use std::collections::HashSet;

use crate::error::{EvalError, Result};

/// A parsed Python literal
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Set(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Key under which this value is stored in a set
    ///
    /// Values that compare equal in Python share a key, so `1`, `1.0` and
    /// `True` collapse. Lists, sets and dicts are unhashable and have none.
    pub fn hash_key(&self) -> Option<String> {
        match self {
            Literal::None => Some("None".to_string()),
            Literal::Bool(b) => Some(i64::from(*b).to_string()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some((*f as i64).to_string())
            }
            Literal::Float(f) => Some(f.to_string()),
            Literal::Str(s) => Some(format!("{s:?}")),
            Literal::Tuple(items) => {
                let keys = items
                    .iter()
                    .map(Literal::hash_key)
                    .collect::<Option<Vec<_>>>()?;
                Some(format!("({})", keys.join(", ")))
            }
            Literal::List(_) | Literal::Set(_) | Literal::Dict(_) => None,
        }
    }

    /// Elements produced by iterating this value
    fn iter_elements(&self) -> Option<Vec<Literal>> {
        match self {
            Literal::List(items) | Literal::Tuple(items) | Literal::Set(items) => {
                Some(items.clone())
            }
            Literal::Dict(entries) => Some(entries.iter().map(|(k, _)| k.clone()).collect()),
            Literal::Str(s) => Some(s.chars().map(|c| Literal::Str(c.to_string())).collect()),
            Literal::None | Literal::Bool(_) | Literal::Int(_) | Literal::Float(_) => None,
        }
    }
}

/// Parse one literal spanning the whole input
pub fn parse(input: &str) -> Result<Literal> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.peek().is_some() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Parse `input` and collect it into a set, as Python's `set(literal)` does
///
/// Strings become the set of their characters and dicts the set of their
/// keys. Scalars and unhashable elements are errors.
pub fn parse_set(input: &str) -> Result<HashSet<String>> {
    let value = parse(input)?;
    let elements = value.iter_elements().ok_or_else(|| EvalError::Literal {
        offset: 0,
        reason: "value is not iterable".to_string(),
    })?;
    elements
        .iter()
        .map(|element| {
            element.hash_key().ok_or_else(|| EvalError::Literal {
                offset: 0,
                reason: "unhashable element".to_string(),
            })
        })
        .collect()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> EvalError {
        EvalError::Literal {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Literal> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => {
                self.pos += 1;
                Ok(Literal::List(self.sequence(']')?.0))
            }
            Some('(') => {
                self.pos += 1;
                let (mut items, trailing_comma) = self.sequence(')')?;
                if items.len() == 1 && !trailing_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            Some('{') => {
                self.pos += 1;
                self.braced()
            }
            Some('\'' | '"') => self.string(),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_alphabetic() => self.word(),
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    /// Comma separated values up to `close`; reports a trailing comma
    fn sequence(&mut self, close: char) -> Result<(Vec<Literal>, bool)> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            if self.eat(close) {
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            trailing_comma = self.eat(',');
            if !trailing_comma {
                if self.eat(close) {
                    return Ok((items, false));
                }
                return Err(self.error("expected ',' or closing bracket"));
            }
        }
    }

    /// A dict or a set, after the opening brace
    fn braced(&mut self) -> Result<Literal> {
        if self.eat('}') {
            return Ok(Literal::Dict(Vec::new()));
        }
        let first = self.value()?;
        if self.eat(':') {
            let mut entries = vec![(first, self.value()?)];
            loop {
                if !self.eat(',') {
                    break;
                }
                if self.peek_closing('}') {
                    break;
                }
                let key = self.value()?;
                if !self.eat(':') {
                    return Err(self.error("expected ':' in dict"));
                }
                entries.push((key, self.value()?));
            }
            if !self.eat('}') {
                return Err(self.error("expected '}'"));
            }
            return Ok(Literal::Dict(entries));
        }

        let mut items = vec![first];
        if self.eat(',') {
            items.extend(self.sequence('}')?.0);
        } else if !self.eat('}') {
            return Err(self.error("expected ',' or '}'"));
        }
        Ok(Literal::Set(items))
    }

    fn peek_closing(&mut self, close: char) -> bool {
        self.skip_whitespace();
        self.peek() == Some(close)
    }

    /// One or more adjacent string literals, concatenated
    fn string(&mut self) -> Result<Literal> {
        let mut out = self.single_string()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('\'' | '"') => out.push_str(&self.single_string()?),
                _ => return Ok(Literal::Str(out)),
            }
        }
    }

    fn single_string(&mut self) -> Result<String> {
        let Some(quote) = self.bump() else {
            return Err(self.error("expected string"));
        };
        let triple = self.chars.get(self.pos..self.pos + 2) == Some(&[quote, quote][..]);
        if triple {
            self.pos += 2;
        }

        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            if c == quote {
                if !triple {
                    return Ok(out);
                }
                if self.chars.get(self.pos..self.pos + 2) == Some(&[quote, quote][..]) {
                    self.pos += 2;
                    return Ok(out);
                }
                out.push(c);
            } else if c == '\\' {
                self.escape(&mut out)?;
            } else if c == '\n' && !triple {
                return Err(self.error("newline in string"));
            } else {
                out.push(c);
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<()> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape"));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' => out.push(c),
            '\n' => {}
            'x' => out.push(self.code_point(2)?),
            'u' => out.push(self.code_point(4)?),
            'U' => out.push(self.code_point(8)?),
            // Unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn code_point(&mut self, digits: usize) -> Result<char> {
        let hex: String = self
            .chars
            .get(self.pos..self.pos + digits)
            .ok_or_else(|| self.error("truncated escape"))?
            .iter()
            .collect();
        self.pos += digits;
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error("invalid escape"))
    }

    fn number(&mut self) -> Result<Literal> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.pos += 1;
                true
            }
            Some('+') => {
                self.pos += 1;
                false
            }
            _ => false,
        };
        self.skip_whitespace();

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => text.push(c),
                '_' => {}
                '.' => {
                    is_float = true;
                    text.push(c);
                }
                'e' | 'E' => {
                    is_float = true;
                    text.push(c);
                    if let Some(sign @ ('-' | '+')) = self.chars.get(self.pos + 1).copied() {
                        text.push(sign);
                        self.pos += 1;
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }

        let parsed = if is_float {
            text.parse().ok().map(Literal::Float)
        } else {
            text.parse().ok().map(Literal::Int)
        };
        parsed.ok_or_else(|| EvalError::Literal {
            offset: start,
            reason: format!("invalid number '{text}'"),
        })
    }

    fn word(&mut self) -> Result<Literal> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            // String prefixes
            "u" | "U" if matches!(self.peek(), Some('\'' | '"')) => self.string(),
            _ => Err(EvalError::Literal {
                offset: start,
                reason: format!("'{word}' is not a literal"),
            }),
        }
    }
}

/// Python `str()` of a JSON value
///
/// Strings stay bare at the top level and are quoted inside containers, so a
/// JSON array of answers becomes a list literal this module can read back.
pub fn python_str(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => python_repr(other),
    }
}

fn python_repr(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<_> = items.iter().map(python_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<_> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), python_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Python repr of a string: single quotes unless the text contains one
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}
