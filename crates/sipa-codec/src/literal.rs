//! Literal expressions
//!
//! Template attributes carry data as JavaScript-style literals
//! (`'text'`, `42`, `[1, , 3]`, `{ a: true }`, `undefined`, ...). This is a
//! small recursive-descent parser for exactly that subset; anything else is
//! taken as a plain string.

use crate::{CodecError, Map, Value};

/// Literal parser
pub struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Value, CodecError> {
        self.skip_whitespace();
        let result = self.parse_value()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(self.error("unexpected characters after literal"));
        }
        Ok(result)
    }

    fn parse_value(&mut self) -> Result<Value, CodecError> {
        self.skip_whitespace();
        match self.peek() {
            Some('"') => self.parse_string('"').map(Value::String),
            Some('\'') => self.parse_string('\'').map(Value::String),
            Some('0'..='9') | Some('-') | Some('+') | Some('.') => self.parse_number(),
            Some('[') => self.parse_array(),
            Some('{') => self.parse_object(),
            Some(c) if c.is_alphabetic() || c == '_' || c == '$' => self.parse_keyword(),
            Some(c) => Err(self.error(&format!("unexpected character: {}", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_string(&mut self, quote: char) -> Result<String, CodecError> {
        self.expect(quote)?;
        let mut result = String::new();

        while let Some(c) = self.peek() {
            self.advance();
            if c == quote {
                return Ok(result);
            }
            if c != '\\' {
                result.push(c);
                continue;
            }
            match self.peek() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('b') => result.push('\u{8}'),
                Some('f') => result.push('\u{c}'),
                Some('0') => result.push('\0'),
                Some('u') => {
                    self.advance();
                    result.push(self.parse_unicode_escape()?);
                    continue;
                }
                Some(other) => result.push(other),
                None => break,
            }
            self.advance();
        }
        Err(self.error("unterminated string"))
    }

    fn parse_unicode_escape(&mut self) -> Result<char, CodecError> {
        let end = self.pos + 4;
        let hex = self
            .input
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }

    fn parse_number(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        let negative = self.peek() == Some('-');
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance();
        }
        if self.eat_str("Infinity") {
            return Ok(Value::Number(if negative { f64::NEG_INFINITY } else { f64::INFINITY }));
        }
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) { self.advance(); }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) { self.advance(); }
        }
        if self.peek() == Some('e') || self.peek() == Some('E') {
            self.advance();
            if self.peek() == Some('+') || self.peek() == Some('-') { self.advance(); }
            while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) { self.advance(); }
        }
        let num_str = self.input[start..self.pos].trim_start_matches('+');
        num_str
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| self.error("invalid number"))
    }

    fn parse_keyword(&mut self) -> Result<Value, CodecError> {
        let start = self.pos;
        while self
            .peek()
            .map(|c| c.is_alphanumeric() || c == '_' || c == '$')
            .unwrap_or(false)
        {
            self.advance();
        }
        match &self.input[start..self.pos] {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            "undefined" => Ok(Value::Undefined),
            "NaN" => Ok(Value::Number(f64::NAN)),
            "Infinity" => Ok(Value::Number(f64::INFINITY)),
            word => Err(self.error(&format!("unknown identifier: {}", word))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, CodecError> {
        self.expect('[')?;
        let mut elements = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(']') => {
                    self.advance();
                    break;
                }
                Some(',') => {
                    // Elision: `[1, , 3]`
                    self.advance();
                    elements.push(Value::Empty);
                    continue;
                }
                _ => {}
            }
            elements.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(']') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }

        Ok(Value::Array(elements))
    }

    fn parse_object(&mut self) -> Result<Value, CodecError> {
        self.expect('{')?;
        let mut map = Map::new();

        loop {
            self.skip_whitespace();
            let key = match self.peek() {
                Some('}') => {
                    self.advance();
                    break;
                }
                Some(q @ ('"' | '\'')) => self.parse_string(q)?,
                Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => self.parse_bare_key(),
                _ => return Err(self.error("expected object key")),
            };
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_whitespace();

            match self.peek() {
                Some(',') => self.advance(),
                Some('}') => {
                    self.advance();
                    break;
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }

        Ok(Value::Object(map))
    }

    fn parse_bare_key(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .map(|c| c.is_alphanumeric() || c == '_' || c == '$')
            .unwrap_or(false)
        {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn error(&self, message: &str) -> CodecError {
        CodecError::Literal {
            pos: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> { self.input[self.pos..].chars().next() }
    fn advance(&mut self) { if let Some(c) = self.peek() { self.pos += c.len_utf8(); } }
    fn skip_whitespace(&mut self) { while self.peek().map(|c| c.is_whitespace()).unwrap_or(false) { self.advance(); } }
    fn expect(&mut self, c: char) -> Result<(), CodecError> {
        if self.peek() == Some(c) { self.advance(); Ok(()) }
        else { Err(self.error(&format!("expected '{}'", c))) }
    }
    fn eat_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) { self.pos += s.len(); true } else { false }
    }
}

/// Strictly parse a literal expression
pub fn try_parse_literal(input: &str) -> Result<Value, CodecError> {
    LiteralParser::new(input).parse()
}

/// Parse a literal expression, falling back to the raw text as a string
pub fn parse_literal(input: &str) -> Value {
    try_parse_literal(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_literal("'Buy milk'"), Value::from("Buy milk"));
        assert_eq!(parse_literal("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_literal("42"), Value::from(42));
        assert_eq!(parse_literal("-3.5e2"), Value::from(-350.0));
        assert_eq!(parse_literal("true"), Value::Bool(true));
        assert_eq!(parse_literal("null"), Value::Null);
        assert_eq!(parse_literal("undefined"), Value::Undefined);
        assert_eq!(parse_literal("-Infinity"), Value::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn test_containers() {
        let parsed = parse_literal("{ name: 'x', 'tags': ['a', 'b',], nested: { ok: false } }");
        let expected: Map = [
            ("name", Value::from("x")),
            ("tags", Value::Array(vec![Value::from("a"), Value::from("b")])),
            ("nested", Value::Object([("ok", false)].into_iter().collect())),
        ]
        .into_iter()
        .collect();
        assert_eq!(parsed, Value::Object(expected));
    }

    #[test]
    fn test_array_holes() {
        assert_eq!(
            parse_literal("[1, , 3]"),
            Value::Array(vec![Value::from(1), Value::Empty, Value::from(3)])
        );
    }

    #[test]
    fn test_fallback_to_string() {
        assert_eq!(parse_literal("Hello world"), Value::from("Hello world"));
        assert_eq!(parse_literal("'unterminated"), Value::from("'unterminated"));
        assert_eq!(parse_literal(""), Value::from(""));
        assert!(try_parse_literal("foo").is_err());
    }

    #[test]
    fn test_escapes() {
        assert_eq!(parse_literal(r"'it\'s\né'"), Value::from("it's\né"));
    }
}
