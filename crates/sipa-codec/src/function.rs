//! Function sources
//!
//! Functions are stored as their source text. The detector below decides
//! whether a stored string is function-shaped; it accepts
//! `function [*][name](...) {...}`, method shorthand `name(...) {...}`,
//! `(...) => ...` and `ident => ...`, each optionally prefixed by `async`.

use std::fmt;

/// Reserved words that look like method shorthand (`if (x) {}`) but are not
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "return", "typeof", "new", "do", "else",
    "try", "finally", "delete", "void", "throw", "case",
];

/// Syntactic shape of a function source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function name(...) {...}` / `function(...) {...}`
    Declaration,
    /// `name(...) {...}`
    Method,
    /// `(...) => ...` / `x => ...`
    Arrow,
}

/// Source text of a function value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    source: String,
    kind: FunctionKind,
}

impl FunctionSource {
    /// Wrap source text if it is function-shaped
    pub fn parse(source: &str) -> Option<Self> {
        let kind = detect(source)?;
        let function = Self {
            source: source.to_string(),
            kind,
        };
        #[cfg(feature = "trusted-eval")]
        if !crate::eval::compiles(&function) {
            tracing::debug!("function-shaped source failed to evaluate, keeping it as a string");
            return None;
        }
        Some(function)
    }

    /// Verbatim source text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }
}

impl fmt::Display for FunctionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Whether `text` is function-shaped
pub fn is_function_source(text: &str) -> bool {
    detect(text).is_some()
}

/// Classify function-shaped text
pub fn detect(text: &str) -> Option<FunctionKind> {
    let mut cursor = Cursor::new(text.trim());
    if cursor.eat_word("async") && !cursor.skip_whitespace() && cursor.peek() != Some('(') {
        return None;
    }

    let save = cursor.pos;
    if cursor.eat_word("function") {
        cursor.skip_whitespace();
        if cursor.peek() == Some('*') {
            cursor.advance();
            cursor.skip_whitespace();
        }
        cursor.identifier();
        cursor.skip_whitespace();
        cursor.group('(', ')')?;
        cursor.skip_whitespace();
        cursor.group('{', '}')?;
        return cursor.at_end().then_some(FunctionKind::Declaration);
    }
    cursor.pos = save;

    if cursor.peek() == Some('(') {
        cursor.group('(', ')')?;
        return arrow_tail(&mut cursor);
    }

    let name = cursor.identifier()?;
    cursor.skip_whitespace();
    match cursor.peek() {
        Some('=') => arrow_tail(&mut cursor),
        Some('(') if !STATEMENT_KEYWORDS.contains(&name) => {
            cursor.group('(', ')')?;
            cursor.skip_whitespace();
            cursor.group('{', '}')?;
            cursor.at_end().then_some(FunctionKind::Method)
        }
        _ => None,
    }
}

fn arrow_tail(cursor: &mut Cursor<'_>) -> Option<FunctionKind> {
    cursor.skip_whitespace();
    if !cursor.eat("=>") {
        return None;
    }
    cursor.skip_whitespace();
    if cursor.peek() == Some('{') {
        cursor.group('{', '}')?;
        return cursor.at_end().then_some(FunctionKind::Arrow);
    }
    (!cursor.at_end()).then_some(FunctionKind::Arrow)
}

/// Character cursor with bracket and string-literal aware skipping
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns whether anything was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.advance();
        }
        self.pos > start
    }

    fn eat(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Eat a keyword only when it is not the prefix of a longer identifier
    fn eat_word(&mut self, word: &str) -> bool {
        let rest = &self.input[self.pos..];
        if !rest.starts_with(word) {
            return false;
        }
        let boundary = rest[word.len()..]
            .chars()
            .next()
            .map(|c| !is_ident_char(c))
            .unwrap_or(true);
        if boundary {
            self.pos += word.len();
            true
        } else {
            false
        }
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => self.advance(),
            _ => return None,
        }
        while self.peek().map(is_ident_char).unwrap_or(false) {
            self.advance();
        }
        Some(&self.input[start..self.pos])
    }

    /// Skip a balanced `open ... close` group starting at the cursor
    fn group(&mut self, open: char, close: char) -> Option<()> {
        if self.peek() != Some(open) {
            return None;
        }
        let mut stack = vec![close];
        self.advance();
        while let Some(expected) = stack.last().copied() {
            let c = self.peek()?;
            self.advance();
            match c {
                '\'' | '"' | '`' => self.string(c)?,
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => {
                    if c != expected {
                        return None;
                    }
                    stack.pop();
                }
                _ => {}
            }
        }
        Some(())
    }

    /// Skip the rest of a string literal whose opening quote was consumed
    fn string(&mut self, quote: char) -> Option<()> {
        loop {
            let c = self.peek()?;
            self.advance();
            if c == '\\' {
                self.advance();
            } else if c == quote {
                return Some(());
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarations() {
        assert_eq!(detect("function add(a, b) { return a + b; }"), Some(FunctionKind::Declaration));
        assert_eq!(detect("function(a) { return a; }"), Some(FunctionKind::Declaration));
        assert_eq!(detect("function* gen() { yield 1; }"), Some(FunctionKind::Declaration));
        assert_eq!(detect("async function load() { await x; }"), Some(FunctionKind::Declaration));
    }

    #[test]
    fn test_methods_and_arrows() {
        assert_eq!(detect("greet(name) { return `hi ${name}`; }"), Some(FunctionKind::Method));
        assert_eq!(detect("(a, b) => a + b"), Some(FunctionKind::Arrow));
        assert_eq!(detect("x => x * 2"), Some(FunctionKind::Arrow));
        assert_eq!(detect("async () => { await go(); }"), Some(FunctionKind::Arrow));
    }

    #[test]
    fn test_not_functions() {
        assert_eq!(detect("hello world"), None);
        assert_eq!(detect("if (x) { y(); }"), None);
        assert_eq!(detect("function broken( {"), None);
        assert_eq!(detect("function f() { return '}'; } trailing"), None);
        assert_eq!(detect("() =>"), None);
        assert_eq!(detect("functional"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn test_braces_inside_strings() {
        assert_eq!(detect(r#"function f() { return "{"; }"#), Some(FunctionKind::Declaration));
    }
}
