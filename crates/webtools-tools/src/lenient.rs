//! Lenient parser for protobuf text-format style dumps.
//!
//! Accepts things like
//!
//! ```text
//! user { id: 42 name: "Ann" roles: [ADMIN, OWNER] } active: true
//! ```
//!
//! and produces a JSON object. Parsing never fails: anything the scanner
//! cannot place is skipped. Blocks nested deeper than [`MAX_DEPTH`] are kept
//! as their raw text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::error::{Result, ToolError};
use crate::json::{to_pretty, Indent};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Same limit serde_json applies when parsing.
pub const MAX_DEPTH: usize = 128;

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").unwrap())
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']' | ':' | ',') || c.is_whitespace()
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self { chars: text.chars().collect(), pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn bump(&mut self) {
        self.pos = (self.pos + 1).min(self.chars.len());
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// `None` means no value was present at this position.
    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            '{' | '[' if self.depth >= MAX_DEPTH => Some(Value::String(self.take_nested())),
            '{' => {
                self.depth += 1;
                let obj = self.parse_object();
                self.depth -= 1;
                Some(Value::Object(obj))
            }
            '[' => {
                self.depth += 1;
                let arr = self.parse_array();
                self.depth -= 1;
                Some(Value::Array(arr))
            }
            '"' => Some(Value::String(self.parse_quoted())),
            _ => {
                let start = self.pos;
                while self.peek().is_some_and(|c| !is_delimiter(c)) {
                    self.pos += 1;
                }
                let token: String = self.chars[start..self.pos].iter().collect();
                if token.is_empty() {
                    None
                } else {
                    Some(classify(&token))
                }
            }
        }
    }

    /// Consumes a bracketed block without recursing and returns its text.
    /// An unbalanced block runs to the end of input.
    fn take_nested(&mut self) -> String {
        let start = self.pos;
        let mut open = 0usize;
        let mut in_string = false;
        while let Some(c) = self.peek() {
            self.pos += 1;
            if in_string {
                match c {
                    '\\' => self.bump(),
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => open += 1,
                '}' | ']' => {
                    open = open.saturating_sub(1);
                    if open == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn parse_quoted(&mut self) -> String {
        self.bump();
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\\' && self.pos + 1 < self.chars.len() {
                self.pos += 1;
                out.push(match self.chars[self.pos] {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            } else {
                out.push(c);
            }
            self.pos += 1;
        }
        self.bump();
        out
    }

    /// Reads a key token. Quoted sections may contain delimiters.
    fn parse_key(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_delimiter(c) {
                break;
            }
            if c == '"' {
                self.pos += 1;
                while let Some(inner) = self.peek() {
                    if inner == '"' {
                        break;
                    }
                    if inner == '\\' && self.pos + 1 < self.chars.len() {
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
            }
            self.bump();
        }
        let raw: String = self.chars[start..self.pos].iter().collect();
        unquote_key(raw.trim())
    }

    fn parse_object(&mut self) -> Map<String, Value> {
        let mut obj = Map::new();
        if self.peek() == Some('{') {
            self.pos += 1;
        }

        while !self.at_end() {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            let before = self.pos;
            let key = self.parse_key();
            self.skip_whitespace();
            if self.peek() == Some(':') {
                self.pos += 1;
            }
            let value = self.parse_value();

            match value {
                Some(value) if !key.is_empty() => {
                    obj.insert(key, value);
                }
                _ => {}
            }

            if self.pos == before {
                self.pos += 1;
            }
        }
        obj
    }

    fn parse_array(&mut self) -> Vec<Value> {
        let mut arr = Vec::new();
        if self.peek() == Some('[') {
            self.pos += 1;
        }

        while !self.at_end() {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }

            match self.parse_value() {
                Some(value) => arr.push(value),
                // stray ':' or '}' inside an array
                None => self.pos += 1,
            }
        }
        arr
    }

    fn parse_root(&mut self) -> Map<String, Value> {
        self.skip_whitespace();
        if self.peek() == Some('{') {
            return self.parse_object();
        }

        let mut result = Map::new();
        while let Some(c) = self.peek() {
            if c == '{' || c == '[' {
                break;
            }

            let key = self.parse_key();
            if key.is_empty() {
                self.bump();
                continue;
            }

            self.skip_whitespace();
            if self.peek() != Some(':') {
                break;
            }
            self.pos += 1;

            if let Some(value) = self.parse_value() {
                result.insert(key, value);
            }
        }
        result
    }
}

fn unquote_key(key: &str) -> String {
    if key.len() >= 2 && key.starts_with('"') && key.ends_with('"') {
        let inner = &key[1..key.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                    continue;
                }
            }
            out.push(c);
        }
        out
    } else {
        key.to_string()
    }
}

fn classify(token: &str) -> Value {
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" | "NULL" => return Value::Null,
        _ => {}
    }

    if !number_regex().is_match(token) {
        return Value::String(token.to_string());
    }

    if let Ok(n) = token.parse::<i64>() {
        return Value::Number(n.into());
    }
    match token.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => Value::Number((f as i64).into()),
        Ok(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Err(_) => Value::String(token.to_string()),
    }
}

/// Parse relaxed key:value text into a JSON object.
pub fn parse(text: &str) -> Map<String, Value> {
    Scanner::new(text).parse_root()
}

/// Parse and pretty-print. Only empty input is an error.
pub fn repair(input: &str, indent: Indent) -> Result<String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(ToolError::EmptyInput);
    }
    let indent = indent.check()?;
    Ok(to_pretty(&Value::Object(parse(raw)), indent))
}
