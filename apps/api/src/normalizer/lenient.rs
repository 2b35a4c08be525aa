//! Tolerant JSON reader used as the syntax-repair step.
//!
//! Accepts the mistakes language models make when asked for JSON: smart or
//! single quotes, bare object keys, trailing and missing commas, raw control
//! characters inside strings, comments, and containers left open at the end
//! of a truncated response. Output is always a `serde_json::Value`, so the
//! repaired text is canonical JSON and `repair` is idempotent.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::normalizer::extract::string_closers;

/// Guards against stack exhaustion on adversarial nesting.
const MAX_DEPTH: usize = 128;

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("nothing to repair")]
    Empty,

    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { found: char, offset: usize },

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("nesting deeper than 128 levels")]
    TooDeep,

    #[error("repaired text is still not valid JSON: {0}")]
    Reparse(#[from] serde_json::Error),
}

/// Rewrites a malformed JSON candidate into canonical JSON text.
pub fn repair(candidate: &str) -> Result<String, RepairError> {
    parse_lenient(candidate).map(|value| value.to_string())
}

/// Parses a top-level object or array, ignoring any text after it.
pub fn parse_lenient(input: &str) -> Result<Value, RepairError> {
    let mut reader = Reader::new(input);
    reader.skip_trivia();

    match reader.peek() {
        None => Err(RepairError::Empty),
        Some('{') | Some('[') => reader.value(0),
        Some(found) => Err(RepairError::Unexpected {
            found,
            offset: reader.pos,
        }),
    }
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
}

impl Reader {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self) -> RepairError {
        match self.peek() {
            Some(found) => RepairError::Unexpected {
                found,
                offset: self.pos,
            },
            None => RepairError::UnexpectedEnd,
        }
    }

    /// Skips whitespace, BOMs, `//` line comments and `/* */` block comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() || c == '\u{FEFF}' => self.pos += 1,
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    while self.peek().is_some() {
                        if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => return,
            }
        }
    }

    fn value(&mut self, depth: usize) -> Result<Value, RepairError> {
        if depth > MAX_DEPTH {
            return Err(RepairError::TooDeep);
        }
        self.skip_trivia();

        match self.peek() {
            None => Err(RepairError::UnexpectedEnd),
            Some('{') => self.object(depth),
            Some('[') => self.array(depth),
            Some(c) if string_closers(c).is_some() => self.string().map(Value::String),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_word_char(c) => Ok(self.bare_value()),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn object(&mut self, depth: usize) -> Result<Value, RepairError> {
        self.bump();
        let mut map = Map::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                // Truncated output: close whatever is open.
                None => return Ok(Value::Object(map)),
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let key = match self.peek() {
                Some(c) if string_closers(c).is_some() => self.string()?,
                Some(c) if is_word_char(c) => self.word(),
                _ => return Err(self.unexpected()),
            };

            self.skip_trivia();
            if self.peek() != Some(':') {
                return Err(self.unexpected());
            }
            self.bump();

            let value = self.value(depth + 1)?;
            map.insert(key, value);
        }
    }

    fn array(&mut self, depth: usize) -> Result<Value, RepairError> {
        self.bump();
        let mut items = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Ok(Value::Array(items)),
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                _ => items.push(self.value(depth + 1)?),
            }
        }
    }

    /// Reads a quoted string. A quote only closes the string when what follows
    /// looks like JSON structure, so stray inner quotes are kept as text.
    fn string(&mut self) -> Result<String, RepairError> {
        let start = self.pos;
        let closers = self
            .bump()
            .and_then(string_closers)
            .ok_or_else(|| self.unexpected())?;
        let mut out = String::new();

        loop {
            let c = self.bump().ok_or(RepairError::UnterminatedString(start))?;
            match c {
                '\\' => {
                    let escaped = self.bump().ok_or(RepairError::UnterminatedString(start))?;
                    self.escape(escaped, &mut out);
                }
                c if closers.contains(&c) && self.at_string_end() => return Ok(out),
                c if c.is_control() => out.push(' '),
                c => out.push(c),
            }
        }
    }

    fn at_string_end(&self) -> bool {
        let mut offset = 0;
        let mut saw_newline = false;

        while let Some(c) = self.peek_at(offset) {
            if !c.is_whitespace() {
                return matches!(c, ',' | '}' | ']' | ':')
                    || (offset > 0 && string_closers(c).is_some())
                    || (saw_newline && is_word_char(c));
            }
            saw_newline |= c == '\n';
            offset += 1;
        }

        true
    }

    fn escape(&mut self, escaped: char, out: &mut String) {
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'u' => {
                let Some(high) = self.hex4() else {
                    out.push('u');
                    return;
                };
                if (0xD800..0xDC00).contains(&high)
                    && self.peek() == Some('\\')
                    && self.peek_at(1) == Some('u')
                {
                    let checkpoint = self.pos;
                    self.pos += 2;
                    match self.hex4() {
                        Some(low) if (0xDC00..0xE000).contains(&low) => {
                            let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                            out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                            return;
                        }
                        _ => self.pos = checkpoint,
                    }
                }
                out.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
            }
            // Unknown escapes (\', \", \\, \/ and friends) keep the character.
            other => out.push(other),
        }
    }

    fn hex4(&mut self) -> Option<u32> {
        let digits: String = (0..4).filter_map(|i| self.peek_at(i)).collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        self.pos += 4;
        u32::from_str_radix(&digits, 16).ok()
    }

    fn number(&mut self) -> Result<Value, RepairError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                self.pos += 1;
            } else {
                break;
            }
        }

        let raw: String = self.chars[start..self.pos].iter().collect();
        let mut text = raw.trim_start_matches('+').to_string();
        if text.starts_with('.') {
            text.insert(0, '0');
        } else if text.starts_with("-.") {
            text.insert(1, '0');
        }
        if text.ends_with('.') {
            text.push('0');
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(value @ Value::Number(_)) => Ok(value),
            _ => Err(RepairError::InvalidNumber(raw)),
        }
    }

    fn word(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| is_word_char(c) || c == '-') {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Literals, plus single unquoted words which are kept as strings.
    fn bare_value(&mut self) -> Value {
        let word = self.word();
        match word.as_str() {
            "true" | "True" => Value::Bool(true),
            "false" | "False" => Value::Bool(false),
            "null" | "None" | "undefined" => Value::Null,
            _ => Value::String(word),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
