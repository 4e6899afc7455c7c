//! PHP scripts that `return` an array literal.
//!
//! Writing follows `var_export` layout. Reading accepts one statement,
//! `return <literal>;`, where the literal is built from `array(...)` or
//! `[...]`, quoted strings, numbers, `true`, `false` and `null`. Nothing is
//! executed. A script with no `return` reads as an empty table.

use crate::error::FormatError;
use crate::format::Format;
use crate::value::{Table, Value};

pub const HEADER: &str = "<?php\n// This file was auto-generated by distconf\n";

pub fn dump(table: &Table) -> Result<String, FormatError> {
    let mut out = String::from(HEADER);
    out.push_str("\nreturn ");
    write_table(&mut out, &keyed(table), 0, "")?;
    out.push_str(";\n");
    Ok(out)
}

type Entries<'a> = Vec<(String, &'a Value)>;

fn keyed(table: &Table) -> Entries<'_> {
    table.iter().map(|(k, v)| (quote(k), v)).collect()
}

fn indexed(items: &[Value]) -> Entries<'_> {
    items.iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect()
}

fn write_table(out: &mut String, entries: &[(String, &Value)], level: usize, path: &str) -> Result<(), FormatError> {
    let indent = "  ".repeat(level);
    out.push_str("array (\n");
    for (key, value) in entries {
        out.push_str(&format!("{indent}  {key} => "));
        let child = if path.is_empty() {
            key.trim_matches('\'').to_string()
        } else {
            format!("{path}.{}", key.trim_matches('\''))
        };
        match value {
            Value::Table(sub) => {
                out.push_str(&format!("\n{indent}  "));
                write_table(out, &keyed(sub), level + 1, &child)?;
            }
            Value::List(items) => {
                out.push_str(&format!("\n{indent}  "));
                write_table(out, &indexed(items), level + 1, &child)?;
            }
            scalar => out.push_str(&scalar_literal(scalar, &child)?),
        }
        out.push_str(",\n");
    }
    out.push_str(&format!("{indent})"));
    Ok(())
}

fn scalar_literal(value: &Value, path: &str) -> Result<String, FormatError> {
    Ok(match value {
        Value::Null => "NULL".into(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_nan() => "NAN".into(),
        Value::Float(f) if f.is_infinite() && *f > 0.0 => "INF".into(),
        Value::Float(f) if f.is_infinite() => "-INF".into(),
        Value::Float(f) => format!("{f:?}"),
        Value::String(s) => quote(s),
        Value::List(_) | Value::Table(_) => {
            return Err(FormatError::Unrepresentable {
                key: path.to_string(),
                format: Format::Php,
                reason: "collection passed as scalar".into(),
            });
        }
    })
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn parse(content: &str) -> Result<Table, FormatError> {
    let mut parser = Parser::new(content);
    parser.skip_open_tag();
    parser.skip_trivia();
    if parser.at_end() || parser.eat_str("?>") {
        return Ok(Table::new());
    }
    if !parser.eat_keyword("return") {
        return Err(parser.error("expected a `return` statement"));
    }
    let value = parser.literal()?;
    parser.skip_trivia();
    parser.eat(b';');
    parser.skip_trivia();
    parser.eat_str("?>");
    parser.skip_trivia();
    if !parser.at_end() {
        return Err(parser.error("unexpected content after the returned literal"));
    }

    match value {
        Value::Table(table) => Ok(table),
        Value::List(items) => Ok(items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect()),
        other => Err(FormatError::NotAMapping {
            found: other.type_name(),
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn error(&self, reason: &str) -> FormatError {
        FormatError::Php {
            offset: self.pos,
            reason: reason.to_string(),
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume a case-insensitive keyword not followed by an identifier char.
    fn eat_keyword(&mut self, word: &str) -> bool {
        let rest = self.rest();
        let matches = rest.len() >= word.len()
            && rest.is_char_boundary(word.len())
            && rest[..word.len()].eq_ignore_ascii_case(word)
            && !rest[word.len()..]
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_');
        if matches {
            self.pos += word.len();
        }
        matches
    }

    fn skip_open_tag(&mut self) {
        self.skip_whitespace();
        self.eat_str("<?php");
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.eat_str("//") || self.eat(b'#') {
                match self.rest().find('\n') {
                    Some(end) => self.pos += end + 1,
                    None => self.pos = self.src.len(),
                }
            } else if self.eat_str("/*") {
                match self.rest().find("*/") {
                    Some(end) => self.pos += end + 2,
                    None => self.pos = self.src.len(),
                }
            } else {
                break;
            }
        }
    }

    fn literal(&mut self) -> Result<Value, FormatError> {
        self.skip_trivia();
        if self.eat_keyword("array") {
            self.skip_trivia();
            if !self.eat(b'(') {
                return Err(self.error("expected `(` after `array`"));
            }
            return self.items(b')');
        }
        match self.peek() {
            Some(b'[') => {
                self.pos += 1;
                self.items(b']')
            }
            Some(b'\'') => self.single_quoted().map(Value::String),
            Some(b'"') => self.double_quoted().map(Value::String),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.number(),
            _ => self.constant(),
        }
    }

    fn constant(&mut self) -> Result<Value, FormatError> {
        if self.eat_keyword("true") {
            Ok(Value::Bool(true))
        } else if self.eat_keyword("false") {
            Ok(Value::Bool(false))
        } else if self.eat_keyword("null") {
            Ok(Value::Null)
        } else if self.eat_keyword("NAN") {
            Ok(Value::Float(f64::NAN))
        } else if self.eat_keyword("INF") {
            Ok(Value::Float(f64::INFINITY))
        } else {
            Err(self.error("expected a literal value"))
        }
    }

    fn number(&mut self) -> Result<Value, FormatError> {
        let start = self.pos;
        let negative = self.eat(b'-');
        if !negative {
            self.eat(b'+');
        }
        if self.eat_keyword("INF") {
            return Ok(Value::Float(if negative {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }));
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'_'))
            || (self.pos > start
                && matches!(self.peek(), Some(b'-' | b'+'))
                && matches!(self.src.as_bytes()[self.pos - 1], b'e' | b'E'))
        {
            self.pos += 1;
        }
        let text: String = self.src[start..self.pos].chars().filter(|&c| c != '_').collect();
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| self.error("malformed number"))
    }

    fn single_quoted(&mut self) -> Result<String, FormatError> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\'' => {
                    self.pos += offset + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, escaped @ ('\\' | '\''))) => out.push(escaped),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    fn double_quoted(&mut self) -> Result<String, FormatError> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, 'v')) => out.push('\x0b'),
                    Some((_, 'e')) => out.push('\x1b'),
                    Some((_, 'f')) => out.push('\x0c'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, escaped @ ('\\' | '"' | '$'))) => out.push(escaped),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                c => out.push(c),
            }
        }
        Err(self.error("unterminated string"))
    }

    /// Parse `key => value` or positional items up to `close`.
    ///
    /// Arrays whose keys are all implicit or integer literals counting up
    /// from 0 become lists. Anything else becomes a table, with implicit keys
    /// numbered after the largest integer key seen so far. Quoted keys keep
    /// `'0' => ...` arrays as tables.
    fn items(&mut self, close: u8) -> Result<Value, FormatError> {
        let mut entries: Vec<(Option<Key>, Value)> = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat(close) {
                break;
            }
            let first = self.literal()?;
            self.skip_trivia();
            if self.eat_str("=>") {
                let key = match first {
                    Value::String(s) => Key::Name(s),
                    Value::Integer(i) => Key::Index(i),
                    Value::Bool(b) => Key::Index(i64::from(b)),
                    Value::Null => Key::Name(String::new()),
                    _ => return Err(self.error("array keys must be strings or integers")),
                };
                let value = self.literal()?;
                entries.push((Some(key), value));
            } else {
                entries.push((None, first));
            }
            self.skip_trivia();
            if self.eat(close) {
                break;
            }
            if !self.eat(b',') {
                return Err(self.error("expected `,` between array items"));
            }
        }

        let positional = entries.iter().zip(0i64..).all(|((key, _), i)| match key {
            None => true,
            Some(Key::Index(k)) => *k == i,
            Some(Key::Name(_)) => false,
        });
        if positional && !entries.is_empty() {
            return Ok(Value::List(entries.into_iter().map(|(_, v)| v).collect()));
        }

        let mut table = Table::new();
        let mut next_index = 0i128;
        for (key, value) in entries {
            let key = match key {
                Some(Key::Index(i)) => {
                    next_index = next_index.max(i128::from(i) + 1);
                    i.to_string()
                }
                Some(Key::Name(name)) => {
                    if let Ok(i) = name.parse::<i128>() {
                        next_index = next_index.max(i.saturating_add(1));
                    }
                    name
                }
                None => {
                    let key = next_index.to_string();
                    next_index = next_index.saturating_add(1);
                    key
                }
            };
            table.insert(key, value);
        }
        Ok(Value::Table(table))
    }
}

enum Key {
    Index(i64),
    Name(String),
}
