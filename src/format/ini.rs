//! INI: one `key=value` line per leaf.
//!
//! Nested tables are written as dotted keys (`db.host=localhost`) and rebuilt
//! on read; `[section]` headers are accepted and prefix the keys below them.
//! Lists use repeated `key[]=item` lines. Unquoted values are scanned for
//! booleans, `null` and numbers; strings that would scan as something else
//! are written double-quoted.

use crate::error::FormatError;
use crate::format::Format;
use crate::value::{Table, Value};

pub const HEADER: &str = "; This file was auto-generated by distconf";

pub fn dump(table: &Table) -> Result<String, FormatError> {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    write_entries(&mut out, table, "")?;
    Ok(out)
}

fn write_entries(out: &mut String, table: &Table, prefix: &str) -> Result<(), FormatError> {
    for (key, value) in table {
        if key.is_empty() || key.contains(['.', '=', '[', ']', ';', '#', '\n']) || key != key.trim() {
            return Err(unrepresentable(key, "key contains characters INI cannot hold"));
        }
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) if sub.is_empty() => {
                return Err(unrepresentable(&path, "an empty table has no INI form"));
            }
            Value::List(items) if items.is_empty() => {
                return Err(unrepresentable(&path, "an empty list has no INI form"));
            }
            Value::Table(sub) => write_entries(out, sub, &path)?,
            Value::List(items) => {
                for item in items {
                    out.push_str(&format!("{path}[]={}\n", render(item, &path)?));
                }
            }
            scalar => out.push_str(&format!("{path}={}\n", render(scalar, &path)?)),
        }
    }
    Ok(())
}

fn render(value: &Value, path: &str) -> Result<String, FormatError> {
    Ok(match value {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) if f.is_finite() => format!("{f:?}"),
        Value::Float(_) => return Err(unrepresentable(path, "non-finite float")),
        Value::String(s) if needs_quotes(s) => quote(s),
        Value::String(s) => s.clone(),
        Value::List(_) | Value::Table(_) => {
            return Err(unrepresentable(path, "nested collections inside a list"));
        }
    })
}

fn unrepresentable(key: &str, reason: &str) -> FormatError {
    FormatError::Unrepresentable {
        key: key.to_string(),
        format: Format::Ini,
        reason: reason.to_string(),
    }
}

fn needs_quotes(s: &str) -> bool {
    s != s.trim()
        || s.contains([';', '#', '"', '\'', '\\', '\n', '\r'])
        || !matches!(scan(s), Value::String(_))
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Type an unquoted value: bool, null, integer, float, else string.
fn scan(raw: &str) -> Value {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => return Value::Bool(true),
        "false" | "off" | "no" | "none" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Integer(i);
    }
    let numeric = raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if numeric && let Ok(f) = raw.parse::<f64>() {
        return Value::Float(f);
    }
    Value::String(raw.to_string())
}

pub fn parse(content: &str) -> Result<Table, FormatError> {
    let mut table = Table::new();
    let mut section: Option<String> = None;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| error(line_no, "malformed section header"))?;
            section = Some(name.to_string());
            continue;
        }

        let (key, raw) = line
            .split_once('=')
            .ok_or_else(|| error(line_no, "expected `key=value`"))?;
        let key = key.trim();
        let (key, is_list) = match key.strip_suffix("[]") {
            Some(key) => (key.trim_end(), true),
            None => (key, false),
        };
        if key.is_empty() {
            return Err(error(line_no, "empty key"));
        }

        let value = parse_value(raw.trim(), line_no)?;
        let path = match &section {
            Some(section) => format!("{section}.{key}"),
            None => key.to_string(),
        };
        insert(&mut table, &path, value, is_list).map_err(|reason| error(line_no, &reason))?;
    }

    Ok(table)
}

fn error(line: usize, reason: &str) -> FormatError {
    FormatError::Ini {
        line,
        reason: reason.to_string(),
    }
}

fn parse_value(raw: &str, line: usize) -> Result<Value, FormatError> {
    if let Some(rest) = raw.strip_prefix('"') {
        let (text, tail) = unquote(rest).ok_or_else(|| error(line, "unterminated quoted value"))?;
        return trailing_comment(tail, line).map(|()| Value::String(text));
    }
    if let Some(rest) = raw.strip_prefix('\'') {
        let (text, tail) = rest
            .split_once('\'')
            .ok_or_else(|| error(line, "unterminated quoted value"))?;
        return trailing_comment(tail, line).map(|()| Value::String(text.to_string()));
    }
    let raw = match raw.find(';') {
        Some(pos) => raw[..pos].trim_end(),
        None => raw,
    };
    Ok(scan(raw))
}

fn trailing_comment(tail: &str, line: usize) -> Result<(), FormatError> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with(';') || tail.starts_with('#') {
        Ok(())
    } else {
        Err(error(line, "unexpected text after quoted value"))
    }
}

/// Read a double-quoted body up to its closing quote. Returns the unescaped
/// text and whatever follows the quote.
fn unquote(body: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '"' => return Some((out, &body[pos + 1..])),
            '\\' => match chars.next()?.1 {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                other => out.push(other),
            },
            c => out.push(c),
        }
    }
    None
}

fn insert(table: &mut Table, path: &str, value: Value, is_list: bool) -> Result<(), String> {
    let mut segments: Vec<&str> = path.split('.').map(str::trim).collect();
    let leaf = segments.pop().unwrap_or(path);
    if leaf.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(format!("malformed key `{path}`"));
    }

    let mut current = table;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        current = match slot {
            Value::Table(sub) => sub,
            _ => return Err(format!("`{path}` conflicts with an existing value")),
        };
    }

    match (current.get_mut(leaf), is_list) {
        (Some(Value::List(items)), true) => items.push(value),
        (None, true) => {
            current.insert(leaf.to_string(), Value::List(vec![value]));
        }
        (Some(Value::Table(_)), _) | (Some(_), true) => {
            return Err(format!("`{path}` conflicts with an existing value"));
        }
        (_, false) => {
            current.insert(leaf.to_string(), value);
        }
    }
    Ok(())
}
