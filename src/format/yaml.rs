//! YAML: block style for the first levels, flow style below.
//!
//! Mappings are indented four spaces. From [`INLINE_DEPTH`] down, collections
//! are written inline (`{ a: 1 }`, `[a, b]`), which keeps deeply nested
//! values on one line. Scalars are rendered by `serde_yaml`, so quoting of
//! ambiguous strings (`'123'`, `'yes'`) follows its rules.

use crate::error::FormatError;
use crate::value::{Table, Value};

/// Nesting level at which collections switch to flow style.
const INLINE_DEPTH: usize = 3;
const INDENT: &str = "    ";

pub fn parse(content: &str) -> Result<Table, FormatError> {
    match serde_yaml::from_str::<Value>(content)? {
        Value::Null => Ok(Table::new()),
        Value::Table(table) => Ok(table),
        other => Err(FormatError::NotAMapping {
            found: other.type_name(),
        }),
    }
}

pub fn dump(table: &Table) -> Result<String, FormatError> {
    if table.is_empty() {
        return Ok("{}\n".to_string());
    }
    let mut out = String::new();
    write_block(&mut out, table, 0)?;
    Ok(out)
}

fn write_block(out: &mut String, table: &Table, level: usize) -> Result<(), FormatError> {
    let indent = INDENT.repeat(level);
    for (key, value) in table {
        let key = flow_string(key)?;
        let block = level + 1 < INLINE_DEPTH;
        match value {
            Value::Table(sub) if block && !sub.is_empty() => {
                out.push_str(&format!("{indent}{key}:\n"));
                write_block(out, sub, level + 1)?;
            }
            Value::List(items) if block && !items.is_empty() => {
                out.push_str(&format!("{indent}{key}:\n"));
                for item in items {
                    out.push_str(&format!("{indent}{INDENT}- {}\n", inline(item)?));
                }
            }
            Value::Table(_) | Value::List(_) => {
                out.push_str(&format!("{indent}{key}: {}\n", inline(value)?));
            }
            scalar => out.push_str(&format!("{indent}{key}: {}\n", scalar_text(scalar)?)),
        }
    }
    Ok(())
}

fn inline(value: &Value) -> Result<String, FormatError> {
    match value {
        Value::Table(table) if table.is_empty() => Ok("{}".to_string()),
        Value::Table(table) => {
            let entries = table
                .iter()
                .map(|(key, value)| Ok(format!("{}: {}", flow_string(key)?, inline(value)?)))
                .collect::<Result<Vec<_>, FormatError>>()?;
            Ok(format!("{{ {} }}", entries.join(", ")))
        }
        Value::List(items) => {
            let items = items.iter().map(inline).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", items.join(", ")))
        }
        Value::String(s) => flow_string(s),
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &Value) -> Result<String, FormatError> {
    let text = match value {
        Value::String(s) if s.chars().any(char::is_control) => serde_json::to_string(s)?,
        _ => serde_yaml::to_string(value)?,
    };
    Ok(text.trim_end_matches('\n').to_string())
}

/// A string safe in both block keys and flow collections: plain when
/// `serde_yaml` leaves it plain and it holds no indicator characters,
/// double-quoted otherwise.
fn flow_string(s: &str) -> Result<String, FormatError> {
    let plain = scalar_text(&Value::String(s.to_string()))?;
    let safe = !plain.is_empty()
        && plain
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '@' | ' '))
        && !plain.starts_with(['-', ' '])
        && !plain.ends_with(' ');
    if safe {
        Ok(plain)
    } else {
        Ok(serde_json::to_string(s)?)
    }
}
