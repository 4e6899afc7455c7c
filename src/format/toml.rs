//! TOML via the `toml` crate. TOML has no null, so tables holding one cannot
//! be written. Datetimes are read as their RFC 3339 text.

use crate::error::FormatError;
use crate::format::Format;
use crate::value::{Table, Value};

pub fn parse(content: &str) -> Result<Table, FormatError> {
    let doc: ::toml::Table = ::toml::from_str(content)?;
    Ok(from_toml_table(doc))
}

pub fn dump(table: &Table) -> Result<String, FormatError> {
    let doc = to_toml_table(table, "")?;
    Ok(::toml::to_string(&doc)?)
}

fn from_toml_table(doc: ::toml::Table) -> Table {
    doc.into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect()
}

fn from_toml(value: ::toml::Value) -> Value {
    match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::Integer(i),
        ::toml::Value::Float(f) => Value::Float(f),
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => Value::List(items.into_iter().map(from_toml).collect()),
        ::toml::Value::Table(sub) => Value::Table(from_toml_table(sub)),
    }
}

fn to_toml_table(table: &Table, prefix: &str) -> Result<::toml::Table, FormatError> {
    let mut doc = ::toml::Table::new();
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        doc.insert(key.clone(), to_toml(value, &path)?);
    }
    Ok(doc)
}

fn to_toml(value: &Value, path: &str) -> Result<::toml::Value, FormatError> {
    Ok(match value {
        Value::Null => {
            return Err(FormatError::Unrepresentable {
                key: path.to_string(),
                format: Format::Toml,
                reason: "TOML has no null value".into(),
            });
        }
        Value::Bool(b) => ::toml::Value::Boolean(*b),
        Value::Integer(i) => ::toml::Value::Integer(*i),
        Value::Float(f) => ::toml::Value::Float(*f),
        Value::String(s) => ::toml::Value::String(s.clone()),
        Value::List(items) => ::toml::Value::Array(
            items
                .iter()
                .map(|item| to_toml(item, path))
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(sub) => ::toml::Value::Table(to_toml_table(sub, path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table;

    #[test]
    fn parses_sections_in_order() {
        let content = "name = \"app\"\n\n[database]\nhost = \"localhost\"\nport = 5432\n";
        let t = parse(content).unwrap();
        assert_eq!(
            t,
            table! {
                "name" => "app",
                "database" => table! { "host" => "localhost", "port" => 5432 },
            }
        );
    }

    #[test]
    fn dump_round_trips() {
        let t = table! {
            "debug" => false,
            "ratio" => 0.5,
            "hosts" => vec![Value::from("a"), Value::from("b")],
            "database" => table! { "host" => "localhost", "port" => 5432 },
        };
        let out = dump(&t).unwrap();
        assert_eq!(parse(&out).unwrap(), t);
        assert_eq!(dump(&parse(&out).unwrap()).unwrap(), out);
    }

    #[test]
    fn null_cannot_be_written() {
        let err = dump(&table! { "db" => table! { "password" => Value::Null } }).unwrap_err();
        match err {
            FormatError::Unrepresentable { key, format, .. } => {
                assert_eq!(key, "db.password");
                assert_eq!(format, Format::Toml);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn datetimes_read_as_text() {
        let t = parse("released = 1979-05-27T07:32:00Z\n").unwrap();
        assert_eq!(t["released"], Value::from("1979-05-27T07:32:00Z"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(parse("a = \n"), Err(FormatError::TomlDe(_))));
    }
}
