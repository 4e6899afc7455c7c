use crate::error::FormatError;
use crate::value::{Table, Value};

pub fn parse(content: &str) -> Result<Table, FormatError> {
    match serde_json::from_str::<Value>(content)? {
        Value::Null => Ok(Table::new()),
        Value::Table(table) => Ok(table),
        other => Err(FormatError::NotAMapping {
            found: other.type_name(),
        }),
    }
}

/// Pretty-printed, newline-terminated.
pub fn dump(table: &Table) -> Result<String, FormatError> {
    let mut out = serde_json::to_string_pretty(table)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::scalar_table;
    use crate::table;

    #[test]
    fn parses_compact_documents() {
        let content = r#"{"string":"foo","btrue":true,"bfalse":false,"nnull":null,"integer":123,"float":12.3,"empty":""}"#;
        assert_eq!(parse(content).unwrap(), scalar_table());
    }

    #[test]
    fn null_document_is_empty() {
        assert!(parse("null").unwrap().is_empty());
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = parse("[1, 2]").unwrap_err();
        assert!(matches!(err, FormatError::NotAMapping { found: "list" }));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse("{\"a\": "), Err(FormatError::Json(_))));
    }

    #[test]
    fn dump_is_pretty_and_ordered() {
        let out = dump(&table! { "b" => 1, "a" => table! { "x" => true } }).unwrap();
        assert_eq!(out, "{\n  \"b\": 1,\n  \"a\": {\n    \"x\": true\n  }\n}\n");
    }

    #[test]
    fn canonical_content_round_trips() {
        let content = dump(&scalar_table()).unwrap();
        assert_eq!(dump(&parse(&content).unwrap()).unwrap(), content);
    }
}
