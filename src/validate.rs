//! Strict parsing of the settings file.
//!
//! The TOML is deserialized once into the all-optional `C::Layer`, with
//! `serde_ignored` watching for keys the layer does not consume. Any such
//! key fails the load with the line it sits on.

use std::collections::HashMap;
use std::path::Path;

use confique::Config;
use serde::Deserialize;

use crate::error::DistconfError;

/// Parse TOML `content` into the layer of settings type `C`, rejecting keys
/// that `C` does not define.
pub fn parse_layer<C: Config>(content: &str, path: &Path) -> Result<C::Layer, DistconfError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut ignored: Vec<String> = Vec::new();
    let layer = serde_ignored::deserialize(toml::Deserializer::new(content), |key| {
        ignored.push(key.to_string());
    })
    .map_err(|source| DistconfError::SettingsParse {
        path: path.to_path_buf(),
        source,
    })?;

    if ignored.is_empty() {
        return Ok(layer);
    }

    let lines = key_lines(content);
    Err(DistconfError::UnknownKeys(
        ignored
            .into_iter()
            .map(|key| DistconfError::UnknownKey {
                line: lines.get(&key).copied().unwrap_or(0),
                key,
                path: path.to_path_buf(),
            })
            .collect(),
    ))
}

/// Map every dotted key defined in `content` to its 1-indexed line.
///
/// Table headers count as the definition of the table key. Keys under
/// `[[array]]` headers and inside inline tables are not indexed.
fn key_lines(content: &str) -> HashMap<String, usize> {
    let mut lines = HashMap::new();
    let mut section: Option<Vec<String>> = Some(Vec::new());

    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with("[[") {
            section = None;
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let header = header.split(']').next().unwrap_or_default();
            let segments = segments(header);
            lines.entry(segments.join(".")).or_insert(i + 1);
            section = Some(segments);
            continue;
        }
        let (Some(prefix), Some((key, _))) = (&section, split_assignment(line)) else {
            continue;
        };
        let mut full = prefix.clone();
        full.extend(segments(key));
        lines.entry(full.join(".")).or_insert(i + 1);
    }
    lines
}

/// Split `key = value` at the first `=` outside quotes.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let mut quote = None;
    for (i, c) in line.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '=') => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Key segments of a (possibly dotted, possibly quoted) TOML key.
fn segments(key: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote = None;
    for c in key.chars() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '.') => out.push(std::mem::take(&mut current).trim().to_string()),
            (None, c) if c.is_whitespace() => {}
            _ => current.push(c),
        }
    }
    out.push(current.trim().to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("/project/distconf.toml")
    }

    fn unknown(content: &str) -> Vec<(String, usize)> {
        match parse_layer::<Settings>(content, &path()) {
            Ok(_) => vec![],
            Err(DistconfError::UnknownKeys(keys)) => keys
                .into_iter()
                .map(|e| match e {
                    DistconfError::UnknownKey { key, line, .. } => (key, line),
                    other => panic!("Expected UnknownKey, got: {other:?}"),
                })
                .collect(),
            Err(other) => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn valid_settings_parse_into_the_layer() {
        let content = r#"
keep_outdated = true
interactive = false
dist_marker = "template"
name = "app"

[dirs]
"config/dist" = "config"

[env_map]
"db.host" = "DB_HOST"
"#;
        let layer = parse_layer::<Settings>(content, &path()).unwrap();
        assert_eq!(layer.keep_outdated, Some(true));
        assert_eq!(layer.dist_marker.as_deref(), Some("template"));
        assert_eq!(layer.dirs.unwrap().get("config/dist").map(String::as_str), Some("config"));
    }

    #[test]
    fn empty_content_is_an_empty_layer() {
        let layer = parse_layer::<Settings>("", &path()).unwrap();
        assert!(layer.keep_outdated.is_none());
        assert!(layer.name.is_none());
    }

    #[test]
    fn unknown_top_level_key() {
        assert_eq!(
            unknown("keep_outdated = true\nkeep_outdatd = true\n"),
            [("keep_outdatd".to_string(), 2)]
        );
    }

    #[test]
    fn every_unknown_key_is_reported() {
        assert_eq!(
            unknown("typo1 = 1\n# note\ntypo2 = 2\n"),
            [("typo1".to_string(), 1), ("typo2".to_string(), 3)]
        );
    }

    #[test]
    fn unknown_table_points_at_its_header() {
        let content = "[dirs]\n\"a\" = \"b\"\n\n[extra]\nflag = true\n";
        assert_eq!(unknown(content), [("extra".to_string(), 4)]);
    }

    #[test]
    fn key_lines_follow_sections_and_quotes() {
        let lines = key_lines("name = \"x\"\n[dirs]\n\"a.b\" = 1\n'c' = \"=\"\n[env_map]\nd.e = 2\n");
        assert_eq!(lines.get("name"), Some(&1));
        assert_eq!(lines.get("dirs"), Some(&2));
        assert_eq!(lines.get("dirs.a.b"), Some(&3));
        assert_eq!(lines.get("dirs.c"), Some(&4));
        assert_eq!(lines.get("env_map.d.e"), Some(&6));
    }

    #[test]
    fn array_table_keys_are_not_indexed() {
        let lines = key_lines("[[items]]\nname = 1\n");
        assert_eq!(lines.get("name"), None);
        assert_eq!(lines.get("items.name"), None);
    }

    #[test]
    fn error_includes_file_path() {
        let err = parse_layer::<Settings>("typo = 1\n", &path()).unwrap_err();
        match err {
            DistconfError::UnknownKeys(keys) => {
                assert!(keys[0].to_string().contains("distconf.toml"));
            }
            other => panic!("Expected UnknownKeys, got: {other:?}"),
        }
    }

    #[test]
    fn syntax_error_is_a_settings_parse_error() {
        let err = parse_layer::<Settings>("keep_outdated = \n", &path()).unwrap_err();
        assert!(matches!(err, DistconfError::SettingsParse { .. }));
    }
}
