//! Parameter reconciliation: bring a current table in line with an expected
//! one without overwriting live values.
//!
//! 1. Prune: unless outdated keys are kept, drop every current key the
//!    expected table does not have, at every level where both sides hold a
//!    table.
//! 2. Diff: collect the expected entries current lacks. A key that is a table
//!    in expected but a scalar in current is missing as a whole subtree.
//! 3. Resolve each missing leaf, in expected order: a non-empty environment
//!    variable wins; otherwise, when a prompt is available, the user is asked
//!    with the template default offered. Leaves settled by the environment
//!    are not asked for.
//! 4. Fill: merge the resolved entries into current. Current values always
//!    win over defaults.

use indexmap::map::Entry;

use crate::codec;
use crate::env::{self, EnvVars};
use crate::error::DistconfError;
use crate::prompt::Prompt;
use crate::types::EnvMapping;
use crate::value::{Table, Value};

/// Settings for one reconciliation. Immutable for the duration of a call.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Base name: prefixes implicit env variable names and appears in the
    /// prompt banner.
    pub name: Option<String>,
    /// Keep keys that are no longer in the expected table.
    pub keep_outdated: bool,
    pub env: EnvMapping,
}

/// Reconcile `current` against `expected`.
///
/// Without a prompt the run is non-interactive and unresolved leaves keep
/// their expected default. Only prompt I/O can fail.
pub fn update_params(
    expected: &Table,
    current: Table,
    options: &MergeOptions,
    env: &EnvVars,
    prompt: Option<&mut dyn Prompt>,
) -> Result<Table, DistconfError> {
    let current = if options.keep_outdated {
        current
    } else {
        prune(current, expected)
    };

    let mut missing = diff(expected, &current);
    if missing.is_empty() {
        return Ok(current);
    }

    let mut resolver = Resolver {
        options,
        env,
        prompt,
        announced: false,
    };
    resolver.resolve(&mut missing, "")?;

    Ok(fill(current, missing))
}

fn prune(current: Table, expected: &Table) -> Table {
    current
        .into_iter()
        .filter_map(|(key, value)| {
            let Some(expected_value) = expected.get(&key) else {
                tracing::debug!(key = %key, "Dropping outdated parameter");
                return None;
            };
            let value = match (value, expected_value) {
                (Value::Table(sub), Value::Table(expected_sub)) => {
                    Value::Table(prune(sub, expected_sub))
                }
                (value, _) => value,
            };
            Some((key, value))
        })
        .collect()
}

fn diff(expected: &Table, current: &Table) -> Table {
    let mut missing = Table::new();
    for (key, expected_value) in expected {
        match (expected_value, current.get(key)) {
            (_, None) => {
                missing.insert(key.clone(), expected_value.clone());
            }
            (Value::Table(expected_sub), Some(Value::Table(current_sub))) => {
                let sub = diff(expected_sub, current_sub);
                if !sub.is_empty() {
                    missing.insert(key.clone(), Value::Table(sub));
                }
            }
            (Value::Table(_), Some(_)) => {
                missing.insert(key.clone(), expected_value.clone());
            }
            _ => {}
        }
    }
    missing
}

/// Deep-merge `missing` into `current`. Existing current leaves win; a
/// scalar in current under a table-shaped missing entry is replaced.
fn fill(mut current: Table, missing: Table) -> Table {
    for (key, missing_value) in missing {
        match current.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(missing_value);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), missing_value) {
                (Value::Table(current_sub), Value::Table(missing_sub)) => {
                    let merged = fill(std::mem::take(current_sub), missing_sub);
                    *current_sub = merged;
                }
                (existing, replacement @ Value::Table(_)) => *existing = replacement,
                _ => {}
            },
        }
    }
    current
}

struct Resolver<'a, 'p> {
    options: &'a MergeOptions,
    env: &'a EnvVars,
    prompt: Option<&'p mut dyn Prompt>,
    announced: bool,
}

impl Resolver<'_, '_> {
    fn resolve(&mut self, missing: &mut Table, prefix: &str) -> Result<(), DistconfError> {
        for (key, value) in missing.iter_mut() {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if let Value::Table(sub) = value {
                self.resolve(sub, &path)?;
                continue;
            }

            let name = self.options.name.as_deref();
            if let Some(found) = env::lookup(self.env, &self.options.env, name, &path) {
                tracing::debug!(key = %path, "Using environment value");
                *value = found;
                continue;
            }

            let Some(prompt) = self.prompt.as_deref_mut() else {
                tracing::debug!(key = %path, "Using template default");
                continue;
            };

            if !self.announced {
                self.announced = true;
                prompt
                    .banner(&banner(name))
                    .map_err(|source| DistconfError::Prompt {
                        key: path.clone(),
                        source,
                    })?;
            }

            let default = codec::encode(value);
            let answer = prompt
                .ask(&path, &default)
                .map_err(|source| DistconfError::Prompt {
                    key: path.clone(),
                    source,
                })?;
            *value = codec::decode(&answer);
        }
        Ok(())
    }
}

fn banner(name: Option<&str>) -> String {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("Some {name} parameters are missing. Please provide them."),
        None => "Some parameters are missing. Please provide them.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::CannedPrompt;
    use crate::table;
    use indexmap::IndexMap;

    fn no_env() -> MergeOptions {
        MergeOptions {
            env: EnvMapping::Explicit(IndexMap::new()),
            ..MergeOptions::default()
        }
    }

    fn update(expected: &Table, current: Table, options: &MergeOptions) -> Table {
        update_params(expected, current, options, &EnvVars::default(), None).unwrap()
    }

    fn keys(table: &Table) -> Vec<&str> {
        table.keys().map(String::as_str).collect()
    }

    #[test]
    fn expected_params_are_present() {
        let expected = table! { "expected" => "foo" };
        let params = update(&expected, Table::new(), &MergeOptions::default());
        assert_eq!(keys(&params), ["expected"]);
    }

    #[test]
    fn outdated_params_are_removed() {
        let expected = table! { "expected" => "foo" };
        let params = update(&expected, table! { "outdated" => "bar" }, &MergeOptions::default());
        assert_eq!(keys(&params), ["expected"]);
    }

    #[test]
    fn outdated_params_are_kept_on_request() {
        let options = MergeOptions {
            keep_outdated: true,
            ..no_env()
        };
        let params = update(
            &table! { "expected" => "foo" },
            table! { "outdated" => "bar" },
            &options,
        );
        assert_eq!(params, table! { "outdated" => "bar", "expected" => "foo" });
    }

    #[test]
    fn nested_outdated_params_are_pruned() {
        let expected = table! { "db" => table! { "host" => "h" } };
        let current = table! { "db" => table! { "host" => "live", "legacy" => 1 } };
        let params = update(&expected, current, &no_env());
        assert_eq!(params, table! { "db" => table! { "host" => "live" } });
    }

    #[test]
    fn keep_outdated_applies_at_every_level() {
        let options = MergeOptions {
            keep_outdated: true,
            ..no_env()
        };
        let expected = table! { "db" => table! { "host" => "h" } };
        let current = table! { "db" => table! { "legacy" => 1 } };
        let params = update(&expected, current, &options);
        assert_eq!(
            params,
            table! { "db" => table! { "legacy" => 1, "host" => "h" } }
        );
    }

    #[test]
    fn defaults_fill_missing_values() {
        let expected = table! { "expected" => "default" };
        assert_eq!(update(&expected, Table::new(), &no_env()), expected);
    }

    #[test]
    fn current_values_are_kept() {
        let expected = table! { "key" => "template" };
        let current = table! { "key" => "live" };
        assert_eq!(update(&expected, current.clone(), &no_env()), current);
    }

    #[test]
    fn nested_missing_leaf_is_filled() {
        let expected = table! { "a" => 1, "b" => table! { "x" => "1", "y" => "2" } };
        let current = table! { "b" => table! { "x" => "1" } };
        let params = update(&expected, current, &no_env());
        assert_eq!(
            params,
            table! { "a" => 1, "b" => table! { "x" => "1", "y" => "2" } }
        );
    }

    #[test]
    fn nested_current_value_wins_over_default() {
        let expected = table! {
            "parameters" => table! { "expected-1" => "other-default", "expected-2" => "expected-value-2" },
            "expected-3" => "expected-value-3",
        };
        let current = table! { "parameters" => table! { "expected-1" => "expected-value" } };
        let params = update(&expected, current, &no_env());
        assert_eq!(
            params,
            table! {
                "parameters" => table! { "expected-1" => "expected-value", "expected-2" => "expected-value-2" },
                "expected-3" => "expected-value-3",
            }
        );
    }

    #[test]
    fn scalar_current_is_replaced_by_expected_tree() {
        let expected = table! { "db" => table! { "host" => "localhost" } };
        let current = table! { "db" => "sqlite://memory" };
        let params = update(&expected, current, &no_env());
        assert_eq!(params, expected);
    }

    #[test]
    fn table_current_under_scalar_expected_is_kept() {
        let expected = table! { "db" => "dsn" };
        let current = table! { "db" => table! { "host" => "x" } };
        let params = update(&expected, current.clone(), &no_env());
        assert_eq!(params, current);
    }

    #[test]
    fn implicit_env_overrides_default() {
        let env: EnvVars = [("FOO", "bar")].into_iter().collect();
        let params = update_params(
            &table! { "foo" => "default" },
            Table::new(),
            &MergeOptions::default(),
            &env,
            None,
        )
        .unwrap();
        assert_eq!(params, table! { "foo" => "bar" });
    }

    #[test]
    fn implicit_env_uses_base_name_prefix() {
        let env: EnvVars = [("NAME_FOO", "from-env"), ("FOO", "unprefixed")]
            .into_iter()
            .collect();
        let options = MergeOptions {
            name: Some("name".into()),
            ..MergeOptions::default()
        };
        let params =
            update_params(&table! { "foo" => "default" }, Table::new(), &options, &env, None)
                .unwrap();
        assert_eq!(params, table! { "foo" => "from-env" });
    }

    #[test]
    fn implicit_env_uses_full_dotted_path() {
        let env: EnvVars = [("PARAMETERS_DB_PORT", "5433")].into_iter().collect();
        let expected = table! { "parameters" => table! { "db" => table! { "port" => 5432 } } };
        let params =
            update_params(&expected, Table::new(), &MergeOptions::default(), &env, None).unwrap();
        assert_eq!(
            params,
            table! { "parameters" => table! { "db" => table! { "port" => 5433 } } }
        );
    }

    #[test]
    fn explicit_env_map_is_used() {
        let env: EnvVars = [("CUSTOM_VAR", "mapped")].into_iter().collect();
        let options = MergeOptions {
            name: Some("name".into()),
            env: EnvMapping::Explicit(IndexMap::from([("foo".into(), "CUSTOM_VAR".into())])),
            ..MergeOptions::default()
        };
        let params =
            update_params(&table! { "foo" => "default" }, Table::new(), &options, &env, None)
                .unwrap();
        assert_eq!(params, table! { "foo" => "mapped" });
    }

    #[test]
    fn explicit_env_map_excludes_unlisted_keys() {
        let env: EnvVars = [("FOO", "ignored")].into_iter().collect();
        let params =
            update_params(&table! { "foo" => "default" }, Table::new(), &no_env(), &env, None)
                .unwrap();
        assert_eq!(params, table! { "foo" => "default" });
    }

    #[test]
    fn env_never_overrides_current_values() {
        let env: EnvVars = [("FOO", "env")].into_iter().collect();
        let params = update_params(
            &table! { "foo" => "default" },
            table! { "foo" => "live" },
            &MergeOptions::default(),
            &env,
            None,
        )
        .unwrap();
        assert_eq!(params, table! { "foo" => "live" });
    }

    #[test]
    fn interactive_asks_each_missing_leaf_once() {
        let mut prompt = CannedPrompt::accepting_defaults();
        let expected = table! {
            "parameters" => table! { "expected-1" => "v1", "expected-2" => "v2" },
            "expected-3" => "v3",
        };
        let current = table! { "parameters" => table! { "expected-1" => "live" } };
        let params = update_params(&expected, current, &no_env(), &EnvVars::default(), Some(&mut prompt))
            .unwrap();

        assert_eq!(
            prompt.questions(),
            ["parameters.expected-2", "expected-3"]
        );
        assert_eq!(
            params,
            table! {
                "parameters" => table! { "expected-1" => "live", "expected-2" => "v2" },
                "expected-3" => "v3",
            }
        );
    }

    #[test]
    fn banner_is_shown_once_with_name() {
        let mut prompt = CannedPrompt::accepting_defaults();
        let options = MergeOptions {
            name: Some("parameters".into()),
            ..no_env()
        };
        update_params(
            &table! { "a" => 1, "b" => 2 },
            Table::new(),
            &options,
            &EnvVars::default(),
            Some(&mut prompt),
        )
        .unwrap();
        assert_eq!(
            prompt.banners,
            ["Some parameters parameters are missing. Please provide them."]
        );
    }

    #[test]
    fn no_banner_when_nothing_is_missing() {
        let mut prompt = CannedPrompt::accepting_defaults();
        let config = table! { "foo" => "bar" };
        update_params(&config, config.clone(), &no_env(), &EnvVars::default(), Some(&mut prompt))
            .unwrap();
        assert!(prompt.banners.is_empty());
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn defaults_are_offered_encoded() {
        let cases = [
            ("string", Value::from("foo"), "\"foo\""),
            ("true", Value::Bool(true), "true"),
            ("false", Value::Bool(false), "false"),
            ("null", Value::Null, "null"),
            ("integer", Value::Integer(123), "123"),
            ("float", Value::Float(12.3), "12.3"),
            ("empty", Value::from(""), "\"\""),
            ("infinity", Value::Float(f64::INFINITY), "Infinity"),
        ];
        for (key, value, encoded) in cases {
            let mut prompt = CannedPrompt::accepting_defaults();
            let expected = table! { key => value.clone() };
            let params =
                update_params(&expected, Table::new(), &no_env(), &EnvVars::default(), Some(&mut prompt))
                    .unwrap();
            assert_eq!(prompt.asked, [(key.to_string(), encoded.to_string())]);
            assert_eq!(params, expected, "{key}");
        }
    }

    #[test]
    fn answers_are_decoded() {
        let cases = [
            ("\"foo\"", Value::from("foo")),
            ("foo", Value::from("foo")),
            ("true", Value::Bool(true)),
            ("null", Value::Null),
            ("123", Value::Integer(123)),
            ("12.3", Value::Float(12.3)),
            ("\"\"", Value::from("")),
        ];
        for (answer, parsed) in cases {
            let mut prompt = CannedPrompt::answering([answer]);
            let params = update_params(
                &table! { "key" => "default" },
                Table::new(),
                &no_env(),
                &EnvVars::default(),
                Some(&mut prompt),
            )
            .unwrap();
            assert_eq!(params, table! { "key" => parsed }, "{answer}");
        }
    }

    #[test]
    fn env_resolved_leaves_are_not_prompted() {
        let env: EnvVars = [("FOO", "from-env")].into_iter().collect();
        let mut prompt = CannedPrompt::answering(["typed"]);
        let params = update_params(
            &table! { "foo" => "default", "bar" => "default" },
            Table::new(),
            &MergeOptions::default(),
            &env,
            Some(&mut prompt),
        )
        .unwrap();
        assert_eq!(prompt.questions(), ["bar"]);
        assert_eq!(params, table! { "foo" => "from-env", "bar" => "typed" });
    }

    #[test]
    fn prompt_failure_propagates() {
        let mut prompt = CannedPrompt::failing();
        let err = update_params(
            &table! { "foo" => "default" },
            Table::new(),
            &no_env(),
            &EnvVars::default(),
            Some(&mut prompt),
        )
        .unwrap_err();
        assert!(matches!(err, DistconfError::Prompt { ref key, .. } if key == "foo"));
    }
}
