use std::collections::HashMap;
use std::sync::Arc;

use super::{ConfigSource, Origin, RawEntry};
use crate::error::{Error, Result};
use crate::options::OptionRegistry;

/// Environment variables named `PREFIX_` followed by the canonical option
/// name upper-cased, with `.` and `-` turned into `_`
/// (`txpool.pricelimit` -> `NODE_TXPOOL_PRICELIMIT`).
pub struct EnvSource {
    prefix: String,
    vars: Vec<(String, String)>,
    registry: Arc<OptionRegistry>,
}

impl EnvSource {
    pub fn new<I, K, V>(registry: Arc<OptionRegistry>, prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        vars.sort_by(|left, right| left.0.cmp(&right.0));
        Self {
            prefix: prefix.into(),
            vars,
            registry,
        }
    }

    /// Snapshots the process environment now; later changes to the
    /// environment are not observed by `load`.
    pub fn from_process_env(registry: Arc<OptionRegistry>, prefix: impl Into<String>) -> Self {
        Self::new(registry, prefix, process_vars())
    }

    pub fn var_name(&self, option: &str) -> String {
        env_var_name(&self.prefix, option)
    }
}

/// Variables that are not valid UTF-8 in name or value cannot name or hold
/// an option and are skipped.
fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let key = key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
                tracing::debug!(var = %key, "skipping variable that is not valid UTF-8");
                None
            }
        })
        .collect()
}

pub fn env_var_name(prefix: &str, option: &str) -> String {
    let suffix = option.to_ascii_uppercase().replace(['.', '-'], "_");
    if prefix.is_empty() {
        suffix
    } else {
        format!("{}_{suffix}", prefix.to_ascii_uppercase())
    }
}

impl ConfigSource for EnvSource {
    fn origin(&self) -> Origin {
        Origin::Env
    }

    fn load(&self) -> Result<Vec<RawEntry>> {
        let mut by_var: HashMap<String, &str> = HashMap::new();
        let mut ambiguous: HashMap<String, (&str, &str)> = HashMap::new();
        for descriptor in self.registry.iter() {
            let var = self.var_name(descriptor.name());
            match by_var.get(&var) {
                Some(first) => {
                    ambiguous.insert(var, (*first, descriptor.name()));
                }
                None => {
                    by_var.insert(var, descriptor.name());
                }
            }
        }

        let marker = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}_", self.prefix.to_ascii_uppercase())
        };

        let mut entries = Vec::new();
        for (key, value) in &self.vars {
            if !key.starts_with(&marker) {
                continue;
            }
            if let Some((first, second)) = ambiguous.get(key.as_str()) {
                return Err(Error::DuplicateOption {
                    name: (*second).to_owned(),
                    existing: (*first).to_owned(),
                    origin: Some(Origin::Env),
                });
            }
            match by_var.get(key.as_str()) {
                Some(option) => entries.push(RawEntry::new(*option, value.as_str(), Origin::Env)),
                None => tracing::debug!(var = %key, "ignoring variable that names no option"),
            }
        }

        tracing::debug!(prefix = %self.prefix, entries = entries.len(), "loaded environment");
        Ok(entries)
    }

    fn describe(&self) -> String {
        format!("environment ({}_*)", self.prefix.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{env_var_name, EnvSource};
    use crate::error::Error;
    use crate::options::{OptionDescriptor, OptionRegistry};
    use crate::sources::{ConfigSource, Origin, RawValue};

    fn registry() -> Arc<OptionRegistry> {
        Arc::new(
            OptionRegistry::from_descriptors([
                OptionDescriptor::integer("txpool.pricelimit", 1),
                OptionDescriptor::bool("db.no-perf-metrics", false),
            ])
            .expect("registry should build"),
        )
    }

    #[test]
    fn derives_variable_names() {
        assert_eq!(
            env_var_name("node", "txpool.pricelimit"),
            "NODE_TXPOOL_PRICELIMIT"
        );
        assert_eq!(
            env_var_name("NODE", "db.no-perf-metrics"),
            "NODE_DB_NO_PERF_METRICS"
        );
        assert_eq!(env_var_name("", "port"), "PORT");
    }

    #[test]
    fn set_variable_naming_two_options_is_rejected() {
        let registry = Arc::new(
            OptionRegistry::from_descriptors([
                OptionDescriptor::string("a.b-c", ""),
                OptionDescriptor::string("a-b.c", ""),
            ])
            .expect("registry should build"),
        );

        let unset = EnvSource::new(Arc::clone(&registry), "NODE", [("NODE_OTHER", "x")]);
        assert!(unset
            .load()
            .expect("unset collision is harmless")
            .is_empty());

        let set = EnvSource::new(registry, "NODE", [("NODE_A_B_C", "x")]);
        match set.load().expect_err("ambiguous variable should fail") {
            Error::DuplicateOption {
                name,
                existing,
                origin,
            } => {
                assert_eq!(name, "a-b.c");
                assert_eq!(existing, "a.b-c");
                assert_eq!(origin, Some(Origin::Env));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn process_snapshot_skips_non_utf8_variables() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        std::env::set_var("NODECONF_ENVTEST_TXPOOL_PRICELIMIT", "25");
        std::env::set_var(
            "NODECONF_ENVTEST_JUNK",
            OsString::from_vec(vec![0xff, 0xfe]),
        );
        std::env::set_var(
            "NODECONF_ENVTEST_DB_NO_PERF_METRICS",
            OsString::from_vec(vec![0xff]),
        );

        let entries = EnvSource::from_process_env(registry(), "NODECONF_ENVTEST")
            .load()
            .expect("env should load");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "txpool.pricelimit");
        assert_eq!(entries[0].value, RawValue::from("25"));
    }

    #[test]
    fn picks_prefixed_variables_only() {
        let source = EnvSource::new(
            registry(),
            "NODE",
            [
                ("NODE_TXPOOL_PRICELIMIT", "25"),
                ("NODE_UNRELATED", "x"),
                ("TXPOOL_PRICELIMIT", "99"),
                ("NODE_DB_NO_PERF_METRICS", "yes"),
            ],
        );
        let entries = source.load().expect("env should load");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "db.no-perf-metrics");
        assert_eq!(entries[0].value, RawValue::from("yes"));
        assert_eq!(entries[1].name, "txpool.pricelimit");
        assert!(entries.iter().all(|entry| entry.origin == Origin::Env));
    }
}
