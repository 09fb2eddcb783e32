use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::options::{OptionKind, OptionRegistry, OptionValue};
use crate::sources::Origin;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveEntry {
    pub name: String,
    pub value: OptionValue,
    pub explicitly_set: bool,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigChange {
    pub name: String,
    pub previous: Option<EffectiveEntry>,
    pub current: Option<EffectiveEntry>,
}

/// The resolved configuration. Built in one piece by the resolver and never
/// modified afterwards; a reload produces a new instance.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    registry: Arc<OptionRegistry>,
    entries: BTreeMap<String, EffectiveEntry>,
}

impl EffectiveConfig {
    pub(crate) fn new(
        registry: Arc<OptionRegistry>,
        entries: BTreeMap<String, EffectiveEntry>,
    ) -> Self {
        Self { registry, entries }
    }

    pub fn registry(&self) -> &Arc<OptionRegistry> {
        &self.registry
    }

    pub fn entry(&self, name: &str) -> Result<&EffectiveEntry> {
        let canonical = self.registry.resolve_alias(name)?;
        self.entries
            .get(canonical)
            .ok_or_else(|| Error::unknown(name, None))
    }

    pub fn value(&self, name: &str) -> Result<&OptionValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    /// Whether any non-default source supplied the option. Unknown names are
    /// simply not set.
    pub fn is_set(&self, name: &str) -> bool {
        self.entry(name)
            .map(|entry| entry.explicitly_set)
            .unwrap_or(false)
    }

    pub fn origin(&self, name: &str) -> Result<Origin> {
        self.entry(name).map(|entry| entry.origin)
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.typed(name, OptionKind::Bool, OptionValue::as_bool)
    }

    pub fn integer(&self, name: &str) -> Result<i64> {
        self.typed(name, OptionKind::Integer, OptionValue::as_integer)
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        self.typed(name, OptionKind::Float, OptionValue::as_float)
    }

    pub fn duration(&self, name: &str) -> Result<Duration> {
        self.typed(name, OptionKind::Duration, OptionValue::as_duration)
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.typed(name, OptionKind::String, OptionValue::as_str)
    }

    pub fn list(&self, name: &str) -> Result<&[String]> {
        self.typed(name, OptionKind::StringList, OptionValue::as_list)
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: OptionKind,
        extract: impl FnOnce(&'a OptionValue) -> Option<T>,
    ) -> Result<T> {
        let entry = self.entry(name)?;
        extract(&entry.value).ok_or_else(|| Error::TypeMismatch {
            name: entry.name.clone(),
            expected,
            got: entry.value.to_string(),
            origin: None,
        })
    }

    /// Entries in canonical-name order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectiveEntry> {
        self.entries.values()
    }

    pub fn explicitly_set(&self) -> Vec<&str> {
        self.entries
            .values()
            .filter(|entry| entry.explicitly_set)
            .map(|entry| entry.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Options whose value, set flag or origin differ between `self` (the
    /// older configuration) and `next`.
    pub fn diff(&self, next: &EffectiveConfig) -> Vec<ConfigChange> {
        let mut names: Vec<&String> = self.entries.keys().chain(next.entries.keys()).collect();
        names.sort();
        names.dedup();

        names
            .into_iter()
            .filter_map(|name| {
                let previous = self.entries.get(name);
                let current = next.entries.get(name);
                (previous != current).then(|| ConfigChange {
                    name: name.clone(),
                    previous: previous.cloned(),
                    current: current.cloned(),
                })
            })
            .collect()
    }

    pub fn render_table(&self, only_set: bool) -> String {
        let rows: Vec<[String; 4]> = self
            .iter()
            .filter(|entry| !only_set || entry.explicitly_set)
            .map(|entry| {
                [
                    entry.name.clone(),
                    entry.value.to_string(),
                    entry.explicitly_set.to_string(),
                    entry.origin.to_string(),
                ]
            })
            .collect();

        let header = ["NAME", "VALUE", "SET", "ORIGIN"].map(ToOwned::to_owned);
        let mut widths = header.clone().map(|column| column.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut rendered = String::new();
        for row in std::iter::once(&header).chain(rows.iter()) {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            rendered.push_str(line.trim_end());
            rendered.push('\n');
        }
        rendered
    }
}

impl PartialEq for EffectiveConfig {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for EffectiveConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
