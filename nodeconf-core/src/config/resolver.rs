use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::effective::{EffectiveConfig, EffectiveEntry};
use crate::config::validation::{coerce_with_delimiter, DEFAULT_LIST_DELIMITER};
use crate::error::{Error, Result};
use crate::options::OptionRegistry;
use crate::sources::{ConfigSource, Origin, RawValue};

pub fn resolve(
    registry: &Arc<OptionRegistry>,
    sources: &[&dyn ConfigSource],
) -> Result<EffectiveConfig> {
    Resolver::new(Arc::clone(registry)).resolve(sources)
}

/// Merges sources into an [`EffectiveConfig`]. Resolution is all-or-nothing:
/// the first unknown key or bad value aborts the pass and nothing is built.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<OptionRegistry>,
    list_delimiter: char,
}

struct Slot {
    raw: RawValue,
    origin: Origin,
    explicitly_set: bool,
}

impl Resolver {
    pub fn new(registry: Arc<OptionRegistry>) -> Self {
        Self {
            registry,
            list_delimiter: DEFAULT_LIST_DELIMITER,
        }
    }

    pub fn with_list_delimiter(mut self, list_delimiter: char) -> Self {
        self.list_delimiter = list_delimiter;
        self
    }

    /// Sources are applied lowest priority first. They are stable-sorted by
    /// origin rank beforehand, so passing them out of order cannot let a file
    /// override the command line.
    pub fn resolve(&self, sources: &[&dyn ConfigSource]) -> Result<EffectiveConfig> {
        let mut ordered = sources.to_vec();
        ordered.sort_by_key(|source| source.origin().rank());

        let mut slots: BTreeMap<&str, Slot> = BTreeMap::new();
        for source in ordered {
            let entries = source.load()?;
            let count = entries.len();
            let mut spellings: HashMap<&str, String> = HashMap::new();

            for entry in entries {
                let canonical = self
                    .registry
                    .resolve_alias(&entry.name)
                    .map_err(|err| err.at_origin(entry.origin))?;
                // Repeating one spelling overwrites; mixing an option with its
                // alias in one source is ambiguous.
                match spellings.get(canonical) {
                    Some(existing) if *existing != entry.name => {
                        return Err(Error::DuplicateOption {
                            name: entry.name,
                            existing: existing.clone(),
                            origin: Some(entry.origin),
                        });
                    }
                    Some(_) => {}
                    None => {
                        spellings.insert(canonical, entry.name.clone());
                    }
                }
                let non_default = entry.origin != Origin::Default;

                match slots.get_mut(canonical) {
                    Some(slot) => {
                        slot.raw = entry.value;
                        slot.origin = entry.origin;
                        slot.explicitly_set |= non_default;
                    }
                    None => {
                        slots.insert(
                            canonical,
                            Slot {
                                raw: entry.value,
                                origin: entry.origin,
                                explicitly_set: non_default,
                            },
                        );
                    }
                }
            }

            tracing::debug!(source = %source.describe(), entries = count, "merged source");
        }

        let mut entries = BTreeMap::new();
        for descriptor in self.registry.iter() {
            let name = descriptor.name();
            let (raw, origin, explicitly_set) = match slots.remove(name) {
                Some(slot) => (slot.raw, slot.origin, slot.explicitly_set),
                None => (
                    RawValue::Typed(descriptor.default_value().clone()),
                    Origin::Default,
                    false,
                ),
            };

            let value = coerce_with_delimiter(name, &raw, descriptor.kind(), self.list_delimiter)
                .map_err(|err| err.at_origin(origin))?;

            entries.insert(
                name.to_owned(),
                EffectiveEntry {
                    name: name.to_owned(),
                    value,
                    explicitly_set,
                    origin,
                },
            );
        }

        let config = EffectiveConfig::new(Arc::clone(&self.registry), entries);
        tracing::debug!(
            options = config.len(),
            explicitly_set = config.explicitly_set().len(),
            "resolved configuration"
        );
        Ok(config)
    }
}
