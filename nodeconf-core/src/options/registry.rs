use std::collections::HashMap;

use clap::{Arg, ArgAction};

use super::types::{OptionDescriptor, OptionKind};
use crate::error::{Error, Result};

/// The closed set of options a process understands. Names and aliases are
/// indexed once at registration; after that the registry is only read, so it
/// is shared behind an `Arc` by every resolution pass.
#[derive(Debug, Default, Clone)]
pub struct OptionRegistry {
    descriptors: Vec<OptionDescriptor>,
    index: HashMap<String, usize>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = OptionDescriptor>,
    {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: OptionDescriptor) -> Result<()> {
        let names: Vec<&str> = std::iter::once(descriptor.name())
            .chain(descriptor.aliases().iter().map(String::as_str))
            .collect();

        for (position, name) in names.iter().enumerate() {
            if let Some(&existing) = self.index.get(*name) {
                return Err(Error::DuplicateOption {
                    name: (*name).to_owned(),
                    existing: self.descriptors[existing].name().to_owned(),
                    origin: None,
                });
            }
            if names[..position].contains(name) {
                return Err(Error::DuplicateOption {
                    name: (*name).to_owned(),
                    existing: descriptor.name().to_owned(),
                    origin: None,
                });
            }
        }

        let slot = self.descriptors.len();
        for name in names {
            self.index.insert(name.to_owned(), slot);
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn resolve_alias(&self, name: &str) -> Result<&str> {
        self.descriptor(name).map(OptionDescriptor::name)
    }

    pub fn descriptor(&self, name: &str) -> Result<&OptionDescriptor> {
        self.get(name).ok_or_else(|| Error::unknown(name, None))
    }

    pub fn get(&self, name: &str) -> Option<&OptionDescriptor> {
        self.index.get(name).map(|&slot| &self.descriptors[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// One long flag per descriptor, named after the canonical name. Flags
    /// carry no clap default, so a flag only has a value when the user typed
    /// it.
    pub fn clap_args(&self) -> Vec<Arg> {
        self.descriptors.iter().map(descriptor_arg).collect()
    }
}

fn descriptor_arg(descriptor: &OptionDescriptor) -> Arg {
    let arg = Arg::new(descriptor.name().to_owned())
        .long(descriptor.name().to_owned())
        .visible_aliases(descriptor.aliases().iter().cloned())
        .help(descriptor.usage().to_owned())
        .value_parser(clap::value_parser!(String));

    match descriptor.kind() {
        OptionKind::Bool => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_name("BOOL"),
        OptionKind::StringList => arg.action(ArgAction::Append).value_name("LIST"),
        OptionKind::Integer => arg.action(ArgAction::Set).value_name("INT"),
        OptionKind::Float => arg.action(ArgAction::Set).value_name("FLOAT"),
        OptionKind::Duration => arg.action(ArgAction::Set).value_name("DURATION"),
        OptionKind::String => arg.action(ArgAction::Set).value_name("VALUE"),
    }
}
