use clap::parser::ValueSource;
use clap::ArgMatches;

use super::{ConfigSource, Origin, RawEntry, RawValue};
use crate::error::Result;
use crate::options::{OptionKind, OptionRegistry};

/// Options the user actually typed on the command line. Whoever builds this
/// source must leave out flags that merely carry a default; the resolver
/// treats every entry here as explicitly set.
#[derive(Debug, Clone, Default)]
pub struct CliSource {
    entries: Vec<(String, RawValue)>,
}

impl CliSource {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Keeps only arguments whose value came from argv. A list flag given
    /// more than once becomes a sequence; given once it stays a scalar so the
    /// usual delimiter splitting applies.
    pub fn from_matches(registry: &OptionRegistry, matches: &ArgMatches) -> Self {
        let mut entries = Vec::new();
        for descriptor in registry.iter() {
            let name = descriptor.name();
            if !matches!(matches.try_get_raw(name), Ok(Some(_))) {
                continue;
            }
            if matches.value_source(name) != Some(ValueSource::CommandLine) {
                continue;
            }

            let values: Vec<String> = matches
                .try_get_many::<String>(name)
                .ok()
                .flatten()
                .map(|values| values.cloned().collect())
                .unwrap_or_default();

            let value = match (descriptor.kind(), values.len()) {
                (OptionKind::StringList, count) if count > 1 => RawValue::Sequence(values),
                _ => match values.into_iter().last() {
                    Some(value) => RawValue::Scalar(value),
                    None => continue,
                },
            };
            entries.push((name.to_owned(), value));
        }
        Self { entries }
    }

    /// Raw value supplied for `name` (canonical or alias), last one wins.
    pub fn get(&self, registry: &OptionRegistry, name: &str) -> Option<&RawValue> {
        let canonical = registry.resolve_alias(name).ok()?;
        self.entries
            .iter()
            .rev()
            .find(|(entry, _)| registry.resolve_alias(entry).ok() == Some(canonical))
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for CliSource {
    fn origin(&self) -> Origin {
        Origin::Cli
    }

    fn load(&self) -> Result<Vec<RawEntry>> {
        Ok(self
            .entries
            .iter()
            .map(|(name, value)| RawEntry::new(name.clone(), value.clone(), Origin::Cli))
            .collect())
    }

    fn describe(&self) -> String {
        "command line".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use clap::Command;

    use super::CliSource;
    use crate::options::{OptionDescriptor, OptionRegistry};
    use crate::sources::{ConfigSource, Origin, RawValue};

    fn registry() -> OptionRegistry {
        OptionRegistry::from_descriptors([
            OptionDescriptor::string("conf", ""),
            OptionDescriptor::integer("port", 30303).with_alias("p2p.port"),
            OptionDescriptor::bool("ntp.disable", false),
            OptionDescriptor::string_list("bootnodes", Vec::<String>::new()),
        ])
        .expect("registry should build")
    }

    fn parse(registry: &OptionRegistry, argv: &[&str]) -> CliSource {
        let matches = Command::new("node")
            .args(registry.clap_args())
            .try_get_matches_from(argv)
            .expect("argv should parse");
        CliSource::from_matches(registry, &matches)
    }

    #[test]
    fn keeps_only_flags_present_in_argv() {
        let registry = registry();
        let source = parse(&registry, &["node", "--conf", "node.yaml", "--ntp.disable"]);
        let entries = source.load().expect("cli always loads");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "conf");
        assert_eq!(entries[1].name, "ntp.disable");
        assert_eq!(entries[1].value, RawValue::from("true"));
        assert!(entries.iter().all(|entry| entry.origin == Origin::Cli));
    }

    #[test]
    fn repeated_list_flag_becomes_sequence() {
        let registry = registry();
        let source = parse(
            &registry,
            &["node", "--bootnodes", "kni://a", "--bootnodes", "kni://b"],
        );
        assert_eq!(
            source.get(&registry, "bootnodes"),
            Some(&RawValue::from(vec!["kni://a".to_owned(), "kni://b".to_owned()]))
        );
    }

    #[test]
    fn lookup_goes_through_aliases() {
        let registry = registry();
        let source = CliSource::new([("p2p.port", "9000")]);
        assert_eq!(source.get(&registry, "port"), Some(&RawValue::from("9000")));
        assert!(source.get(&registry, "conf").is_none());
    }
}
