pub mod cli;
pub mod default;
pub mod document;
pub mod env;
pub mod file;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::options::OptionValue;

pub use cli::CliSource;
pub use default::DefaultSource;
pub use document::{DocumentFormat, DocumentNode};
pub use env::EnvSource;
pub use file::FileSource;

/// Where a raw value came from. Variants are declared lowest priority first,
/// so the derived ordering is the precedence ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Default,
    File,
    Env,
    Cli,
}

impl Origin {
    pub fn rank(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::File => 1,
            Self::Env => 2,
            Self::Cli => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::File => "file",
            Self::Env => "env",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(String),
    Sequence(Vec<String>),
    /// Already typed, as emitted by the default source or by callers that
    /// build entries programmatically.
    Typed(OptionValue),
}

impl RawValue {
    /// Text used in error messages to show what the source actually held.
    pub fn repr(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Sequence(values) => format!("[{}]", values.join(", ")),
            Self::Typed(value) => value.to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(values: Vec<String>) -> Self {
        Self::Sequence(values)
    }
}

impl From<OptionValue> for RawValue {
    fn from(value: OptionValue) -> Self {
        Self::Typed(value)
    }
}

/// One key/value pair as a source produced it. `name` is whatever the source
/// used, canonical or alias; the resolver maps it through the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub name: String,
    pub value: RawValue,
    pub origin: Origin,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, value: impl Into<RawValue>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin,
        }
    }
}

/// A configuration origin. `load` must be a pure function of the source's own
/// input and must not touch shared state.
pub trait ConfigSource: Send + Sync {
    fn origin(&self) -> Origin;

    fn load(&self) -> Result<Vec<RawEntry>>;

    fn describe(&self) -> String {
        self.origin().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Origin, RawValue};
    use crate::options::OptionValue;

    #[test]
    fn origins_order_by_priority() {
        assert!(Origin::Cli > Origin::Env);
        assert!(Origin::Env > Origin::File);
        assert!(Origin::File > Origin::Default);
        assert!(Origin::Cli.rank() > Origin::Default.rank());
    }

    #[test]
    fn raw_value_repr_shows_source_text() {
        assert_eq!(RawValue::from("yes").repr(), "yes");
        assert_eq!(
            RawValue::from(vec!["a".to_owned(), "b".to_owned()]).repr(),
            "[a, b]"
        );
        assert_eq!(RawValue::from(OptionValue::Integer(7)).repr(), "7");
    }
}
