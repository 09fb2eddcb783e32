pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod sources;

pub use config::{
    load, ConfigChange, ConfigHandle, EffectiveConfig, EffectiveEntry, LoaderSettings, Resolver,
};
pub use error::{Error, Result};
pub use options::{OptionDescriptor, OptionKind, OptionRegistry, OptionValue};
pub use sources::{
    CliSource, ConfigSource, DefaultSource, EnvSource, FileSource, Origin, RawEntry, RawValue,
};
