pub mod registry;
pub mod types;

pub use registry::OptionRegistry;
pub use types::{format_duration, OptionDescriptor, OptionKind, OptionValue};
