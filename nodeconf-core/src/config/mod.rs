pub mod effective;
pub mod loader;
pub mod manager;
pub mod resolver;
pub mod validation;

pub use effective::{ConfigChange, EffectiveConfig, EffectiveEntry};
pub use loader::{conf_path, load, load_with_env, LoaderSettings, DEFAULT_CONF_OPTION};
pub use manager::{ConfigHandle, ConfigSnapshot, ReloadReport};
pub use resolver::{resolve, Resolver};
pub use validation::{coerce, coerce_with_delimiter};
