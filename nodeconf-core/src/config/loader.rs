use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::effective::EffectiveConfig;
use crate::config::resolver::Resolver;
use crate::config::validation::{coerce, DEFAULT_LIST_DELIMITER};
use crate::error::Result;
use crate::options::{OptionKind, OptionRegistry};
use crate::sources::{CliSource, ConfigSource, DefaultSource, EnvSource, FileSource};

pub const DEFAULT_CONF_OPTION: &str = "conf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Option whose command-line value names the config file.
    pub conf_option: String,
    /// Enables the environment source when set, e.g. `NODE`.
    pub env_prefix: Option<String>,
    pub list_delimiter: char,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            conf_option: DEFAULT_CONF_OPTION.to_owned(),
            env_prefix: None,
            list_delimiter: DEFAULT_LIST_DELIMITER,
        }
    }
}

/// Runs the standard pipeline: defaults, the file named by the `conf`
/// option (if the user passed one), the environment (if a prefix is
/// configured) and finally the command line.
pub fn load(
    registry: &Arc<OptionRegistry>,
    cli: &CliSource,
    settings: &LoaderSettings,
) -> Result<EffectiveConfig> {
    let env = settings
        .env_prefix
        .as_deref()
        .map(|prefix| EnvSource::from_process_env(Arc::clone(registry), prefix));
    load_with_env(registry, cli, env.as_ref(), settings)
}

pub fn load_with_env(
    registry: &Arc<OptionRegistry>,
    cli: &CliSource,
    env: Option<&EnvSource>,
    settings: &LoaderSettings,
) -> Result<EffectiveConfig> {
    let defaults = DefaultSource::new(Arc::clone(registry));
    let file = conf_path(registry, cli, settings)?.map(FileSource::new);

    let mut sources: Vec<&dyn ConfigSource> = vec![&defaults];
    if let Some(file) = &file {
        tracing::debug!(path = %file.path().display(), "using config file");
        sources.push(file);
    }
    if let Some(env) = env {
        sources.push(env);
    }
    sources.push(cli);

    Resolver::new(Arc::clone(registry))
        .with_list_delimiter(settings.list_delimiter)
        .resolve(&sources)
}

/// Path given to the `conf` option on the command line. Only the command
/// line may name the file; an empty value means no file.
pub fn conf_path(
    registry: &OptionRegistry,
    cli: &CliSource,
    settings: &LoaderSettings,
) -> Result<Option<PathBuf>> {
    let Some(raw) = cli.get(registry, &settings.conf_option) else {
        return Ok(None);
    };
    let value = coerce(&settings.conf_option, raw, OptionKind::String)?;
    Ok(value
        .as_str()
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from))
}
