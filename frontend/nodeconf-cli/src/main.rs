mod cli;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches};
use nodeconf_core::catalog::node_registry;
use nodeconf_core::config::{load, ConfigChange, LoaderSettings};
use nodeconf_core::{CliSource, EffectiveConfig, EffectiveEntry, OptionRegistry};

fn main() {
    if let Err(error) = run() {
        eprintln!("nodeconf failed: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let registry = Arc::new(node_registry().context("failed to build option catalog")?);
    let matches = cli::Cli::command().args(registry.clap_args()).get_matches();
    let args = cli::Cli::from_arg_matches(&matches)?;
    nodeconf_core::logging::init_tracing(&args.log_level);

    let node_flags = CliSource::from_matches(&registry, &matches);
    tracing::debug!(flags = node_flags.len(), "parsed node flags");
    let settings = LoaderSettings {
        env_prefix: args.env_prefix.clone(),
        list_delimiter: args.list_delimiter,
        ..LoaderSettings::default()
    };

    match args.command.unwrap_or_default() {
        cli::Command::Show { json, only_set } => {
            let config = load(&registry, &node_flags, &settings)?;
            print_config(&config, json, only_set)
        }
        cli::Command::Check => {
            let config = load(&registry, &node_flags, &settings)?;
            println!(
                "configuration is valid: {} options, {} explicitly set",
                config.len(),
                config.explicitly_set().len()
            );
            Ok(())
        }
        cli::Command::Watch { json } => {
            let runtime =
                tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
            runtime.block_on(watch(registry, node_flags, settings, json))
        }
    }
}

fn print_config(config: &EffectiveConfig, json: bool, only_set: bool) -> Result<()> {
    if !json {
        print!("{}", config.render_table(only_set));
        return Ok(());
    }

    let entries: BTreeMap<&str, &EffectiveEntry> = config
        .iter()
        .filter(|entry| !only_set || entry.explicitly_set)
        .map(|entry| (entry.name.as_str(), entry))
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn print_changes(version: u64, changes: &[ConfigChange], json: bool) -> Result<()> {
    if json {
        let report = serde_json::json!({ "version": version, "changes": changes });
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    println!("version {version}: {} change(s)", changes.len());
    for change in changes {
        let describe = |entry: Option<&EffectiveEntry>| {
            entry.map_or_else(
                || "<absent>".to_owned(),
                |entry| format!("{} ({})", entry.value, entry.origin),
            )
        };
        println!(
            "  {}: {} -> {}",
            change.name,
            describe(change.previous.as_ref()),
            describe(change.current.as_ref())
        );
    }
    Ok(())
}

#[cfg(unix)]
async fn watch(
    registry: Arc<OptionRegistry>,
    node_flags: CliSource,
    settings: LoaderSettings,
    json: bool,
) -> Result<()> {
    use nodeconf_core::ConfigHandle;
    use tokio::signal::unix::{signal, SignalKind};

    let handle = ConfigHandle::new(load(&registry, &node_flags, &settings)?);
    print_config(&handle.current(), json, true)?;

    let mut hangup = signal(SignalKind::hangup()).context("failed to install SIGHUP handler")?;
    loop {
        tokio::select! {
            received = hangup.recv() => {
                if received.is_none() {
                    break;
                }
                match handle.reload(|| load(&registry, &node_flags, &settings)) {
                    Ok(report) => print_changes(report.snapshot.version, &report.changes, json)?,
                    Err(error) => eprintln!(
                        "reload failed, still serving version {}: {error}",
                        handle.version()
                    ),
                }
            }
            interrupted = tokio::signal::ctrl_c() => {
                interrupted.context("failed to listen for ctrl-c")?;
                break;
            }
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn watch(
    _registry: Arc<OptionRegistry>,
    _node_flags: CliSource,
    _settings: LoaderSettings,
    _json: bool,
) -> Result<()> {
    anyhow::bail!("watch relies on SIGHUP and is only available on unix")
}
