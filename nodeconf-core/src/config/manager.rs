use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::effective::{ConfigChange, EffectiveConfig};
use crate::config::resolver::Resolver;
use crate::error::Result;
use crate::sources::ConfigSource;

#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub config: Arc<EffectiveConfig>,
    pub version: u64,
}

#[derive(Debug, Clone)]
pub struct ReloadReport {
    pub snapshot: ConfigSnapshot,
    pub changes: Vec<ConfigChange>,
}

/// Shared pointer to the live configuration. Readers take the current `Arc`
/// without locking; a reload builds a complete new configuration first and
/// swaps it in only if resolution succeeded.
pub struct ConfigHandle {
    current: ArcSwap<EffectiveConfig>,
    version: AtomicU64,
    reload_lock: Mutex<()>,
}

impl ConfigHandle {
    pub fn new(initial: EffectiveConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            version: AtomicU64::new(1),
            reload_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<EffectiveConfig> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ConfigSnapshot {
            config: self.current(),
            version: self.version(),
        }
    }

    pub fn reload_from(
        &self,
        resolver: &Resolver,
        sources: &[&dyn ConfigSource],
    ) -> Result<ReloadReport> {
        self.reload(|| resolver.resolve(sources))
    }

    /// Replaces the live configuration with the one `build` produces. On
    /// error the previous configuration stays live and the error is returned.
    pub fn reload<F>(&self, build: F) -> Result<ReloadReport>
    where
        F: FnOnce() -> Result<EffectiveConfig>,
    {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let next = match build() {
            Ok(next) => Arc::new(next),
            Err(err) => {
                tracing::warn!(
                    %err,
                    version = self.version(),
                    "reload failed; keeping current configuration"
                );
                return Err(err);
            }
        };

        let previous = self.current.swap(Arc::clone(&next));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        let changes = previous.diff(&next);
        tracing::info!(version, changed = changes.len(), "configuration reloaded");

        Ok(ReloadReport {
            snapshot: ConfigSnapshot {
                config: next,
                version,
            },
            changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::ConfigHandle;
    use crate::config::resolver::{resolve, Resolver};
    use crate::error::Error;
    use crate::options::{OptionDescriptor, OptionRegistry};
    use crate::sources::{CliSource, DefaultSource, DocumentFormat, FileSource};

    fn registry() -> Arc<OptionRegistry> {
        Arc::new(
            OptionRegistry::from_descriptors([
                OptionDescriptor::integer("port", 30303),
                OptionDescriptor::bool("metrics", false),
            ])
            .expect("registry should build"),
        )
    }

    #[test]
    fn reload_swaps_in_new_configuration() {
        let registry = registry();
        let defaults = DefaultSource::new(Arc::clone(&registry));
        let initial = resolve(&registry, &[&defaults]).expect("initial");
        let handle = ConfigHandle::new(initial);
        let before = handle.current();

        let cli = CliSource::new([("port", "9000")]);
        let report = handle
            .reload_from(&Resolver::new(Arc::clone(&registry)), &[&defaults, &cli])
            .expect("reload");

        assert_eq!(report.snapshot.version, 2);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].name, "port");
        assert_eq!(handle.current().integer("port").expect("port"), 9000);
        assert_eq!(handle.version(), 2);

        // Readers holding the old instance keep seeing it unchanged.
        assert_eq!(before.integer("port").expect("port"), 30303);
        assert!(!before.is_set("port"));
    }

    #[test]
    fn failed_reload_keeps_previous_configuration() {
        let registry = registry();
        let defaults = DefaultSource::new(Arc::clone(&registry));
        let handle = ConfigHandle::new(resolve(&registry, &[&defaults]).expect("initial"));

        let broken = FileSource::from_contents("node.yaml", "port: many\n", DocumentFormat::Yaml);
        let error = handle
            .reload_from(&Resolver::new(Arc::clone(&registry)), &[&defaults, &broken])
            .expect_err("reload should fail");

        assert!(matches!(error, Error::TypeMismatch { .. }));
        assert_eq!(handle.version(), 1);
        assert_eq!(
            handle.snapshot().config.integer("port").expect("port"),
            30303
        );
    }
}
