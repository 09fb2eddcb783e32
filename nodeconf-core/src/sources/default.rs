use std::sync::Arc;

use super::{ConfigSource, Origin, RawEntry, RawValue};
use crate::error::Result;
use crate::options::OptionRegistry;

/// Baseline source: one typed entry per registered option.
pub struct DefaultSource {
    registry: Arc<OptionRegistry>,
}

impl DefaultSource {
    pub fn new(registry: Arc<OptionRegistry>) -> Self {
        Self { registry }
    }
}

impl ConfigSource for DefaultSource {
    fn origin(&self) -> Origin {
        Origin::Default
    }

    fn load(&self) -> Result<Vec<RawEntry>> {
        Ok(self
            .registry
            .iter()
            .map(|descriptor| {
                RawEntry::new(
                    descriptor.name(),
                    RawValue::Typed(descriptor.default_value().clone()),
                    Origin::Default,
                )
            })
            .collect())
    }
}
