use super::{Aggregator, Ready, Unconfigured};
use crate::imports::*;
use std::sync::atomic::AtomicU64;

impl Default for Aggregator<Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator<Unconfigured> {
    pub fn new() -> Self {
        Aggregator {
            state: Unconfigured,
        }
    }

    #[tracing::instrument(skip(self, raw), err, fields(key_count = raw.len()))]
    pub fn configure(self, raw: &RawConfig) -> std::result::Result<Aggregator<Ready>, ConfigError> {
        let config = Config::from_raw(raw)?;
        Ok(self.with_config(config))
    }

    // For a Config that was already validated, e.g. one shared between several aggregators.
    pub fn with_config(self, config: Config) -> Aggregator<Ready> {
        tracing::info!(
            aggregation_count = config.aggregations().len(),
            debug = config.debug(),
            "Aggregator ready"
        );
        Aggregator {
            state: Ready {
                config,
                cycles: AtomicU64::new(0),
            },
        }
    }
}
