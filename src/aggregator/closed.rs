use super::{Aggregator, Closed, Unconfigured};
use crate::imports::*;

impl Aggregator<Closed> {
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn cycles(&self) -> u64 {
        self.state.cycles
    }

    // Replacing the configuration means going through setup again.
    pub fn reset(self) -> Aggregator<Unconfigured> {
        tracing::debug!(cycles = self.state.cycles, "Aggregator reset");
        Aggregator::<Unconfigured>::new()
    }
}
