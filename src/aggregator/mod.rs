use crate::imports::*;
use std::sync::atomic::AtomicU64;

mod closed;
mod merge;
mod ready;
mod unconfigured;

/*
    Consts:
    * MAIN_TOPIC - Output topic of the aggregated record, always the first entry of an OutputBatch
*/
pub const MAIN_TOPIC: &str = "main";

/*
    Types:
    * Aggregator - Lifecycle wrapper, the state parameter decides which operations exist
    * Unconfigured - Nothing validated yet, only `configure`/`with_config` are available
    * Ready - Holds the immutable Config and a diagnostic cycle counter, `process` and `close` are available
    * Closed - Terminal state, keeps the last Config and cycle count for inspection
*/
#[derive(Debug)]
pub struct Unconfigured;

#[derive(Debug)]
pub struct Ready {
    config: Config,
    cycles: AtomicU64,
}

#[derive(Debug)]
pub struct Closed {
    config: Config,
    cycles: u64,
}

#[derive(Debug)]
pub struct Aggregator<T = Ready> {
    state: T,
}

// Per-cycle diagnostics: debug level when the `debug` flag is set, trace otherwise.
macro_rules! diagnostic {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::debug!($($arg)+);
        } else {
            tracing::trace!($($arg)+);
        }
    };
}
pub(crate) use diagnostic;
