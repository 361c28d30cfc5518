mod aggregator;
mod config;
mod operations;
mod runtime;
mod values;

// Library exports
pub mod prelude {
    // Lifecycle
    pub use crate::aggregator::{Aggregator, Closed, Ready, Unconfigured, MAIN_TOPIC};

    // Configuration
    pub use crate::config::{AggregationSpec, Config, ConfigError, RawConfig};

    // Operations
    pub use crate::operations::Operation;

    // Records and paths
    pub use crate::values::field_path::FieldPath;
    pub use crate::values::record::{Batch, OutputBatch, Record};
    pub use crate::values::scalar::{MetaMap, MetaValue, ObjectBuilder};

    // Host adapter
    pub use crate::runtime::{ChannelSource, CycleRunner, JsonEventSource, RecordSource};
}

pub use config::ConfigError;

// Internal imports for use within the crate
#[allow(unused_imports)]
pub(crate) mod imports {
    // Core types
    pub use crate::values::{
        field_path::FieldPath, helpers::*, record::*, scalar::*,
    };

    pub use crate::config::{AggregationEntry, AggregationSpec, Config, ConfigError, RawConfig};
    pub use crate::operations::Operation;

    // Result and error handling
    pub type Result<T> = anyhow::Result<T>;
    pub use anyhow::Context as _;

    // Collections
    pub use indexmap::IndexMap;
    pub use std::collections::HashMap;

    // Async
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
