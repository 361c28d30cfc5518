use crate::imports::*;
use serde::Serialize;
use serde::ser::SerializeMap;

mod ingest;
mod validation;

pub use ingest::RawConfig;
pub(crate) use ingest::{AGGREGATIONS_KEY, FlagRule};

/*
    Types:
    * ConfigError - Everything that can reject a configuration, raised only while configuring
    * AggregationEntry - One parsed (field path, operation) pair
    * AggregationSpec - Ordered aggregation entries, in the order the raw mapping listed them
    * Config - The canonical, validated configuration. Immutable once built.
*/
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported aggregation operation: {0}")]
    UnsupportedOperation(String),
    #[error("aggregations must be a dictionary")]
    AggregationsNotMapping,
    #[error("Invalid aggregations JSON: {0}")]
    InvalidAggregationsJson(String),
    #[error("Invalid field path '{path}': {reason}")]
    InvalidFieldPath { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationEntry {
    pub path: FieldPath,
    pub op: Operation,
}

impl AggregationEntry {
    pub fn output_key(&self, append_op_to_key: bool) -> String {
        if append_op_to_key {
            self.op.suffixed_key(self.path.leaf())
        } else {
            self.path.leaf().to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationSpec {
    entries: Vec<AggregationEntry>,
}

impl AggregationSpec {
    pub(crate) fn from_entries(entries: Vec<AggregationEntry>) -> Self {
        AggregationSpec { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregationEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, dotted: &str) -> Option<Operation> {
        self.entries
            .iter()
            .find(|entry| entry.path.to_dotted() == dotted)
            .map(|entry| entry.op)
    }

    // Exact full-path match against a leaf location.
    pub fn targets(&self, segments: &[String]) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.path.matches_segments(segments))
    }

    pub fn to_value(&self) -> MetaValue {
        let map: MetaMap = self
            .entries
            .iter()
            .map(|entry| {
                (
                    entry.path.to_dotted(),
                    MetaValue::String(entry.op.as_str().to_string()),
                )
            })
            .collect();
        MetaValue::Object(map)
    }
}

impl<'a> IntoIterator for &'a AggregationSpec {
    type Item = &'a AggregationEntry;
    type IntoIter = std::slice::Iter<'a, AggregationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for AggregationSpec {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.path, &entry.op)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    aggregations: AggregationSpec,
    forward_extra_fields: bool,
    forward_image: bool,
    append_op_to_key: bool,
    forward_upstream_data: bool,
    debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            aggregations: AggregationSpec::default(),
            forward_extra_fields: ingest::FORWARD_EXTRA_FIELDS.default,
            forward_image: ingest::FORWARD_IMAGE.default,
            append_op_to_key: ingest::APPEND_OP_TO_KEY.default,
            forward_upstream_data: ingest::FORWARD_UPSTREAM_DATA.default,
            debug: ingest::DEBUG.default,
        }
    }
}

impl Config {
    #[tracing::instrument(skip(raw), err, fields(key_count = raw.len()))]
    pub fn from_raw(raw: &RawConfig) -> std::result::Result<Self, ConfigError> {
        let aggregations = validation::validate_aggregations(raw.get(AGGREGATIONS_KEY))?;

        let config = Config {
            aggregations,
            forward_extra_fields: raw.flag(&ingest::FORWARD_EXTRA_FIELDS),
            forward_image: raw.flag(&ingest::FORWARD_IMAGE),
            append_op_to_key: raw.flag(&ingest::APPEND_OP_TO_KEY),
            forward_upstream_data: raw.flag(&ingest::FORWARD_UPSTREAM_DATA),
            debug: raw.flag(&ingest::DEBUG),
        };

        tracing::debug!(
            aggregation_count = config.aggregations.len(),
            forward_extra_fields = config.forward_extra_fields,
            forward_image = config.forward_image,
            append_op_to_key = config.append_op_to_key,
            forward_upstream_data = config.forward_upstream_data,
            debug = config.debug,
            "Configuration validated"
        );
        Ok(config)
    }

    pub fn to_raw(&self) -> RawConfig {
        let mut raw = RawConfig::new();
        raw.insert(AGGREGATIONS_KEY, self.aggregations.to_value());
        for (rule, value) in self.flags() {
            raw.insert(rule.key, MetaValue::Bool(value));
        }
        raw
    }

    fn flags(&self) -> [(&'static FlagRule, bool); 5] {
        [
            (&ingest::FORWARD_EXTRA_FIELDS, self.forward_extra_fields),
            (&ingest::FORWARD_IMAGE, self.forward_image),
            (&ingest::APPEND_OP_TO_KEY, self.append_op_to_key),
            (&ingest::FORWARD_UPSTREAM_DATA, self.forward_upstream_data),
            (&ingest::DEBUG, self.debug),
        ]
    }

    pub fn aggregations(&self) -> &AggregationSpec {
        &self.aggregations
    }

    pub fn forward_extra_fields(&self) -> bool {
        self.forward_extra_fields
    }

    pub fn forward_image(&self) -> bool {
        self.forward_image
    }

    pub fn append_op_to_key(&self) -> bool {
        self.append_op_to_key
    }

    pub fn forward_upstream_data(&self) -> bool {
        self.forward_upstream_data
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

impl TryFrom<&RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: &RawConfig) -> std::result::Result<Self, Self::Error> {
        Config::from_raw(raw)
    }
}

impl From<&Config> for RawConfig {
    fn from(config: &Config) -> Self {
        config.to_raw()
    }
}
