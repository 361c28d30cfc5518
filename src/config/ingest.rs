use crate::imports::*;
use serde::{Deserialize, Serialize};

/*
    Ingestion rules for loosely typed configuration:
    * AGGREGATIONS_KEY / AGGREGATIONS_ENV_VAR - Where the aggregation mapping lives
    * FlagRule - Key, environment variable and default of one boolean flag
    * FLAG_RULES - Every boolean flag the configuration knows about
    * TRUTHY_LITERALS - Strings (trimmed, case-insensitive) that coerce to true. Anything else is false.
*/
pub(crate) const AGGREGATIONS_KEY: &str = "aggregations";
pub(crate) const AGGREGATIONS_ENV_VAR: &str = "FILTER_AGGREGATIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FlagRule {
    pub key: &'static str,
    pub env_var: &'static str,
    pub default: bool,
}

pub(crate) const FORWARD_EXTRA_FIELDS: FlagRule = FlagRule {
    key: "forward_extra_fields",
    env_var: "FILTER_FORWARD_EXTRA_FIELDS",
    default: true,
};
pub(crate) const FORWARD_IMAGE: FlagRule = FlagRule {
    key: "forward_image",
    env_var: "FILTER_FORWARD_IMAGE",
    default: false,
};
pub(crate) const APPEND_OP_TO_KEY: FlagRule = FlagRule {
    key: "append_op_to_key",
    env_var: "FILTER_APPEND_OP_TO_KEY",
    default: true,
};
pub(crate) const FORWARD_UPSTREAM_DATA: FlagRule = FlagRule {
    key: "forward_upstream_data",
    env_var: "FILTER_FORWARD_UPSTREAM_DATA",
    default: true,
};
pub(crate) const DEBUG: FlagRule = FlagRule {
    key: "debug",
    env_var: "FILTER_DEBUG",
    default: false,
};

pub(crate) const FLAG_RULES: [FlagRule; 5] = [
    FORWARD_EXTRA_FIELDS,
    FORWARD_IMAGE,
    APPEND_OP_TO_KEY,
    FORWARD_UPSTREAM_DATA,
    DEBUG,
];

pub(crate) const TRUTHY_LITERALS: [&str; 3] = ["true", "1", "yes"];

/*
    RawConfig - The untyped configuration mapping handed over by the host. May carry keys this
    crate knows nothing about (source/output addresses, ids, ...), they are kept but never read.
*/
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(MetaMap);

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // Builder style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // Keys in `overrides` replace keys already present.
    pub fn extend(&mut self, overrides: RawConfig) {
        self.0.extend(overrides.0);
    }

    /*
        Builds a raw mapping from FILTER_* environment variables. Only variables that are set
        produce keys, so the result is meant to be layered over another RawConfig with `extend`.
    */
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut raw = RawConfig::new();
        if let Some(aggregations) = lookup(AGGREGATIONS_ENV_VAR) {
            raw.insert(AGGREGATIONS_KEY, aggregations);
        }
        for rule in FLAG_RULES.iter() {
            if let Some(value) = lookup(rule.env_var) {
                tracing::debug!(flag = rule.key, env_var = rule.env_var, "Flag set from environment");
                raw.insert(rule.key, value);
            }
        }
        raw
    }

    pub(crate) fn flag(&self, rule: &FlagRule) -> bool {
        match self.get(rule.key) {
            None | Some(MetaValue::Null) => rule.default,
            Some(value) => coerce_flag(rule.key, value),
        }
    }
}

impl From<MetaMap> for RawConfig {
    fn from(map: MetaMap) -> Self {
        RawConfig(map)
    }
}

impl TryFrom<MetaValue> for RawConfig {
    type Error = anyhow::Error;

    fn try_from(value: MetaValue) -> Result<Self> {
        match value {
            MetaValue::Object(map) => Ok(RawConfig(map)),
            other => Err(anyhow::anyhow!(
                "raw configuration must be an object, got {:?}",
                meta_type_of(&other)
            )),
        }
    }
}

// Never fails: unrecognised values degrade to false.
pub(crate) fn coerce_flag(key: &str, value: &MetaValue) -> bool {
    match value {
        MetaValue::Bool(b) => *b,
        MetaValue::String(s) => is_truthy_literal(s),
        MetaValue::Number(n) => is_truthy_literal(&n.to_string()),
        other => {
            tracing::warn!(
                flag = %key,
                value_type = ?meta_type_of(other),
                "Flag value is not a boolean or string, treating as false"
            );
            false
        }
    }
}

fn is_truthy_literal(s: &str) -> bool {
    let normalised = s.trim().to_lowercase();
    TRUTHY_LITERALS.contains(&normalised.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boolean_string_representations() {
        let cases = [
            ("true", true),
            ("True", true),
            ("TRUE", true),
            ("1", true),
            ("yes", true),
            ("Yes", true),
            (" yes ", true),
            ("false", false),
            ("False", false),
            ("FALSE", false),
            ("0", false),
            ("no", false),
            ("No", false),
            ("", false),
            (" ", false),
            ("maybe", false),
            ("2", false),
        ];
        for (input, expected) in cases {
            let raw = RawConfig::new().with("forward_extra_fields", input);
            assert_eq!(raw.flag(&FORWARD_EXTRA_FIELDS), expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_native_and_odd_flag_values() {
        assert!(!RawConfig::new().with("debug", false).flag(&DEBUG));
        assert!(RawConfig::new().with("debug", true).flag(&DEBUG));
        assert!(RawConfig::new().with("debug", 1).flag(&DEBUG));
        assert!(!RawConfig::new().with("debug", 0).flag(&DEBUG));
        assert!(!RawConfig::new().with("debug", json!(["true"])).flag(&DEBUG));
    }

    #[test]
    fn test_missing_or_null_flag_uses_default() {
        for rule in FLAG_RULES {
            assert_eq!(RawConfig::new().flag(&rule), rule.default);
            assert_eq!(
                RawConfig::new().with(rule.key, MetaValue::Null).flag(&rule),
                rule.default
            );
        }
    }

    #[test]
    fn test_from_lookup_reads_filter_variables() {
        let vars: HashMap<&str, &str> = [
            ("FILTER_AGGREGATIONS", "{\"meta.count\": \"sum\"}"),
            ("FILTER_FORWARD_IMAGE", "true"),
            ("FILTER_DEBUG", "yes"),
            ("UNRELATED", "1"),
        ]
        .into_iter()
        .collect();

        let raw = RawConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get("aggregations"), Some(&json!("{\"meta.count\": \"sum\"}")));
        assert!(raw.flag(&FORWARD_IMAGE));
        assert!(raw.flag(&DEBUG));
        assert!(raw.flag(&FORWARD_EXTRA_FIELDS));
    }

    #[test]
    fn test_extend_overrides_existing_keys() {
        let mut raw = RawConfig::new()
            .with("aggregations", json!({"meta.sheeps": "sum"}))
            .with("debug", false);
        raw.extend(RawConfig::new().with("debug", "true"));

        assert!(raw.flag(&DEBUG));
        assert_eq!(raw.get("aggregations"), Some(&json!({"meta.sheeps": "sum"})));
    }

    #[test]
    fn test_try_from_rejects_non_object() {
        assert!(RawConfig::try_from(json!([1, 2])).is_err());
        assert_eq!(RawConfig::try_from(json!({"id": "x"})).unwrap().len(), 1);
    }
}
