use crate::imports::*;
use std::borrow::Cow;

/*
    Functions:
    * validate_aggregations - Turns the raw "aggregations" value into an ordered AggregationSpec
    * parse_aggregations_json - JSON fallback for aggregations handed over as a string

    Accepted shapes: absent (no aggregations), a native mapping, or a string holding a JSON object.
    Every value must name a registered operation and every key must be a well-formed field path.
*/
#[tracing::instrument(skip(value), err)]
pub(super) fn validate_aggregations(
    value: Option<&MetaValue>,
) -> std::result::Result<AggregationSpec, ConfigError> {
    let map: Cow<'_, MetaMap> = match value {
        None => {
            tracing::debug!("No aggregations configured");
            return Ok(AggregationSpec::default());
        }
        Some(MetaValue::Object(map)) => Cow::Borrowed(map),
        Some(MetaValue::String(s)) => Cow::Owned(parse_aggregations_json(s)?),
        Some(other) => {
            tracing::warn!(value_type = ?meta_type_of(other), "Aggregations have the wrong type");
            return Err(ConfigError::AggregationsNotMapping);
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (path, op) in map.iter() {
        let op: Operation = match op {
            MetaValue::String(name) => name.parse()?,
            other => return Err(ConfigError::UnsupportedOperation(other.to_string())),
        };
        let path = FieldPath::parse(path)?;
        tracing::debug!(path = %path, op = %op, "Validated aggregation");
        entries.push(AggregationEntry { path, op });
    }

    Ok(AggregationSpec::from_entries(entries))
}

fn parse_aggregations_json(s: &str) -> std::result::Result<MetaMap, ConfigError> {
    match serde_json::from_str::<MetaValue>(s) {
        Ok(MetaValue::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::AggregationsNotMapping),
        Err(e) => Err(ConfigError::InvalidAggregationsJson(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_aggregations_are_empty() {
        assert!(validate_aggregations(None).unwrap().is_empty());
    }

    #[test]
    fn test_json_string_keeps_listed_order() {
        let value = json!(
            "{\"meta.sheeps\": \"sum\", \"meta.temperature\": \"avg\", \"meta.status\": \"distinct\"}"
        );
        let spec = validate_aggregations(Some(&value)).unwrap();
        let paths: Vec<String> = spec.iter().map(|e| e.path.to_dotted()).collect();
        assert_eq!(paths, ["meta.sheeps", "meta.temperature", "meta.status"]);
    }

    #[test]
    fn test_empty_mapping_is_valid() {
        assert!(validate_aggregations(Some(&json!({}))).unwrap().is_empty());
        assert!(validate_aggregations(Some(&json!("{}"))).unwrap().is_empty());
    }

    #[test]
    fn test_nested_paths_are_parsed() {
        let value = json!({
            "meta.sensors.temperature": "avg",
            "deeply.nested.field": "sum",
            "simple_field": "count"
        });
        let spec = validate_aggregations(Some(&value)).unwrap();
        assert!(spec.targets(&["deeply".into(), "nested".into(), "field".into()]));
        assert!(!spec.targets(&["deeply".into(), "nested".into()]));
        assert_eq!(spec.get("simple_field"), Some(Operation::Count));
    }

    #[test]
    fn test_boolean_value_is_not_a_mapping() {
        let err = validate_aggregations(Some(&json!(true))).unwrap_err();
        assert_eq!(err, ConfigError::AggregationsNotMapping);
    }
}
