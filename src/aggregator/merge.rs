use super::diagnostic;
use crate::imports::*;

/*
    Output assembly helpers for one cycle:
    * reduce_aggregations - Runs every configured reduction and writes the results into a fresh tree
    * merge_extra_fields - Copies non-aggregated leaves of the live records on top, later records win
    * first_image - The image and format of the first live record carrying one
*/
pub(super) fn reduce_aggregations(
    spec: &AggregationSpec,
    live: &[(&str, &Record)],
    append_op_to_key: bool,
    data: &mut MetaMap,
    verbose: bool,
) -> Vec<FieldPath> {
    let mut written = Vec::with_capacity(spec.len());
    for entry in spec {
        let values: Vec<&MetaValue> = live
            .iter()
            .filter_map(|(_, record)| entry.path.read(&record.data))
            .filter(|value| !value.is_null())
            .collect();

        let result = entry.op.reduce(&values);
        let key = entry.output_key(append_op_to_key);
        diagnostic!(
            verbose,
            path = %entry.path,
            op = %entry.op,
            input_count = values.len(),
            output_key = %key,
            "Reduced"
        );
        entry.path.write(data, &key, result);
        written.push(entry.path.with_leaf(key));
    }
    written
}

/*
    A leaf is skipped when its path is an aggregation target, or when it lies on or below an
    aggregated output location, or when an aggregated output lies below it. Anything else is
    written, so a later record overwrites an earlier one at the same path. An empty map never
    replaces a map already in place, it only fills a missing key.
*/
pub(super) fn merge_extra_fields(
    data: &mut MetaMap,
    live: &[(&str, &Record)],
    spec: &AggregationSpec,
    protected: &[FieldPath],
    verbose: bool,
) -> usize {
    let mut merged = 0;
    for (topic, record) in live {
        for (segments, value) in collect_leaves(&record.data) {
            if spec.targets(&segments) || overlaps_protected(&segments, protected) {
                diagnostic!(verbose, topic = %topic, path = %segments.join("."), "Extra field skipped");
                continue;
            }
            if is_empty_map(value) && get_at_path(data, &segments).is_some_and(MetaValue::is_object) {
                continue;
            }
            let Some((leaf, parents)) = segments.split_last() else {
                continue;
            };
            insert_at_path(data, parents, leaf, value.clone());
            diagnostic!(verbose, topic = %topic, path = %segments.join("."), "Extra field merged");
            merged += 1;
        }
    }
    merged
}

pub(super) fn first_image<'a>(live: &[(&'a str, &'a Record)]) -> Option<(&'a str, &'a Record)> {
    live.iter().copied().find(|(_, record)| record.has_image())
}

fn is_empty_map(value: &MetaValue) -> bool {
    value.as_object().is_some_and(MetaMap::is_empty)
}

fn overlaps_protected(segments: &[String], protected: &[FieldPath]) -> bool {
    protected.iter().any(|output| {
        let output = output.segments();
        segments.starts_with(output) || output.starts_with(segments)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: MetaValue) -> Record {
        match value {
            MetaValue::Object(map) => Record::new(map),
            _ => panic!("test records must be objects"),
        }
    }

    fn spec(value: MetaValue) -> AggregationSpec {
        Config::from_raw(&RawConfig::new().with("aggregations", value))
            .unwrap()
            .aggregations()
            .clone()
    }

    #[test]
    fn test_protected_output_is_not_overwritten() {
        // an upstream record already carrying the suffixed key must not clobber the result
        let a = record(json!({"meta": {"sheeps": 4, "sheeps_sum": 100}}));
        let b = record(json!({"meta": {"sheeps": 5}}));
        let live = [("a", &a), ("b", &b)];
        let spec = spec(json!({"meta.sheeps": "sum"}));

        let mut data = MetaMap::new();
        let written = reduce_aggregations(&spec, &live, true, &mut data, false);
        merge_extra_fields(&mut data, &live, &spec, &written, false);

        assert_eq!(MetaValue::Object(data), json!({"meta": {"sheeps_sum": 9}}));
    }

    #[test]
    fn test_scalar_parent_does_not_replace_aggregated_map() {
        let a = record(json!({"meta": {"count": 1}}));
        let b = record(json!({"meta": "flat"}));
        let live = [("a", &a), ("b", &b)];
        let spec = spec(json!({"meta.count": "sum"}));

        let mut data = MetaMap::new();
        let written = reduce_aggregations(&spec, &live, true, &mut data, false);
        let merged = merge_extra_fields(&mut data, &live, &spec, &written, false);

        assert_eq!(merged, 0);
        assert_eq!(MetaValue::Object(data), json!({"meta": {"count_sum": 1}}));
    }

    #[test]
    fn test_later_record_wins_on_shared_extra_path() {
        let a = record(json!({"meta": {"location": "field_a"}, "id": 1}));
        let b = record(json!({"meta": {"location": "field_b"}}));
        let live = [("a", &a), ("b", &b)];

        let mut data = MetaMap::new();
        merge_extra_fields(&mut data, &live, &AggregationSpec::default(), &[], false);

        assert_eq!(
            MetaValue::Object(data),
            json!({"meta": {"location": "field_b"}, "id": 1})
        );
    }

    #[test]
    fn test_first_image_skips_records_without_one() {
        let plain = Record::default();
        let pictured = Record::default().with_image(vec![1u8, 2, 3], Some("RGB".into()));
        let live = [("a", &plain), ("b", &pictured)];

        let (topic, record) = first_image(&live).unwrap();
        assert_eq!(topic, "b");
        assert_eq!(record.format.as_deref(), Some("RGB"));
    }
}
