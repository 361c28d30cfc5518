use crate::imports::*;

/*
    Helper functions:
    * get_at_path - Reads the value at a segment chain, None when any segment is missing (a present null is Some)
    * insert_at_path - Writes a value under leaf_key below a segment chain, creating maps as needed
    * collect_leaves - Lists every leaf of a metadata tree with its full segment path
    * meta_type_of - Returns the MetaType of a given MetaValue
    * is_truthy - Boolean coercion used by the logical reducers
    * values_equal - Structural equality where numbers compare by value (1 == 1.0)
    * to_meta - Module with helper functions to create MetaValues of various types
*/
pub(crate) fn get_at_path<'a>(tree: &'a MetaMap, segments: &[String]) -> Option<&'a MetaValue> {
    let (last, parents) = segments.split_last()?;

    let mut current = tree;
    for segment in parents {
        match current.get(segment) {
            Some(MetaValue::Object(map)) => current = map,
            _ => return None,
        }
    }

    current.get(last)
}

pub(crate) fn insert_at_path(
    tree: &mut MetaMap,
    parents: &[String],
    leaf_key: &str,
    value: MetaValue,
) {
    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| MetaValue::Object(MetaMap::new()));
        if !slot.is_object() {
            *slot = MetaValue::Object(MetaMap::new());
        }
        let Some(map) = slot.as_object_mut() else {
            return;
        };
        current = map;
    }
    current.insert(leaf_key.to_string(), value);
}

// Non-empty maps are descended into; everything else (including an empty map) is a leaf.
pub(crate) fn collect_leaves(tree: &MetaMap) -> Vec<(Vec<String>, &MetaValue)> {
    let mut leaves = Vec::new();
    let mut prefix = Vec::new();
    collect_leaves_recursive(tree, &mut prefix, &mut leaves);
    leaves
}

fn collect_leaves_recursive<'a>(
    map: &'a MetaMap,
    prefix: &mut Vec<String>,
    leaves: &mut Vec<(Vec<String>, &'a MetaValue)>,
) {
    for (key, value) in map {
        prefix.push(key.clone());
        match value {
            MetaValue::Object(nested) if !nested.is_empty() => {
                collect_leaves_recursive(nested, prefix, leaves);
            }
            _ => leaves.push((prefix.clone(), value)),
        }
        prefix.pop();
    }
}

pub fn meta_type_of(value: &MetaValue) -> MetaType {
    match value {
        MetaValue::Null => MetaType::Null,
        MetaValue::Bool(_) => MetaType::Bool,
        MetaValue::Number(n) if n.is_f64() => MetaType::Float,
        MetaValue::Number(_) => MetaType::Integer,
        MetaValue::String(_) => MetaType::String,
        MetaValue::Array(_) => MetaType::Array,
        MetaValue::Object(_) => MetaType::Object,
    }
}

pub fn is_truthy(value: &MetaValue) -> bool {
    match value {
        MetaValue::Null => false,
        MetaValue::Bool(b) => *b,
        MetaValue::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        MetaValue::String(s) => !s.is_empty(),
        MetaValue::Array(a) => !a.is_empty(),
        MetaValue::Object(o) => !o.is_empty(),
    }
}

// Booleans never equal numbers here, so `true` and `1` stay distinct values.
pub fn values_equal(a: &MetaValue, b: &MetaValue) -> bool {
    match (a, b) {
        (MetaValue::Number(x), MetaValue::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (MetaValue::Array(x), MetaValue::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (MetaValue::Object(x), MetaValue::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

pub mod to_meta {
    use crate::imports::*;
    /*
        Functions:
        * i64 - Creates a MetaValue::Number from i64
        * u64 - Creates a MetaValue::Number from u64
        * f64 - Creates a MetaValue::Number from f64, null when not finite
        * bool - Creates a MetaValue::Bool
        * null - Creates a MetaValue::Null
        * array - Creates a MetaValue::Array
    */

    pub fn i64(n: i64) -> MetaValue {
        MetaValue::Number(n.into())
    }
    pub fn u64(n: u64) -> MetaValue {
        MetaValue::Number(n.into())
    }
    pub fn f64(n: f64) -> MetaValue {
        match serde_json::Number::from_f64(n) {
            Some(num) => MetaValue::Number(num),
            None => MetaValue::Null,
        }
    }
    pub fn bool(b: bool) -> MetaValue {
        MetaValue::Bool(b)
    }
    pub fn null() -> MetaValue {
        MetaValue::Null
    }
    pub fn array(arr: Vec<MetaValue>) -> MetaValue {
        MetaValue::Array(arr)
    }
}
