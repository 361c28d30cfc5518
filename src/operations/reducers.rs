use crate::imports::*;
use serde_json::Number;
use std::cmp::Ordering;

/*
    Functions:
    (NUMERIC - input is already filtered down to JSON numbers)
    * sum - Integral while every input is an integer, float otherwise; 0 on empty input
    * avg - Arithmetic mean as a float
    * min / max - Original value of the extreme, first occurrence wins ties
    * median - Middle value, midpoint average as a float for an even count
    * std - Population standard deviation, 0 for a single value
    (ANY TYPE)
    * distinct - Values with duplicates removed, first occurrence order
    * mode - Most frequent value, first occurrence wins ties
*/
pub(super) fn sum(numbers: &[&Number]) -> MetaValue {
    let mut integral: Option<i128> = Some(0);
    let mut total = 0.0;
    for n in numbers {
        total += n.as_f64().unwrap_or(0.0);
        integral = match (integral, integer_of(n)) {
            (Some(acc), Some(i)) => acc.checked_add(i),
            _ => None,
        };
    }

    match integral {
        Some(acc) => i64::try_from(acc)
            .map(to_meta::i64)
            .or_else(|_| u64::try_from(acc).map(to_meta::u64))
            .unwrap_or_else(|_| to_meta::f64(total)),
        None => to_meta::f64(total),
    }
}

pub(super) fn avg(numbers: &[&Number]) -> MetaValue {
    match mean(numbers) {
        Some(m) => to_meta::f64(m),
        None => to_meta::null(),
    }
}

pub(super) fn min(numbers: &[&Number]) -> MetaValue {
    extreme(numbers, Ordering::Less)
}

pub(super) fn max(numbers: &[&Number]) -> MetaValue {
    extreme(numbers, Ordering::Greater)
}

pub(super) fn median(numbers: &[&Number]) -> MetaValue {
    if numbers.is_empty() {
        return to_meta::null();
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_by(|a, b| compare_numbers(a, b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        MetaValue::Number(sorted[mid].clone())
    } else {
        let lower = sorted[mid - 1].as_f64().unwrap_or(0.0);
        let upper = sorted[mid].as_f64().unwrap_or(0.0);
        to_meta::f64((lower + upper) / 2.0)
    }
}

pub(super) fn std(numbers: &[&Number]) -> MetaValue {
    let Some(m) = mean(numbers) else {
        return to_meta::null();
    };
    let variance = numbers
        .iter()
        .map(|n| {
            let delta = n.as_f64().unwrap_or(0.0) - m;
            delta * delta
        })
        .sum::<f64>()
        / numbers.len() as f64;
    to_meta::f64(variance.sqrt())
}

pub(super) fn distinct(values: &[&MetaValue]) -> Vec<MetaValue> {
    let mut seen: Vec<MetaValue> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| values_equal(s, value)) {
            seen.push((*value).clone());
        }
    }
    seen
}

pub(super) fn mode(values: &[&MetaValue]) -> MetaValue {
    let mut counts: Vec<(&MetaValue, usize)> = Vec::new();
    for &value in values {
        match counts.iter().position(|(seen, _)| values_equal(seen, value)) {
            Some(index) => counts[index].1 += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&MetaValue, usize)> = None;
    for (value, count) in counts {
        // strict comparison keeps the earliest value on ties
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone()).unwrap_or(MetaValue::Null)
}

fn mean(numbers: &[&Number]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    let total: f64 = numbers.iter().filter_map(|n| n.as_f64()).sum();
    Some(total / numbers.len() as f64)
}

fn extreme(numbers: &[&Number], wanted: Ordering) -> MetaValue {
    let mut best: Option<&Number> = None;
    for &n in numbers {
        if best.is_none_or(|b| compare_numbers(n, b) == wanted) {
            best = Some(n);
        }
    }
    best.map(|n| MetaValue::Number(n.clone()))
        .unwrap_or(MetaValue::Null)
}

fn integer_of(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (integer_of(a), integer_of(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}
