use crate::imports::*;
use serde::Serialize;

mod reducers;

/*
    Types:
    * Operation - The closed set of reductions an aggregation path can name

    Every reducer receives the present, non-null values found at one path across the live
    records of a cycle, in processing order. Numeric reducers keep only JSON numbers.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    CountDistinct,
    Distinct,
    Median,
    Std,
    Any,
    All,
    Mode,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::Sum,
        Operation::Avg,
        Operation::Min,
        Operation::Max,
        Operation::Count,
        Operation::CountDistinct,
        Operation::Distinct,
        Operation::Median,
        Operation::Std,
        Operation::Any,
        Operation::All,
        Operation::Mode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Avg => "avg",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Count => "count",
            Operation::CountDistinct => "count_distinct",
            Operation::Distinct => "distinct",
            Operation::Median => "median",
            Operation::Std => "std",
            Operation::Any => "any",
            Operation::All => "all",
            Operation::Mode => "mode",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Operation::Sum
                | Operation::Avg
                | Operation::Min
                | Operation::Max
                | Operation::Median
                | Operation::Std
        )
    }

    // "<leaf>_<operation>", e.g. "sheeps_sum"
    pub fn suffixed_key(&self, leaf: &str) -> String {
        format!("{}_{}", leaf, self.as_str())
    }

    pub fn reduce(&self, values: &[&MetaValue]) -> MetaValue {
        if self.is_numeric() {
            let numbers: Vec<&serde_json::Number> =
                values.iter().filter_map(|v| v.as_number()).collect();
            return match self {
                Operation::Sum => reducers::sum(&numbers),
                Operation::Avg => reducers::avg(&numbers),
                Operation::Min => reducers::min(&numbers),
                Operation::Max => reducers::max(&numbers),
                Operation::Median => reducers::median(&numbers),
                Operation::Std => reducers::std(&numbers),
                _ => to_meta::null(),
            };
        }

        match self {
            Operation::Count => to_meta::u64(values.len() as u64),
            Operation::CountDistinct => to_meta::u64(reducers::distinct(values).len() as u64),
            Operation::Distinct => to_meta::array(reducers::distinct(values)),
            Operation::Any => to_meta::bool(values.iter().any(|v| is_truthy(v))),
            Operation::All => to_meta::bool(values.iter().all(|v| is_truthy(v))),
            Operation::Mode => reducers::mode(values),
            _ => to_meta::null(),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedOperation(s.to_string()))
    }
}
