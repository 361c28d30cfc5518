use crate::imports::*;

use pest::Parser;
use pest::error::InputLocation;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "values/field_path.pest"] // relative to src directory
struct FieldPathParser;

/*
    FieldPath - A parsed dotted address of a metadata leaf, e.g. "meta.sensors.temperature".
    Segments are never empty and there is always at least one.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(dotted: &str) -> std::result::Result<Self, ConfigError> {
        let mut pairs = FieldPathParser::parse(Rule::path, dotted).map_err(|e| {
            let position = match e.location {
                InputLocation::Pos(pos) => pos,
                InputLocation::Span((start, _)) => start,
            };
            ConfigError::InvalidFieldPath {
                path: dotted.to_string(),
                reason: format!("{} at position {}", e.variant.message(), position),
            }
        })?;

        let segments: Vec<String> = pairs
            .next()
            .map(|path| {
                path.into_inner()
                    .filter(|pair| pair.as_rule() == Rule::segment)
                    .map(|pair| pair.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        if segments.is_empty() {
            return Err(ConfigError::InvalidFieldPath {
                path: dotted.to_string(),
                reason: "path has no segments".to_string(),
            });
        }
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn parents(&self) -> &[String] {
        self.segments
            .split_last()
            .map(|(_, parents)| parents)
            .unwrap_or_default()
    }

    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }

    // Same parents, different final key.
    pub fn with_leaf(&self, leaf_key: impl Into<String>) -> Self {
        let mut segments = self.parents().to_vec();
        segments.push(leaf_key.into());
        FieldPath { segments }
    }

    pub fn matches_segments(&self, segments: &[String]) -> bool {
        self.segments == segments
    }

    pub fn read<'a>(&self, tree: &'a MetaMap) -> Option<&'a MetaValue> {
        get_at_path(tree, &self.segments)
    }

    pub fn write(&self, tree: &mut MetaMap, leaf_key: &str, value: MetaValue) {
        insert_at_path(tree, self.parents(), leaf_key, value)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl serde::Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dotted())
    }
}
