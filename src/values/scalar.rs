use crate::imports::*;

/*
    Types:
    * MetaValue - A node of a record's metadata tree, re-export of serde_json::Value
    * MetaMap - String-keyed map node, keeps insertion order (serde_json "preserve_order")
    * MetaType - Enum representing the type of a metadata value
    * ObjectBuilder - Builder pattern for constructing nested metadata trees
*/
pub type MetaValue = serde_json::Value;
pub type MetaMap = serde_json::Map<String, MetaValue>;

#[derive(Debug, Clone, Copy, PartialEq, Default, Hash, Eq)]
pub enum MetaType {
    #[default]
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectBuilder {
    map: MetaMap,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    pub fn object(mut self, key: impl Into<String>, nested: ObjectBuilder) -> Self {
        self.map.insert(key.into(), MetaValue::Object(nested.map));
        self
    }

    pub fn build_value(self) -> MetaValue {
        MetaValue::Object(self.map)
    }

    pub fn build_map(self) -> MetaMap {
        self.map
    }
}

/*
    Extension Traits:
    * MetaAsExt - Shape checks with an error naming the offending field, for inputs read from outside
*/
pub trait MetaAsExt {
    fn as_array_or_err(&self, field: &str) -> Result<&Vec<MetaValue>>;
    fn as_object_or_err(&self, field: &str) -> Result<&MetaMap>;
}

impl MetaAsExt for MetaValue {
    fn as_array_or_err(&self, field: &str) -> Result<&Vec<MetaValue>> {
        self.as_array()
            .context(format!("'{}' must be an array", field))
    }

    fn as_object_or_err(&self, field: &str) -> Result<&MetaMap> {
        self.as_object()
            .context(format!("'{}' must be an object", field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_builder_nests_maps() {
        let value = ObjectBuilder::new()
            .insert("id", 1)
            .object("meta", ObjectBuilder::new().insert("valid", true))
            .build_value();

        assert_eq!(value["id"], 1);
        assert_eq!(value["meta"]["valid"], true);
    }

    #[test]
    fn test_as_object_or_err_names_field() {
        let value = MetaValue::from("not an object");
        let err = value.as_object_or_err("events[0]").unwrap_err();
        assert!(err.to_string().contains("'events[0]' must be an object"));
    }
}
