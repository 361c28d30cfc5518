use crate::imports::*;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/*
    Types:
    * Record - One source's contribution for a cycle: optional binary payload + format tag, and a metadata tree
    * Batch - Topic -> Record (or absence) for one cycle, iteration order is the processing order
    * OutputBatch - Topic -> Record, "main" is always the first entry
*/
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default)]
    pub data: MetaMap,
}

impl Record {
    pub fn new(data: MetaMap) -> Self {
        Record {
            image: None,
            format: None,
            data,
        }
    }

    pub fn with_image(mut self, image: impl Into<Bytes>, format: Option<String>) -> Self {
        self.image = Some(image.into());
        self.format = format;
        self
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

impl From<MetaMap> for Record {
    fn from(data: MetaMap) -> Self {
        Record::new(data)
    }
}

impl From<ObjectBuilder> for Record {
    fn from(builder: ObjectBuilder) -> Self {
        Record::new(builder.build_map())
    }
}

pub type Batch = IndexMap<String, Option<Record>>;

pub type OutputBatch = IndexMap<String, Record>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialises_without_empty_payload() {
        let record = Record::from(ObjectBuilder::new().insert("id", 1));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({"data": {"id": 1}}));
    }

    #[test]
    fn test_record_deserialises_data_only() {
        let record: Record = serde_json::from_str(r#"{"data": {"meta": {"id": 2}}}"#).unwrap();
        assert!(!record.has_image());
        assert_eq!(record.format, None);
        assert_eq!(record.data["meta"]["id"], 2);
    }

    #[test]
    fn test_with_image_sets_format() {
        let record = Record::default().with_image(vec![0u8; 4], Some("RGB".to_string()));
        assert_eq!(record.image.as_deref(), Some(&[0u8; 4][..]));
        assert_eq!(record.format.as_deref(), Some("RGB"));
    }
}
