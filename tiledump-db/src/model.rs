use std::collections::BTreeMap;

use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

/// A retrieved payload together with the metadata that decides where it lands on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub id: String,
    pub local_path: String,
    pub file_name: String,
    pub attributes: BTreeMap<String, String>,
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        local_path: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            local_path: local_path.into(),
            file_name: file_name.into(),
            attributes: BTreeMap::new(),
            content: content.into(),
        }
    }
}

/// Shape of a `FileContent` record as the server writes it.
///
/// `Content` is null when the payload was too large for a single document; the
/// bytes then live in GridFS under `LargeContentId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContentRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "LocalPath", default)]
    pub local_path: Option<String>,
    #[serde(rename = "FileName", default)]
    pub file_name: Option<String>,
    /// Values may be null: the server writes a `Dictionary<string, string>`.
    #[serde(rename = "Attributes", default)]
    pub attributes: Option<BTreeMap<String, Option<String>>>,
    #[serde(rename = "LargeContentId", default)]
    pub large_content_id: Option<String>,
    #[serde(rename = "Content", default)]
    pub content: Option<Binary>,
}

impl FileContentRecord {
    /// GridFS id of the payload, if the record points at one.
    pub fn large_content_id(&self) -> Option<&str> {
        self.large_content_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    pub fn into_document(self, content: Vec<u8>) -> Document {
        Document {
            id: self.id,
            local_path: self.local_path.unwrap_or_default(),
            file_name: self.file_name.unwrap_or_default(),
            attributes: self
                .attributes
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
            content,
        }
    }

    /// Converts a record whose payload is stored inline.
    pub fn into_inline_document(mut self) -> Document {
        let content = self.content.take().map(|b| b.bytes).unwrap_or_default();
        self.into_document(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc, spec::BinarySubtype};

    #[test]
    fn record_deserializes_from_server_layout() {
        let png = Binary {
            subtype: BinarySubtype::Generic,
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        let raw = doc! {
            "_id": "Planetoid_13/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/1/0/6",
            "FileName": "6.png",
            "LocalPath": "Planetoid_13/com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded/1/0",
            "Attributes": { "format": "png" },
            "LargeContentId": bson::Bson::Null,
            "Content": png,
        };

        let record: FileContentRecord = bson::from_document(raw).unwrap();
        assert_eq!(record.large_content_id(), None);

        let document = record.into_inline_document();
        assert_eq!(document.file_name, "6.png");
        assert_eq!(document.content, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(document.attributes.get("format").map(String::as_str), Some("png"));
    }

    #[test]
    fn large_record_has_no_inline_content() {
        let raw = doc! {
            "_id": "Planetoid_2/Satelite/12/20/20",
            "FileName": "20.png",
            "LocalPath": "Planetoid_2/Satelite/12/20",
            "LargeContentId": "65f0c0ffee0000000000beef",
            "Content": bson::Bson::Null,
        };

        let record: FileContentRecord = bson::from_document(raw).unwrap();
        assert_eq!(record.large_content_id(), Some("65f0c0ffee0000000000beef"));
        assert!(record.content.is_none());
    }

    #[test]
    fn null_attribute_values_are_dropped() {
        let raw = doc! {
            "_id": "Planetoid_2/Satelite/12/20/20",
            "FileName": "20.png",
            "LocalPath": "Planetoid_2/Satelite/12/20",
            "Attributes": { "format": "png", "source": bson::Bson::Null },
            "Content": bson::Bson::Null,
        };

        let record: FileContentRecord = bson::from_document(raw).unwrap();
        let document = record.into_inline_document();
        assert_eq!(document.attributes.len(), 1);
        assert_eq!(document.attributes.get("format").map(String::as_str), Some("png"));
        assert!(!document.attributes.contains_key("source"));
    }

    #[test]
    fn missing_path_fields_become_empty() {
        let record: FileContentRecord = bson::from_document(doc! { "_id": "x" }).unwrap();
        let document = record.into_inline_document();
        assert_eq!(document.local_path, "");
        assert_eq!(document.file_name, "");
        assert!(document.content.is_empty());
    }
}
