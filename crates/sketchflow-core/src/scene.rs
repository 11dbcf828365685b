use base64::Engine as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::CanonicalElement;

/// Files referenced by image elements, keyed by file id in insertion order.
pub type BinaryFiles = IndexMap<String, FileData>;

#[derive(Debug, thiserror::Error)]
pub enum FileDecodeError {
    #[error("data URL is missing the `data:` prefix or the `,` separator")]
    MalformedDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub id: String,
    pub mime_type: String,
    #[serde(rename = "dataURL")]
    pub data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_retrieved: Option<i64>,
}

impl FileData {
    /// Decodes the payload of a `data:<mime>;base64,<payload>` URL.
    pub fn decode(&self) -> Result<Vec<u8>, FileDecodeError> {
        let rest = self
            .data_url
            .strip_prefix("data:")
            .ok_or(FileDecodeError::MalformedDataUrl)?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or(FileDecodeError::MalformedDataUrl)?;
        if !header.ends_with(";base64") {
            return Err(FileDecodeError::NotBase64);
        }
        Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
    }
}

/// Reads a `files` map leniently: entries that do not decode are dropped with a warning.
/// An entry missing its own `id` takes the map key.
pub fn files_from_value(value: &Value) -> BinaryFiles {
    let mut files = BinaryFiles::new();
    let Some(map) = value.as_object() else {
        if !value.is_null() {
            tracing::warn!("scene `files` is not an object; ignoring it");
        }
        return files;
    };
    for (key, entry) in map {
        let mut entry = entry.clone();
        if let Some(obj) = entry.as_object_mut() {
            obj.entry("id").or_insert_with(|| Value::String(key.clone()));
        }
        match serde_json::from_value::<FileData>(entry) {
            Ok(file) => {
                files.insert(key.clone(), file);
            }
            Err(err) => tracing::warn!(file_id = %key, %err, "dropping malformed scene file"),
        }
    }
    files
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub elements: Vec<CanonicalElement>,
    #[serde(default)]
    pub files: BinaryFiles,
}

impl Scene {
    pub fn new(elements: Vec<CanonicalElement>) -> Self {
        Self {
            elements,
            files: BinaryFiles::new(),
        }
    }

    pub fn with_files(elements: Vec<CanonicalElement>, files: BinaryFiles) -> Self {
        Self { elements, files }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements not soft-deleted.
    pub fn live_elements(&self) -> impl Iterator<Item = &CanonicalElement> {
        self.elements.iter().filter(|e| !e.is_deleted)
    }

    pub fn element(&self, id: &str) -> Option<&CanonicalElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}
