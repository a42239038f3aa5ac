/**
 * Image Ingestion
 * Turns uploaded files into storable image references: inline data for
 * profile/cover/project images, object storage URLs for blog covers.
 */
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ceiling for images inlined into a record.
pub const MAX_INLINE_IMAGE_BYTES: usize = 500 * 1024;

/// A stored image: either fetched from elsewhere or carried in the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageRef {
    Url {
        url: String,
    },
    Inline {
        mime: String,
        #[serde(serialize_with = "encode_bytes", deserialize_with = "decode_bytes")]
        data: Vec<u8>,
    },
}

fn encode_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn decode_bytes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

impl ImageRef {
    pub fn url(url: impl Into<String>) -> Self {
        ImageRef::Url { url: url.into() }
    }

    /// Value usable as an `<img src>`: the URL itself or a `data:` URL.
    pub fn src(&self) -> String {
        match self {
            ImageRef::Url { url } => url.clone(),
            ImageRef::Inline { mime, data } => {
                format!("data:{};base64,{}", mime, STANDARD.encode(data))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image is {size} bytes, limit is {limit} bytes")]
    SizeExceeded { size: usize, limit: usize },

    #[error("unsupported content type: {0}")]
    InvalidType(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Upload to object storage and reference by URL.
    Url,
    /// Encode into the record itself.
    Inline,
}

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Byte storage that hands back a fetchable URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> std::io::Result<String>;
}

/// Stores objects as files under `root`; URLs are `{public_base}/uploads/{key}`.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> std::io::Result<String> {
        if key.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid object key: {}", key),
            ));
        }

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(key = %key, size = bytes.len(), "object stored");
        Ok(format!("{}/uploads/{}", self.public_base, key))
    }
}

/// Keep only characters that are safe in a single path segment.
fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Storage key for a URL-mode upload.
pub fn object_key(owner: &str, file_name: &str) -> String {
    format!(
        "blogs/{}/{}_{}",
        sanitize_file_name(owner),
        Utc::now().timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

/// Convert an uploaded file into an [`ImageRef`].
pub async fn ingest(
    file: UploadedFile,
    mode: IngestMode,
    owner: &str,
    storage: &dyn ObjectStorage,
) -> Result<ImageRef, ImageError> {
    match mode {
        IngestMode::Url => {
            let key = object_key(owner, &file.file_name);
            let url = storage.put(&key, &file.bytes, &file.content_type).await?;
            Ok(ImageRef::Url { url })
        }
        IngestMode::Inline => {
            if file.bytes.len() > MAX_INLINE_IMAGE_BYTES {
                return Err(ImageError::SizeExceeded {
                    size: file.bytes.len(),
                    limit: MAX_INLINE_IMAGE_BYTES,
                });
            }
            let mime = file.content_type.trim().to_ascii_lowercase();
            if !mime.starts_with("image/") {
                return Err(ImageError::InvalidType(file.content_type));
            }
            Ok(ImageRef::Inline {
                mime,
                data: file.bytes,
            })
        }
    }
}
