//! Media service for image uploads.
//!
//! Three input shapes (multipart bytes, base64 data URI, source URL) are
//! normalized to raw bytes plus a declared extension, then run through one
//! validation routine before being handed to the storage backend.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use maru_common::{AppError, AppResult, IdGenerator, StorageBackend};

/// Upload size cap. Applied to base64 payloads only; multipart and URL
/// inputs are passed through uncapped.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// An image payload in one of the accepted input shapes.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Raw bytes from a multipart upload, with the client-declared filename.
    Multipart {
        /// Original filename, used to extract the declared extension.
        filename: String,
        /// File bytes.
        bytes: Vec<u8>,
    },
    /// A `data:image/...;base64,...` data URI.
    Base64(String),
    /// A source URL to fetch the image from.
    Url(String),
}

/// An accepted image, ready for storage.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Decoded bytes.
    pub bytes: Vec<u8>,
    /// Validated extension (png, jpeg, or jpg).
    pub extension: String,
    /// Declared content type.
    pub content_type: String,
}

/// Media service delegating persistence to an object storage backend.
#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn StorageBackend>,
    http: reqwest::Client,
    id_gen: IdGenerator,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, http: reqwest::Client) -> Self {
        Self {
            storage,
            http,
            id_gen: IdGenerator::new(),
        }
    }

    /// Normalize, validate, and store an image. Returns its public URL.
    ///
    /// `None` (or an empty payload) is passed through as `None` so callers
    /// can treat the image as optional.
    pub async fn upload(&self, input: Option<ImageInput>) -> AppResult<Option<String>> {
        let Some(input) = input else {
            return Ok(None);
        };

        let Some(image) = self.normalize(input).await? else {
            return Ok(None);
        };

        let key = self.id_gen.generate_filename(&image.extension);
        let uploaded = self
            .storage
            .upload(&key, &image.bytes, &image.content_type)
            .await?;

        tracing::info!(key = %uploaded.key, size = uploaded.size, "Image uploaded");
        Ok(Some(uploaded.url))
    }

    /// Delete a stored image by its public URL.
    pub async fn remove_by_url(&self, url: &str) -> AppResult<()> {
        let key = url
            .rsplit('/')
            .next()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("Not a storage URL: {url}")))?;

        if !self.storage.exists(key).await? {
            return Err(AppError::NotFound(format!("File does not exist: {key}")));
        }

        self.storage.delete(key).await?;
        tracing::info!(key = %key, "Image deleted");
        Ok(())
    }

    /// Normalize one input shape to bytes plus a declared extension.
    ///
    /// Empty payloads normalize to `None`.
    async fn normalize(&self, input: ImageInput) -> AppResult<Option<NormalizedImage>> {
        match input {
            ImageInput::Multipart { filename, bytes } => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let content_type = content_type_from_filename(&filename);
                let extension = validate_content_type(&content_type)?;
                Ok(Some(NormalizedImage {
                    bytes,
                    extension,
                    content_type,
                }))
            }
            ImageInput::Base64(data_uri) => {
                if data_uri.is_empty() {
                    return Ok(None);
                }
                let payload = data_uri
                    .split_once(',')
                    .map(|(_, p)| p)
                    .ok_or_else(|| AppError::BadRequest("Malformed data URI".to_string()))?;

                let bytes = BASE64
                    .decode(payload)
                    .map_err(|e| AppError::BadRequest(format!("Invalid base64 payload: {e}")))?;

                if bytes.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::SizeExceeded(format!(
                        "Image exceeds {MAX_IMAGE_BYTES} bytes"
                    )));
                }

                let content_type = content_type_from_data_uri(&data_uri);
                let extension = validate_content_type(&content_type)?;
                Ok(Some(NormalizedImage {
                    bytes,
                    extension,
                    content_type,
                }))
            }
            ImageInput::Url(url) => {
                if url.is_empty() {
                    return Ok(None);
                }
                let content_type = content_type_from_url(&url)?;
                let extension = validate_content_type(&content_type)?;

                let response = self.http.get(&url).send().await.map_err(|e| {
                    AppError::ExternalService(format!("Failed to fetch image: {e}"))
                })?;
                let bytes = response.bytes().await.map_err(|e| {
                    AppError::ExternalService(format!("Failed to read image body: {e}"))
                })?;

                Ok(Some(NormalizedImage {
                    bytes: bytes.to_vec(),
                    extension,
                    content_type,
                }))
            }
        }
    }
}

/// Declared content type from a multipart filename ("photo.png" -> "image/png").
fn content_type_from_filename(filename: &str) -> String {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    format!("image/{extension}")
}

/// Declared content type from a data URI header ("data:image/png;base64,...").
fn content_type_from_data_uri(data_uri: &str) -> String {
    let colon = data_uri.find(':');
    let semicolon = data_uri.find(';');
    match (colon, semicolon) {
        (Some(c), Some(s)) if c < s => data_uri[c + 1..s].to_string(),
        _ => String::new(),
    }
}

/// Declared content type from a source URL's path extension.
fn content_type_from_url(url: &str) -> AppResult<String> {
    let parsed =
        url::Url::parse(url).map_err(|e| AppError::BadRequest(format!("Invalid URL: {e}")))?;
    let extension = parsed
        .path()
        .rsplit('.')
        .next()
        .filter(|e| !e.contains('/'))
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension.is_empty() {
        return Err(AppError::BadRequest("File is not an image".to_string()));
    }
    Ok(format!("image/{extension}"))
}

/// The single validation routine all three input shapes feed into.
fn validate_content_type(content_type: &str) -> AppResult<String> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest("File is not an image".to_string()));
    }
    Ok(content_type
        .split('/')
        .nth(1)
        .unwrap_or_default()
        .to_string())
}
