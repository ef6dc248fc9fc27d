use axum::extract::Multipart;
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::util::error::HandlerError;

/// Name of the file part carrying the picture.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Malformed multipart body: {0}")]
    Multipart(String),
    #[error("Only image files are allowed")]
    NotAnImage,
    #[error("Image exceeds the {limit_mb} MB limit")]
    TooLarge { limit_mb: usize },
    #[error("{0} is required")]
    MissingField(String),
    #[error("{0} is invalid")]
    InvalidField(String),
}

impl From<UploadError> for HandlerError {
    fn from(err: UploadError) -> Self {
        HandlerError::bad_request(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedImage {
    /// Extension taken from the MIME subtype, e.g. `image/png` -> `png`.
    /// Anything that is not plain ASCII alphanumerics becomes `bin`.
    pub fn extension(&self) -> &str {
        self.content_type
            .split_once('/')
            .map(|(_, sub)| sub.split(['+', ';']).next().unwrap_or(sub).trim())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("bin")
    }
}

/// Text fields plus the optional `image` part of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

impl MultipartForm {
    /// Drain the request, rejecting non-image files and images larger than `max_bytes`.
    pub async fn read(mut multipart: Multipart, max_bytes: usize) -> Result<Self, UploadError> {
        let mut form = MultipartForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| UploadError::Multipart(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD && field.file_name().is_some() {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("image/") {
                    warn!("Rejected upload with content type '{}'", content_type);
                    return Err(UploadError::NotAnImage);
                }
                let file_name = field.file_name().map(str::to_string);
                let mut buf = BytesMut::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?
                {
                    if buf.len() + chunk.len() > max_bytes {
                        return Err(UploadError::TooLarge { limit_mb: max_bytes / (1024 * 1024) });
                    }
                    buf.extend_from_slice(&chunk);
                }
                debug!("Received image {:?} ({} bytes)", file_name, buf.len());
                if !buf.is_empty() {
                    form.image = Some(UploadedImage { file_name, content_type, bytes: buf.freeze() });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Trimmed, non-empty text value.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required(&self, key: &str) -> Result<String, UploadError> {
        self.text(key).ok_or_else(|| UploadError::MissingField(key.to_string()))
    }

    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, UploadError> {
        match self.text(key) {
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| UploadError::InvalidField(key.to_string())),
            None => Ok(None),
        }
    }
}
