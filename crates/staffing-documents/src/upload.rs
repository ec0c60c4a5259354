//! Signature image intake
//!
//! An upload is accepted only when the declared content type and the magic
//! bytes agree on one of PNG, JPEG, GIF or WebP.

use base64::Engine;
use bytes::Bytes;
use staffing_core::error::{StaffingError, ValidationErrors};

/// Image formats accepted as signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    /// Identify the format from its leading bytes
    pub fn sniff(data: &[u8]) -> Option<ImageKind> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else {
            None
        }
    }

    /// Map a declared content type onto a kind; parameters are ignored
    pub fn from_content_type(content_type: &str) -> Option<ImageKind> {
        let parsed: mime::Mime = content_type.trim().parse().ok()?;
        if parsed.type_() != mime::IMAGE {
            return None;
        }
        match parsed.subtype().as_str().to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpeg" | "jpg" | "pjpeg" => Some(ImageKind::Jpeg),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// A verified signature image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    pub kind: ImageKind,
    pub data: Bytes,
}

impl SignatureImage {
    /// Re-identify a previously stored image
    pub fn from_stored(data: Bytes) -> Option<Self> {
        ImageKind::sniff(&data).map(|kind| Self { kind, data })
    }

    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.kind.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}

/// Upload rejection reasons
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,
    #[error("file is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported media type {0}")]
    Unsupported(String),
}

impl From<UploadError> for StaffingError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Empty => ValidationErrors::single("file", "can't be empty").into(),
            UploadError::TooLarge { size, max } => StaffingError::PayloadTooLarge { size, max },
            UploadError::Unsupported(content_type) => {
                StaffingError::UnsupportedMediaType { content_type }
            }
        }
    }
}

/// Checks applied to every uploaded signature
#[derive(Debug, Clone, Copy)]
pub struct SignaturePolicy {
    pub max_bytes: usize,
}

impl SignaturePolicy {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    /// `declared` is the multipart part's content type; when absent or generic
    /// it is guessed from `filename`.
    pub fn inspect(
        &self,
        declared: Option<&str>,
        filename: Option<&str>,
        data: Bytes,
    ) -> Result<SignatureImage, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }

        let declared = match declared.map(str::trim) {
            Some(ct) if !ct.is_empty() && ct != mime::APPLICATION_OCTET_STREAM.essence_str() => {
                ct.to_string()
            }
            _ => filename
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        };

        let claimed = ImageKind::from_content_type(&declared)
            .ok_or_else(|| UploadError::Unsupported(declared.clone()))?;
        match ImageKind::sniff(&data) {
            Some(actual) if actual == claimed => Ok(SignatureImage { kind: actual, data }),
            _ => Err(UploadError::Unsupported(declared)),
        }
    }
}
