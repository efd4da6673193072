//! Image upload policy: allowed formats and per-file size limit.
//!
//! The declared MIME type is only trusted as far as it agrees with the
//! file's magic bytes, which are sniffed with [`image::guess_format`].

use image::ImageFormat;

use crate::validation::{FieldErrorCode, ValidationErrors};

/// Default per-file upload limit (10 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// MIME types accepted for product and category images.
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An uploaded file that satisfied the policy.
#[derive(Debug, Clone)]
pub struct AcceptedImage {
    pub bytes: Vec<u8>,
    pub kind: ImageKind,
    pub original_name: Option<String>,
}

/// Image formats the catalog stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// File extension used for stored copies.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Upload constraints applied at the request boundary.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_bytes: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Check a single file, returning its sniffed kind or a user-facing message.
    pub fn check(&self, file: &UploadedFile) -> Result<ImageKind, String> {
        if file.bytes.is_empty() {
            return Err("The uploaded file is empty.".into());
        }
        if file.bytes.len() > self.max_bytes {
            return Err(format!(
                "The image may not be greater than {} kilobytes.",
                self.max_bytes / 1024
            ));
        }
        if let Some(declared) = file.content_type.as_deref() {
            let declared = declared.to_ascii_lowercase();
            if !ALLOWED_IMAGE_MIME_TYPES.contains(&declared.as_str()) {
                return Err(format!(
                    "The file must be an image of type: {}.",
                    ALLOWED_IMAGE_MIME_TYPES.join(", ")
                ));
            }
        }
        image::guess_format(&file.bytes)
            .ok()
            .and_then(ImageKind::from_format)
            .ok_or_else(|| "The file must be an image.".to_string())
    }

    /// Check every file in a batch. Failures are recorded as `{field}.{index}`.
    pub fn accept_all(
        &self,
        errors: &mut ValidationErrors,
        field: &str,
        files: Vec<UploadedFile>,
    ) -> Vec<AcceptedImage> {
        let mut accepted = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            match self.check(&file) {
                Ok(kind) => accepted.push(AcceptedImage {
                    bytes: file.bytes,
                    kind,
                    original_name: file.file_name,
                }),
                Err(message) => {
                    errors.add(&format!("{field}.{index}"), FieldErrorCode::File, message)
                }
            }
        }
        accepted
    }

    /// Check an optional single-file field such as a category image.
    pub fn accept_one(
        &self,
        errors: &mut ValidationErrors,
        field: &str,
        file: Option<UploadedFile>,
    ) -> Option<AcceptedImage> {
        let file = file?;
        match self.check(&file) {
            Ok(kind) => Some(AcceptedImage {
                bytes: file.bytes,
                kind,
                original_name: file.file_name,
            }),
            Err(message) => {
                errors.add(field, FieldErrorCode::File, message);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Smallest byte strings `image::guess_format` recognizes.
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    pub const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
}
