//! Upload candidates and content-type validation.

use std::path::Path;

/// Content types the captioning backend accepts.
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
];

/// Declared type for files whose extension maps to no image type.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Check a declared content type against the allow-list (case-insensitive).
pub fn is_supported_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_ascii_lowercase();
    SUPPORTED_CONTENT_TYPES.contains(&lowered.as_str())
}

/// Map a file extension to the content type a browser would declare for it.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => UNKNOWN_CONTENT_TYPE,
    }
}

/// The content type declared for `path`: the override if given, else the
/// type implied by its extension.
pub fn declared_content_type(path: &Path, content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) => ct.to_string(),
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .map(content_type_for_extension)
            .unwrap_or(UNKNOWN_CONTENT_TYPE)
            .to_string(),
    }
}

/// A single image held in memory together with its declared content type.
///
/// The declared type is sent verbatim to the backend and used as the upload's
/// `Content-Type`; it is not sniffed from the bytes.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Display name (usually the file name)
    pub name: String,
    /// Declared MIME type
    pub content_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension unless
    /// `content_type` overrides it.
    pub async fn from_path(path: &Path, content_type: Option<&str>) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let declared = declared_content_type(path, content_type);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, declared, bytes))
    }

    pub fn is_supported(&self) -> bool {
        is_supported_content_type(&self.content_type)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
