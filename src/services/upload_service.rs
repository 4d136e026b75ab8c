use std::path::{Path, PathBuf};

use mime::Mime;
use serde::Serialize;
use tokio::fs;
use uuid::Uuid;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

const ALLOWED_TYPES: [(&str, MediaKind); 8] = [
    ("image/jpeg", MediaKind::Image),
    ("image/png", MediaKind::Image),
    ("image/webp", MediaKind::Image),
    ("image/gif", MediaKind::Image),
    ("video/mp4", MediaKind::Video),
    ("video/quicktime", MediaKind::Video),
    ("video/x-msvideo", MediaKind::Video),
    ("video/webm", MediaKind::Video),
];

/// Maps an allowed declared content type to its media kind.
pub fn classify(content_type: &str) -> Option<MediaKind> {
    let mime: Mime = content_type.parse().ok()?;
    let essence = mime.essence_str().to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == essence)
        .map(|(_, kind)| *kind)
}

/// Lowercased extension of the original name, or the kind's default.
pub fn extension_for(original_name: Option<&str>, kind: MediaKind) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| kind.default_extension().to_string())
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub url: String,
    pub filename: String,
    pub content_type: String,
    pub media_type: MediaKind,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    public_base: String,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, backend_url: &str) -> Self {
        UploadService {
            dir: dir.into(),
            public_base: format!("{}/api/uploads", backend_url.trim_end_matches('/')),
        }
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub async fn save(
        &self,
        data: &[u8],
        original_name: Option<&str>,
        content_type: &str,
    ) -> Result<StoredUpload> {
        let kind = classify(content_type)
            .ok_or_else(|| AppError::UnsupportedFileType(content_type.to_string()))?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension_for(original_name, kind));

        self.ensure_dir().await?;
        fs::write(self.dir.join(&filename), data).await?;

        Ok(StoredUpload {
            url: format!("{}/{}", self.public_base, filename),
            filename,
            content_type: content_type.to_string(),
            media_type: kind,
            size: data.len(),
        })
    }

    /// Resolves a served file name inside the upload directory. Anything
    /// that could escape the directory resolves to nothing.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        if file_name.is_empty()
            || file_name.contains("..")
            || file_name.contains('/')
            || file_name.contains('\\')
        {
            return None;
        }

        let path = self.dir.join(file_name);
        path.is_file().then_some(path)
    }
}
