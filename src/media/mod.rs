pub mod thumbnail;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify by the declared content type. Anything not `image/*` is video.
    pub fn classify(content_type: &str) -> Self {
        let is_image = content_type
            .get(..6)
            .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
            .unwrap_or(false);
        if is_image { MediaKind::Image } else { MediaKind::Video }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{} size must not exceed {}", kind_label(.kind), megabytes(.ceiling))]
    PayloadTooLarge { kind: MediaKind, ceiling: usize },

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

fn kind_label(kind: &MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "Image",
        MediaKind::Video => "Video",
    }
}

fn megabytes(bytes: &usize) -> String {
    format!("{:.1}MB", *bytes as f64 / 1024.0 / 1024.0)
}

/// Paths of a persisted upload, with forward-slash separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub kind: MediaKind,
    pub media_path: String,
    pub thumbnail_path: Option<String>,
}

/// Writes uploads under one root directory and derives image thumbnails.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_image_bytes: usize,
    max_video_bytes: usize,
}

impl MediaStore {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.upload_dir),
            max_image_bytes: config.max_image_bytes,
            max_video_bytes: config.max_video_bytes,
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub fn ceiling(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Image => self.max_image_bytes,
            MediaKind::Video => self.max_video_bytes,
        }
    }

    /// Check size against the ceiling for the declared kind. Nothing is written.
    pub fn check(&self, content_type: &str, len: usize) -> Result<MediaKind, MediaError> {
        let kind = MediaKind::classify(content_type);
        let ceiling = self.ceiling(kind);
        if len > ceiling {
            debug!("Rejected {} upload of {} bytes (ceiling {})", kind.as_str(), len, ceiling);
            return Err(MediaError::PayloadTooLarge { kind, ceiling });
        }
        Ok(kind)
    }

    /// Validate and persist an upload, then try to derive a thumbnail for images.
    ///
    /// Thumbnail failures are logged and leave `thumbnail_path` empty.
    pub async fn ingest(
        &self,
        bytes: Bytes,
        content_type: &str,
        filename: Option<&str>,
    ) -> Result<StoredMedia, MediaError> {
        let kind = self.check(content_type, bytes.len())?;

        tokio::fs::create_dir_all(&self.root).await?;
        let name = format!("{}{}", Uuid::new_v4(), extension_of(filename));
        let path = self.root.join(&name);
        tokio::fs::write(&path, &bytes).await?;
        debug!("Stored {} upload ({} bytes) as {}", kind.as_str(), bytes.len(), name);

        let thumbnail_path = match kind {
            MediaKind::Image => self.write_thumbnail(&name, bytes).await,
            MediaKind::Video => None,
        };

        Ok(StoredMedia {
            kind,
            media_path: portable_path(&path),
            thumbnail_path,
        })
    }

    async fn write_thumbnail(&self, original_name: &str, bytes: Bytes) -> Option<String> {
        let rendered = tokio::task::spawn_blocking(move || thumbnail::render(&bytes)).await;
        let jpeg = match rendered {
            Ok(Ok(jpeg)) => jpeg,
            Ok(Err(e)) => {
                warn!("Skipping thumbnail for {}: {}", original_name, e);
                return None;
            }
            Err(e) => {
                warn!("Thumbnail task for {} did not complete: {}", original_name, e);
                return None;
            }
        };

        let path = self.root.join(format!("{}{}", thumbnail::FILE_PREFIX, original_name));
        match tokio::fs::write(&path, jpeg).await {
            Ok(()) => Some(portable_path(&path)),
            Err(e) => {
                warn!("Failed to write thumbnail {}: {}", path.display(), e);
                self.remove(&portable_path(&path)).await;
                None
            }
        }
    }

    /// Best-effort removal of a stored file. A file that is already gone is fine.
    pub async fn remove(&self, stored_path: &str) {
        match tokio::fs::remove_file(stored_path).await {
            Ok(()) => debug!("Removed {}", stored_path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove {}: {}", stored_path, e),
        }
    }
}

/// Extension of the client filename, reduced to a short alphanumeric suffix.
fn extension_of(filename: Option<&str>) -> String {
    let ext = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
        Some(ext) => format!(".{}", ext.to_ascii_lowercase()),
        None => String::new(),
    }
}

fn portable_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
