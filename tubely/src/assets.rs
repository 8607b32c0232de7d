//! Uploaded asset naming and local storage.
//!
//! Assets are stored flat under the configured assets root as `<id>.<ext>`, where `<id>` is
//! 32 random bytes encoded as unpadded URL-safe base64 (always 43 characters). A fresh id per
//! upload means concurrent uploads never target the same file.

use base64::{Engine as _, engine::general_purpose};
use mime::Mime;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::errors::{Error, Result};

/// Image formats accepted for thumbnails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn from_media_type(media_type: &Mime) -> Option<Self> {
        if media_type.type_() != mime::IMAGE {
            return None;
        }
        if media_type.subtype() == mime::JPEG {
            Some(ImageFormat::Jpeg)
        } else if media_type.subtype() == mime::PNG {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    /// Resolve a declared `Content-Type` header. The header is trusted; content is not sniffed.
    pub fn parse_content_type(content_type: Option<&str>) -> Result<Self> {
        let raw = content_type.unwrap_or_default();
        let media_type = raw.parse::<Mime>().map_err(|_| Error::BadRequest {
            message: "Failed to parse media type".to_string(),
        })?;

        Self::from_media_type(&media_type).ok_or_else(|| Error::UnsupportedMediaType {
            media_type: media_type.essence_str().to_string(),
        })
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// Random identifier naming one stored asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetId(String);

impl AssetId {
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self, format: ImageFormat) -> String {
        format!("{}.{}", self.0, format.extension())
    }
}

/// Asset storage on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the assets root if it does not exist yet
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Create `file_name` under the root and copy `content` into it.
    ///
    /// A partially written file is removed again when the copy fails.
    pub async fn write(&self, file_name: &str, mut content: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(file_name);

        let mut file = fs::File::create(&path).await.map_err(|e| Error::Internal {
            operation: format!("create thumbnail file: {e}"),
        })?;

        let copied = match tokio::io::copy(&mut content, &mut file).await {
            Ok(_) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = copied {
            drop(file);
            self.remove(file_name).await;
            return Err(Error::Internal {
                operation: format!("write thumbnail file: {e}"),
            });
        }

        debug!(path = %path.display(), "Stored asset");
        Ok(path)
    }

    /// Best-effort removal of a stored asset
    pub async fn remove(&self, file_name: &str) {
        let path = self.path_for(file_name);
        if let Err(e) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove asset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_media_types() {
        assert_eq!(ImageFormat::parse_content_type(Some("image/jpeg")).unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::parse_content_type(Some("image/png")).unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::parse_content_type(Some("IMAGE/PNG")).unwrap(), ImageFormat::Png);
        assert_eq!(
            ImageFormat::parse_content_type(Some("image/jpeg; charset=binary")).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_unsupported_media_types() {
        for content_type in ["image/gif", "video/mp4", "text/plain", "application/octet-stream"] {
            assert!(
                matches!(
                    ImageFormat::parse_content_type(Some(content_type)),
                    Err(Error::UnsupportedMediaType { .. })
                ),
                "expected {content_type} to be unsupported"
            );
        }
    }

    #[test]
    fn test_malformed_or_missing_content_type() {
        for content_type in [None, Some(""), Some("image"), Some("not a mime type")] {
            assert!(
                matches!(ImageFormat::parse_content_type(content_type), Err(Error::BadRequest { .. })),
                "expected {content_type:?} to be malformed"
            );
        }
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
        assert_eq!(ImageFormat::Png.extension(), "png");
    }

    #[test]
    fn test_asset_id_shape() {
        let id = AssetId::generate();
        assert_eq!(id.as_str().len(), 43);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(id.file_name(ImageFormat::Png), format!("{}.png", id.as_str()));
    }

    #[test]
    fn test_asset_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..100).map(|_| AssetId::generate().as_str().to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[tokio::test]
    async fn test_write_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path());
        let content = b"\x89PNG\r\n\x1a\nnot really a png";

        let path = store.write("thumb.png", content).await.unwrap();
        assert_eq!(path, dir.path().join("thumb.png"));
        assert_eq!(std::fs::read(&path).unwrap(), content);

        store.remove("thumb.png").await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_into_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path().join("missing"));

        let result = store.write("thumb.jpg", b"jpeg").await;
        assert!(matches!(result, Err(Error::Internal { .. })));
    }

    #[tokio::test]
    async fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path().join("nested/assets"));

        store.ensure_root().await.unwrap();
        assert!(store.root().is_dir());
    }
}
