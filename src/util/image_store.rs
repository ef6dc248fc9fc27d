use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::util::upload::UploadedImage;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the image and return its public path, e.g. `/uploads/restaurant-1700000000000-<uuid>.png`.
    async fn save(&self, prefix: &str, image: &UploadedImage) -> Result<String, ImageStoreError>;
    /// Best-effort removal of a previously returned public path.
    async fn remove(&self, public_path: &str);
}

/// Writes images into a local directory served by `ServeDir`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalImageStore { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

fn file_name(prefix: &str, image: &UploadedImage) -> String {
    format!(
        "{}-{}-{}.{}",
        prefix,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        image.extension()
    )
}

#[async_trait]
impl ImageStore for LocalImageStore {
    #[instrument(skip(self, image), fields(bytes = image.bytes.len()))]
    async fn save(&self, prefix: &str, image: &UploadedImage) -> Result<String, ImageStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let name = file_name(prefix, image);
        tokio::fs::write(self.root.join(&name), &image.bytes).await?;
        info!("Stored image {}", name);
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    async fn remove(&self, public_path: &str) {
        let Some(name) = public_path.strip_prefix(PUBLIC_PREFIX).map(|p| p.trim_start_matches('/')) else {
            return;
        };
        if name.is_empty() || name.contains("..") || name.contains('/') {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(name)).await {
            warn!("Could not remove old image {}: {}", public_path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn save_then_remove() {
        let dir = std::env::temp_dir().join(format!("img-store-{}", uuid::Uuid::new_v4()));
        let store = LocalImageStore::new(&dir);
        let image = UploadedImage {
            file_name: Some("a.png".into()),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };

        let path = store.save("menu", &image).await.unwrap();
        assert!(path.starts_with("/uploads/menu-"));
        assert!(path.ends_with(".png"));
        let on_disk = dir.join(path.trim_start_matches("/uploads/"));
        assert!(on_disk.exists());

        store.remove(&path).await;
        assert!(!on_disk.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_get_distinct_files() {
        let dir = std::env::temp_dir().join(format!("img-store-{}", uuid::Uuid::new_v4()));
        let store = std::sync::Arc::new(LocalImageStore::new(&dir));
        let image = UploadedImage {
            file_name: None,
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = store.clone();
                let image = image.clone();
                tokio::spawn(async move { store.save("menu", &image).await.unwrap() })
            })
            .collect();
        let mut paths = std::collections::HashSet::new();
        for handle in handles {
            paths.insert(handle.await.unwrap());
        }

        assert_eq!(paths.len(), 20);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 20);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
