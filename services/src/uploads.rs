//! Persistence of uploaded images in a designated directory.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;
use tracing::{debug, info};

use crate::uuid::unique_stem;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploaded file has no usable name")]
    InvalidName,

    #[error("unknown upload naming policy `{0}` (expected `original` or `unique`)")]
    UnknownPolicy(String),

    #[error("failed to access upload {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// How stored files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Client-provided file name, reduced to its final path component.
    /// A later upload with the same name overwrites the earlier one.
    Original,
    /// `upload_<uuid>.<ext>`; never collides. The file only lives until
    /// the image has been analyzed (see [`UploadStore::release`]).
    Unique,
}

impl FromStr for NamingPolicy {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(NamingPolicy::Original),
            "unique" | "uuid" => Ok(NamingPolicy::Unique),
            other => Err(UploadError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Writes uploads below a single directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    naming: NamingPolicy,
}

impl UploadStore {
    /// Creates the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>, naming: NamingPolicy) -> Result<Self, UploadError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| UploadError::Io {
                path: dir.display().to_string(),
                source,
            })?;
        info!(dir = %dir.display(), ?naming, "upload directory ready");
        Ok(Self { dir, naming })
    }

    /// Stores `bytes` and returns the written path.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf, UploadError> {
        let file_name = self.file_name(original_name)?;
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| UploadError::Io {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), bytes = bytes.len(), "upload stored");
        Ok(path)
    }

    /// Called once the stored image has been analyzed.
    ///
    /// `Unique` files are temporary and removed here; `Original` files stay.
    /// A file that is already gone is not an error.
    pub async fn release(&self, path: &Path) -> Result<(), UploadError> {
        if self.naming != NamingPolicy::Unique {
            return Ok(());
        }
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "temporary upload removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(UploadError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    fn file_name(&self, original_name: &str) -> Result<String, UploadError> {
        let base = sanitize_file_name(original_name);
        match self.naming {
            NamingPolicy::Original => base.ok_or(UploadError::InvalidName),
            NamingPolicy::Unique => {
                let ext = base
                    .as_deref()
                    .and_then(|b| Path::new(b).extension())
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())
                    .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
                    .unwrap_or_else(|| "jpg".to_string());
                Ok(format!("upload_{}.{ext}", unique_stem()))
            }
        }
    }
}

/// Final path component of a client-supplied name, with separators and
/// control characters removed. `None` when nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("dog.jpg").as_deref(), Some("dog.jpg"));
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name("C:\\pics\\cat.png").as_deref(), Some("cat.png"));
        assert_eq!(sanitize_file_name("uploads/.."), None);
        assert_eq!(sanitize_file_name("   "), None);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("Unique".parse::<NamingPolicy>().unwrap(), NamingPolicy::Unique);
        assert_eq!("original".parse::<NamingPolicy>().unwrap(), NamingPolicy::Original);
        assert!("random".parse::<NamingPolicy>().is_err());
    }

    #[tokio::test]
    async fn original_policy_keeps_the_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"), NamingPolicy::Original)
            .await
            .unwrap();

        let path = store.save("nested/dir/dog.jpg", b"bytes").await.unwrap();

        assert_eq!(path, tmp.path().join("uploads").join("dog.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn unique_policy_never_collides_and_keeps_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), NamingPolicy::Unique).await.unwrap();

        let a = store.save("cat.PNG", b"a").await.unwrap();
        let b = store.save("cat.PNG", b"b").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("png"));
        let stem = a.file_stem().and_then(|s| s.to_str()).unwrap();
        assert!(stem.starts_with("upload_"));
    }

    #[tokio::test]
    async fn release_removes_only_unique_files() {
        let tmp = tempfile::tempdir().unwrap();

        let unique = UploadStore::new(tmp.path().join("unique"), NamingPolicy::Unique)
            .await
            .unwrap();
        let temp = unique.save("dog.jpg", b"bytes").await.unwrap();
        unique.release(&temp).await.unwrap();
        assert!(!temp.exists());
        // Releasing twice is harmless.
        unique.release(&temp).await.unwrap();

        let original = UploadStore::new(tmp.path().join("original"), NamingPolicy::Original)
            .await
            .unwrap();
        let kept = original.save("dog.jpg", b"bytes").await.unwrap();
        original.release(&kept).await.unwrap();
        assert_eq!(std::fs::read(&kept).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn original_policy_rejects_unusable_names() {
        let tmp = tempfile::tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), NamingPolicy::Original).await.unwrap();
        assert!(matches!(
            store.save("../", b"x").await,
            Err(UploadError::InvalidName)
        ));
    }
}
