// src/store/evidence.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::{
    store::{EvidenceMetadata, EvidenceStore},
    tracker::error::ProgressError,
};

/// URL prefix under which stored photos are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Stores photos as files in a local directory.
///
/// Files are named `{teamCode}_{unixMillis}{.ext}`; the returned reference is
/// the public path of the file.
#[derive(Debug, Clone)]
pub struct FsEvidenceStore {
    root: PathBuf,
    max_bytes: usize,
}

impl FsEvidenceStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

/// Keeps only characters that are safe in a file name.
fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(sanitize)
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn io_unavailable(err: std::io::Error) -> ProgressError {
    tracing::error!("Evidence store I/O error: {:?}", err);
    ProgressError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl EvidenceStore for FsEvidenceStore {
    async fn put(
        &self,
        bytes: &[u8],
        metadata: &EvidenceMetadata,
    ) -> Result<String, ProgressError> {
        if bytes.is_empty() {
            return Err(ProgressError::MissingEvidence);
        }
        if bytes.len() > self.max_bytes {
            return Err(ProgressError::PayloadTooLarge(self.max_bytes));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(io_unavailable)?;

        let mut team = sanitize(&metadata.team_code);
        if team.is_empty() {
            team = "team".to_string();
        }
        let stem = format!("{}_{}", team, Utc::now().timestamp_millis());
        let ext = extension_of(metadata.file_name.as_deref());

        // Two uploads from one team within the same millisecond get a suffix.
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}{ext}")
            } else {
                format!("{stem}-{attempt}{ext}")
            };

            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&name))
                .await;

            match opened {
                Ok(mut file) => {
                    file.write_all(bytes).await.map_err(io_unavailable)?;
                    file.flush().await.map_err(io_unavailable)?;
                    tracing::debug!("Stored {} byte photo as {}", bytes.len(), name);
                    return Ok(format!("{PUBLIC_PREFIX}{name}"));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < 100 => attempt += 1,
                Err(e) => return Err(io_unavailable(e)),
            }
        }
    }

    async fn discard(&self, photo_ref: &str) -> Result<(), ProgressError> {
        let name = photo_ref.strip_prefix(PUBLIC_PREFIX).unwrap_or(photo_ref);
        if name.is_empty() || sanitize_file_name(name) != name {
            return Err(ProgressError::InvalidRecord(format!(
                "'{}' is not a stored photo",
                photo_ref
            )));
        }

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_unavailable(e)),
        }
    }
}

/// Like `sanitize`, but also keeps the extension dot.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect::<String>()
        .replace("..", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(team_code: &str, file_name: &str) -> EvidenceMetadata {
        EvidenceMetadata {
            team_code: team_code.to_string(),
            file_name: Some(file_name.to_string()),
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Some("photo.JPG")), ".jpg");
        assert_eq!(extension_of(Some("archive.tar.gz")), ".gz");
        assert_eq!(extension_of(Some("noext")), "");
        assert_eq!(extension_of(None), "");
    }

    #[tokio::test]
    async fn test_put_names_file_after_team() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 1024);

        let photo_ref = store
            .put(b"jpeg bytes", &metadata("TEAM001", "photo.jpg"))
            .await
            .unwrap();

        assert!(photo_ref.starts_with("/uploads/TEAM001_"));
        assert!(photo_ref.ends_with(".jpg"));

        let name = photo_ref.strip_prefix(PUBLIC_PREFIX).unwrap();
        let stored = tokio::fs::read(dir.path().join(name)).await.unwrap();
        assert_eq!(stored, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 1024);

        let mut refs = Vec::new();
        for _ in 0..5 {
            refs.push(store.put(b"x", &metadata("TEAM001", "a.png")).await.unwrap());
        }
        refs.sort();
        refs.dedup();
        assert_eq!(refs.len(), 5);
    }

    #[tokio::test]
    async fn test_put_sanitizes_team_code() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 1024);

        let photo_ref = store
            .put(b"x", &metadata("../../etc", "p.png"))
            .await
            .unwrap();
        assert!(photo_ref.starts_with("/uploads/etc_"));
    }

    #[tokio::test]
    async fn test_put_rejects_empty_and_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 4);

        let empty = store.put(b"", &metadata("TEAM001", "p.png")).await;
        assert_eq!(empty.unwrap_err(), ProgressError::MissingEvidence);

        let large = store.put(b"12345", &metadata("TEAM001", "p.png")).await;
        assert_eq!(large.unwrap_err(), ProgressError::PayloadTooLarge(4));
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 1024);

        let photo_ref = store.put(b"x", &metadata("TEAM001", "p.png")).await.unwrap();
        store.discard(&photo_ref).await.unwrap();

        let name = photo_ref.strip_prefix(PUBLIC_PREFIX).unwrap();
        assert!(!dir.path().join(name).exists());

        // Already gone is fine.
        store.discard(&photo_ref).await.unwrap();
    }

    #[tokio::test]
    async fn test_discard_refuses_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsEvidenceStore::new(dir.path(), 1024);

        let result = store.discard("/uploads/../secret").await;
        assert!(matches!(result, Err(ProgressError::InvalidRecord(_))));
    }
}
