//! Document staging on top of Apache OpenDAL.

use std::path::PathBuf;

use bytes::Bytes;
use cognitax_shared::types::UploadId;
use opendal::{ErrorKind, Operator, services};
use tracing::warn;

use super::error::StagingError;

/// Where staged documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingBackend {
    /// Local directory.
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory. Contents vanish on restart.
    Memory,
}

impl StagingBackend {
    /// Create a local filesystem backend.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocalFs { .. } => "fs",
            Self::Memory => "memory",
        }
    }
}

/// A document written to the staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDocument {
    /// Storage key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// Scoped storage for uploaded documents while they are being ingested.
///
/// Each staged document belongs to exactly one upload; the ingestion pipeline
/// discards it on every exit path.
#[derive(Debug, Clone)]
pub struct DocumentStaging {
    operator: Operator,
    backend: &'static str,
}

impl DocumentStaging {
    /// Create a staging area for the given backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be initialized.
    pub fn new(backend: &StagingBackend) -> Result<Self, StagingError> {
        let operator = match backend {
            StagingBackend::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StagingError::configuration("invalid staging path"))?;
                Operator::new(services::Fs::default().root(root))
                    .map_err(|e| StagingError::configuration(e.to_string()))?
                    .finish()
            }
            StagingBackend::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StagingError::configuration(e.to_string()))?
                .finish(),
        };

        Ok(Self {
            operator,
            backend: backend.name(),
        })
    }

    /// In-memory staging area.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory backend cannot be initialized.
    pub fn memory() -> Result<Self, StagingError> {
        Self::new(&StagingBackend::Memory)
    }

    /// Backend name.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        self.backend
    }

    /// Storage key for a staged document.
    ///
    /// Format: `staging/{upload_id}/{sanitized_filename}`
    #[must_use]
    pub fn staging_key(upload_id: UploadId, filename: &str) -> String {
        format!("staging/{upload_id}/{}", sanitize_filename(filename))
    }

    /// Writes a document into the staging area.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn stage(
        &self,
        upload_id: UploadId,
        filename: &str,
        bytes: Bytes,
    ) -> Result<StagedDocument, StagingError> {
        let key = Self::staging_key(upload_id, filename);
        let size = bytes.len() as u64;
        self.operator.write(&key, bytes).await?;
        Ok(StagedDocument { key, size })
    }

    /// Reads a staged document back.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or cannot be read.
    pub async fn read(&self, doc: &StagedDocument) -> Result<Bytes, StagingError> {
        let buffer = self.operator.read(&doc.key).await?;
        Ok(buffer.to_bytes())
    }

    /// Removes a staged document and its upload directory. Missing documents
    /// are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn discard(&self, doc: &StagedDocument) -> Result<(), StagingError> {
        self.remove(&doc.key, false).await?;
        if let Some(dir) = upload_prefix(&doc.key) {
            self.remove(dir, true).await?;
        }
        Ok(())
    }

    async fn remove(&self, path: &str, recursive: bool) -> Result<(), StagingError> {
        let result = if recursive {
            self.operator.remove_all(path).await
        } else {
            self.operator.delete(path).await
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(path, error = %e, "Failed to discard staged document");
                Err(e.into())
            }
        }
    }

    /// Check if a key exists in the staging area.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.exists(key).await.unwrap_or(false)
    }
}

/// Directory holding every object staged for one upload, with a trailing
/// slash. `None` for keys outside the `staging/{upload_id}/` layout.
fn upload_prefix(key: &str) -> Option<&str> {
    const ROOT: &str = "staging/";
    let slash = key.strip_prefix(ROOT)?.find('/')?;
    (slash > 0).then(|| &key[..=ROOT.len() + slash])
}

/// Sanitize filename for use in a storage key.
///
/// Only ASCII alphanumerics, dots, hyphens and underscores survive. Empty
/// names become `document`.
fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('.').is_empty() {
        "document".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("statement.pdf"), "statement.pdf");
        assert_eq!(sanitize_filename("my statement (1).pdf"), "my_statement__1_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename(""), "document");
        assert_eq!(sanitize_filename(".."), "document");
    }

    #[test]
    fn test_staging_key_format() {
        let upload_id = UploadId::new();
        let key = DocumentStaging::staging_key(upload_id, "HDFC Apr.pdf");
        assert_eq!(key, format!("staging/{upload_id}/HDFC_Apr.pdf"));
    }

    #[tokio::test]
    async fn test_stage_read_discard() {
        let staging = DocumentStaging::memory().unwrap();
        let upload_id = UploadId::new();

        let doc = staging
            .stage(upload_id, "statement.pdf", Bytes::from_static(b"%PDF-1.7"))
            .await
            .unwrap();
        assert_eq!(doc.size, 8);
        assert!(staging.exists(&doc.key).await);
        assert_eq!(staging.read(&doc).await.unwrap(), Bytes::from_static(b"%PDF-1.7"));

        staging.discard(&doc).await.unwrap();
        assert!(!staging.exists(&doc.key).await);

        // Discarding twice is fine.
        staging.discard(&doc).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_document() {
        let staging = DocumentStaging::memory().unwrap();
        let doc = StagedDocument {
            key: "staging/missing/statement.pdf".to_string(),
            size: 0,
        };
        assert!(matches!(
            staging.read(&doc).await,
            Err(StagingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_fs_backend() {
        let root = std::env::temp_dir().join(format!("cognitax-staging-test-{}", UploadId::new()));
        let staging = DocumentStaging::new(&StagingBackend::local_fs(&root)).unwrap();
        assert_eq!(staging.backend(), "fs");

        let upload_id = UploadId::new();
        let doc = staging
            .stage(upload_id, "a.pdf", Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert_eq!(staging.read(&doc).await.unwrap().as_ref(), b"data");

        let upload_dir = root.join("staging").join(upload_id.to_string());
        assert!(upload_dir.is_dir());

        staging.discard(&doc).await.unwrap();
        assert!(!root.join(&doc.key).exists());
        assert!(!upload_dir.exists());

        // The shared staging root stays in place for other uploads.
        assert!(root.join("staging").is_dir());
        staging.discard(&doc).await.unwrap();

        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn test_upload_prefix() {
        let upload_id = UploadId::new();
        let key = DocumentStaging::staging_key(upload_id, "a.pdf");
        assert_eq!(upload_prefix(&key), Some(format!("staging/{upload_id}/").as_str()));
        assert_eq!(upload_prefix("staging/a.pdf"), None);
        assert_eq!(upload_prefix("staging//a.pdf"), None);
        assert_eq!(upload_prefix("other/x/a.pdf"), None);
    }

    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);
            prop_assert!(!sanitized.is_empty());
            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        #[test]
        fn prop_staging_key_has_three_segments(filename in ".{0,40}") {
            let key = DocumentStaging::staging_key(UploadId::new(), &filename);
            let parts: Vec<&str> = key.split('/').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0], "staging");
        }
    }
}
