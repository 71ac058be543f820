//! Upload lifecycle types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cognitax_shared::types::{UploadId, UserId};
use serde::{Deserialize, Serialize};

use crate::statement::NewTransaction;
use crate::tax::{NewTaxSummary, TaxSummary};

/// Processing state of an upload.
///
/// ```text
/// processing ──► completed
///      │
///      └───────► failed
/// ```
///
/// Terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Ingestion in progress.
    Processing,
    /// Transactions and tax summary stored.
    Completed,
    /// Ingestion gave up; nothing was stored.
    Failed,
}

impl UploadStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns true for `completed` and `failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Validates a transition and returns the new status.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] unless moving from `processing` to a
    /// terminal state.
    pub const fn transition_to(self, next: Self) -> Result<Self, InvalidTransition> {
        match (self, next) {
            (Self::Processing, Self::Completed | Self::Failed) => Ok(next),
            _ => Err(InvalidTransition {
                from: self,
                to: next,
            }),
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown upload status '{other}'")),
        }
    }
}

/// A rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move upload from {from} to {to}")]
pub struct InvalidTransition {
    /// Current status.
    pub from: UploadStatus,
    /// Requested status.
    pub to: UploadStatus,
}

/// One submitted statement and its processing lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Upload ID.
    pub id: UploadId,
    /// Owning user.
    pub owner_id: UserId,
    /// Original filename.
    pub filename: String,
    /// Size of the document in bytes.
    pub byte_size: i64,
    /// Issuing bank, once extracted.
    pub bank_name: Option<String>,
    /// Statement period, once extracted.
    pub statement_period: Option<String>,
    /// Lifecycle state.
    pub status: UploadStatus,
    /// When the upload was received.
    pub created_at: DateTime<Utc>,
}

impl Upload {
    /// A fresh upload in `processing`.
    #[must_use]
    pub fn new(owner_id: UserId, filename: impl Into<String>, byte_size: i64) -> Self {
        Self {
            id: UploadId::new(),
            owner_id,
            filename: filename.into(),
            byte_size,
            bank_name: None,
            statement_period: None,
            status: UploadStatus::Processing,
            created_at: Utc::now(),
        }
    }
}

/// Everything written when an upload completes, in one atomic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompletion {
    /// Upload being completed.
    pub upload_id: UploadId,
    /// Owning user.
    pub owner_id: UserId,
    /// Extracted bank name.
    pub bank_name: Option<String>,
    /// Extracted statement period.
    pub statement_period: Option<String>,
    /// Validated transactions.
    pub transactions: Vec<NewTransaction>,
    /// Tax estimate and tips.
    pub tax_summary: NewTaxSummary,
}

/// A document submitted for ingestion.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Owning user.
    pub owner_id: UserId,
    /// Original filename.
    pub filename: String,
    /// MIME type of the document.
    pub mime_type: String,
    /// Document contents.
    pub bytes: bytes::Bytes,
}

/// Result of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Upload ID.
    pub upload_id: UploadId,
    /// Always `completed`.
    pub status: UploadStatus,
    /// Transactions stored.
    pub transactions_count: usize,
    /// Malformed entries dropped under the `skip` policy.
    pub skipped_count: usize,
    /// Extracted bank name.
    pub bank_name: Option<String>,
    /// Extracted statement period.
    pub statement_period: Option<String>,
    /// Stored tax summary.
    pub tax_summary: TaxSummary,
}
