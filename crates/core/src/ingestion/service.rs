//! Statement ingestion pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cognitax_shared::config::{IngestionSettings, MalformedEntryPolicy};
use cognitax_shared::types::UploadId;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::error::IngestionError;
use super::prompts::{EXTRACTION_PROMPT, EXTRACTION_SYSTEM_INSTRUCTION};
use super::types::{IngestRequest, IngestionReport, Upload, UploadCompletion, UploadStatus};
use crate::advisory::{AdvisoryContext, AdvisoryGenerator};
use crate::decoder::decode_json_payload;
use crate::extraction::DocumentExtractor;
use crate::staging::{DocumentStaging, StagedDocument};
use crate::statement::{ExtractedStatement, NewTransaction, validate_entry};
use crate::tax::{NewTaxSummary, TaxRules, TaxSummary};

/// MIME type assumed when the client sends none.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

/// Repository trait for upload persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait IngestionRepository: Send + Sync {
    /// Store a new upload in `processing`.
    fn create_upload(
        &self,
        upload: &Upload,
    ) -> impl Future<Output = Result<(), IngestionError>> + Send;

    /// Store transactions and tax summary, record the extracted metadata and
    /// move the upload to `completed`, all in one transaction.
    ///
    /// Must fail with [`IngestionError::InvalidTransition`] if the upload is
    /// no longer `processing`.
    fn complete_upload(
        &self,
        completion: UploadCompletion,
    ) -> impl Future<Output = Result<TaxSummary, IngestionError>> + Send;

    /// Move a `processing` upload to `failed`.
    ///
    /// Must fail with [`IngestionError::InvalidTransition`] if the upload is
    /// already terminal.
    fn mark_failed(
        &self,
        upload_id: UploadId,
    ) -> impl Future<Output = Result<(), IngestionError>> + Send;

    /// Move every upload still `processing` and created before `cutoff` to
    /// `failed`. Returns how many were changed.
    fn fail_stale_uploads(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, IngestionError>> + Send;
}

/// Tunables for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionOptions {
    /// What to do with entries that fail validation.
    pub malformed_entry_policy: MalformedEntryPolicy,
    /// Largest accepted document.
    pub max_upload_bytes: u64,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self::from(&IngestionSettings::default())
    }
}

impl From<&IngestionSettings> for IngestionOptions {
    fn from(settings: &IngestionSettings) -> Self {
        Self {
            malformed_entry_policy: settings.malformed_entry_policy,
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Turns an uploaded statement into stored transactions and a tax summary.
pub struct IngestionService<R: IngestionRepository, E: DocumentExtractor> {
    repo: Arc<R>,
    extractor: Arc<E>,
    staging: Arc<DocumentStaging>,
    advisory: AdvisoryGenerator<E>,
    rules: TaxRules,
    options: IngestionOptions,
}

impl<R: IngestionRepository, E: DocumentExtractor> IngestionService<R, E> {
    /// Create a new ingestion service.
    #[must_use]
    pub fn new(
        repo: Arc<R>,
        extractor: Arc<E>,
        staging: Arc<DocumentStaging>,
        options: IngestionOptions,
    ) -> Self {
        Self {
            repo,
            advisory: AdvisoryGenerator::new(Arc::clone(&extractor)),
            extractor,
            staging,
            rules: TaxRules::default(),
            options,
        }
    }

    /// Replace the tax rules.
    #[must_use]
    pub const fn with_rules(mut self, rules: TaxRules) -> Self {
        self.rules = rules;
        self
    }

    /// Pipeline options.
    #[must_use]
    pub const fn options(&self) -> &IngestionOptions {
        &self.options
    }

    /// Rejects empty and oversized documents.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::InvalidUpload`] describing the problem.
    pub fn check_upload(&self, size: usize) -> Result<(), IngestionError> {
        if size == 0 {
            return Err(IngestionError::InvalidUpload("file is empty".to_string()));
        }
        if size as u64 > self.options.max_upload_bytes {
            return Err(IngestionError::InvalidUpload(format!(
                "file is {size} bytes, the limit is {} bytes",
                self.options.max_upload_bytes
            )));
        }
        Ok(())
    }

    /// Runs the full pipeline for one document.
    ///
    /// The upload is created in `processing` and ends in `completed` or
    /// `failed`. On failure nothing but the failed upload is stored. The
    /// staged copy of the document is removed on every path.
    ///
    /// # Errors
    ///
    /// Returns the error of the stage that failed.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestionReport, IngestionError> {
        self.check_upload(request.bytes.len())?;
        let byte_size = i64::try_from(request.bytes.len())
            .map_err(|_| IngestionError::InvalidUpload("file is too large".to_string()))?;

        let upload = Upload::new(request.owner_id, request.filename.clone(), byte_size);
        self.repo.create_upload(&upload).await?;
        info!(
            upload_id = %upload.id,
            owner_id = %upload.owner_id,
            filename = %upload.filename,
            size = byte_size,
            "Upload accepted"
        );

        match self.process(&upload, request).await {
            Ok(report) => {
                info!(
                    upload_id = %upload.id,
                    transactions = report.transactions_count,
                    skipped = report.skipped_count,
                    "Upload completed"
                );
                Ok(report)
            }
            Err(e) => {
                error!(upload_id = %upload.id, stage = e.stage(), error = %e, "Ingestion failed");
                if let Err(mark_err) = self.repo.mark_failed(upload.id).await {
                    error!(upload_id = %upload.id, error = %mark_err, "Failed to mark upload as failed");
                }
                Err(e)
            }
        }
    }

    /// Fails uploads that have been `processing` for longer than `stale_after`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository update fails.
    pub async fn fail_stale_uploads(&self, stale_after: Duration) -> Result<u64, IngestionError> {
        let Some(cutoff) = chrono::Duration::from_std(stale_after)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(0);
        };

        let count = self.repo.fail_stale_uploads(cutoff).await?;
        if count > 0 {
            warn!(count, %cutoff, "Marked abandoned uploads as failed");
        }
        Ok(count)
    }

    async fn process(
        &self,
        upload: &Upload,
        request: IngestRequest,
    ) -> Result<IngestionReport, IngestionError> {
        let mime_type = match request.mime_type.trim() {
            "" => DEFAULT_MIME_TYPE,
            mime => mime,
        };

        let staged = self
            .staging
            .stage(upload.id, &upload.filename, request.bytes.clone())
            .await?;

        let outcome = self.extract_and_store(upload, &staged, mime_type).await;

        if let Err(e) = self.staging.discard(&staged).await {
            warn!(upload_id = %upload.id, key = %staged.key, error = %e, "Staged document left behind");
        }
        outcome
    }

    async fn extract_and_store(
        &self,
        upload: &Upload,
        staged: &StagedDocument,
        mime_type: &str,
    ) -> Result<IngestionReport, IngestionError> {
        let bytes = self.staging.read(staged).await?;
        let handle = self
            .extractor
            .submit_document(bytes, mime_type, &upload.filename)
            .await?;
        debug!(upload_id = %upload.id, document = %handle.name, "Document processed");

        let raw = self
            .extractor
            .generate(
                EXTRACTION_PROMPT,
                Some(&handle),
                Some(EXTRACTION_SYSTEM_INSTRUCTION),
            )
            .await?;
        let statement: ExtractedStatement = decode_json_payload(&raw)?;

        let (transactions, skipped_count) =
            self.validate_entries(upload.id, &statement.transactions)?;
        let computation = self.rules.estimate(&transactions)?;
        let tips = self
            .advisory
            .advise(&AdvisoryContext::from(&computation))
            .await;

        let transactions_count = transactions.len();
        let bank_name = non_blank(statement.bank_name);
        let statement_period = non_blank(statement.statement_period);

        let tax_summary = self
            .repo
            .complete_upload(UploadCompletion {
                upload_id: upload.id,
                owner_id: upload.owner_id,
                bank_name: bank_name.clone(),
                statement_period: statement_period.clone(),
                transactions,
                tax_summary: NewTaxSummary {
                    computation,
                    optimization_tips: Vec::from(tips),
                },
            })
            .await?;

        Ok(IngestionReport {
            upload_id: upload.id,
            status: UploadStatus::Completed,
            transactions_count,
            skipped_count,
            bank_name,
            statement_period,
            tax_summary,
        })
    }

    fn validate_entries(
        &self,
        upload_id: UploadId,
        entries: &[Value],
    ) -> Result<(Vec<NewTransaction>, usize), IngestionError> {
        let mut valid = Vec::with_capacity(entries.len());
        let mut skipped = 0;

        for (index, entry) in entries.iter().enumerate() {
            match validate_entry(entry) {
                Ok(txn) => valid.push(txn),
                Err(source) => match self.options.malformed_entry_policy {
                    MalformedEntryPolicy::Abort => {
                        return Err(IngestionError::InvalidEntry { index, source });
                    }
                    MalformedEntryPolicy::Skip => {
                        warn!(%upload_id, index, error = %source, "Skipping malformed transaction");
                        skipped += 1;
                    }
                },
            }
        }

        Ok((valid, skipped))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
