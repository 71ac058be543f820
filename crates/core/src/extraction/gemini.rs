//! Gemini REST API client.

use std::time::Duration;

use bytes::Bytes;
use cognitax_shared::config::GeminiSettings;
use reqwest::{Response, header};
use tracing::{debug, info, warn};

use super::poll::{PollError, PollState, RetryPolicy, Sleeper, TokioSleeper, poll_until};
use super::wire::{
    DisplayName, FileState, GenerateRequest, GenerateResponse, RemoteFile, StartUploadBody,
    UploadedFile,
};
use super::{DocumentExtractor, DocumentHandle, ExtractionError};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent as a header and never logged.
    pub api_key: String,
    /// Model used for `generateContent`.
    pub model: String,
    /// REST base, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub api_base: String,
    /// Upload base, e.g. `https://generativelanguage.googleapis.com/upload/v1beta`.
    pub upload_base: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// File status polling.
    pub poll: RetryPolicy,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[hidden]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("upload_base", &self.upload_base)
            .field("request_timeout", &self.request_timeout)
            .field("poll", &self.poll)
            .finish()
    }
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            upload_base: settings.upload_base.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            poll: RetryPolicy {
                interval: Duration::from_secs(settings.poll_interval_secs),
                max_attempts: settings.max_poll_attempts,
            },
        }
    }
}

/// Client for the Gemini file and generation endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient<S = TokioSleeper> {
    http: reqwest::Client,
    config: GeminiConfig,
    sleeper: S,
}

impl GeminiClient {
    /// Creates a client that sleeps on the tokio timer between status polls.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExtractionError::external(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            sleeper: TokioSleeper,
        })
    }
}

impl<S: Sleeper> GeminiClient<S> {
    /// Replaces the sleeper used between status polls.
    #[must_use]
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> GeminiClient<T> {
        GeminiClient {
            http: self.http,
            config: self.config,
            sleeper,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn file_status_url(&self, name: &str) -> String {
        if name.starts_with("files/") {
            format!("{}/{name}", self.config.api_base)
        } else {
            format!("{}/files/{name}", self.config.api_base)
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }

    /// Announces a resumable upload and returns the URL to send bytes to.
    async fn start_upload(
        &self,
        size: usize,
        mime_type: &str,
        display_name: &str,
    ) -> Result<String, ExtractionError> {
        let response = self
            .http
            .post(format!("{}/files", self.config.upload_base))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadBody {
                file: DisplayName { display_name },
            })
            .send()
            .await?;

        let response = ensure_success(response).await?;

        response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ExtractionError::external("upload session URL missing from response"))
    }

    /// Sends the document bytes and finalizes the upload.
    async fn transfer(&self, upload_url: &str, bytes: Bytes) -> Result<RemoteFile, ExtractionError> {
        let response = self
            .http
            .put(upload_url)
            .header(header::CONTENT_LENGTH, bytes.len().to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;

        let uploaded: UploadedFile = ensure_success(response).await?.json().await?;
        Ok(uploaded.file)
    }

    async fn file_state(&self, name: &str) -> Result<FileState, ExtractionError> {
        let response = self
            .http
            .get(self.file_status_url(name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let file: RemoteFile = ensure_success(response).await?.json().await?;
        Ok(FileState::parse(file.state.as_deref()))
    }

    /// Polls the file resource until it is active.
    async fn wait_until_active(&self, name: &str) -> Result<(), ExtractionError> {
        let outcome = poll_until(&self.config.poll, &self.sleeper, |attempt| async move {
            let state = self.file_state(name).await?;
            debug!(file = %name, attempt, state = ?state, "Checked document state");
            Ok::<_, ExtractionError>(match state {
                FileState::Active => PollState::Ready(()),
                FileState::Failed => PollState::Failed("FAILED".to_string()),
                FileState::Pending(_) => PollState::Pending,
            })
        })
        .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(PollError::Failed(state)) => Err(ExtractionError::external(format!(
                "document processing ended in state {state}"
            ))),
            Err(PollError::Exhausted { attempts }) => Err(ExtractionError::timeout(format!(
                "document not ready after {attempts} status checks"
            ))),
            Err(PollError::Check(e)) => Err(e),
        }
    }
}

impl<S: Sleeper> DocumentExtractor for GeminiClient<S> {
    async fn submit_document(
        &self,
        bytes: Bytes,
        mime_type: &str,
        display_name: &str,
    ) -> Result<DocumentHandle, ExtractionError> {
        let upload_url = self
            .start_upload(bytes.len(), mime_type, display_name)
            .await?;
        let file = self.transfer(&upload_url, bytes).await?;
        info!(file = %file.name, "Document uploaded, waiting for processing");

        if FileState::parse(file.state.as_deref()) != FileState::Active {
            self.wait_until_active(&file.name).await?;
        }

        Ok(DocumentHandle {
            mime_type: file.mime_type.unwrap_or_else(|| mime_type.to_string()),
            name: file.name,
            uri: file.uri,
        })
    }

    async fn generate(
        &self,
        prompt: &str,
        document: Option<&DocumentHandle>,
        system_instruction: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let request = GenerateRequest::new(prompt, document, system_instruction);

        let response = self
            .http
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let body: GenerateResponse = ensure_success(response).await?.json().await?;
        body.into_text()
    }
}

/// Turns a non-success response into an error carrying its status and body.
async fn ensure_success(response: Response) -> Result<Response, ExtractionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Document service request failed");
    Err(ExtractionError::upstream(status.as_u16(), &body))
}
