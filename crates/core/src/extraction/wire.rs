//! Request and response bodies of the upstream REST API.

use serde::{Deserialize, Serialize};

use super::ExtractionError;
use super::DocumentHandle;

#[derive(Debug, Serialize)]
pub(super) struct StartUploadBody<'a> {
    pub file: DisplayName<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct DisplayName<'a> {
    pub display_name: &'a str,
}

/// Envelope returned by the finalizing upload request.
#[derive(Debug, Deserialize)]
pub(super) struct UploadedFile {
    pub file: RemoteFile,
}

/// File resource as described by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoteFile {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Processing state of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum FileState {
    Active,
    Failed,
    Pending(String),
}

impl FileState {
    pub fn parse(state: Option<&str>) -> Self {
        match state {
            Some("ACTIVE") => Self::Active,
            Some("FAILED") => Self::Failed,
            other => Self::Pending(other.unwrap_or("STATE_UNSPECIFIED").to_string()),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub(super) enum Part {
    File {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl GenerateRequest {
    /// Builds a request whose parts are the optional document followed by the prompt.
    pub fn new(
        prompt: &str,
        document: Option<&DocumentHandle>,
        system_instruction: Option<&str>,
    ) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(doc) = document {
            parts.push(Part::File {
                file_data: FileData {
                    mime_type: doc.mime_type.clone(),
                    file_uri: doc.uri.clone(),
                },
            });
        }
        parts.push(Part::Text {
            text: prompt.to_string(),
        });

        Self {
            contents: vec![Content { parts }],
            system_instruction: system_instruction.map(|text| Content {
                parts: vec![Part::Text {
                    text: text.to_string(),
                }],
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate, in order.
    pub fn into_text(self) -> Result<String, ExtractionError> {
        let parts = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .ok_or_else(|| ExtractionError::external("response contained no candidates"))?;

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(ExtractionError::external("response contained no text"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handle() -> DocumentHandle {
        DocumentHandle {
            name: "files/abc123".to_string(),
            uri: "https://example.test/v1beta/files/abc123".to_string(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_request_with_document_and_instruction() {
        let body = serde_json::to_value(GenerateRequest::new(
            "extract",
            Some(&handle()),
            Some("be precise"),
        ))
        .unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"fileData": {
                            "mimeType": "application/pdf",
                            "fileUri": "https://example.test/v1beta/files/abc123"
                        }},
                        {"text": "extract"}
                    ]
                }],
                "systemInstruction": {"parts": [{"text": "be precise"}]}
            })
        );
    }

    #[test]
    fn test_text_only_request() {
        let body = serde_json::to_value(GenerateRequest::new("tips please", None, None)).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "tips please"}]}]}));
    }

    #[test]
    fn test_response_text_concatenated_in_order() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "```json\n"}, {"text": "{}"}, {"text": "\n```"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();

        assert_eq!(response.into_text().unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(response.into_text().is_err());
    }

    #[test]
    fn test_response_without_text() {
        let response: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": [{}]}}]})).unwrap();
        assert!(response.into_text().is_err());
    }

    #[test]
    fn test_file_state_parse() {
        assert_eq!(FileState::parse(Some("ACTIVE")), FileState::Active);
        assert_eq!(FileState::parse(Some("FAILED")), FileState::Failed);
        assert_eq!(
            FileState::parse(Some("PROCESSING")),
            FileState::Pending("PROCESSING".to_string())
        );
        assert_eq!(
            FileState::parse(None),
            FileState::Pending("STATE_UNSPECIFIED".to_string())
        );
    }

    #[test]
    fn test_uploaded_file_envelope() {
        let uploaded: UploadedFile = serde_json::from_value(json!({
            "file": {
                "name": "files/abc123",
                "uri": "https://example.test/v1beta/files/abc123",
                "mimeType": "application/pdf",
                "state": "PROCESSING"
            }
        }))
        .unwrap();
        assert_eq!(uploaded.file.name, "files/abc123");
        assert_eq!(uploaded.file.state.as_deref(), Some("PROCESSING"));
    }
}
