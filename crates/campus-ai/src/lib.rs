//! Client for the Google Generative Language API.
//!
//! Two capabilities, mirroring what the assistant routes need: registering
//! an uploaded file with the File API, and a non-streaming `generateContent`
//! call that carries the full conversation history each time.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use campus_types::conversation::{ContentPart, ConversationTurn, FileRef, TurnRole};

const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured; the one the assistant shipped with.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("gateway returned no text candidate")]
    EmptyReply,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Generative Language API error envelope.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<u16>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    uri: String,
    mime_type: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Registers a local file with the File API so it can be referenced in
    /// a conversation turn. Returns the gateway-assigned URI.
    pub async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<FileRef> {
        let bytes = tokio::fs::read(path).await?;

        let metadata = json!({ "file": { "display_name": display_name } }).to_string();
        let form = reqwest::multipart::Form::new()
            .part(
                "metadata",
                reqwest::multipart::Part::text(metadata)
                    .mime_str("application/json")
                    .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?,
            )
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(display_name.to_string())
                    .mime_str(mime_type)
                    .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?,
            );

        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);
        let response = self.http.post(&url).multipart(form).send().await?;
        let response = check_status(response).await?;

        let uploaded: UploadResponse = response.json().await?;
        debug!("Registered upload '{}' as {}", display_name, uploaded.file.uri);

        Ok(FileRef {
            file_uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    /// Sends the prior history plus one new user turn and returns the
    /// model's text reply. The gateway is stateless; the caller owns history.
    pub async fn generate_reply(
        &self,
        history: &[ConversationTurn],
        parts: Vec<ContentPart>,
    ) -> Result<String> {
        if parts.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "a turn needs at least one part".into(),
            ));
        }

        let body = build_request_body(history, parts);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self.http.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;

        let generated: GenerateResponse = response.json().await?;
        extract_reply(generated)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&body) {
        return Err(GatewayError::Api {
            status: parsed.error.code.unwrap_or(status.as_u16()),
            message: parsed.error.message,
        });
    }
    Err(GatewayError::Api {
        status: status.as_u16(),
        message: body,
    })
}

fn build_request_body(history: &[ConversationTurn], parts: Vec<ContentPart>) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|turn| json!({ "role": turn.role, "parts": turn.parts }))
        .collect();
    contents.push(json!({ "role": TurnRole::User, "parts": parts }));
    json!({ "contents": contents })
}

fn extract_reply(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .flatten()
        .take(1)
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        return Err(GatewayError::EmptyReply);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_history_then_new_turn() {
        let history = vec![
            ConversationTurn::user(vec![ContentPart::text("hi")]),
            ConversationTurn::model("hello"),
        ];
        let body = build_request_body(&history, vec![ContentPart::text("how are you")]);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "how are you");
    }

    #[test]
    fn file_parts_serialize_as_file_data() {
        let body = build_request_body(
            &[],
            vec![ContentPart::file("files/abc", "application/pdf")],
        );
        let part = &body["contents"][0]["parts"][0];
        assert_eq!(part["fileData"]["fileUri"], "files/abc");
        assert_eq!(part["fileData"]["mimeType"], "application/pdf");
    }

    #[test]
    fn parses_generate_response() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"there"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_reply(response).unwrap(), "Hello there");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_reply(response), Err(GatewayError::EmptyReply)));
    }

    #[test]
    fn parses_error_envelope() {
        let json = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.error.code, Some(400));
        assert_eq!(parsed.error.message, "API key not valid");
    }

    #[test]
    fn parses_upload_response() {
        let json = r#"{"file":{"name":"files/abc","uri":"https://generativelanguage.googleapis.com/v1beta/files/abc","mimeType":"image/png"}}"#;
        let parsed: UploadResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.file.uri.ends_with("files/abc"));
        assert_eq!(parsed.file.mime_type.as_deref(), Some("image/png"));
    }
}
