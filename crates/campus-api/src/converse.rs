use std::path::{Path as FsPath, PathBuf};

use anyhow::Context;
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{error, warn};
use uuid::Uuid;

use campus_types::api::ConverseResponse;
use campus_types::conversation::{ContentPart, ConversationTurn, FileRef};

use crate::{AppState, session};

/// What the browser sees on any assistant failure. Details stay in the log.
const FAILURE_REPLY: &str = "Error: Could not generate a response.";

/// POST /converse — one assistant exchange: optional text, optional file.
/// On success the session history grows by exactly two turns.
pub async fn converse(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> Response {
    let (jar, session_id) = session::session_id(jar);

    match handle_exchange(&state, session_id, multipart).await {
        Ok(reply) => (jar, Json(ConverseResponse { success: true, reply })).into_response(),
        Err(err) => {
            error!("Assistant exchange failed: {:#}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                jar,
                Json(ConverseResponse {
                    success: false,
                    reply: FAILURE_REPLY.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn handle_exchange(
    state: &AppState,
    session_id: Uuid,
    mut multipart: Multipart,
) -> anyhow::Result<String> {
    let mut message_text: Option<String> = None;
    let mut upload: Option<TempUpload> = None;

    while let Some(field) = multipart.next_field().await.context("bad multipart body")? {
        match field.name() {
            Some("message") => {
                let text = field.text().await.context("unreadable message field")?;
                if !text.trim().is_empty() {
                    message_text = Some(text);
                }
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.context("unreadable file field")?;
                if !bytes.is_empty() {
                    upload =
                        Some(TempUpload::write(&state.uploads_dir, file_name, mime_type, &bytes).await?);
                }
            }
            _ => {}
        }
    }

    // Register the upload with the gateway first; its URI becomes a part.
    let mut file_ref = None;
    if let Some(upload) = &upload {
        file_ref = Some(
            state
                .ai
                .upload_file(&upload.path, &upload.mime_type, &upload.file_name)
                .await?,
        );
    }

    let parts = build_parts(message_text.as_deref(), file_ref);

    let history = state.sessions.history(session_id);
    let result = state.ai.generate_reply(&history, parts.clone()).await;

    // The spooled file's job ends with the gateway call, success or not.
    if let Some(upload) = upload {
        upload.remove().await;
    }

    let reply = result?;
    state.sessions.append_exchange(
        session_id,
        ConversationTurn::user(parts),
        ConversationTurn::model(reply.clone()),
    );

    Ok(reply)
}

/// Text part (when non-empty) followed by the file part (when uploaded).
/// A file-only exchange yields a single file-reference part.
fn build_parts(message_text: Option<&str>, file_ref: Option<FileRef>) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    if let Some(text) = message_text {
        parts.push(ContentPart::text(text));
    }
    if let Some(file_ref) = file_ref {
        parts.push(ContentPart::File { file_data: file_ref });
    }
    parts
}

/// An uploaded file spooled to disk for the duration of one gateway call.
/// `remove` is the normal path; Drop is the backstop when an error unwinds
/// past it, so no request leaves a file behind.
struct TempUpload {
    path: PathBuf,
    file_name: String,
    mime_type: String,
    removed: bool,
}

impl TempUpload {
    async fn write(
        dir: &FsPath,
        file_name: String,
        mime_type: String,
        bytes: &[u8],
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .context("creating uploads dir")?;
        let path = dir.join(Uuid::new_v4().to_string());
        tokio::fs::write(&path, bytes)
            .await
            .context("spooling upload")?;
        Ok(Self {
            path,
            file_name,
            mime_type,
            removed: false,
        })
    }

    async fn remove(mut self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Failed to remove temp upload {}: {}", self.path.display(), e);
        }
        self.removed = true;
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_ref() -> FileRef {
        FileRef {
            file_uri: "files/abc".into(),
            mime_type: "application/pdf".into(),
        }
    }

    #[test]
    fn text_only_is_one_text_part() {
        let parts = build_parts(Some("hello"), None);
        assert_eq!(parts.len(), 1);
        assert!(matches!(&parts[0], ContentPart::Text { text } if text == "hello"));
    }

    #[test]
    fn file_only_is_one_file_part() {
        let parts = build_parts(None, Some(file_ref()));
        assert_eq!(parts.len(), 1);
        assert!(matches!(&parts[0], ContentPart::File { .. }));
    }

    #[test]
    fn text_and_file_keeps_text_first() {
        let parts = build_parts(Some("see attached"), Some(file_ref()));
        assert_eq!(parts.len(), 2);
        assert!(matches!(&parts[0], ContentPart::Text { .. }));
        assert!(matches!(&parts[1], ContentPart::File { .. }));
    }

    #[test]
    fn nothing_yields_no_parts() {
        // The gateway rejects an empty turn; that error becomes the fixed
        // failure reply, same as any other upstream problem.
        assert!(build_parts(None, None).is_empty());
    }

    #[tokio::test]
    async fn temp_upload_is_removed_on_the_normal_path() {
        let dir = std::env::temp_dir().join("campus-test-uploads");
        let upload = TempUpload::write(&dir, "a.txt".into(), "text/plain".into(), b"hi")
            .await
            .unwrap();
        let path = upload.path.clone();
        assert!(path.exists());
        upload.remove().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn temp_upload_is_removed_on_drop() {
        let dir = std::env::temp_dir().join("campus-test-uploads");
        let upload = TempUpload::write(&dir, "b.txt".into(), "text/plain".into(), b"hi")
            .await
            .unwrap();
        let path = upload.path.clone();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
    }
}
