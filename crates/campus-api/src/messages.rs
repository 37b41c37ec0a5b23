use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::info;
use uuid::Uuid;

use campus_types::api::{MessagesResponse, PostMessageRequest};
use campus_types::models::Message;

use crate::error::ApiError;
use crate::{AppState, session};

/// POST /project/{id}/message — appends one message and returns the full
/// updated list with senders expanded.
///
/// The append is a single INSERT at the storage boundary, so two
/// near-simultaneous posts to the same project both land; there is no
/// load-mutate-save window to lose one in.
pub async fn post_message(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    jar: SignedCookieJar,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, session_id) = session::session_id(jar);
    // Always None until an authentication flow sets it.
    let sender_id = state.sessions.current_user(session_id);

    // Existence check first so an unknown project is a 404, not an FK error.
    let db = state.clone();
    let pid = project_id.clone();
    let project = tokio::task::spawn_blocking(move || db.db.get_project(&pid))
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??
        .ok_or(ApiError::NotFound("Project"))?;

    let message_id = Uuid::new_v4();
    let db = state.clone();
    let pid = project_id.clone();
    let sender = sender_id.map(|u| u.to_string());
    let body = req.message;
    let rows = tokio::task::spawn_blocking(move || {
        db.db
            .append_message(&message_id.to_string(), &pid, sender.as_deref(), &body)?;
        db.db.get_messages(&pid)
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

    let messages = rows
        .into_iter()
        .map(|row| row.into_message())
        .collect::<anyhow::Result<Vec<Message>>>()?;

    info!(
        "Message {} appended to project '{}' ({} total)",
        message_id,
        project.title,
        messages.len()
    );

    Ok((jar, Json(MessagesResponse { success: true, messages })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn jar(state: &AppState) -> SignedCookieJar {
        SignedCookieJar::new(state.cookie_key.clone())
    }

    fn seed_project(state: &AppState) -> String {
        let id = Uuid::new_v4().to_string();
        state.db.create_project(&id, "P", "d").unwrap();
        id
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let state = test_support::state();
        let result = post_message(
            State(state.clone()),
            Path(Uuid::new_v4().to_string()),
            jar(&state),
            Json(PostMessageRequest { message: "hi".into() }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn appends_preserve_order_text_and_null_sender() {
        let state = test_support::state();
        let project_id = seed_project(&state);

        for i in 0..4 {
            post_message(
                State(state.clone()),
                Path(project_id.clone()),
                jar(&state),
                Json(PostMessageRequest { message: format!("msg {}", i) }),
            )
            .await
            .unwrap();
        }

        let rows = state.db.get_messages(&project_id).unwrap();
        assert_eq!(rows.len(), 4);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.body, format!("msg {}", i));
            // No authentication flow exists, so every sender is null.
            assert!(row.sender.is_none());
        }
    }
}
