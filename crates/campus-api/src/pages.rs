use anyhow::anyhow;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;

use campus_types::models::Message;

use crate::error::ApiError;
use crate::{AppState, session};

pub fn templates() -> anyhow::Result<minijinja::Environment<'static>> {
    let mut env = minijinja::Environment::new();
    env.add_template("index", include_str!("../../../templates/index.html"))?;
    env.add_template("project", include_str!("../../../templates/project.html"))?;
    Ok(env)
}

/// GET / — project listing. Loading the homepage also resets this
/// session's assistant history, whatever its length.
pub async fn homepage(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, session_id) = session::session_id(jar);
    state.sessions.reset_history(session_id);

    let projects = state
        .db
        .list_projects()?
        .into_iter()
        .map(|row| row.into_project(vec![]))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let html = state
        .templates
        .get_template("index")
        .and_then(|t| t.render(minijinja::context! { projects }))
        .map_err(|e| anyhow!("template error: {}", e))?;

    Ok((jar, Html(html)))
}

/// GET /project/{id} — project page with its messages, senders expanded.
/// Unknown ids get a plain-text 404, matching what the links promise.
pub async fn project_page(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    jar: SignedCookieJar,
) -> Result<Response, ApiError> {
    let (jar, session_id) = session::session_id(jar);

    let Some(row) = state.db.get_project(&project_id)? else {
        return Ok((StatusCode::NOT_FOUND, "Project not found").into_response());
    };

    let messages = state
        .db
        .get_messages(&project_id)?
        .into_iter()
        .map(|m| m.into_message())
        .collect::<anyhow::Result<Vec<Message>>>()?;

    let project = row.into_project(messages)?;
    // Empty until an authentication flow sets the session identity.
    let current_user_id = state
        .sessions
        .current_user(session_id)
        .map(|u| u.to_string())
        .unwrap_or_default();

    let html = state
        .templates
        .get_template("project")
        .and_then(|t| t.render(minijinja::context! { project, current_user_id }))
        .map_err(|e| anyhow!("template error: {}", e))?;

    Ok((jar, Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
    use campus_types::conversation::{ContentPart, ConversationTurn};
    use uuid::Uuid;

    #[test]
    fn templates_compile() {
        templates().unwrap();
    }

    #[tokio::test]
    async fn unknown_project_page_is_plain_404() {
        let state = test_support::state();
        let jar = SignedCookieJar::new(state.cookie_key.clone());
        let response = project_page(
            State(state),
            Path(uuid::Uuid::new_v4().to_string()),
            jar,
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn homepage_renders_project_titles() {
        let state = test_support::state();
        state
            .db
            .create_project(&uuid::Uuid::new_v4().to_string(), "Campus Mesh", "radios")
            .unwrap();
        let jar = SignedCookieJar::new(state.cookie_key.clone());

        let response = homepage(State(state), jar).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn homepage_load_resets_session_history() {
        let state = test_support::state();
        let session_id = Uuid::new_v4();
        state.sessions.append_exchange(
            session_id,
            ConversationTurn::user(vec![ContentPart::text("remember this")]),
            ConversationTurn::model("noted"),
        );
        assert_eq!(state.sessions.history(session_id).len(), 2);

        // Jar signed with the state's key so the handler sees this session.
        let jar = SignedCookieJar::new(state.cookie_key.clone())
            .add(Cookie::new(session::SESSION_COOKIE, session_id.to_string()));

        homepage(State(state.clone()), jar).await.unwrap();
        assert!(state.sessions.history(session_id).is_empty());
    }
}
