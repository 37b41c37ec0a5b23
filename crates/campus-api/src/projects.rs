use anyhow::anyhow;
use axum::Json;
use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use campus_types::api::{CreateProjectRequest, ProjectResponse};

use crate::AppState;
use crate::error::ApiError;

/// POST /project — creates a project with no members, files or messages.
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id = Uuid::new_v4();
    state
        .db
        .create_project(&id.to_string(), &req.title, &req.description)?;

    let project = state
        .db
        .get_project(&id.to_string())?
        .ok_or_else(|| anyhow!("project {} vanished after insert", id))?
        .into_project(vec![])?;

    info!("Created project '{}' ({})", project.title, project.id);
    Ok(Json(ProjectResponse { success: true, project }))
}
