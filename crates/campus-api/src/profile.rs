use anyhow::anyhow;
use axum::Json;
use axum::extract::State;
use tracing::info;
use uuid::Uuid;

use campus_types::api::{CreateProfileRequest, ProfileResponse};

use crate::AppState;
use crate::error::ApiError;

/// POST /profile — stores a user profile. The role enumeration is enforced
/// by the store's CHECK constraint, not here.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = Uuid::new_v4();
    let skills = split_csv(&req.skills);
    let interests = split_csv(&req.research_interests);

    state.db.create_user(
        &id.to_string(),
        &req.name,
        &req.role,
        &req.department,
        &skills,
        &interests,
    )?;

    let user = state
        .db
        .get_user_by_id(&id.to_string())?
        .ok_or_else(|| anyhow!("user {} vanished after insert", id))?
        .into_user()?;

    info!("Created profile '{}' ({})", user.name, user.id);
    Ok(Json(ProfileResponse { success: true, user }))
}

/// Splits a comma-separated tag string, trimming each token. Every token
/// between commas is kept, exactly as submitted.
fn split_csv(input: &str) -> Vec<String> {
    input.split(',').map(|t| t.trim().to_string()).collect()
}
