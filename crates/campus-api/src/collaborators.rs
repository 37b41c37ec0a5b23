use axum::Json;
use axum::extract::{Path, State};

use campus_types::api::CollaboratorsResponse;

use crate::AppState;
use crate::error::ApiError;

/// GET /collaborators/{interest} — every user with a matching research
/// interest. No match is a success with an empty list, not an error.
pub async fn find_collaborators(
    State(state): State<AppState>,
    Path(interest): Path<String>,
) -> Result<Json<CollaboratorsResponse>, ApiError> {
    let needle = interest.to_lowercase();

    let mut matches = Vec::new();
    for row in state.db.list_users()? {
        if interest_matches(&row.interests()?, &needle) {
            matches.push(row.into_user()?);
        }
    }

    Ok(Json(CollaboratorsResponse { success: true, matches }))
}

/// Case-insensitive interest match. A tag matches when it contains the
/// query as a substring, or when the query equals the tag's word-initial
/// acronym (so "AI" finds "artificial intelligence").
fn interest_matches(interests: &[String], needle_lower: &str) -> bool {
    if needle_lower.is_empty() {
        return false;
    }
    interests.iter().any(|tag| {
        let tag_lower = tag.to_lowercase();
        tag_lower.contains(needle_lower) || acronym(&tag_lower) == needle_lower
    })
}

fn acronym(tag_lower: &str) -> String {
    tag_lower
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}
