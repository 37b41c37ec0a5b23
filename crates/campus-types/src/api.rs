use serde::{Deserialize, Serialize};

use crate::models::{Message, Project, User};

// -- Profiles --

/// `role` stays a plain string here: the store's CHECK constraint is the
/// only enumeration enforcement, matching how profile creation behaves.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub name: String,
    pub role: String,
    pub department: String,
    /// Comma-separated tags, split and trimmed server-side.
    pub skills: String,
    pub research_interests: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: User,
}

// -- Collaborators --

#[derive(Debug, Serialize)]
pub struct CollaboratorsResponse {
    pub success: bool,
    pub matches: Vec<User>,
}

// -- Projects --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

// -- Project messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<Message>,
}

// -- Assistant --

#[derive(Debug, Serialize)]
pub struct ConverseResponse {
    pub success: bool,
    pub reply: String,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}
