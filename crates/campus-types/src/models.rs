use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campus role. The store enforces the enumeration via a CHECK constraint;
/// this enum is the typed view of values that made it past the constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => f.write_str("student"),
            Role::Faculty => f.write_str("faculty"),
        }
    }
}

#[derive(Debug)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub department: String,
    pub skills: Vec<String>,
    pub research_interests: Vec<String>,
    /// Declared in the schema; no route populates it yet.
    pub uploaded_files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Membership is deferred: projects are created with no members and
    /// no route adds any.
    pub members: Vec<Uuid>,
    pub files: Vec<String>,
    pub messages: Vec<Message>,
}

/// A project chat message. Append-only once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    /// Expanded sender, or None when the message was posted without an
    /// established identity (the common case until auth lands).
    pub sender: Option<User>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("faculty".parse::<Role>().unwrap(), Role::Faculty);
        assert_eq!(Role::Student.to_string(), "student");
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: Uuid::nil(),
            name: "Ada".into(),
            role: Role::Faculty,
            department: "CS".into(),
            skills: vec!["rust".into()],
            research_interests: vec!["formal methods".into()],
            uploaded_files: vec![],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "faculty");
        assert!(json["researchInterests"].is_array());
        assert!(json["uploadedFiles"].is_array());
    }
}
