//! Database row types — these map directly to SQLite rows.
//! Distinct from the campus-types API models to keep the DB layer independent.

use anyhow::{Context, Result};
use campus_types::models::{Message, Project, Role, User};
use chrono::{DateTime, Utc};

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub department: String,
    pub skills: String,
    pub research_interests: String,
    pub uploaded_files: String,
    pub created_at: String,
}

pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub files: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub project_id: String,
    pub body: String,
    pub created_at: String,
    /// Sender expanded by the LEFT JOIN in the message query; None when the
    /// message was posted without an identity or the user row is gone.
    pub sender: Option<UserRow>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: self.id.parse().context("corrupt user id")?,
            name: self.name,
            role: self
                .role
                .parse::<Role>()
                .map_err(|e| anyhow::anyhow!("{}", e))?,
            department: self.department,
            skills: serde_json::from_str(&self.skills).context("corrupt skills column")?,
            research_interests: serde_json::from_str(&self.research_interests)
                .context("corrupt research_interests column")?,
            uploaded_files: serde_json::from_str(&self.uploaded_files)
                .context("corrupt uploaded_files column")?,
        })
    }

    /// Parsed interest tags, for in-memory matching.
    pub fn interests(&self) -> Result<Vec<String>> {
        serde_json::from_str(&self.research_interests).context("corrupt research_interests column")
    }
}

impl ProjectRow {
    /// Builds the API model; `members` stays empty until membership exists.
    pub fn into_project(self, messages: Vec<Message>) -> Result<Project> {
        Ok(Project {
            id: self.id.parse().context("corrupt project id")?,
            title: self.title,
            description: self.description,
            members: vec![],
            files: serde_json::from_str(&self.files).context("corrupt files column")?,
            messages,
        })
    }
}

impl MessageRow {
    pub fn into_message(self) -> Result<Message> {
        let sender = match self.sender {
            Some(row) => Some(row.into_user()?),
            None => None,
        };
        Ok(Message {
            id: self.id.parse().context("corrupt message id")?,
            sender,
            text: self.body,
            created_at: parse_sqlite_datetime(&self.created_at)
                .context("corrupt message timestamp")?,
        })
    }
}

/// SQLite's `datetime('now')` stores "YYYY-MM-DD HH:MM:SS" without a
/// timezone; fall back to parsing that as naive UTC.
pub fn parse_sqlite_datetime(s: &str) -> Result<DateTime<Utc>> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .with_context(|| format!("unparseable timestamp '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sqlite_default_format() {
        let ts = parse_sqlite_datetime("2026-08-30 12:30:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-08-30T12:30:00+00:00");
    }

    #[test]
    fn parses_rfc3339() {
        assert!(parse_sqlite_datetime("2026-08-30T12:30:00Z").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_sqlite_datetime("not a date").is_err());
    }
}
