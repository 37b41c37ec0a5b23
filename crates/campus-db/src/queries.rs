use crate::Database;
use crate::models::{MessageRow, ProjectRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        role: &str,
        department: &str,
        skills: &[String],
        research_interests: &[String],
    ) -> Result<()> {
        let skills_json = serde_json::to_string(skills)?;
        let interests_json = serde_json::to_string(research_interests)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, role, department, skills, research_interests)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, role, department, skills_json, interests_json],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([], |row| user_from_row(row, 0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Projects --

    pub fn create_project(&self, id: &str, title: &str, description: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, title, description) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, title, description],
            )?;
            Ok(())
        })
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, files, created_at FROM projects WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], project_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, files, created_at
                 FROM projects ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map([], project_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Messages --

    /// Appends a message as a single INSERT. The storage boundary is the
    /// atomicity boundary here: there is no load-mutate-save cycle, so
    /// concurrent appends to one project cannot drop each other.
    pub fn append_message(
        &self,
        id: &str,
        project_id: &str,
        sender_id: Option<&str>,
        body: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, project_id, sender_id, body) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, project_id, sender_id, body],
            )?;
            Ok(())
        })
    }

    /// Messages for a project in insertion order, each with its sender
    /// expanded in a single query (LEFT JOIN keeps sender-less rows).
    pub fn get_messages(&self, project_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, project_id))
    }
}

const USER_COLUMNS: &str =
    "id, name, role, department, skills, research_interests, uploaded_files, created_at";

fn user_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        role: row.get(offset + 2)?,
        department: row.get(offset + 3)?,
        skills: row.get(offset + 4)?,
        research_interests: row.get(offset + 5)?,
        uploaded_files: row.get(offset + 6)?,
        created_at: row.get(offset + 7)?,
    })
}

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        files: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
    let row = stmt.query_row([id], |row| user_from_row(row, 0)).optional()?;
    Ok(row)
}

fn query_messages(conn: &Connection, project_id: &str) -> Result<Vec<MessageRow>> {
    // JOIN users to expand the sender in a single query (no N+1). rowid is
    // the tiebreaker so same-second appends keep insertion order.
    let mut stmt = conn.prepare(
        "SELECT m.id, m.project_id, m.body, m.created_at,
                u.id, u.name, u.role, u.department, u.skills,
                u.research_interests, u.uploaded_files, u.created_at
         FROM messages m
         LEFT JOIN users u ON m.sender_id = u.id
         WHERE m.project_id = ?1
         ORDER BY m.created_at, m.rowid",
    )?;

    let rows = stmt
        .query_map([project_id], |row| {
            let sender = match row.get::<_, Option<String>>(4)? {
                Some(_) => Some(user_from_row(row, 4)?),
                None => None,
            };
            Ok(MessageRow {
                id: row.get(0)?,
                project_id: row.get(1)?,
                body: row.get(2)?,
                created_at: row.get(3)?,
                sender,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
