use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            role                TEXT NOT NULL CHECK (role IN ('student', 'faculty')),
            department          TEXT NOT NULL,
            skills              TEXT NOT NULL DEFAULT '[]',
            research_interests  TEXT NOT NULL DEFAULT '[]',
            uploaded_files      TEXT NOT NULL DEFAULT '[]',
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS projects (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            files       TEXT NOT NULL DEFAULT '[]',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Membership is part of the schema but nothing writes to it yet.
        CREATE TABLE IF NOT EXISTS project_members (
            project_id  TEXT NOT NULL REFERENCES projects(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            PRIMARY KEY (project_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            project_id  TEXT NOT NULL REFERENCES projects(id),
            sender_id   TEXT REFERENCES users(id),
            body        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_project
            ON messages(project_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
