//! SQLite storage for parsed clippings

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use std::path::Path;

use super::ClippingRecord;

pub struct ClippingStore {
    conn: Connection,
}

impl ClippingStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(path).context("Failed to open clippings database")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS clippings (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT,
                location TEXT NOT NULL,
                added_on TEXT,
                kind TEXT NOT NULL,
                note_text TEXT NOT NULL,
                created_at INTEGER DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    pub fn insert_all(&mut self, records: &[ClippingRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO clippings (title, author, location, added_on, kind, note_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.title,
                    record.author,
                    record.location,
                    record.added_on.map(|t| t.to_string()),
                    record.kind.to_string(),
                    record.note_text,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    #[allow(dead_code)]
    pub fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM clippings", [], |row| row.get(0))?;
        Ok(count)
    }
}
