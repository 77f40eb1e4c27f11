// 📜 Audit journal - append-only event trail in SQLite
//
// Every change the CLI makes to the registry (transfers, accruals, loans,
// saves) is appended here. Events are never updated or deleted.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::RecordId;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    /// None for registry-wide events such as saves
    pub record_id: Option<RecordId>,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        kind: &str,
        record_id: Option<RecordId>,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            kind: kind.to_string(),
            record_id,
            data,
            actor: actor.to_string(),
        }
    }
}

pub struct Journal {
    conn: Connection,
}

impl Journal {
    /// Open (or create) the journal file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open journal: {:?}", path.as_ref()))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        setup(&conn)?;
        Ok(Journal { conn })
    }

    /// Append an event
    pub fn record(&self, event: &Event) -> Result<()> {
        let data_json = serde_json::to_string(&event.data)?;

        self.conn
            .execute(
                "INSERT INTO events (
                    event_id, timestamp, kind, record_id, data, actor
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    event.event_id,
                    event.timestamp.to_rfc3339(),
                    event.kind,
                    event.record_id.map(|id| id as i64),
                    data_json,
                    event.actor,
                ],
            )
            .context("Failed to insert event")?;

        tracing::debug!(kind = %event.kind, record_id = ?event.record_id, "event journaled");
        Ok(())
    }

    /// Events touching one record, oldest first
    pub fn events_for(&self, record_id: RecordId) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT event_id, timestamp, kind, record_id, data, actor
             FROM events
             WHERE record_id = ?1
             ORDER BY id ASC",
        )?;

        let events = stmt
            .query_map(params![record_id as i64], |row| {
                let timestamp_str: String = row.get(1)?;
                let record_id: Option<i64> = row.get(3)?;
                let data_json: String = row.get(4)?;

                Ok(Event {
                    event_id: row.get(0)?,
                    timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                        .map_err(|_| rusqlite::Error::InvalidQuery)?
                        .with_timezone(&Utc),
                    kind: row.get(2)?,
                    record_id: record_id.map(|id| id as RecordId),
                    data: serde_json::from_str(&data_json)
                        .map_err(|_| rusqlite::Error::InvalidQuery)?,
                    actor: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(events)
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn setup(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            kind TEXT NOT NULL,
            record_id INTEGER,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_record ON events(record_id)",
        [],
    )?;

    Ok(())
}
