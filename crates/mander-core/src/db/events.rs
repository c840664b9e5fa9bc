//! Event log operations

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::event::{format_timestamp, Event, EventRecord};
use crate::store::EventStore;

/// An event together with its position in the log
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    /// Global log sequence; increasing within every user's stream
    pub seq: i64,
    pub appended_at: DateTime<Utc>,
    pub event: Event,
}

fn decode(fields: &str) -> Result<Event> {
    let record: EventRecord = serde_json::from_str(fields)?;
    Event::from_record(&record)
}

impl Database {
    /// Full stream for a user, with log positions
    pub fn list_events(&self, user_id: &str) -> Result<Vec<StoredEvent>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, appended_at, fields FROM events WHERE user_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(seq, appended_at, fields)| {
                Ok(StoredEvent {
                    seq,
                    appended_at: parse_datetime(&appended_at)?,
                    event: decode(&fields)?,
                })
            })
            .collect()
    }

    /// Number of events in a user's stream
    pub fn event_count(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM events WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Users with at least one event, and their event counts
    pub fn list_users(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, COUNT(*) FROM events GROUP BY user_id ORDER BY user_id",
        )?;
        let users = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }
}

impl EventStore for Database {
    fn append(&self, user_id: &str, event: &Event) -> Result<()> {
        let conn = self.conn()?;
        let fields = serde_json::to_string(&event.to_record())?;

        conn.execute(
            "INSERT INTO events (user_id, kind, occurred_at, fields) VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                event.kind().as_str(),
                format_timestamp(&event.occurred_at),
                fields
            ],
        )?;

        info!(
            user_id,
            kind = %event.kind(),
            seq = conn.last_insert_rowid(),
            "Appended event"
        );
        Ok(())
    }

    fn read_all(&self, user_id: &str) -> Result<Vec<Event>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT fields FROM events WHERE user_id = ?1 ORDER BY id")?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.iter().map(|fields| decode(fields)).collect()
    }

    fn next_transaction_id(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let value = conn.query_row(
            r#"
            INSERT INTO transaction_counters (user_id, value) VALUES (?1, 1)
            ON CONFLICT(user_id) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(value)
    }
}
