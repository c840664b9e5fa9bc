//! In-memory event store for tests and throwaway sessions

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::EventStore;
use crate::error::{Error, Result};
use crate::event::{Event, EventRecord};

/// Thread-safe in-memory [`EventStore`]. Clones share the same streams.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    streams: HashMap<String, Vec<EventRecord>>,
    counters: HashMap<String, i64>,
}

fn poisoned<T>(_: T) -> Error {
    Error::Store("in-memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already encoded record, bypassing the typed codec
    pub fn append_record(&self, user_id: &str, record: EventRecord) -> Result<()> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner
            .streams
            .entry(user_id.to_string())
            .or_default()
            .push(record);
        Ok(())
    }

    /// Number of events in a user's stream
    pub fn len(&self, user_id: &str) -> Result<usize> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.streams.get(user_id).map_or(0, Vec::len))
    }
}

impl EventStore for MemoryStore {
    fn append(&self, user_id: &str, event: &Event) -> Result<()> {
        self.append_record(user_id, event.to_record())?;
        trace!(user_id, kind = %event.kind(), "appended event");
        Ok(())
    }

    fn read_all(&self, user_id: &str) -> Result<Vec<Event>> {
        let inner = self.inner.read().map_err(poisoned)?;
        inner
            .streams
            .get(user_id)
            .map(|records| records.iter().map(Event::from_record).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn next_transaction_id(&self, user_id: &str) -> Result<i64> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let counter = inner.counters.entry(user_id.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}
