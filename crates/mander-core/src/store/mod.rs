//! Event store boundary
//!
//! An append-only log partitioned per user. Within one user's stream events
//! come back in the order they were appended; there is no ordering across
//! users. Implementations must also provide a per-user counter used to assign
//! ids to manually added transactions.
//!
//! Stores keep events as flat string maps ([`EventRecord`]) and decode them
//! strictly on read, so a malformed record surfaces as an error instead of
//! reaching the projection.
//!
//! [`EventRecord`]: crate::event::EventRecord

mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::event::Event;

pub trait EventStore {
    /// Append one event to the end of the user's stream.
    ///
    /// Not retried: each submitted command must produce exactly one append.
    fn append(&self, user_id: &str, event: &Event) -> Result<()>;

    /// The user's full stream from the beginning, in append order
    fn read_all(&self, user_id: &str) -> Result<Vec<Event>>;

    /// Atomically increment and return the user's transaction counter.
    /// Values are unique per user and never reused; the first is 1.
    fn next_transaction_id(&self, user_id: &str) -> Result<i64>;
}

impl<S: EventStore + ?Sized> EventStore for &S {
    fn append(&self, user_id: &str, event: &Event) -> Result<()> {
        (**self).append(user_id, event)
    }

    fn read_all(&self, user_id: &str) -> Result<Vec<Event>> {
        (**self).read_all(user_id)
    }

    fn next_transaction_id(&self, user_id: &str) -> Result<i64> {
        (**self).next_transaction_id(user_id)
    }
}
