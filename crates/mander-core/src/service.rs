//! Write and read paths over an event store
//!
//! Write: command → (id allocation) → processor → one append.
//! Read: full stream replay → projection over the supplied baseline.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::command::{handle_command_at, Command};
use crate::error::Result;
use crate::event::Event;
use crate::models::BaselineTransaction;
use crate::projection::{project, PersonalizationView};
use crate::store::EventStore;

pub struct Personalizer<S> {
    store: S,
}

impl<S: EventStore> Personalizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process a command and append the resulting event
    pub fn submit(&self, user_id: &str, command: Command) -> Result<Event> {
        self.submit_at(user_id, command, Utc::now())
    }

    /// [`submit`](Self::submit) with an explicit occurrence time
    pub fn submit_at(
        &self,
        user_id: &str,
        command: Command,
        occurred_at: DateTime<Utc>,
    ) -> Result<Event> {
        let command = if command.needs_transaction_id() {
            let id = self.store.next_transaction_id(user_id)?;
            debug!(user_id, id, "Allocated transaction id");
            command.with_transaction_id(id.to_string())
        } else {
            command
        };

        let event = handle_command_at(command, occurred_at)?;
        self.store.append(user_id, &event)?;

        info!(
            user_id,
            kind = %event.kind(),
            transaction_id = event.data.transaction_id().unwrap_or("-"),
            "Recorded event"
        );
        Ok(event)
    }

    /// Replay the user's stream over `baseline`
    pub fn view<I>(&self, user_id: &str, baseline: I) -> Result<PersonalizationView>
    where
        I: IntoIterator<Item = BaselineTransaction>,
    {
        let events = self.store.read_all(user_id)?;
        debug!(user_id, events = events.len(), "Replaying event stream");
        Ok(project(baseline, &events))
    }

    /// The user's raw event stream
    pub fn history(&self, user_id: &str) -> Result<Vec<Event>> {
        self.store.read_all(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::event::EventData;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn add(name: &str, amount: f64) -> Command {
        Command::AddTransaction {
            account_id: "acc-1".into(),
            transaction_id: None,
            amount,
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            name: name.into(),
        }
    }

    #[test]
    fn test_submit_allocates_sequential_ids() {
        let service = Personalizer::new(MemoryStore::new());

        let first = service.submit("alice", add("Cash gift", 100.0)).unwrap();
        let second = service.submit("alice", add("Lunch", -12.0)).unwrap();
        let other = service.submit("bob", add("Rent", -900.0)).unwrap();

        assert_eq!(first.data.transaction_id(), Some("1"));
        assert_eq!(second.data.transaction_id(), Some("2"));
        assert_eq!(other.data.transaction_id(), Some("1"));
    }

    #[test]
    fn test_submit_keeps_caller_supplied_id() {
        let store = MemoryStore::new();
        let service = Personalizer::new(&store);

        let command = add("Cash gift", 100.0).with_transaction_id("m1");
        let event = service.submit("alice", command).unwrap();

        assert_eq!(event.data.transaction_id(), Some("m1"));
        // The counter was not touched
        assert_eq!(store.next_transaction_id("alice").unwrap(), 1);
    }

    #[test]
    fn test_submit_appends_exactly_one_event() {
        let store = MemoryStore::new();
        let service = Personalizer::new(&store);
        let at = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();

        let event = service
            .submit_at(
                "alice",
                Command::CategorizeTransaction {
                    transaction_id: "t1".into(),
                    category: "Food".into(),
                },
                at,
            )
            .unwrap();

        assert_eq!(store.len("alice").unwrap(), 1);
        assert_eq!(service.history("alice").unwrap(), vec![event.clone()]);
        assert_eq!(event.occurred_at, at);
        assert!(matches!(
            event.data,
            EventData::TransactionCategorized { .. }
        ));
    }

    #[test]
    fn test_rejected_form_never_reaches_the_store() {
        let store = MemoryStore::new();
        let result = Command::from_form([("kind", "launch-rocket")]);
        assert!(matches!(result, Err(Error::UnknownCommandKind(_))));
        assert_eq!(store.len("alice").unwrap(), 0);
    }

    #[test]
    fn test_view_replays_over_baseline() {
        let service = Personalizer::new(MemoryStore::new());
        let baseline = vec![BaselineTransaction::new(
            "t1",
            "ACME",
            -50.0,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        )];

        service
            .submit(
                "alice",
                Command::CategorizeTransaction {
                    transaction_id: "t1".into(),
                    category: "Food".into(),
                },
            )
            .unwrap();
        service.submit("alice", add("Cash gift", 100.0)).unwrap();

        let view = service.view("alice", baseline.clone()).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.get("t1").unwrap().has_category("Food"));
        assert!(view.get("1").unwrap().can_delete);

        // Another user sees only the baseline
        let view = service.view("bob", baseline).unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.get("t1").unwrap().category.is_empty());
    }
}
