//! Personalization view projection
//!
//! The view is rebuilt on every read: seed it with the externally sourced
//! (baseline) transactions, then fold the user's full event stream over it
//! in stream order. The fold is pure; given the same baseline and the same
//! events it always produces the same view.
//!
//! Events that target a transaction id not present in the view at that point
//! of the fold (for example a category on a bank transaction outside the
//! fetched date range) are no-ops for that read.
//!
//! Auto-categorization rules are remembered for the rest of the fold, so a
//! rule also covers manual transactions added after it.

use serde::Serialize;
use tracing::debug;

use crate::event::{Event, EventData};
use crate::models::{BaselineTransaction, Category, Transaction};

/// Materialized snapshot of a user's transactions with all edits applied
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonalizationView {
    pub transactions: Vec<Transaction>,
    /// Auto-categorization rules seen so far, as (merchant name, category)
    #[serde(skip)]
    auto_rules: Vec<(String, String)>,
}

impl PersonalizationView {
    /// Start a view from baseline transactions, before any events
    pub fn new<I>(baseline: I) -> Self
    where
        I: IntoIterator<Item = BaselineTransaction>,
    {
        Self {
            transactions: baseline
                .into_iter()
                .map(Transaction::from_baseline)
                .collect(),
            auto_rules: Vec::new(),
        }
    }

    /// Apply one event to the view
    pub fn apply(&mut self, event: &Event) {
        match &event.data {
            EventData::TransactionAdded {
                transaction_id,
                amount,
                date,
                name,
                ..
            } => {
                // Ids come from the per-user counter, so no lookup for an existing entry
                let mut tx = Transaction::manual(transaction_id, name, *amount, *date);
                for (_, category) in self.auto_rules.iter().filter(|(rule, _)| rule == name) {
                    tx.add_category(Category::auto(category));
                }
                self.transactions.push(tx);
            }
            EventData::TransactionCategorized {
                transaction_id,
                category,
            } => match self.find_mut(transaction_id) {
                Some(tx) => tx.add_category(Category::new(category)),
                None => debug!(
                    transaction_id = %transaction_id,
                    category = %category,
                    "Ignoring categorization for transaction not in view"
                ),
            },
            EventData::CategoryRemoved {
                transaction_id,
                category,
            } => match self.find_mut(transaction_id) {
                Some(tx) => tx.remove_category(category),
                None => debug!(
                    transaction_id = %transaction_id,
                    category = %category,
                    "Ignoring category removal for transaction not in view"
                ),
            },
            EventData::TransactionRemoved { transaction_id } => {
                self.transactions.retain(|tx| &tx.id != transaction_id);
            }
            EventData::AutoCategorizationAdded { name, category } => {
                let mut matched = 0usize;
                for tx in self.transactions.iter_mut().filter(|tx| &tx.name == name) {
                    tx.add_category(Category::auto(category));
                    matched += 1;
                }
                debug!(name = %name, category = %category, matched, "Applied auto-categorization");
                self.auto_rules.push((name.clone(), category.clone()));
            }
        }
    }

    /// Look up a transaction by id
    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|tx| tx.id == id)
    }
}

impl<'a> IntoIterator for &'a PersonalizationView {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

/// Build a view by folding `events` over `baseline`
pub fn project<'a, B, E>(baseline: B, events: E) -> PersonalizationView
where
    B: IntoIterator<Item = BaselineTransaction>,
    E: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .fold(PersonalizationView::new(baseline), |mut view, event| {
            view.apply(event);
            view
        })
}
