//! Mander Core Library
//!
//! Event-sourced personalization of bank transactions:
//! - Commands and the command processor
//! - Event schema and the flat string codec used at the storage boundary
//! - Projection of an event stream over baseline transactions
//! - Event stores (SQLite/SQLCipher and in-memory)
//! - Period/category filtering and spending reports
//! - Baseline feed loaders and configuration

pub mod baseline;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod filter;
pub mod models;
pub mod projection;
pub mod reports;
pub mod service;
pub mod store;

pub use command::{handle_command, handle_command_at, Command, CommandKind};
pub use config::Config;
pub use db::{Database, StoredEvent};
pub use error::{Error, Result};
pub use event::{Event, EventData, EventKind, EventRecord};
pub use filter::{Period, ViewFilter};
pub use models::{BaselineTransaction, Category, Transaction, NEEDS_CATEGORIES};
pub use projection::{project, PersonalizationView};
pub use reports::{BudgetSplit, CategoryBreakdown, MonthlyFlow};
pub use service::Personalizer;
pub use store::{EventStore, MemoryStore};
