//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Mander - Personalize your bank transactions
#[derive(Parser)]
#[command(name = "mander")]
#[command(about = "Event-sourced personal finance dashboard", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to [storage] path in the config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// User whose event stream to use (defaults to [user] default_id)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Config file (defaults to ~/.local/share/mander/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set MANDER_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status and users
    Status,

    /// Add a manual transaction
    Add {
        /// Merchant or description
        name: String,

        /// Signed amount (negative = expense, positive = income)
        #[arg(allow_negative_numbers = true)]
        amount: f64,

        /// Transaction date, YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Account the transaction belongs to
        #[arg(short, long, default_value = "manual")]
        account: String,
    },

    /// Add a category to a transaction
    Categorize {
        transaction_id: String,
        category: String,
    },

    /// Remove a category from a transaction
    Uncategorize {
        transaction_id: String,
        category: String,
    },

    /// Delete a transaction from the view
    Remove { transaction_id: String },

    /// Categorize every transaction with this exact merchant name
    AutoCategorize { name: String, category: String },

    /// Submit a raw command payload (e.g. kind=remove-transaction transactionId=7)
    Submit {
        /// Form fields as key=value pairs
        #[arg(required = true, value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },

    /// Show the raw event stream
    Events {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show personalized transactions
    View {
        /// Baseline feed exported from the bank (.json or .csv)
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Month to show, YYYY-MM (all months if omitted)
        #[arg(short, long)]
        period: Option<String>,

        /// Only transactions with this category
        #[arg(short, long)]
        category: Option<String>,

        /// Maximum rows (defaults to [view] default_limit; 0 = no limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending breakdowns for a period
    Report {
        /// Baseline feed exported from the bank (.json or .csv)
        #[arg(short, long)]
        baseline: Option<PathBuf>,

        /// Month to report on, YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse a `key=value` pair; the value may itself contain `=`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
