//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `open_service` - Shared utilities to open the event store
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Database status and per-user event counts

use std::path::Path;

use anyhow::{Context, Result};
use mander_core::{db::Database, Personalizer};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Open the database and wrap it for submitting commands and building views
pub fn open_service(db_path: &Path, no_encrypt: bool) -> Result<Personalizer<Database>> {
    Ok(Personalizer::new(open_db(db_path, no_encrypt)?))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Categorize a bank transaction: mander categorize <id> Groceries");
    println!("  2. View it over your bank export: mander view --baseline transactions.csv");

    Ok(())
}

pub fn cmd_status(db: &Database) -> Result<()> {
    let encrypted = db.is_encrypted()?;
    let users = db.list_users()?;
    let total: i64 = users.iter().map(|(_, count)| count).sum();

    println!();
    println!("📊 Mander Status");
    println!("   ─────────────────────────────────────────");
    println!("   Database:   {}", db.path());
    println!(
        "   Encryption: {}",
        if encrypted { "🔒 enabled" } else { "⚠️  disabled" }
    );
    println!("   Events:     {}", total);

    if users.is_empty() {
        println!();
        println!("   No events recorded yet.");
        return Ok(());
    }

    println!();
    println!("   {:<24} {:>8}", "User", "Events");
    for (user, count) in users {
        println!("   {:<24} {:>8}", user, count);
    }

    Ok(())
}
