//! SQLite-backed event store with connection pooling and migrations
//!
//! - `events` - append-only per-user event log ([`EventStore`] impl)
//!
//! [`EventStore`]: crate::store::EventStore

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod events;

pub use events::StoredEvent;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "MANDER_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"mander-salt-v1-f";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    // SQLite CURRENT_TIMESTAMP format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .map_err(|e| Error::InvalidData(format!("bad timestamp '{}': {}", s, e)))
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
    encrypted: bool,
}

impl Database {
    /// Open (or create) an encrypted database
    ///
    /// Requires `MANDER_DB_KEY` to hold the passphrase. Use `new_unencrypted()`
    /// for development and testing.
    pub fn new(path: &str) -> Result<Self> {
        match std::env::var(DB_KEY_ENV).ok() {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases.",
                DB_KEY_ENV
            ))),
        }
    }

    /// Open (or create) an unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open (or create) a database with an explicit passphrase
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Every pooled connection needs the key before first use
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted: passphrase.is_some(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "mander_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Whether this database was opened with a SQLCipher key
    pub fn is_encrypted(&self) -> Result<bool> {
        if !self.encrypted {
            return Ok(false);
        }
        let conn = self.conn()?;
        let version: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(version.is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL: readers don't block the appender
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Append-only event log; id gives the per-user stream order
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                occurred_at TEXT NOT NULL,
                fields TEXT NOT NULL,
                appended_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_events_user ON events(user_id, id);

            -- Manual transaction id counters
            CREATE TABLE IF NOT EXISTS transaction_counters (
                user_id TEXT PRIMARY KEY,
                value INTEGER NOT NULL
            );

            -- Events are never rewritten
            CREATE TRIGGER IF NOT EXISTS events_no_update
            BEFORE UPDATE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;

            CREATE TRIGGER IF NOT EXISTS events_no_delete
            BEFORE DELETE ON events
            BEGIN
                SELECT RAISE(ABORT, 'events are append-only');
            END;
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
