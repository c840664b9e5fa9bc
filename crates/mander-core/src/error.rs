//! Error types for Mander

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Event store error: {0}")]
    Store(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Unknown command kind: {0}")]
    UnknownCommandKind(String),

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("Missing field '{field}' for {kind}")]
    MissingField { kind: String, field: &'static str },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
