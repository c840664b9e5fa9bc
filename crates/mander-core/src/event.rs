//! Persisted events and their flat string-record encoding
//!
//! Events are the immutable facts in a user's stream. The storage boundary
//! only understands flat `field -> string` maps, so every event can be turned
//! into an [`EventRecord`] and back. Decoding is strict: a record with an
//! unknown kind, a missing field or an unparsable value is rejected here
//! rather than inside the projection fold.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Flat representation of an event at the storage boundary
pub type EventRecord = BTreeMap<String, String>;

pub(crate) const FIELD_KIND: &str = "kind";
pub(crate) const FIELD_OCCURRED_AT: &str = "occurredAt";
pub(crate) const FIELD_ACCOUNT_ID: &str = "accountId";
pub(crate) const FIELD_TRANSACTION_ID: &str = "transactionId";
pub(crate) const FIELD_AMOUNT: &str = "amount";
pub(crate) const FIELD_DATE: &str = "date";
pub(crate) const FIELD_NAME: &str = "name";
pub(crate) const FIELD_CATEGORY: &str = "category";

/// Event kinds, named in the past tense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    TransactionAdded,
    TransactionCategorized,
    CategoryRemoved,
    TransactionRemoved,
    AutoCategorizationAdded,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionAdded => "transaction-added",
            Self::TransactionCategorized => "transaction-categorized",
            Self::CategoryRemoved => "category-removed",
            Self::TransactionRemoved => "transaction-removed",
            Self::AutoCategorizationAdded => "auto-categorization-added",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "transaction-added" => Ok(Self::TransactionAdded),
            "transaction-categorized" => Ok(Self::TransactionCategorized),
            "category-removed" => Ok(Self::CategoryRemoved),
            "transaction-removed" => Ok(Self::TransactionRemoved),
            "auto-categorization-added" => Ok(Self::AutoCategorizationAdded),
            _ => Err(Error::UnknownEventKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum EventData {
    TransactionAdded {
        account_id: String,
        transaction_id: String,
        amount: f64,
        date: NaiveDate,
        name: String,
    },
    TransactionCategorized {
        transaction_id: String,
        category: String,
    },
    CategoryRemoved {
        transaction_id: String,
        category: String,
    },
    TransactionRemoved {
        transaction_id: String,
    },
    /// Applies `category` to every transaction whose name equals `name`
    AutoCategorizationAdded {
        name: String,
        category: String,
    },
}

impl EventData {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::TransactionAdded { .. } => EventKind::TransactionAdded,
            Self::TransactionCategorized { .. } => EventKind::TransactionCategorized,
            Self::CategoryRemoved { .. } => EventKind::CategoryRemoved,
            Self::TransactionRemoved { .. } => EventKind::TransactionRemoved,
            Self::AutoCategorizationAdded { .. } => EventKind::AutoCategorizationAdded,
        }
    }

    /// The transaction this event targets, if it targets a single one
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::TransactionAdded { transaction_id, .. }
            | Self::TransactionCategorized { transaction_id, .. }
            | Self::CategoryRemoved { transaction_id, .. }
            | Self::TransactionRemoved { transaction_id } => Some(transaction_id),
            Self::AutoCategorizationAdded { .. } => None,
        }
    }
}

/// An immutable fact in a user's event stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: EventData,
}

impl Event {
    pub fn new(occurred_at: DateTime<Utc>, data: EventData) -> Self {
        Self { occurred_at, data }
    }

    pub fn kind(&self) -> EventKind {
        self.data.kind()
    }

    /// Encode to the flat string map stored by the event log
    pub fn to_record(&self) -> EventRecord {
        let mut record = EventRecord::new();
        record.insert(FIELD_KIND.into(), self.kind().as_str().into());
        record.insert(FIELD_OCCURRED_AT.into(), format_timestamp(&self.occurred_at));

        match &self.data {
            EventData::TransactionAdded {
                account_id,
                transaction_id,
                amount,
                date,
                name,
            } => {
                record.insert(FIELD_ACCOUNT_ID.into(), account_id.clone());
                record.insert(FIELD_TRANSACTION_ID.into(), transaction_id.clone());
                record.insert(FIELD_AMOUNT.into(), amount.to_string());
                record.insert(FIELD_DATE.into(), date.to_string());
                record.insert(FIELD_NAME.into(), name.clone());
            }
            EventData::TransactionCategorized {
                transaction_id,
                category,
            }
            | EventData::CategoryRemoved {
                transaction_id,
                category,
            } => {
                record.insert(FIELD_TRANSACTION_ID.into(), transaction_id.clone());
                record.insert(FIELD_CATEGORY.into(), category.clone());
            }
            EventData::TransactionRemoved { transaction_id } => {
                record.insert(FIELD_TRANSACTION_ID.into(), transaction_id.clone());
            }
            EventData::AutoCategorizationAdded { name, category } => {
                record.insert(FIELD_NAME.into(), name.clone());
                record.insert(FIELD_CATEGORY.into(), category.clone());
            }
        }

        record
    }

    /// Decode a stored record. Unknown fields are ignored; missing or
    /// malformed ones are errors.
    pub fn from_record(record: &EventRecord) -> Result<Self> {
        let fields = Fields::new("event", record);
        let kind: EventKind = fields.required(FIELD_KIND)?.parse()?;
        let fields = Fields::new(kind.as_str(), record);
        let occurred_at = parse_timestamp(fields.required(FIELD_OCCURRED_AT)?)?;

        let data = match kind {
            EventKind::TransactionAdded => EventData::TransactionAdded {
                account_id: fields.required(FIELD_ACCOUNT_ID)?.to_string(),
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
                amount: parse_amount(fields.required(FIELD_AMOUNT)?)?,
                date: parse_date(fields.required(FIELD_DATE)?)?,
                name: fields.required(FIELD_NAME)?.to_string(),
            },
            EventKind::TransactionCategorized => EventData::TransactionCategorized {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.to_string(),
            },
            EventKind::CategoryRemoved => EventData::CategoryRemoved {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.to_string(),
            },
            EventKind::TransactionRemoved => EventData::TransactionRemoved {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
            },
            EventKind::AutoCategorizationAdded => EventData::AutoCategorizationAdded {
                name: fields.required(FIELD_NAME)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.to_string(),
            },
        };

        Ok(Self { occurred_at, data })
    }
}

/// Field lookup over a flat string map, tagged with the kind for error messages
pub(crate) struct Fields<'a, M> {
    kind: &'a str,
    map: &'a M,
}

/// Maps that can be read as flat string fields
pub(crate) trait FieldMap {
    fn field(&self, key: &str) -> Option<&str>;
}

impl FieldMap for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl FieldMap for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<'a, M: FieldMap> Fields<'a, M> {
    pub(crate) fn new(kind: &'a str, map: &'a M) -> Self {
        Self { kind, map }
    }

    /// A present, non-blank field
    pub(crate) fn optional(&self, field: &'static str) -> Option<&'a str> {
        self.map.field(field).filter(|v| !v.trim().is_empty())
    }

    pub(crate) fn required(&self, field: &'static str) -> Result<&'a str> {
        self.optional(field).ok_or_else(|| Error::MissingField {
            kind: self.kind.to_string(),
            field,
        })
    }
}

/// UTC, ISO-8601, millisecond precision (e.g. `2024-03-05T10:15:00.123Z`)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::InvalidField {
            field: FIELD_OCCURRED_AT,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

pub(crate) fn parse_amount(value: &str) -> Result<f64> {
    let amount: f64 = value.trim().parse().map_err(|e: std::num::ParseFloatError| {
        Error::InvalidField {
            field: FIELD_AMOUNT,
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;
    if !amount.is_finite() {
        return Err(Error::InvalidField {
            field: FIELD_AMOUNT,
            value: value.to_string(),
            reason: "amount must be finite".into(),
        });
    }
    Ok(amount)
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidField {
        field: FIELD_DATE,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
