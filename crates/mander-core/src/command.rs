//! User commands and the command processor
//!
//! A [`Command`] is a transient request to change a user's data. The
//! processor turns each accepted command into exactly one [`Event`] stamped
//! with the time it occurred; persisting that event is the caller's job.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::event::{
    parse_amount, parse_date, Event, EventData, Fields, FIELD_ACCOUNT_ID, FIELD_AMOUNT,
    FIELD_CATEGORY, FIELD_DATE, FIELD_KIND, FIELD_NAME, FIELD_TRANSACTION_ID,
};

/// Form field accepted as an alias of `accountId` (the add form posts `account`)
const FIELD_ACCOUNT_ALIAS: &str = "account";

/// Command kinds, named in the imperative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    AddTransaction,
    CategorizeTransaction,
    RemoveCategory,
    RemoveTransaction,
    AddAutoCategorization,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddTransaction => "add-transaction",
            Self::CategorizeTransaction => "categorize-transaction",
            Self::RemoveCategory => "remove-category",
            Self::RemoveTransaction => "remove-transaction",
            Self::AddAutoCategorization => "add-auto-categorization",
        }
    }
}

impl std::str::FromStr for CommandKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "add-transaction" => Ok(Self::AddTransaction),
            "categorize-transaction" => Ok(Self::CategorizeTransaction),
            "remove-category" => Ok(Self::RemoveCategory),
            "remove-transaction" => Ok(Self::RemoveTransaction),
            "add-auto-categorization" => Ok(Self::AddAutoCategorization),
            _ => Err(Error::UnknownCommandKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to change state; never persisted directly
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    AddTransaction {
        account_id: String,
        /// Assigned from the per-user counter before processing
        transaction_id: Option<String>,
        amount: f64,
        date: NaiveDate,
        name: String,
    },
    CategorizeTransaction {
        transaction_id: String,
        category: String,
    },
    RemoveCategory {
        transaction_id: String,
        category: String,
    },
    RemoveTransaction {
        transaction_id: String,
    },
    AddAutoCategorization {
        name: String,
        category: String,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::AddTransaction { .. } => CommandKind::AddTransaction,
            Self::CategorizeTransaction { .. } => CommandKind::CategorizeTransaction,
            Self::RemoveCategory { .. } => CommandKind::RemoveCategory,
            Self::RemoveTransaction { .. } => CommandKind::RemoveTransaction,
            Self::AddAutoCategorization { .. } => CommandKind::AddAutoCategorization,
        }
    }

    /// Decode a flat key-value payload, as submitted by an HTML form.
    ///
    /// `kind` selects the variant; anything unrecognized fails with
    /// [`Error::UnknownCommandKind`]. A blank `transactionId` on an
    /// `add-transaction` payload counts as absent.
    pub fn from_form<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let kind_str = map
            .get(FIELD_KIND)
            .map(|k| k.trim().to_string())
            .unwrap_or_default();
        if kind_str.is_empty() {
            return Err(Error::MissingField {
                kind: "command".into(),
                field: FIELD_KIND,
            });
        }
        let kind: CommandKind = kind_str.parse()?;
        let fields = Fields::new(kind.as_str(), &map);

        let command = match kind {
            CommandKind::AddTransaction => {
                let account_id = match fields.optional(FIELD_ACCOUNT_ID) {
                    Some(id) => id,
                    None => fields.required(FIELD_ACCOUNT_ALIAS)?,
                };
                Self::AddTransaction {
                    account_id: account_id.to_string(),
                    transaction_id: fields.optional(FIELD_TRANSACTION_ID).map(str::to_string),
                    amount: parse_amount(fields.required(FIELD_AMOUNT)?)?,
                    date: parse_date(fields.required(FIELD_DATE)?)?,
                    name: fields.required(FIELD_NAME)?.to_string(),
                }
            }
            CommandKind::CategorizeTransaction => Self::CategorizeTransaction {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.trim().to_string(),
            },
            CommandKind::RemoveCategory => Self::RemoveCategory {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.trim().to_string(),
            },
            CommandKind::RemoveTransaction => Self::RemoveTransaction {
                transaction_id: fields.required(FIELD_TRANSACTION_ID)?.to_string(),
            },
            CommandKind::AddAutoCategorization => Self::AddAutoCategorization {
                name: fields.required(FIELD_NAME)?.to_string(),
                category: fields.required(FIELD_CATEGORY)?.trim().to_string(),
            },
        };

        Ok(command)
    }

    /// Attach a freshly allocated id to an `add-transaction` command.
    /// Other kinds, and commands that already carry an id, are unchanged.
    pub fn with_transaction_id(self, id: impl Into<String>) -> Self {
        match self {
            Self::AddTransaction {
                account_id,
                transaction_id: None,
                amount,
                date,
                name,
            } => Self::AddTransaction {
                account_id,
                transaction_id: Some(id.into()),
                amount,
                date,
                name,
            },
            other => other,
        }
    }

    /// Whether this command still needs a transaction id allocated
    pub fn needs_transaction_id(&self) -> bool {
        matches!(
            self,
            Self::AddTransaction {
                transaction_id: None,
                ..
            }
        )
    }
}

/// Translate a command into its event, stamped with the current time
pub fn handle_command(command: Command) -> Result<Event> {
    handle_command_at(command, Utc::now())
}

/// Translate a command into its event with an explicit occurrence time.
/// The timestamp is truncated to millisecond precision.
pub fn handle_command_at(command: Command, occurred_at: DateTime<Utc>) -> Result<Event> {
    let occurred_at = truncate_to_millis(occurred_at);

    let data = match command {
        Command::AddTransaction {
            account_id,
            transaction_id,
            amount,
            date,
            name,
        } => {
            let transaction_id = transaction_id.ok_or_else(|| Error::MissingField {
                kind: CommandKind::AddTransaction.as_str().into(),
                field: FIELD_TRANSACTION_ID,
            })?;
            EventData::TransactionAdded {
                account_id,
                transaction_id,
                amount,
                date,
                name,
            }
        }
        Command::CategorizeTransaction {
            transaction_id,
            category,
        } => EventData::TransactionCategorized {
            transaction_id,
            category,
        },
        Command::RemoveCategory {
            transaction_id,
            category,
        } => EventData::CategoryRemoved {
            transaction_id,
            category,
        },
        Command::RemoveTransaction { transaction_id } => {
            EventData::TransactionRemoved { transaction_id }
        }
        Command::AddAutoCategorization { name, category } => {
            EventData::AutoCategorizationAdded { name, category }
        }
    };

    Ok(Event::new(occurred_at, data))
}

fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}
