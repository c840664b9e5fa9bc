//! Commands that record events, plus the raw event listing

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use mander_core::{db::Database, Command, Event, EventData, EventStore, Personalizer};

use super::{format_amount, truncate};

fn print_recorded(event: &Event) {
    match &event.data {
        EventData::TransactionAdded {
            transaction_id,
            amount,
            date,
            name,
            ..
        } => {
            println!("✅ Added transaction {}:", transaction_id);
            println!("   {} │ {:>10} │ {}", date, format_amount(*amount), truncate(name, 40));
        }
        EventData::TransactionCategorized {
            transaction_id,
            category,
        } => println!("✅ Categorized {} as '{}'", transaction_id, category),
        EventData::CategoryRemoved {
            transaction_id,
            category,
        } => println!("✅ Removed '{}' from {}", category, transaction_id),
        EventData::TransactionRemoved { transaction_id } => {
            println!("✅ Removed transaction {}", transaction_id)
        }
        EventData::AutoCategorizationAdded { name, category } => {
            println!("✅ Transactions named '{}' will be categorized as '{}'", name, category)
        }
    }
}

fn record<S: EventStore>(service: &Personalizer<S>, user: &str, command: Command) -> Result<Event> {
    let kind = command.kind();
    let event = service
        .submit(user, command)
        .with_context(|| format!("Failed to record {}", kind))?;
    print_recorded(&event);
    Ok(event)
}

pub fn cmd_add<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    account: &str,
    name: &str,
    amount: f64,
    date: Option<NaiveDate>,
) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("Transaction name cannot be empty");
    }
    if !amount.is_finite() {
        anyhow::bail!("Amount must be a finite number");
    }

    let command = Command::AddTransaction {
        account_id: account.to_string(),
        transaction_id: None,
        amount,
        date: date.unwrap_or_else(|| Local::now().date_naive()),
        name: name.trim().to_string(),
    };
    record(service, user, command)?;
    Ok(())
}

pub fn cmd_categorize<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    transaction_id: &str,
    category: &str,
) -> Result<()> {
    let category = non_empty_category(category)?;
    record(
        service,
        user,
        Command::CategorizeTransaction {
            transaction_id: transaction_id.to_string(),
            category,
        },
    )?;
    Ok(())
}

pub fn cmd_uncategorize<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    transaction_id: &str,
    category: &str,
) -> Result<()> {
    let category = non_empty_category(category)?;
    record(
        service,
        user,
        Command::RemoveCategory {
            transaction_id: transaction_id.to_string(),
            category,
        },
    )?;
    Ok(())
}

pub fn cmd_remove<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    transaction_id: &str,
) -> Result<()> {
    record(
        service,
        user,
        Command::RemoveTransaction {
            transaction_id: transaction_id.to_string(),
        },
    )?;
    Ok(())
}

pub fn cmd_auto_categorize<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    name: &str,
    category: &str,
) -> Result<()> {
    let category = non_empty_category(category)?;
    record(
        service,
        user,
        Command::AddAutoCategorization {
            name: name.to_string(),
            category,
        },
    )?;
    Ok(())
}

/// Decode a raw form payload and record it
pub fn cmd_submit<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    fields: Vec<(String, String)>,
) -> Result<()> {
    let command = Command::from_form(fields).context("Invalid command payload")?;
    record(service, user, command)?;
    Ok(())
}

pub fn cmd_events(db: &Database, user: &str, json: bool) -> Result<()> {
    let events = db.list_events(user)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events recorded for '{}'. Record one with:", user);
        println!("  mander categorize <transaction-id> <category>");
        return Ok(());
    }

    println!();
    println!("📜 Event Stream for '{}' ({} events)", user, events.len());
    println!("   ─────────────────────────────────────────────────────────────");

    for stored in events {
        let event = &stored.event;
        let detail = match &event.data {
            EventData::TransactionAdded {
                transaction_id,
                amount,
                date,
                name,
                ..
            } => format!(
                "{} {} {} {}",
                transaction_id,
                date,
                format_amount(*amount),
                truncate(name, 30)
            ),
            EventData::TransactionCategorized {
                transaction_id,
                category,
            }
            | EventData::CategoryRemoved {
                transaction_id,
                category,
            } => format!("{} → {}", transaction_id, category),
            EventData::TransactionRemoved { transaction_id } => transaction_id.clone(),
            EventData::AutoCategorizationAdded { name, category } => {
                format!("'{}' → {}", truncate(name, 30), category)
            }
        };

        println!(
            "   [{:>4}] {} │ {:<25} │ {}",
            stored.seq,
            event.occurred_at.format("%Y-%m-%d %H:%M:%S"),
            event.kind().as_str(),
            detail
        );
    }

    Ok(())
}

fn non_empty_category(category: &str) -> Result<String> {
    let category = category.trim();
    if category.is_empty() {
        anyhow::bail!("Category cannot be empty");
    }
    Ok(category.to_string())
}
