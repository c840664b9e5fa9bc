//! Mander CLI - Event-sourced transaction personalization
//!
//! Usage:
//!   mander init                          Initialize database
//!   mander categorize t1 Food            Record a categorization
//!   mander view --baseline feed.csv      Show the personalized view
//!   mander report --period 2024-03       Spending breakdowns

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use mander_core::Config;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.storage.path.clone().into());
    let no_encrypt = cli.no_encrypt || !config.storage.encrypt;
    let user = cli
        .user
        .clone()
        .unwrap_or_else(|| config.user.default_id.clone());
    debug!(
        db = %db_path.display(),
        user = %user,
        encrypt = !no_encrypt,
        "Resolved settings"
    );

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path, no_encrypt),
        Commands::Status => {
            let db = commands::open_db(&db_path, no_encrypt)?;
            commands::cmd_status(&db)
        }
        Commands::Add {
            name,
            amount,
            date,
            account,
        } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_add(&service, &user, &account, &name, amount, date)
        }
        Commands::Categorize {
            transaction_id,
            category,
        } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_categorize(&service, &user, &transaction_id, &category)
        }
        Commands::Uncategorize {
            transaction_id,
            category,
        } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_uncategorize(&service, &user, &transaction_id, &category)
        }
        Commands::Remove { transaction_id } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_remove(&service, &user, &transaction_id)
        }
        Commands::AutoCategorize { name, category } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_auto_categorize(&service, &user, &name, &category)
        }
        Commands::Submit { fields } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_submit(&service, &user, fields)
        }
        Commands::Events { json } => {
            let db = commands::open_db(&db_path, no_encrypt)?;
            commands::cmd_events(&db, &user, json)
        }
        Commands::View {
            baseline,
            period,
            category,
            limit,
            json,
        } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            let options = commands::ViewOptions {
                baseline: baseline.as_deref(),
                period: period.as_deref(),
                category: category.as_deref(),
                limit: match limit {
                    Some(0) => None,
                    Some(n) => Some(n),
                    None => config.view.default_limit,
                },
                newest_first: config.view.newest_first,
                json,
            };
            commands::cmd_view(&service, &user, &options)
        }
        Commands::Report {
            baseline,
            period,
            json,
        } => {
            let service = commands::open_service(&db_path, no_encrypt)?;
            commands::cmd_report(
                &service,
                &user,
                baseline.as_deref(),
                period.as_deref(),
                json,
            )
        }
    }
}
