//! Personalized transaction listing

use std::path::Path;

use anyhow::{Context, Result};
use mander_core::{baseline, BaselineTransaction, EventStore, Period, Personalizer, ViewFilter};

use super::{format_amount, truncate};

/// Options for `mander view`
#[derive(Debug, Default)]
pub struct ViewOptions<'a> {
    pub baseline: Option<&'a Path>,
    pub period: Option<&'a str>,
    pub category: Option<&'a str>,
    pub limit: Option<usize>,
    pub newest_first: bool,
    pub json: bool,
}

/// Load the bank export, or nothing when no file was given
pub fn load_baseline(path: Option<&Path>) -> Result<Vec<BaselineTransaction>> {
    match path {
        Some(path) => baseline::load_file(path)
            .with_context(|| format!("Failed to load baseline {}", path.display())),
        None => Ok(Vec::new()),
    }
}

pub fn parse_period(period: Option<&str>) -> Result<Option<Period>> {
    period
        .map(|p| p.parse::<Period>().context("Invalid period"))
        .transpose()
}

pub fn cmd_view<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    options: &ViewOptions<'_>,
) -> Result<()> {
    let baseline = load_baseline(options.baseline)?;
    let period = parse_period(options.period)?;
    let view = service.view(user, baseline).context("Failed to build view")?;

    let filter = ViewFilter::new()
        .period(period)
        .category(options.category)
        .newest_first(options.newest_first)
        .limit(options.limit);
    let total = view.iter().filter(|tx| filter.matches(tx)).count();
    let shown = filter.apply(&view);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!("No transactions found.");
        if options.baseline.is_none() {
            println!("  Pass a bank export with --baseline transactions.csv");
        }
        return Ok(());
    }

    println!();
    match period {
        Some(period) => println!("📝 Transactions for {}", period),
        None => println!("📝 Transactions"),
    }
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &shown {
        let categories: Vec<&str> = tx.category.iter().map(|c| c.name.as_str()).collect();
        let marker = if tx.can_delete { "✎" } else { " " };
        let need = if tx.is_need { " (need)" } else { "" };

        println!(
            "   {}{:<8} {} │ {:>10} │ {:<32} │ {}{}",
            marker,
            truncate(&tx.id, 8),
            tx.date,
            format_amount(tx.amount),
            truncate(&tx.name, 32),
            categories.join(", "),
            need
        );
    }

    if shown.len() < total {
        println!();
        println!("   Showing {} of {} (use --limit 0 for all)", shown.len(), total);
    }

    Ok(())
}
