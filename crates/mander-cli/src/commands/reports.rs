//! Report generation commands

use std::path::Path;

use anyhow::{Context, Result};
use mander_core::reports::{breakdown_by_category, breakdown_by_month, needs_wants_savings};
use mander_core::{EventStore, Period, Personalizer, ViewFilter};
use serde_json::json;

use super::{format_amount, load_baseline, parse_period};

pub fn cmd_report<S: EventStore>(
    service: &Personalizer<S>,
    user: &str,
    baseline: Option<&Path>,
    period: Option<&str>,
    json: bool,
) -> Result<()> {
    let baseline = load_baseline(baseline)?;
    let period = parse_period(period)?.unwrap_or_else(Period::current);
    let view = service.view(user, baseline).context("Failed to build view")?;

    let selected = ViewFilter::new().period(Some(period)).apply(&view);
    let categories = breakdown_by_category(selected.iter().copied());
    let split = needs_wants_savings(selected.iter().copied());
    // Month-over-month history covers the whole view, not just the period
    let months = breakdown_by_month(&view);

    if json {
        let report = json!({
            "period": period,
            "categories": categories,
            "budget": split,
            "months": months,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending Report: {}", period);
    println!("   ─────────────────────────────────────────");

    if selected.is_empty() {
        println!("   No transactions in this period.");
    } else {
        for row in &categories {
            println!(
                "   {:<28} {:>12}  ({} txn)",
                row.category,
                format_amount(row.amount),
                row.transaction_count
            );
        }
    }

    println!();
    println!("💰 50/30/20 Budget");
    println!("   ─────────────────────────────────────────");
    println!("   Income      ${:>10.2}", split.income);
    println!("   Needs       ${:>10.2}  {:>3}%  (target 50%)", split.needs, split.needs_pct);
    println!("   Wants       ${:>10.2}  {:>3}%  (target 30%)", split.wants, split.wants_pct);
    println!("   Savings     ${:>10.2}  {:>3}%  (target 20%)", split.savings, split.savings_pct);

    if !months.is_empty() {
        let net: f64 = months.iter().map(|m| m.net).sum();

        println!();
        println!("📈 Monthly Net Flow");
        println!("   ─────────────────────────────────────────");
        for month in &months {
            println!("   {}   {:>12}", month.period, format_amount(month.net));
        }
        println!("   Total     {:>12}", format_amount(net));
    }

    Ok(())
}
