//! Spending reports over a personalized view
//!
//! All functions take an already filtered selection of transactions and use
//! the view's sign convention: negative amounts are expenses, positive are
//! income.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::filter::Period;
use crate::models::Transaction;

/// Label for transactions without any category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Net flow for one category (keyed by the transaction's first category)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    /// Signed sum; negative means net spending
    pub amount: f64,
    pub transaction_count: usize,
}

/// The 50/30/20 needs, wants, savings split
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetSplit {
    pub income: f64,
    /// Total spending as a positive number
    pub spending: f64,
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
    /// Shares of income, rounded to whole percent (0 when there is no income)
    pub needs_pct: f64,
    pub wants_pct: f64,
    pub savings_pct: f64,
}

/// Net signed flow for a calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyFlow {
    pub period: Period,
    pub net: f64,
    pub transaction_count: usize,
}

/// Group by first category, largest net spend first
pub fn breakdown_by_category<'a, I>(transactions: I) -> Vec<CategoryBreakdown>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (f64, usize)> = HashMap::new();

    for tx in transactions {
        let category = tx.primary_category().unwrap_or(UNCATEGORIZED);
        let entry = totals.entry(category.to_string()).or_insert_with(|| {
            order.push(category.to_string());
            (0.0, 0)
        });
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategoryBreakdown> = order
        .into_iter()
        .filter_map(|category| {
            totals.remove(&category).map(|(amount, count)| CategoryBreakdown {
                category,
                amount,
                transaction_count: count,
            })
        })
        .collect();
    // Stable: ties keep first-seen order
    breakdown.sort_by(|a, b| a.amount.total_cmp(&b.amount));
    breakdown
}

pub fn needs_wants_savings<'a, I>(transactions: I) -> BudgetSplit
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut split = BudgetSplit::default();
    let mut net = 0.0;

    for tx in transactions {
        net += tx.amount;
        if tx.is_expense() {
            split.spending -= tx.amount;
            if tx.is_need {
                split.needs -= tx.amount;
            }
        } else {
            split.income += tx.amount;
        }
    }

    split.wants = split.spending - split.needs;
    split.savings = f64::max(net, 0.0);
    split.needs_pct = percentage(split.needs, split.income);
    split.wants_pct = percentage(split.wants, split.income);
    split.savings_pct = percentage(split.savings, split.income);
    split
}

/// Net flow per month, oldest first
pub fn breakdown_by_month<'a, I>(transactions: I) -> Vec<MonthlyFlow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut months: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
    for tx in transactions {
        let entry = months.entry(Period::containing(tx.date)).or_default();
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    months
        .into_iter()
        .map(|(period, (net, count))| MonthlyFlow {
            period,
            net,
            transaction_count: count,
        })
        .collect()
}

fn percentage(amount: f64, total: f64) -> f64 {
    if total == 0.0 || amount == 0.0 {
        return 0.0;
    }
    (amount / total * 100.0).round()
}
