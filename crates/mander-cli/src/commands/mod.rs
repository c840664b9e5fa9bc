//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `transactions` - Commands that append events (add, categorize, remove, ...)
//! - `view` - Personalized transaction listing
//! - `reports` - Category, 50/30/20 and monthly breakdowns

pub mod core;
pub mod reports;
pub mod transactions;
pub mod view;

// Re-export command functions for main.rs
pub use core::*;
pub use reports::*;
pub use transactions::*;
pub use view::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Signed amount, red for expenses and green for income
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs())
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount)
    }
}
