//! Domain models for Mander

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Category names counted as essential spending ("needs") in the 50/30/20 split
///
/// Membership is fixed; users cannot mark their own categories as needs.
pub const NEEDS_CATEGORIES: &[&str] = &[
    "Housing",
    "Rent",
    "Mortgage",
    "Utilities",
    "Electricity",
    "Water",
    "Gas",
    "Internet",
    "Phone",
    "Groceries",
    "Food",
    "Transportation",
    "Insurance",
    "Healthcare",
    "Medical",
    "Childcare",
    "Education",
    "Loan Payments",
    "Taxes",
];

/// Whether a category name is on the needs list
///
/// Matching is exact on the trimmed name, like every other category comparison.
pub fn is_need_category(name: &str) -> bool {
    let name = name.trim();
    NEEDS_CATEGORIES.iter().any(|need| *need == name)
}

/// A category attached to a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Derived from [`NEEDS_CATEGORIES`]
    pub is_need: bool,
    /// Added by an auto-categorization rule rather than by hand
    pub is_auto_categorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    /// Create a manually assigned category. The name is trimmed.
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            is_need: is_need_category(&name),
            name,
            is_auto_categorized: false,
            description: None,
        }
    }

    /// Create a category assigned by an auto-categorization rule
    pub fn auto(name: &str) -> Self {
        Self {
            is_auto_categorized: true,
            ..Self::new(name)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A transaction as it appears in the personalization view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Merchant name as reported by the bank (or typed by the user)
    pub name: String,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub date: NaiveDate,
    pub category: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Only manually added transactions can be deleted
    pub can_delete: bool,
    /// True when any attached category is a need
    pub is_need: bool,
}

impl Transaction {
    /// Seed a view entry from an externally sourced transaction
    pub fn from_baseline(baseline: BaselineTransaction) -> Self {
        let mut tx = Self {
            id: baseline.id,
            name: baseline.name,
            amount: baseline.amount,
            date: baseline.date,
            category: Vec::new(),
            logo: baseline.logo,
            can_delete: false,
            is_need: false,
        };
        for name in &baseline.category {
            tx.add_category(Category::new(name));
        }
        tx.refresh_need();
        tx
    }

    /// A manually entered transaction; starts uncategorized
    pub fn manual(id: &str, name: &str, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            date,
            category: Vec::new(),
            logo: None,
            can_delete: true,
            is_need: false,
        }
    }

    /// Append a category unless one with the same name is already attached.
    /// The first occurrence wins, so a manual category is never replaced by
    /// an automatic one of the same name.
    pub fn add_category(&mut self, category: Category) {
        if category.name.is_empty() || self.has_category(&category.name) {
            return;
        }
        self.category.push(category);
        self.refresh_need();
    }

    /// Remove every category with the given name
    pub fn remove_category(&mut self, name: &str) {
        let name = name.trim();
        self.category.retain(|c| c.name != name);
        self.refresh_need();
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.category.iter().any(|c| c.name == name)
    }

    /// Name of the first category, used as the primary grouping key
    pub fn primary_category(&self) -> Option<&str> {
        self.category.first().map(|c| c.name.as_str())
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    fn refresh_need(&mut self) {
        self.is_need = self.category.iter().any(|c| c.is_need);
    }
}

/// A transaction record from the external financial-data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineTransaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    /// Categories supplied by the provider, if any. `null` reads as none.
    #[serde(default, deserialize_with = "deserialize_nullable_categories")]
    pub category: Vec<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

fn deserialize_nullable_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl BaselineTransaction {
    pub fn new(id: &str, name: &str, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            date,
            category: Vec::new(),
            logo: None,
        }
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.category = categories.iter().map(|c| c.to_string()).collect();
        self
    }
}
