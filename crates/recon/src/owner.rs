//! Responsible-owner lookups.
//!
//! Two independent strategies, one per flavor. Both compare trimmed,
//! upper-cased text and answer "" when nothing matches.

use std::collections::HashMap;

use crate::config::OwnerTables;

fn fold(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Category → owner (Rimac).
#[derive(Debug, Clone, Default)]
pub struct CategoryOwners {
    by_category: HashMap<String, String>,
}

impl CategoryOwners {
    pub fn from_tables(tables: &OwnerTables) -> Self {
        let mut by_category = HashMap::new();
        for (owner, categories) in &tables.by_category {
            for category in categories {
                // First owner listed keeps the category
                by_category
                    .entry(fold(category))
                    .or_insert_with(|| owner.trim().to_string());
            }
        }
        Self { by_category }
    }

    pub fn resolve(&self, category: &str) -> String {
        self.by_category.get(&fold(category)).cloned().unwrap_or_default()
    }
}

/// (line of business, product) → owner (Pacífico).
#[derive(Debug, Clone, Default)]
pub struct LineProductOwners {
    by_pair: HashMap<(String, String), String>,
}

impl LineProductOwners {
    pub fn from_tables(tables: &OwnerTables) -> Self {
        let mut by_pair = HashMap::new();
        for entry in &tables.by_line_product {
            by_pair
                .entry((fold(&entry.line), fold(&entry.product)))
                .or_insert_with(|| entry.owner.trim().to_string());
        }
        Self { by_pair }
    }

    pub fn resolve(&self, line: &str, product: &str) -> String {
        self.by_pair
            .get(&(fold(line), fold(product)))
            .cloned()
            .unwrap_or_default()
    }
}
