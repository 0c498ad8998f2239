//! Shopping list consolidation
//!
//! Turns the ingredient line items of every recipe in a user's cart into
//! one entry per (ingredient name, measurement unit) with summed amounts.

use std::collections::BTreeMap;
use std::fmt;

/// One ingredient line contributed by a recipe in the cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl CartLine {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

/// A consolidated shopping list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} {}", self.name, self.total_amount, self.measurement_unit)
    }
}

/// Consolidated shopping list, ordered by ingredient name then unit
///
/// Ordering compares strings by code point, so it does not depend on the
/// database collation or the process locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Group lines by (name, unit) and sum their amounts
    pub fn consolidate<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = CartLine>,
    {
        let mut groups: BTreeMap<(String, String), i64> = BTreeMap::new();
        for line in lines {
            *groups.entry((line.name, line.measurement_unit)).or_insert(0) += line.amount;
        }

        let items = groups
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
                name,
                measurement_unit,
                total_amount,
            })
            .collect();

        Self { items }
    }

    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Plain-text report, one newline-terminated `name - amount unit` line per entry
    pub fn render_text(&self) -> String {
        self.items.iter().map(|item| format!("{}\n", item)).collect()
    }
}

impl IntoIterator for ShoppingList {
    type Item = ShoppingListItem;
    type IntoIter = std::vec::IntoIter<ShoppingListItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
