use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One ingredient line of a recipe placed into a shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartIngredient {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl CartIngredient {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>, amount: i32) -> Self {
        Self {
            name: name.into(),
            measurement_unit: measurement_unit.into(),
            amount,
        }
    }
}

/// Total amount of one ingredient across every recipe in the cart.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) — {}",
            self.name, self.measurement_unit, self.total_amount
        )
    }
}

/// Aggregated shopping list of a single user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShoppingList {
    /// Display name of the cart owner.
    pub owner: String,
    pub generated_on: NaiveDate,
    /// Items ordered by ingredient name, then unit.
    pub items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    /// Sums the amounts of `entries` per `(name, measurement_unit)`.
    ///
    /// Grouping goes through an ordered map, so the items come out sorted by
    /// name with a byte-wise comparison and the result does not depend on the
    /// order of `entries`.
    pub fn aggregate<I>(owner: impl Into<String>, generated_on: NaiveDate, entries: I) -> Self
    where
        I: IntoIterator<Item = CartIngredient>,
    {
        let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
        for entry in entries {
            *totals
                .entry((entry.name, entry.measurement_unit))
                .or_insert(0) += i64::from(entry.amount);
        }

        let items = totals
            .into_iter()
            .map(|((name, measurement_unit), total_amount)| ShoppingListItem {
                name,
                measurement_unit,
                total_amount,
            })
            .collect();

        Self {
            owner: owner.into(),
            generated_on,
            items,
        }
    }

    /// Attachment name offered to the client, restricted to ASCII.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .owner
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let stem = stem.trim_matches('_');
        if stem.is_empty() {
            "shopping_list.txt".to_string()
        } else {
            format!("{stem}_shopping_list.txt")
        }
    }

    /// Plain-text document with header, one line per item and footer.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shopping list for {}", self.owner)?;
        writeln!(f)?;
        writeln!(f, "Date: {}", self.generated_on.format("%Y-%m-%d"))?;
        writeln!(f)?;
        for item in &self.items {
            writeln!(f, "{item}")?;
        }
        if !self.items.is_empty() {
            writeln!(f)?;
        }
        write!(f, "Foodgram ({})", self.generated_on.year())
    }
}
