use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Per-user recipe collections backed by membership records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Favorite,
    ShoppingCart,
}

impl MembershipKind {
    /// Value stored in the `kind` column.
    pub fn as_str(self) -> &'static str {
        match self {
            MembershipKind::Favorite => "favorite",
            MembershipKind::ShoppingCart => "shopping_cart",
        }
    }

    /// Parses a stored `kind` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "favorite" => Some(MembershipKind::Favorite),
            "shopping_cart" => Some(MembershipKind::ShoppingCart),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recipe placed into one of the user's collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub id: i32,
    pub user_id: i32,
    pub recipe_id: i32,
    pub kind: MembershipKind,
    pub created_at: NaiveDateTime,
}

/// Payload required to add a recipe to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: i32,
    pub recipe_id: i32,
    pub kind: MembershipKind,
}

impl NewMembership {
    pub fn new(user_id: i32, recipe_id: i32, kind: MembershipKind) -> Self {
        Self {
            user_id,
            recipe_id,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_storage_values() {
        for kind in [MembershipKind::Favorite, MembershipKind::ShoppingCart] {
            assert_eq!(MembershipKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MembershipKind::parse("wishlist"), None);
    }
}
