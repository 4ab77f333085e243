use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Domain representation of a tag that can be attached to multiple recipes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier of the tag.
    pub id: i32,
    /// Human-readable name of the tag.
    pub name: String,
    /// Display color in `#RRGGBB` notation.
    pub color: String,
    /// Unique URL-friendly identifier used by recipe filters.
    pub slug: String,
    /// Timestamp for when the tag record was created.
    #[serde(skip_serializing)]
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the tag record.
    #[serde(skip_serializing)]
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    /// Construct a new tag payload. Colors are stored lowercase.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            color: color.into().trim().to_lowercase(),
            slug: slug.into().trim().to_string(),
        }
    }
}

/// Patch data applied when updating an existing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
    pub slug: Option<String>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list tags.
#[derive(Debug, Clone, Default)]
pub struct TagListQuery {
    /// Restrict the results to the given identifiers.
    pub ids: Option<Vec<i32>>,
}

impl TagListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: &[i32]) -> Self {
        self.ids = Some(ids.to_vec());
        self
    }
}

/// Returns `true` when `value` is a `#` followed by exactly six hex digits.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => digits.len() == 6 && digits.chars().all(|ch| ch.is_ascii_hexdigit()),
        None => false,
    }
}

/// Returns `true` when `value` is a non-empty slug made of ASCII letters, digits, `-` and `_`.
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
