use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::tag::{NewTag, UpdateTag, is_hex_color, is_slug};
use crate::forms::{first_invalid_field, sanitize_inline_text};

/// Maximum allowed length for a tag name and slug.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the tag form helpers.
pub type TagFormResult<T> = Result<T, TagFormError>;

/// Errors that can occur while processing tag forms.
#[derive(Debug, Error)]
pub enum TagFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("tag name cannot be empty")]
    EmptyName,
    #[error("color `{0}` is not a #RRGGBB value")]
    InvalidColor(String),
    #[error("slug `{0}` may only contain letters, digits, `-` and `_`")]
    InvalidSlug(String),
}

impl TagFormError {
    /// Payload field the error refers to.
    pub fn field(&self) -> String {
        match self {
            TagFormError::Validation(errors) => first_invalid_field(errors),
            TagFormError::EmptyName => "name".to_string(),
            TagFormError::InvalidColor(_) => "color".to_string(),
            TagFormError::InvalidSlug(_) => "slug".to_string(),
        }
    }
}

/// JSON payload used to create a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct AddTagForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    pub color: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub slug: String,
}

impl AddTagForm {
    /// Validates and sanitizes the payload into a domain `NewTag`.
    pub fn into_new_tag(self) -> TagFormResult<NewTag> {
        self.validate()?;

        let sanitized_name = sanitize_inline_text(&self.name);
        if sanitized_name.is_empty() {
            return Err(TagFormError::EmptyName);
        }

        let color = check_color(&self.color)?;
        let slug = check_slug(&self.slug)?;

        Ok(NewTag::new(sanitized_name, color, slug))
    }
}

/// JSON payload used to patch a tag; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditTagForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: Option<String>,
    pub color: Option<String>,
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub slug: Option<String>,
}

impl EditTagForm {
    /// Validates and sanitizes the payload into a domain `UpdateTag`.
    pub fn into_update_tag(self, updated_at: NaiveDateTime) -> TagFormResult<UpdateTag> {
        self.validate()?;

        let name = match self.name {
            Some(name) => {
                let sanitized = sanitize_inline_text(&name);
                if sanitized.is_empty() {
                    return Err(TagFormError::EmptyName);
                }
                Some(sanitized)
            }
            None => None,
        };

        let color = self
            .color
            .as_deref()
            .map(check_color)
            .transpose()?
            .map(|color| color.to_lowercase());
        let slug = self.slug.as_deref().map(check_slug).transpose()?;

        Ok(UpdateTag {
            name,
            color,
            slug,
            updated_at,
        })
    }
}

fn check_color(input: &str) -> TagFormResult<String> {
    let trimmed = input.trim();
    if !is_hex_color(trimmed) {
        return Err(TagFormError::InvalidColor(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

fn check_slug(input: &str) -> TagFormResult<String> {
    let trimmed = input.trim();
    if !is_slug(trimmed) {
        return Err(TagFormError::InvalidSlug(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}
