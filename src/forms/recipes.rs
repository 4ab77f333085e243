use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::recipe::{IngredientAmount, NewRecipe, UpdateRecipe};
use crate::forms::{first_invalid_field, sanitize_inline_text, sanitize_multiline_text};

/// Maximum allowed length for a recipe name.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the recipe payload helpers.
pub type RecipeFormResult<T> = Result<T, RecipeFormError>;

/// Errors raised while validating a recipe payload.
#[derive(Debug, Error)]
pub enum RecipeFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("recipe body must be a JSON object")]
    NotAnObject,
    #[error("this field is required")]
    MissingField(&'static str),
    #[error("{source}")]
    InvalidType {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("recipe name cannot be empty")]
    EmptyName,
    #[error("recipe text cannot be empty")]
    EmptyText,
    #[error("cooking time must be at least 1 minute")]
    InvalidCookingTime,
    #[error("at least one tag is required")]
    MissingTags,
    #[error("tag {0} is listed more than once")]
    DuplicateTag(i32),
    #[error("at least one ingredient is required")]
    MissingIngredients,
    #[error("ingredient {0} is listed more than once")]
    DuplicateIngredient(i32),
    #[error("amount of ingredient {0} must be a positive integer")]
    InvalidAmount(i32),
}

impl RecipeFormError {
    /// Payload field the error refers to.
    pub fn field(&self) -> String {
        match self {
            RecipeFormError::Validation(errors) => first_invalid_field(errors),
            RecipeFormError::NotAnObject => "non_field_errors".to_string(),
            RecipeFormError::MissingField(field) | RecipeFormError::InvalidType { field, .. } => {
                field.to_string()
            }
            RecipeFormError::EmptyName => "name".to_string(),
            RecipeFormError::EmptyText => "text".to_string(),
            RecipeFormError::InvalidCookingTime => "cooking_time".to_string(),
            RecipeFormError::MissingTags | RecipeFormError::DuplicateTag(_) => "tags".to_string(),
            RecipeFormError::MissingIngredients | RecipeFormError::DuplicateIngredient(_) => {
                "ingredients".to_string()
            }
            RecipeFormError::InvalidAmount(_) => "amount".to_string(),
        }
    }
}

/// Ingredient reference submitted with a recipe.
#[derive(Debug, Clone, Copy)]
pub struct IngredientAmountPayload {
    /// Identifier of the reference ingredient.
    pub id: i32,
    pub amount: i32,
}

/// JSON body accepted when creating or replacing a recipe.
#[derive(Debug, Clone, Validate)]
pub struct RecipePayload {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmountPayload>,
}

/// Payload fields after validation, shared by creation and update.
struct CleanRecipe {
    name: String,
    text: String,
    image: Option<String>,
    cooking_time: i32,
    tag_ids: Vec<i32>,
    ingredients: Vec<IngredientAmount>,
}

impl RecipePayload {
    /// Decodes a JSON body one field at a time so that a wrongly typed value
    /// is reported against the field that holds it.
    ///
    /// `tags`, `ingredients` and `image` may be absent or `null`. The entries
    /// of `ingredients` report a bad `id` under `ingredients` and a bad
    /// `amount` under `amount`.
    pub fn from_json(body: Value) -> RecipeFormResult<Self> {
        let Value::Object(mut fields) = body else {
            return Err(RecipeFormError::NotAnObject);
        };

        let name = required(&mut fields, "name")?;
        let text = required(&mut fields, "text")?;
        let image = optional(&mut fields, "image")?;
        let cooking_time = required(&mut fields, "cooking_time")?;
        let tags = optional(&mut fields, "tags")?.unwrap_or_default();
        let entries: Vec<Value> = optional(&mut fields, "ingredients")?.unwrap_or_default();

        let ingredients = entries
            .into_iter()
            .map(ingredient_entry)
            .collect::<RecipeFormResult<Vec<_>>>()?;

        Ok(Self {
            name,
            text,
            image,
            cooking_time,
            tags,
            ingredients,
        })
    }

    /// Validates the payload into a recipe owned by `author_id`.
    pub fn into_new_recipe(self, author_id: i32) -> RecipeFormResult<NewRecipe> {
        let clean = self.clean()?;

        Ok(NewRecipe {
            author_id,
            name: clean.name,
            text: clean.text,
            image: clean.image,
            cooking_time: clean.cooking_time,
            tag_ids: clean.tag_ids,
            ingredients: clean.ingredients,
        })
    }

    /// Validates the payload into a full replacement of an existing recipe.
    pub fn into_update_recipe(self, updated_at: NaiveDateTime) -> RecipeFormResult<UpdateRecipe> {
        let clean = self.clean()?;

        Ok(UpdateRecipe {
            name: clean.name,
            text: clean.text,
            image: clean.image,
            cooking_time: clean.cooking_time,
            tag_ids: clean.tag_ids,
            ingredients: clean.ingredients,
            updated_at,
        })
    }

    fn clean(self) -> RecipeFormResult<CleanRecipe> {
        if self.cooking_time < 1 {
            return Err(RecipeFormError::InvalidCookingTime);
        }

        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(RecipeFormError::EmptyName);
        }

        let text = sanitize_multiline_text(&self.text);
        if text.is_empty() {
            return Err(RecipeFormError::EmptyText);
        }

        let image = self
            .image
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty());

        let tag_ids = distinct_tags(&self.tags)?;
        let ingredients = distinct_ingredients(&self.ingredients)?;

        Ok(CleanRecipe {
            name,
            text,
            image,
            cooking_time: self.cooking_time,
            tag_ids,
            ingredients,
        })
    }
}

fn required<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> RecipeFormResult<T> {
    optional(fields, field)?.ok_or(RecipeFormError::MissingField(field))
}

fn optional<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    field: &'static str,
) -> RecipeFormResult<Option<T>> {
    match fields.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| RecipeFormError::InvalidType { field, source }),
    }
}

fn ingredient_entry(entry: Value) -> RecipeFormResult<IngredientAmountPayload> {
    let Value::Object(mut entry) = entry else {
        return Err(RecipeFormError::InvalidType {
            field: "ingredients",
            source: serde::de::Error::custom(
                "each ingredient must be an object with id and amount",
            ),
        });
    };

    let id = required(&mut entry, "id").map_err(|err| match err {
        RecipeFormError::MissingField(_) => RecipeFormError::MissingField("ingredients"),
        RecipeFormError::InvalidType { source, .. } => RecipeFormError::InvalidType {
            field: "ingredients",
            source,
        },
        other => other,
    })?;
    let amount = required(&mut entry, "amount")?;

    Ok(IngredientAmountPayload { id, amount })
}

fn distinct_tags(tags: &[i32]) -> RecipeFormResult<Vec<i32>> {
    if tags.is_empty() {
        return Err(RecipeFormError::MissingTags);
    }

    let mut seen = HashSet::with_capacity(tags.len());
    for &tag_id in tags {
        if !seen.insert(tag_id) {
            return Err(RecipeFormError::DuplicateTag(tag_id));
        }
    }

    Ok(tags.to_vec())
}

fn distinct_ingredients(
    ingredients: &[IngredientAmountPayload],
) -> RecipeFormResult<Vec<IngredientAmount>> {
    if ingredients.is_empty() {
        return Err(RecipeFormError::MissingIngredients);
    }

    let mut seen = HashSet::with_capacity(ingredients.len());
    let mut result = Vec::with_capacity(ingredients.len());
    for entry in ingredients {
        if !seen.insert(entry.id) {
            return Err(RecipeFormError::DuplicateIngredient(entry.id));
        }
        if entry.amount < 1 {
            return Err(RecipeFormError::InvalidAmount(entry.id));
        }
        result.push(IngredientAmount::new(entry.id, entry.amount));
    }

    Ok(result)
}
