use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::tag::Tag;
use crate::domain::user::User;

/// Ingredient entry of a recipe together with the amount required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// Identifier of the referenced ingredient.
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    /// Positive amount expressed in `measurement_unit`.
    pub amount: i32,
}

/// Domain representation of a recipe with its author and associations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Unique identifier of the recipe.
    pub id: i32,
    /// User that created the recipe.
    pub author: User,
    /// Title of the recipe.
    pub name: String,
    /// Cooking instructions.
    pub text: String,
    /// Optional reference to the recipe picture.
    pub image: Option<String>,
    /// Cooking time in minutes, at least one.
    pub cooking_time: i32,
    /// Tags attached to the recipe ordered by name.
    pub tags: Vec<Tag>,
    /// Ingredients in the order they were submitted.
    pub ingredients: Vec<RecipeIngredient>,
    /// Timestamp for when the recipe record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the recipe record.
    pub updated_at: NaiveDateTime,
}

/// Reference to an ingredient with the amount used by a recipe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

impl IngredientAmount {
    pub fn new(ingredient_id: i32, amount: i32) -> Self {
        Self {
            ingredient_id,
            amount,
        }
    }
}

/// Validated payload required to insert a recipe with its associations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub author_id: i32,
    pub name: String,
    pub text: String,
    pub image: Option<String>,
    pub cooking_time: i32,
    /// Distinct identifiers of the attached tags.
    pub tag_ids: Vec<i32>,
    /// Ingredient entries with distinct ingredient identifiers.
    pub ingredients: Vec<IngredientAmount>,
}

/// Validated replacement applied to an existing recipe.
///
/// Tags and ingredients replace the stored associations entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecipe {
    pub name: String,
    pub text: String,
    /// New image reference; `None` keeps the stored one.
    pub image: Option<String>,
    pub cooking_time: i32,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

/// Query definition used to list recipes.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    /// Only recipes written by this user.
    pub author_id: Option<i32>,
    /// Only recipes carrying at least one of these tag slugs.
    pub tag_slugs: Vec<String>,
    /// Only recipes in this user's favorites.
    pub favorited_by: Option<i32>,
    /// Only recipes in this user's shopping cart.
    pub in_shopping_cart_of: Option<i32>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl RecipeListQuery {
    /// Construct a query that targets all recipes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author(mut self, author_id: i32) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn tags<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_slugs = slugs.into_iter().map(Into::into).collect();
        self
    }

    pub fn favorited_by(mut self, user_id: i32) -> Self {
        self.favorited_by = Some(user_id);
        self
    }

    pub fn in_shopping_cart_of(mut self, user_id: i32) -> Self {
        self.in_shopping_cart_of = Some(user_id);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
