use std::collections::HashSet;

use diesel::RunQueryDsl;
use pushkind_common::db::{DbConnection, DbPool};

use crate::domain::ingredient::{Ingredient, IngredientListQuery, NewIngredient};
use crate::domain::membership::{Membership, MembershipKind, NewMembership};
use crate::domain::recipe::{NewRecipe, Recipe, RecipeListQuery, UpdateRecipe};
use crate::domain::shopping_list::CartIngredient;
use crate::domain::subscription::{NewSubscription, Subscription, SubscriptionListQuery};
use crate::domain::tag::{NewTag, Tag, TagListQuery, UpdateTag};
use crate::domain::user::{NewUser, UpdateUser, User, UserListQuery};

pub use errors::{RepositoryError, RepositoryResult};

pub mod errors;
pub mod ingredient;
pub mod membership;
pub mod recipe;
pub mod subscription;
pub mod tag;
pub mod user;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Checks out a connection with foreign key enforcement switched on.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        let mut conn = self.pool.get()?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        Ok(conn)
    }
}

/// Offset and limit derived from 1-based pagination, saturating at `i64::MAX`.
pub(crate) fn page_bounds(page: usize, per_page: usize) -> (i64, i64) {
    let offset = page.max(1).saturating_sub(1).saturating_mul(per_page);
    (
        i64::try_from(offset).unwrap_or(i64::MAX),
        i64::try_from(per_page).unwrap_or(i64::MAX),
    )
}

pub trait UserReader {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, user_id: i32, updates: &UpdateUser) -> RepositoryResult<User>;
}

pub trait TagReader {
    fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>>;
    fn list_tags(&self, query: TagListQuery) -> RepositoryResult<Vec<Tag>>;
}

pub trait TagWriter {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag>;
    fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()>;
}

pub trait IngredientReader {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>>;
    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>>;
    /// Lists ingredients ordered by name, filtered by the query's search term.
    fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>>;
}

pub trait IngredientWriter {
    /// Inserts the ingredients that are not stored yet and returns how many were added.
    fn upsert_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize>;
}

pub trait RecipeReader {
    fn get_recipe_by_id(&self, id: i32) -> RepositoryResult<Option<Recipe>>;
    fn list_recipes(&self, query: RecipeListQuery) -> RepositoryResult<(usize, Vec<Recipe>)>;
}

pub trait RecipeWriter {
    fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe>;
    fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe>;
    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()>;
}

pub trait MembershipReader {
    /// Returns the subset of `recipe_ids` present in the user's `kind` collection.
    fn list_member_recipe_ids(
        &self,
        user_id: i32,
        kind: MembershipKind,
        recipe_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>>;
    /// Every ingredient line of every recipe in the user's shopping cart.
    fn list_cart_ingredients(&self, user_id: i32) -> RepositoryResult<Vec<CartIngredient>>;
}

pub trait MembershipWriter {
    fn create_membership(&self, new_membership: &NewMembership) -> RepositoryResult<Membership>;
    fn delete_membership(
        &self,
        user_id: i32,
        recipe_id: i32,
        kind: MembershipKind,
    ) -> RepositoryResult<()>;
}

pub trait SubscriptionReader {
    /// Returns the subset of `author_ids` the user is subscribed to.
    fn list_subscribed_author_ids(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>>;
    /// Lists the authors followed by the user, ordered by name.
    fn list_subscriptions(
        &self,
        query: SubscriptionListQuery,
    ) -> RepositoryResult<(usize, Vec<User>)>;
}

pub trait SubscriptionWriter {
    fn create_subscription(
        &self,
        new_subscription: &NewSubscription,
    ) -> RepositoryResult<Subscription>;
    fn delete_subscription(&self, user_id: i32, author_id: i32) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::page_bounds;

    #[test]
    fn page_bounds_are_one_based() {
        assert_eq!(page_bounds(0, 10), (0, 10));
        assert_eq!(page_bounds(1, 10), (0, 10));
        assert_eq!(page_bounds(3, 25), (50, 25));
    }

    #[test]
    fn huge_pages_saturate_instead_of_overflowing() {
        assert_eq!(page_bounds(usize::MAX, 100), (i64::MAX, 100));
        assert_eq!(page_bounds(2, usize::MAX), (i64::MAX, i64::MAX));
    }
}
