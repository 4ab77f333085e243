//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::TempDir;

use pushkind_common::db::{DbPool, establish_connection_pool};
use pushkind_recipes::domain::ingredient::{Ingredient, IngredientListQuery, NewIngredient};
use pushkind_recipes::domain::recipe::{IngredientAmount, NewRecipe, Recipe};
use pushkind_recipes::domain::tag::{NewTag, Tag};
use pushkind_recipes::domain::user::{NewUser, User, Viewer};
use pushkind_recipes::repository::{
    DieselRepository, IngredientReader, IngredientWriter, RecipeWriter, TagWriter, UserWriter,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
///
/// The file lives in its own temporary directory that is removed on drop.
pub struct TestDb {
    // Dropped in declaration order: connections close before the directory goes.
    pool: DbPool,
    path: PathBuf,
    dir: TempDir,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let url = path.to_str().expect("Temporary path is not UTF-8.");

        let pool = establish_connection_pool(url).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");

        TestDb { dir, path, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

pub fn seed_user(repo: &DieselRepository, name: &str) -> User {
    repo.create_user(&NewUser::new(
        format!("{}@example.com", name.to_lowercase()),
        name,
    ))
    .expect("Failed to create user.")
}

pub fn seed_viewer(repo: &DieselRepository, name: &str) -> Viewer {
    Viewer::new(seed_user(repo, name), false)
}

pub fn seed_tag(repo: &DieselRepository, slug: &str, color: &str) -> Tag {
    repo.create_tag(&NewTag::new(slug, color, slug))
        .expect("Failed to create tag.")
}

/// Inserts `(name, unit)` pairs and returns them keyed in insertion order.
pub fn seed_ingredients(repo: &DieselRepository, items: &[(&str, &str)]) -> Vec<Ingredient> {
    let new_items: Vec<NewIngredient> = items
        .iter()
        .map(|(name, unit)| NewIngredient::new(*name, *unit))
        .collect();
    repo.upsert_ingredients(&new_items)
        .expect("Failed to insert ingredients.");

    let stored = repo
        .list_ingredients(IngredientListQuery::new())
        .expect("Failed to list ingredients.");
    items
        .iter()
        .filter_map(|(name, unit)| {
            stored
                .iter()
                .find(|item| item.name == *name && item.measurement_unit == *unit)
                .cloned()
        })
        .collect()
}

pub fn seed_recipe(
    repo: &DieselRepository,
    author: &User,
    name: &str,
    tags: &[&Tag],
    ingredients: &[(&Ingredient, i32)],
) -> Recipe {
    repo.create_recipe(&NewRecipe {
        author_id: author.id,
        name: name.to_string(),
        text: format!("How to cook {name}."),
        image: None,
        cooking_time: 15,
        tag_ids: tags.iter().map(|tag| tag.id).collect(),
        ingredients: ingredients
            .iter()
            .map(|(ingredient, amount)| IngredientAmount::new(ingredient.id, *amount))
            .collect(),
    })
    .expect("Failed to create recipe.")
}
