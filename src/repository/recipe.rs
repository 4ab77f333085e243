use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::{
    domain::membership::MembershipKind,
    domain::recipe::{
        IngredientAmount, NewRecipe as DomainNewRecipe, Recipe as DomainRecipe,
        RecipeIngredient as DomainRecipeIngredient, RecipeListQuery,
        UpdateRecipe as DomainUpdateRecipe,
    },
    domain::tag::Tag as DomainTag,
    domain::user::User as DomainUser,
    models::recipe::{
        NewRecipe as DbNewRecipe, NewRecipeIngredient as DbNewRecipeIngredient,
        NewRecipeTag as DbNewRecipeTag, Recipe as DbRecipe, RecipeIngredientRow,
        UpdateRecipe as DbUpdateRecipe,
    },
    models::tag::Tag as DbTag,
    models::user::User as DbUser,
    repository::{
        DieselRepository, RecipeReader, RecipeWriter, RepositoryError, RepositoryResult,
        page_bounds,
    },
    schema::recipes,
};

impl RecipeReader for DieselRepository {
    fn get_recipe_by_id(&self, id: i32) -> RepositoryResult<Option<DomainRecipe>> {
        let mut conn = self.conn()?;
        let recipe = recipes::table
            .filter(recipes::id.eq(id))
            .first::<DbRecipe>(&mut conn)
            .optional()?;

        match recipe {
            Some(db_recipe) => Ok(Some(load_recipe(&mut conn, db_recipe)?)),
            None => Ok(None),
        }
    }

    fn list_recipes(
        &self,
        query: RecipeListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainRecipe>)> {
        let mut conn = self.conn()?;

        let tag_ids = resolve_tag_ids(&mut conn, &query.tag_slugs)?;

        let total = filtered_recipes(&query, tag_ids.clone())
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_recipes(&query, tag_ids)
            .order((recipes::created_at.desc(), recipes::id.desc()));

        if let Some(pagination) = &query.pagination {
            let (offset, limit) = page_bounds(pagination.page, pagination.per_page);
            items = items.offset(offset).limit(limit);
        }

        let db_recipes = items.load::<DbRecipe>(&mut conn)?;

        if db_recipes.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, load_recipe_details(&mut conn, db_recipes)?))
    }
}

impl RecipeWriter for DieselRepository {
    fn create_recipe(&self, new_recipe: &DomainNewRecipe) -> RepositoryResult<DomainRecipe> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainRecipe, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(recipes::table)
                .values(DbNewRecipe::from(new_recipe))
                .get_result::<DbRecipe>(conn)?;

            insert_associations(conn, created.id, &new_recipe.tag_ids, &new_recipe.ingredients)?;

            load_recipe(conn, created)
        })
    }

    fn update_recipe(
        &self,
        recipe_id: i32,
        updates: &DomainUpdateRecipe,
    ) -> RepositoryResult<DomainRecipe> {
        use crate::schema::{recipe_ingredients, recipe_tags};

        let mut conn = self.conn()?;

        // Associations are replaced wholesale inside the same transaction as the row update.
        conn.transaction::<DomainRecipe, RepositoryError, _>(|conn| {
            let updated = diesel::update(recipes::table.filter(recipes::id.eq(recipe_id)))
                .set(&DbUpdateRecipe::from(updates))
                .get_result::<DbRecipe>(conn)?;

            diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                .execute(conn)?;
            diesel::delete(
                recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
            )
            .execute(conn)?;

            insert_associations(conn, recipe_id, &updates.tag_ids, &updates.ingredients)?;

            load_recipe(conn, updated)
        })
    }

    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(recipes::table.filter(recipes::id.eq(recipe_id))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn resolve_tag_ids(
    conn: &mut SqliteConnection,
    slugs: &[String],
) -> RepositoryResult<Option<Vec<i32>>> {
    use crate::schema::tags;

    if slugs.is_empty() {
        return Ok(None);
    }

    let ids = tags::table
        .filter(tags::slug.eq_any(slugs))
        .select(tags::id)
        .load::<i32>(conn)?;

    Ok(Some(ids))
}

fn filtered_recipes(
    query: &RecipeListQuery,
    tag_ids: Option<Vec<i32>>,
) -> recipes::BoxedQuery<'static, Sqlite> {
    use crate::schema::{recipe_memberships, recipe_tags};

    let mut items = recipes::table.into_boxed::<Sqlite>();

    if let Some(author_id) = query.author_id {
        items = items.filter(recipes::author_id.eq(author_id));
    }

    if let Some(tag_ids) = tag_ids {
        items = items.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(recipe_tags::tag_id.eq_any(tag_ids))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    let memberships = [
        (query.favorited_by, MembershipKind::Favorite),
        (query.in_shopping_cart_of, MembershipKind::ShoppingCart),
    ];
    for (user_id, kind) in memberships {
        if let Some(user_id) = user_id {
            items = items.filter(
                recipes::id.eq_any(
                    recipe_memberships::table
                        .filter(recipe_memberships::user_id.eq(user_id))
                        .filter(recipe_memberships::kind.eq(kind.as_str()))
                        .select(recipe_memberships::recipe_id),
                ),
            );
        }
    }

    items
}

fn insert_associations(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    tag_ids: &[i32],
    ingredients: &[IngredientAmount],
) -> RepositoryResult<()> {
    use crate::schema::{recipe_ingredients, recipe_tags};

    let tag_rows: Vec<DbNewRecipeTag> = tag_ids
        .iter()
        .map(|&tag_id| DbNewRecipeTag { recipe_id, tag_id })
        .collect();

    let ingredient_rows: Vec<DbNewRecipeIngredient> = ingredients
        .iter()
        .map(|entry| DbNewRecipeIngredient {
            recipe_id,
            ingredient_id: entry.ingredient_id,
            amount: entry.amount,
        })
        .collect();

    if !tag_rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(&tag_rows)
            .execute(conn)?;
    }

    if !ingredient_rows.is_empty() {
        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_rows)
            .execute(conn)?;
    }

    Ok(())
}

fn load_recipe(conn: &mut SqliteConnection, db_recipe: DbRecipe) -> RepositoryResult<DomainRecipe> {
    load_recipe_details(conn, vec![db_recipe])?
        .pop()
        .ok_or(RepositoryError::NotFound)
}

fn load_recipe_details(
    conn: &mut SqliteConnection,
    db_recipes: Vec<DbRecipe>,
) -> RepositoryResult<Vec<DomainRecipe>> {
    use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags, users};

    let recipe_ids: Vec<i32> = db_recipes.iter().map(|recipe| recipe.id).collect();
    let author_ids: Vec<i32> = db_recipes.iter().map(|recipe| recipe.author_id).collect();

    let authors: HashMap<i32, DomainUser> = users::table
        .filter(users::id.eq_any(&author_ids))
        .load::<DbUser>(conn)?
        .into_iter()
        .map(|user| (user.id, DomainUser::from(user)))
        .collect();

    let tag_rows = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order((tags::name.asc(), tags::id.asc()))
        .select((recipe_tags::recipe_id, DbTag::as_select()))
        .load::<(i32, DbTag)>(conn)?;

    let mut tag_map: HashMap<i32, Vec<DomainTag>> = HashMap::new();
    for (recipe_id, tag) in tag_rows {
        tag_map.entry(recipe_id).or_default().push(tag.into());
    }

    let ingredient_rows = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(recipe_ingredients::id.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::ingredient_id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load::<RecipeIngredientRow>(conn)?;

    let mut ingredient_map: HashMap<i32, Vec<DomainRecipeIngredient>> = HashMap::new();
    for row in ingredient_rows {
        ingredient_map.entry(row.recipe_id).or_default().push(row.into());
    }

    db_recipes
        .into_iter()
        .map(|db_recipe| {
            let author = authors
                .get(&db_recipe.author_id)
                .cloned()
                .ok_or(RepositoryError::MissingReference)?;
            let tags = tag_map.remove(&db_recipe.id).unwrap_or_default();
            let ingredients = ingredient_map.remove(&db_recipe.id).unwrap_or_default();
            Ok(db_recipe.into_domain(author, tags, ingredients))
        })
        .collect()
}
