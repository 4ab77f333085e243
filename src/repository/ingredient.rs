use diesel::prelude::*;

use crate::domain::ingredient::{
    Ingredient as DomainIngredient, IngredientListQuery, NewIngredient as DomainNewIngredient,
};
use crate::models::ingredient::{Ingredient as DbIngredient, NewIngredient as DbNewIngredient};
use crate::repository::{
    DieselRepository, IngredientReader, IngredientWriter, RepositoryError, RepositoryResult,
};

impl IngredientReader for DieselRepository {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<DomainIngredient>> {
        use crate::schema::ingredients;

        let mut conn = self.conn()?;
        let ingredient = ingredients::table
            .filter(ingredients::id.eq(id))
            .first::<DbIngredient>(&mut conn)
            .optional()?;

        Ok(ingredient.map(Into::into))
    }

    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<DomainIngredient>> {
        use crate::schema::ingredients;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let rows = ingredients::table
            .filter(ingredients::id.eq_any(ids))
            .order(ingredients::id.asc())
            .load::<DbIngredient>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn list_ingredients(
        &self,
        query: IngredientListQuery,
    ) -> RepositoryResult<Vec<DomainIngredient>> {
        use crate::schema::ingredients;

        let mut conn = self.conn()?;

        let mut items = ingredients::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(term) = query.search.as_ref().filter(|term| !term.is_empty()) {
            let pattern = format!("%{}%", escape_like(term));
            items = items.filter(ingredients::search_name.like(pattern).escape('\\'));
        }

        let rows = items
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .load::<DbIngredient>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl IngredientWriter for DieselRepository {
    fn upsert_ingredients(
        &self,
        new_ingredients: &[DomainNewIngredient],
    ) -> RepositoryResult<usize> {
        use crate::schema::ingredients;

        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for new_ingredient in new_ingredients {
                inserted += diesel::insert_or_ignore_into(ingredients::table)
                    .values(DbNewIngredient::from(new_ingredient))
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }
}

/// Escapes `LIKE` wildcards so the term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
