use std::collections::HashSet;

use diesel::prelude::*;

use crate::{
    domain::membership::{Membership as DomainMembership, MembershipKind, NewMembership},
    domain::shopping_list::CartIngredient,
    models::membership::{Membership as DbMembership, NewMembership as DbNewMembership},
    repository::{
        DieselRepository, MembershipReader, MembershipWriter, RepositoryError, RepositoryResult,
    },
    schema::recipe_memberships,
};

impl MembershipReader for DieselRepository {
    fn list_member_recipe_ids(
        &self,
        user_id: i32,
        kind: MembershipKind,
        recipe_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut conn = self.conn()?;
        let ids = recipe_memberships::table
            .filter(recipe_memberships::user_id.eq(user_id))
            .filter(recipe_memberships::kind.eq(kind.as_str()))
            .filter(recipe_memberships::recipe_id.eq_any(recipe_ids))
            .select(recipe_memberships::recipe_id)
            .load::<i32>(&mut conn)?;

        Ok(ids.into_iter().collect())
    }

    fn list_cart_ingredients(&self, user_id: i32) -> RepositoryResult<Vec<CartIngredient>> {
        use crate::schema::{ingredients, recipe_ingredients};

        let mut conn = self.conn()?;

        let cart = recipe_memberships::table
            .filter(recipe_memberships::user_id.eq(user_id))
            .filter(recipe_memberships::kind.eq(MembershipKind::ShoppingCart.as_str()))
            .select(recipe_memberships::recipe_id);

        let rows = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq_any(cart))
            .select((
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load::<(String, String, i32)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(name, measurement_unit, amount)| {
                CartIngredient::new(name, measurement_unit, amount)
            })
            .collect())
    }
}

impl MembershipWriter for DieselRepository {
    fn create_membership(
        &self,
        new_membership: &NewMembership,
    ) -> RepositoryResult<DomainMembership> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(recipe_memberships::table)
            .values(DbNewMembership::from(new_membership))
            .get_result::<DbMembership>(&mut conn)?;

        created
            .into_domain()
            .ok_or_else(|| RepositoryError::ConstraintViolation("unknown membership kind".into()))
    }

    fn delete_membership(
        &self,
        user_id: i32,
        recipe_id: i32,
        kind: MembershipKind,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            recipe_memberships::table
                .filter(recipe_memberships::user_id.eq(user_id))
                .filter(recipe_memberships::recipe_id.eq(recipe_id))
                .filter(recipe_memberships::kind.eq(kind.as_str())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
