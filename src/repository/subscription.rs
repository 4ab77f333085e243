use std::collections::HashSet;

use diesel::prelude::*;

use crate::{
    domain::subscription::{
        NewSubscription, Subscription as DomainSubscription, SubscriptionListQuery,
    },
    domain::user::User as DomainUser,
    models::subscription::{NewSubscription as DbNewSubscription, Subscription as DbSubscription},
    models::user::User as DbUser,
    repository::{
        DieselRepository, RepositoryError, RepositoryResult, SubscriptionReader,
        SubscriptionWriter, page_bounds,
    },
    schema::{subscriptions, users},
};

impl SubscriptionReader for DieselRepository {
    fn list_subscribed_author_ids(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut conn = self.conn()?;
        let ids = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::author_id.eq_any(author_ids))
            .select(subscriptions::author_id)
            .load::<i32>(&mut conn)?;

        Ok(ids.into_iter().collect())
    }

    fn list_subscriptions(
        &self,
        query: SubscriptionListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainUser>)> {
        let mut conn = self.conn()?;

        let followed = |user_id: i32| {
            subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .select(subscriptions::author_id)
        };

        let total = users::table
            .filter(users::id.eq_any(followed(query.user_id)))
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = users::table
            .filter(users::id.eq_any(followed(query.user_id)))
            .order((users::name.asc(), users::id.asc()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(pagination) = &query.pagination {
            let (offset, limit) = page_bounds(pagination.page, pagination.per_page);
            items = items.offset(offset).limit(limit);
        }

        let authors = items.load::<DbUser>(&mut conn)?;

        Ok((total, authors.into_iter().map(Into::into).collect()))
    }
}

impl SubscriptionWriter for DieselRepository {
    fn create_subscription(
        &self,
        new_subscription: &NewSubscription,
    ) -> RepositoryResult<DomainSubscription> {
        let mut conn = self.conn()?;

        let created = diesel::insert_into(subscriptions::table)
            .values(DbNewSubscription::from(new_subscription))
            .get_result::<DbSubscription>(&mut conn)?;

        Ok(created.into())
    }

    fn delete_subscription(&self, user_id: i32, author_id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            subscriptions::table
                .filter(subscriptions::user_id.eq(user_id))
                .filter(subscriptions::author_id.eq(author_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
