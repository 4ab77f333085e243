use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// A user following the recipes of an author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub id: i32,
    /// Follower.
    pub user_id: i32,
    /// Followed author, never equal to `user_id`.
    pub author_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSubscription {
    pub user_id: i32,
    pub author_id: i32,
}

impl NewSubscription {
    pub fn new(user_id: i32, author_id: i32) -> Self {
        Self { user_id, author_id }
    }
}

/// Query definition used to list the authors a user follows.
#[derive(Debug, Clone)]
pub struct SubscriptionListQuery {
    pub user_id: i32,
    pub pagination: Option<Pagination>,
}

impl SubscriptionListQuery {
    pub fn new(user_id: i32) -> Self {
        Self {
            user_id,
            pagination: None,
        }
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
