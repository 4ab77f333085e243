use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;
use serde::{Deserialize, Serialize};

use crate::domain::user::Viewer;

pub use errors::{ServiceError, ServiceResult};

pub mod errors;
pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod shopping_list;
pub mod subscriptions;
pub mod tags;
pub mod users;

/// Upper bound applied to client supplied page sizes.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page number and size requested by a client.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self { page, limit }
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Total number of matching records.
    pub count: usize,
    pub page: usize,
    pub limit: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: usize, query: &PageQuery) -> Self {
        Self {
            count,
            page: query.page(),
            limit: query.limit(),
            results,
        }
    }
}

/// The viewer or `Unauthorized` for anonymous callers.
pub(crate) fn require_viewer(viewer: Option<&Viewer>) -> ServiceResult<&Viewer> {
    viewer.ok_or(ServiceError::Unauthorized)
}

/// The viewer when it holds the service role.
pub(crate) fn require_admin(viewer: Option<&Viewer>) -> ServiceResult<&Viewer> {
    let viewer = require_viewer(viewer)?;
    if !viewer.is_admin {
        return Err(ServiceError::Forbidden);
    }
    Ok(viewer)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_ITEMS_PER_PAGE.clamp(1, MAX_PAGE_SIZE));

        let query = PageQuery::new(Some(0), Some(1_000));
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);
    }
}
