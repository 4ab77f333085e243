use chrono::NaiveDateTime;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            name: name.into().trim().to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct UpdateUser {
    pub name: String,
    pub updated_at: NaiveDateTime,
}

impl From<&AuthenticatedUser> for NewUser {
    fn from(value: &AuthenticatedUser) -> Self {
        NewUser::new(value.email.clone(), value.name.clone())
    }
}

/// Query definition used to list local users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Local user acting on a request together with the privileges granted by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Viewer {
    pub user: User,
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(user: User, is_admin: bool) -> Self {
        Self { user, is_admin }
    }

    pub fn id(&self) -> i32 {
        self.user.id
    }

    /// Whether the viewer may modify a record owned by `owner_id`.
    pub fn can_modify(&self, owner_id: i32) -> bool {
        self.is_admin || self.user.id == owner_id
    }
}
