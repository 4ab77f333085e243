use chrono::Utc;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::user::{NewUser, UpdateUser, User, UserListQuery, Viewer};
use crate::repository::{RepositoryError, SubscriptionReader, UserReader, UserWriter};
use crate::services::{Page, PageQuery, ServiceError, ServiceResult, require_viewer};

/// Public representation of a user.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub name: String,
    /// Whether the viewer follows this user.
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_subscribed,
        }
    }
}

/// Maps an identity from the session to a local user, creating it on first sight.
///
/// A lost race against a concurrent insert of the same email is recovered by
/// reading the row written by the other request.
pub fn resolve_viewer<R>(
    repo: &R,
    identity: Option<&AuthenticatedUser>,
) -> ServiceResult<Option<Viewer>>
where
    R: UserReader + UserWriter + ?Sized,
{
    let Some(identity) = identity else {
        return Ok(None);
    };

    let new_user = NewUser::from(identity);
    if new_user.email.is_empty() {
        return Err(ServiceError::Unauthorized);
    }

    let user = match repo.get_user_by_email(&new_user.email)? {
        Some(user) => user,
        None => match repo.create_user(&new_user) {
            Ok(user) => user,
            Err(RepositoryError::AlreadyExists) => {
                log::warn!(
                    "User {} was created concurrently, reloading",
                    new_user.email
                );
                repo.get_user_by_email(&new_user.email)?.ok_or_else(|| {
                    ServiceError::Internal(format!("user {} vanished", new_user.email))
                })?
            }
            Err(err) => return Err(err.into()),
        },
    };

    let user = if !new_user.name.is_empty() && user.name != new_user.name {
        let updates = UpdateUser {
            name: new_user.name.clone(),
            updated_at: Utc::now().naive_utc(),
        };
        repo.update_user(user.id, &updates)?
    } else {
        user
    };

    let is_admin = check_role(SERVICE_ACCESS_ROLE, &identity.roles);
    Ok(Some(Viewer::new(user, is_admin)))
}

/// Profile of the calling user.
pub fn current_user(viewer: Option<&Viewer>) -> ServiceResult<UserView> {
    let viewer = require_viewer(viewer)?;
    Ok(UserView::new(viewer.user.clone(), false))
}

pub fn list_users<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    page: PageQuery,
) -> ServiceResult<Page<UserView>>
where
    R: UserReader + SubscriptionReader + ?Sized,
{
    let query = UserListQuery::new().paginate(page.page(), page.limit());
    let (total, users) = repo.list_users(query)?;
    let views = user_views(repo, viewer, users)?;

    Ok(Page::new(views, total, &page))
}

pub fn get_user<R>(repo: &R, viewer: Option<&Viewer>, user_id: i32) -> ServiceResult<UserView>
where
    R: UserReader + SubscriptionReader + ?Sized,
{
    let user = repo
        .get_user_by_id(user_id)?
        .ok_or_else(|| ServiceError::not_found("User not found."))?;

    let mut views = user_views(repo, viewer, vec![user])?;
    views
        .pop()
        .ok_or_else(|| ServiceError::not_found("User not found."))
}

/// Builds views for `users`, flagging the ones the viewer follows.
pub(crate) fn user_views<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    users: Vec<User>,
) -> ServiceResult<Vec<UserView>>
where
    R: SubscriptionReader + ?Sized,
{
    let subscribed = match viewer {
        Some(viewer) if !users.is_empty() => {
            let ids: Vec<i32> = users.iter().map(|user| user.id).collect();
            repo.list_subscribed_author_ids(viewer.id(), &ids)?
        }
        _ => Default::default(),
    };

    Ok(users
        .into_iter()
        .map(|user| {
            let is_subscribed = subscribed.contains(&user.id);
            UserView::new(user, is_subscribed)
        })
        .collect())
}
