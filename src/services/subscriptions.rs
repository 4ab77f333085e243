use serde::{Deserialize, Serialize};

use crate::domain::recipe::RecipeListQuery;
use crate::domain::subscription::{NewSubscription, SubscriptionListQuery};
use crate::domain::user::{User, Viewer};
use crate::repository::{
    RecipeReader, RepositoryError, SubscriptionReader, SubscriptionWriter, UserReader,
};
use crate::services::recipes::ShortRecipeView;
use crate::services::users::UserView;
use crate::services::{Page, PageQuery, ServiceError, ServiceResult, require_viewer};

/// Query parameters accepted by the subscriptions list.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Maximum number of recipes shown per author.
    pub recipes_limit: Option<usize>,
}

/// Followed author together with a preview of their recipes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<ShortRecipeView>,
    pub recipes_count: usize,
}

/// Follows `author_id` on behalf of the viewer.
pub fn subscribe<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    author_id: i32,
    recipes_limit: Option<usize>,
) -> ServiceResult<SubscriptionView>
where
    R: UserReader + RecipeReader + SubscriptionWriter + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    if viewer.id() == author_id {
        return Err(ServiceError::SelfSubscription);
    }

    let author = repo
        .get_user_by_id(author_id)?
        .ok_or_else(|| ServiceError::not_found("User not found."))?;

    repo.create_subscription(&NewSubscription::new(viewer.id(), author_id))
        .map_err(|err| match err {
            RepositoryError::AlreadyExists => {
                ServiceError::already_exists("You are already subscribed to this user.")
            }
            RepositoryError::MissingReference => ServiceError::not_found("User not found."),
            RepositoryError::ConstraintViolation(_) => ServiceError::SelfSubscription,
            other => other.into(),
        })?;

    subscription_view(repo, author, recipes_limit)
}

/// Stops following `author_id`.
pub fn unsubscribe<R>(repo: &R, viewer: Option<&Viewer>, author_id: i32) -> ServiceResult<()>
where
    R: SubscriptionWriter + ?Sized,
{
    let viewer = require_viewer(viewer)?;

    repo.delete_subscription(viewer.id(), author_id)
        .map_err(|err| match err {
            RepositoryError::NotFound => {
                ServiceError::not_found("You are not subscribed to this user.")
            }
            other => other.into(),
        })
}

/// Authors followed by the viewer, ordered by name.
pub fn list_subscriptions<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    query: SubscriptionQuery,
) -> ServiceResult<Page<SubscriptionView>>
where
    R: SubscriptionReader + RecipeReader + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    let page = PageQuery::new(query.page, query.limit);

    let list_query = SubscriptionListQuery::new(viewer.id()).paginate(page.page(), page.limit());
    let (total, authors) = repo.list_subscriptions(list_query)?;

    let views = authors
        .into_iter()
        .map(|author| subscription_view(repo, author, query.recipes_limit))
        .collect::<ServiceResult<Vec<_>>>()?;

    Ok(Page::new(views, total, &page))
}

fn subscription_view<R>(
    repo: &R,
    author: User,
    recipes_limit: Option<usize>,
) -> ServiceResult<SubscriptionView>
where
    R: RecipeReader + ?Sized,
{
    let mut query = RecipeListQuery::new().author(author.id);
    if let Some(limit) = recipes_limit {
        query = query.paginate(1, limit);
    }

    let (recipes_count, recipes) = repo.list_recipes(query)?;

    Ok(SubscriptionView {
        author: UserView::new(author, true),
        recipes: recipes.into_iter().map(ShortRecipeView::from).collect(),
        recipes_count,
    })
}
