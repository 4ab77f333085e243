use crate::domain::membership::{MembershipKind, NewMembership};
use crate::domain::user::Viewer;
use crate::repository::{MembershipWriter, RecipeReader, RepositoryError};
use crate::services::recipes::{ShortRecipeView, find_recipe};
use crate::services::{ServiceError, ServiceResult, require_viewer};

fn collection_label(kind: MembershipKind) -> &'static str {
    match kind {
        MembershipKind::Favorite => "favorites",
        MembershipKind::ShoppingCart => "the shopping cart",
    }
}

/// Puts a recipe into one of the viewer's collections.
pub fn add_membership<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    recipe_id: i32,
    kind: MembershipKind,
) -> ServiceResult<ShortRecipeView>
where
    R: RecipeReader + MembershipWriter + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    let recipe = find_recipe(repo, recipe_id)?;

    repo.create_membership(&NewMembership::new(viewer.id(), recipe_id, kind))
        .map_err(|err| match err {
            RepositoryError::AlreadyExists => ServiceError::already_exists(format!(
                "Recipe is already in {}.",
                collection_label(kind)
            )),
            RepositoryError::MissingReference => ServiceError::not_found("Recipe not found."),
            other => other.into(),
        })?;

    Ok(recipe.into())
}

/// Takes a recipe out of one of the viewer's collections.
pub fn remove_membership<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    recipe_id: i32,
    kind: MembershipKind,
) -> ServiceResult<()>
where
    R: MembershipWriter + ?Sized,
{
    let viewer = require_viewer(viewer)?;

    repo.delete_membership(viewer.id(), recipe_id, kind)
        .map_err(|err| match err {
            RepositoryError::NotFound => ServiceError::not_found(format!(
                "Recipe is not in {}.",
                collection_label(kind)
            )),
            other => other.into(),
        })
}
