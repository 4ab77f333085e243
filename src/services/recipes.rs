use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::membership::MembershipKind;
use crate::domain::recipe::{IngredientAmount, Recipe, RecipeIngredient, RecipeListQuery};
use crate::domain::tag::{Tag, TagListQuery};
use crate::domain::user::Viewer;
use crate::forms::recipes::{RecipeFormError, RecipePayload};
use crate::repository::{
    IngredientReader, MembershipReader, RecipeReader, RecipeWriter, RepositoryError,
    SubscriptionReader, TagReader,
};
use crate::services::users::UserView;
use crate::services::{Page, PageQuery, ServiceError, ServiceResult, require_viewer};

/// Query parameters accepted by the recipe list.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Only recipes written by this user.
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches when it carries any of them.
    #[serde(default)]
    pub tags: Vec<String>,
    /// `1` restricts the list to the viewer's favorites.
    pub is_favorited: Option<String>,
    /// `1` restricts the list to the viewer's shopping cart.
    pub is_in_shopping_cart: Option<String>,
}

/// Full representation of a recipe as seen by a viewer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact representation used by collections and subscriptions.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShortRecipeView {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl From<Recipe> for ShortRecipeView {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Lists recipes newest first.
///
/// Membership filters need a viewer. Anonymous callers have them ignored, or
/// rejected with `Unauthorized` when `strict_membership_filters` is set.
pub fn list_recipes<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    query: RecipeQuery,
    strict_membership_filters: bool,
) -> ServiceResult<Page<RecipeView>>
where
    R: RecipeReader + MembershipReader + SubscriptionReader + ?Sized,
{
    let page = PageQuery::new(query.page, query.limit);
    let mut list_query = RecipeListQuery::new().paginate(page.page(), page.limit());

    if let Some(author_id) = query.author {
        list_query = list_query.author(author_id);
    }

    let slugs: Vec<String> = query
        .tags
        .iter()
        .map(|slug| slug.trim())
        .filter(|slug| !slug.is_empty())
        .map(str::to_string)
        .collect();
    if !slugs.is_empty() {
        list_query = list_query.tags(slugs);
    }

    let favorited = flag_enabled(query.is_favorited.as_deref());
    let in_cart = flag_enabled(query.is_in_shopping_cart.as_deref());

    match viewer {
        Some(viewer) => {
            if favorited {
                list_query = list_query.favorited_by(viewer.id());
            }
            if in_cart {
                list_query = list_query.in_shopping_cart_of(viewer.id());
            }
        }
        None if strict_membership_filters && (favorited || in_cart) => {
            return Err(ServiceError::Unauthorized);
        }
        None => {}
    }

    let (total, recipes) = repo.list_recipes(list_query)?;
    let views = recipe_views(repo, viewer, recipes)?;

    Ok(Page::new(views, total, &page))
}

pub fn get_recipe<R>(repo: &R, viewer: Option<&Viewer>, recipe_id: i32) -> ServiceResult<RecipeView>
where
    R: RecipeReader + MembershipReader + SubscriptionReader + ?Sized,
{
    let recipe = find_recipe(repo, recipe_id)?;
    single_view(repo, viewer, recipe)
}

/// Validates the payload and stores the recipe with its tags and ingredients.
pub fn create_recipe<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    payload: RecipePayload,
) -> ServiceResult<RecipeView>
where
    R: RecipeWriter
        + TagReader
        + IngredientReader
        + MembershipReader
        + SubscriptionReader
        + ?Sized,
{
    let viewer = require_viewer(viewer)?;

    let new_recipe = payload.into_new_recipe(viewer.id()).map_err(form_error)?;
    ensure_references_exist(repo, &new_recipe.tag_ids, &new_recipe.ingredients)?;

    let recipe = repo.create_recipe(&new_recipe).map_err(write_error)?;
    log::info!("Recipe {} created by user {}", recipe.id, viewer.id());

    single_view(repo, Some(viewer), recipe)
}

/// Replaces a recipe and its associations. Only the author or an admin may do so.
pub fn update_recipe<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    recipe_id: i32,
    payload: RecipePayload,
) -> ServiceResult<RecipeView>
where
    R: RecipeReader
        + RecipeWriter
        + TagReader
        + IngredientReader
        + MembershipReader
        + SubscriptionReader
        + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    let existing = find_recipe(repo, recipe_id)?;
    if !viewer.can_modify(existing.author.id) {
        return Err(ServiceError::Forbidden);
    }

    let updates = payload
        .into_update_recipe(Utc::now().naive_utc())
        .map_err(form_error)?;
    ensure_references_exist(repo, &updates.tag_ids, &updates.ingredients)?;

    let recipe = repo
        .update_recipe(recipe_id, &updates)
        .map_err(write_error)?;

    single_view(repo, Some(viewer), recipe)
}

/// Deletes a recipe. Only the author or an admin may do so.
pub fn delete_recipe<R>(repo: &R, viewer: Option<&Viewer>, recipe_id: i32) -> ServiceResult<()>
where
    R: RecipeReader + RecipeWriter + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    let existing = find_recipe(repo, recipe_id)?;
    if !viewer.can_modify(existing.author.id) {
        return Err(ServiceError::Forbidden);
    }

    repo.delete_recipe(recipe_id).map_err(write_error)?;
    log::info!("Recipe {} deleted by user {}", recipe_id, viewer.id());

    Ok(())
}

pub(crate) fn find_recipe<R>(repo: &R, recipe_id: i32) -> ServiceResult<Recipe>
where
    R: RecipeReader + ?Sized,
{
    repo.get_recipe_by_id(recipe_id)?
        .ok_or_else(|| ServiceError::not_found("Recipe not found."))
}

/// Builds views for `recipes` with the viewer's membership and subscription flags.
pub(crate) fn recipe_views<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    recipes: Vec<Recipe>,
) -> ServiceResult<Vec<RecipeView>>
where
    R: MembershipReader + SubscriptionReader + ?Sized,
{
    let (favorites, cart, subscribed) = match viewer {
        Some(viewer) if !recipes.is_empty() => {
            let recipe_ids: Vec<i32> = recipes.iter().map(|recipe| recipe.id).collect();
            let mut author_ids: Vec<i32> = recipes.iter().map(|recipe| recipe.author.id).collect();
            author_ids.sort_unstable();
            author_ids.dedup();

            (
                repo.list_member_recipe_ids(viewer.id(), MembershipKind::Favorite, &recipe_ids)?,
                repo.list_member_recipe_ids(
                    viewer.id(),
                    MembershipKind::ShoppingCart,
                    &recipe_ids,
                )?,
                repo.list_subscribed_author_ids(viewer.id(), &author_ids)?,
            )
        }
        _ => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let is_subscribed = subscribed.contains(&recipe.author.id);
            RecipeView {
                id: recipe.id,
                is_favorited: favorites.contains(&recipe.id),
                is_in_shopping_cart: cart.contains(&recipe.id),
                tags: recipe.tags,
                author: UserView::new(recipe.author, is_subscribed),
                ingredients: recipe.ingredients,
                name: recipe.name,
                image: recipe.image,
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            }
        })
        .collect())
}

fn single_view<R>(repo: &R, viewer: Option<&Viewer>, recipe: Recipe) -> ServiceResult<RecipeView>
where
    R: MembershipReader + SubscriptionReader + ?Sized,
{
    recipe_views(repo, viewer, vec![recipe])?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Recipe not found."))
}

fn ensure_references_exist<R>(
    repo: &R,
    tag_ids: &[i32],
    ingredients: &[IngredientAmount],
) -> ServiceResult<()>
where
    R: TagReader + IngredientReader + ?Sized,
{
    let known_tags: HashSet<i32> = repo
        .list_tags(TagListQuery::new().ids(tag_ids))?
        .into_iter()
        .map(|tag| tag.id)
        .collect();
    if let Some(missing) = tag_ids.iter().find(|id| !known_tags.contains(*id)) {
        return Err(ServiceError::invalid_field(
            "tags",
            format!("Tag {missing} does not exist."),
        ));
    }

    let ingredient_ids: Vec<i32> = ingredients.iter().map(|entry| entry.ingredient_id).collect();
    let known_ingredients: HashSet<i32> = repo
        .get_ingredients_by_ids(&ingredient_ids)?
        .into_iter()
        .map(|ingredient| ingredient.id)
        .collect();
    if let Some(missing) = ingredient_ids
        .iter()
        .find(|id| !known_ingredients.contains(*id))
    {
        return Err(ServiceError::invalid_field(
            "ingredients",
            format!("Ingredient {missing} does not exist."),
        ));
    }

    Ok(())
}

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true")
    )
}

fn form_error(err: RecipeFormError) -> ServiceError {
    ServiceError::invalid_field(err.field(), err.to_string())
}

fn write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::not_found("Recipe not found."),
        RepositoryError::MissingReference => ServiceError::invalid_field(
            "non_field_errors",
            "A referenced tag or ingredient no longer exists.",
        ),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recipe::NewRecipe;
    use crate::forms::recipes::IngredientAmountPayload;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{
        sample_ingredient, sample_recipe, sample_tag, sample_user, viewer,
    };

    fn payload() -> RecipePayload {
        RecipePayload {
            name: "Omelette".to_string(),
            text: "Whisk and fry.".to_string(),
            image: None,
            cooking_time: 10,
            tags: vec![1],
            ingredients: vec![IngredientAmountPayload { id: 1, amount: 2 }],
        }
    }

    fn expect_known_references(repo: &mut FakeRepo) {
        repo.tag_reader
            .expect_list_tags()
            .returning(|_| Ok(vec![sample_tag(1, "breakfast")]));
        repo.ingredient_reader
            .expect_get_ingredients_by_ids()
            .returning(|_| Ok(vec![sample_ingredient(1, "Egg", "pcs")]));
    }

    fn expect_no_flags(repo: &mut FakeRepo) {
        repo.membership_reader
            .expect_list_member_recipe_ids()
            .returning(|_, _, _| Ok(HashSet::new()));
        repo.subscription_reader
            .expect_list_subscribed_author_ids()
            .returning(|_, _| Ok(HashSet::new()));
    }

    #[test]
    fn list_marks_viewer_memberships() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_list_recipes()
            .withf(|query| {
                query.tag_slugs == vec!["breakfast".to_string()]
                    && query.favorited_by == Some(1)
                    && query.in_shopping_cart_of.is_none()
            })
            .returning(|_| {
                Ok((
                    2,
                    vec![
                        sample_recipe(10, sample_user(2, "Bob")),
                        sample_recipe(11, sample_user(2, "Bob")),
                    ],
                ))
            });
        repo.membership_reader
            .expect_list_member_recipe_ids()
            .returning(|_, kind, _| match kind {
                MembershipKind::Favorite => Ok(HashSet::from([10, 11])),
                MembershipKind::ShoppingCart => Ok(HashSet::from([11])),
            });
        repo.subscription_reader
            .expect_list_subscribed_author_ids()
            .withf(|_, ids| ids == [2])
            .returning(|_, _| Ok(HashSet::from([2])));

        let viewer = viewer(1, false);
        let query = RecipeQuery {
            tags: vec!["breakfast".to_string(), " ".to_string()],
            is_favorited: Some("1".to_string()),
            ..RecipeQuery::default()
        };
        let page = list_recipes(&repo, Some(&viewer), query, false).expect("expected success");

        assert_eq!(page.count, 2);
        assert!(page.results.iter().all(|recipe| recipe.is_favorited));
        let cart: Vec<bool> = page
            .results
            .iter()
            .map(|recipe| recipe.is_in_shopping_cart)
            .collect();
        assert_eq!(cart, vec![false, true]);
        assert!(page.results[0].author.is_subscribed);
    }

    #[test]
    fn anonymous_membership_filter_is_ignored_by_default() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_list_recipes()
            .withf(|query| query.favorited_by.is_none() && query.in_shopping_cart_of.is_none())
            .returning(|_| Ok((1, vec![sample_recipe(10, sample_user(2, "Bob"))])));

        let query = RecipeQuery {
            is_in_shopping_cart: Some("1".to_string()),
            ..RecipeQuery::default()
        };
        let page = list_recipes(&repo, None, query, false).expect("expected success");

        assert_eq!(page.results.len(), 1);
        assert!(!page.results[0].is_in_shopping_cart);
        assert!(!page.results[0].is_favorited);
    }

    #[test]
    fn anonymous_membership_filter_is_rejected_when_strict() {
        let repo = FakeRepo::new();
        let query = RecipeQuery {
            is_favorited: Some("true".to_string()),
            ..RecipeQuery::default()
        };

        let result = list_recipes(&repo, None, query, true);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_requires_viewer() {
        let repo = FakeRepo::new();

        let result = create_recipe(&repo, None, payload());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_rejects_unknown_ingredient() {
        let mut repo = FakeRepo::new();
        repo.tag_reader
            .expect_list_tags()
            .returning(|_| Ok(vec![sample_tag(1, "breakfast")]));
        repo.ingredient_reader
            .expect_get_ingredients_by_ids()
            .returning(|_| Ok(Vec::new()));
        let viewer = viewer(1, false);

        let result = create_recipe(&repo, Some(&viewer), payload());

        assert!(matches!(
            result,
            Err(ServiceError::InvalidField { ref field, .. }) if field == "ingredients"
        ));
    }

    #[test]
    fn create_rejects_zero_cooking_time() {
        let repo = FakeRepo::new();
        let viewer = viewer(1, false);
        let mut payload = payload();
        payload.cooking_time = 0;

        let result = create_recipe(&repo, Some(&viewer), payload);

        assert!(matches!(
            result,
            Err(ServiceError::InvalidField { ref field, .. }) if field == "cooking_time"
        ));
    }

    #[test]
    fn create_persists_recipe_for_viewer() {
        let mut repo = FakeRepo::new();
        expect_known_references(&mut repo);
        expect_no_flags(&mut repo);
        repo.recipe_writer
            .expect_create_recipe()
            .times(1)
            .withf(|new_recipe: &NewRecipe| {
                new_recipe.author_id == 1
                    && new_recipe.tag_ids == vec![1]
                    && new_recipe.ingredients == vec![IngredientAmount::new(1, 2)]
            })
            .returning(|_| Ok(sample_recipe(20, sample_user(1, "Anna"))));
        let viewer = viewer(1, false);

        let view = create_recipe(&repo, Some(&viewer), payload()).expect("expected success");

        assert_eq!(view.id, 20);
        assert!(!view.is_favorited);
    }

    #[test]
    fn update_by_other_user_is_forbidden() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_get_recipe_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, sample_user(2, "Bob")))));
        let viewer = viewer(1, false);

        let result = update_recipe(&repo, Some(&viewer), 10, payload());

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn admin_may_update_foreign_recipe() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_get_recipe_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, sample_user(2, "Bob")))));
        expect_known_references(&mut repo);
        expect_no_flags(&mut repo);
        repo.recipe_writer
            .expect_update_recipe()
            .times(1)
            .withf(|id, updates| *id == 10 && updates.name == "Omelette")
            .returning(|id, _| Ok(sample_recipe(id, sample_user(2, "Bob"))));
        let viewer = viewer(1, true);

        let view = update_recipe(&repo, Some(&viewer), 10, payload()).expect("expected success");

        assert_eq!(view.author.id, 2);
    }

    #[test]
    fn delete_missing_recipe_is_not_found() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_get_recipe_by_id()
            .returning(|_| Ok(None));
        let viewer = viewer(1, false);

        let result = delete_recipe(&repo, Some(&viewer), 10);

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn author_deletes_own_recipe() {
        let mut repo = FakeRepo::new();
        repo.recipe_reader
            .expect_get_recipe_by_id()
            .returning(|id| Ok(Some(sample_recipe(id, sample_user(1, "Anna")))));
        repo.recipe_writer
            .expect_delete_recipe()
            .times(1)
            .returning(|_| Ok(()));
        let viewer = viewer(1, false);

        delete_recipe(&repo, Some(&viewer), 10).expect("expected success");
    }
}
