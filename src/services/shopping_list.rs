use chrono::NaiveDate;

use crate::domain::shopping_list::ShoppingList;
use crate::domain::user::Viewer;
use crate::repository::MembershipReader;
use crate::services::{ServiceResult, require_viewer};

/// Sums the ingredients of every recipe in the viewer's shopping cart.
///
/// An empty cart produces a list without items.
pub fn build_shopping_list<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    generated_on: NaiveDate,
) -> ServiceResult<ShoppingList>
where
    R: MembershipReader + ?Sized,
{
    let viewer = require_viewer(viewer)?;
    let entries = repo.list_cart_ingredients(viewer.id())?;

    let owner = if viewer.user.name.is_empty() {
        viewer.user.email.clone()
    } else {
        viewer.user.name.clone()
    };

    Ok(ShoppingList::aggregate(owner, generated_on, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shopping_list::CartIngredient;
    use crate::repository::mock::MockMembershipReader;
    use crate::services::ServiceError;
    use crate::services::test_support::viewer;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default()
    }

    #[test]
    fn cart_of_two_recipes_is_summed() {
        let mut repo = MockMembershipReader::new();
        repo.expect_list_cart_ingredients()
            .withf(|user_id| *user_id == 4)
            .returning(|_| {
                Ok(vec![
                    CartIngredient::new("Salt", "g", 5),
                    CartIngredient::new("Rice", "g", 100),
                    CartIngredient::new("Salt", "g", 3),
                ])
            });
        let viewer = viewer(4, false);

        let list = build_shopping_list(&repo, Some(&viewer), today()).expect("expected success");

        let lines: Vec<String> = list.items.iter().map(ToString::to_string).collect();
        assert_eq!(lines, vec!["Rice (g) — 100", "Salt (g) — 8"]);
        assert_eq!(list.owner, "user4");
    }

    #[test]
    fn empty_cart_is_not_an_error() {
        let mut repo = MockMembershipReader::new();
        repo.expect_list_cart_ingredients()
            .returning(|_| Ok(Vec::new()));
        let viewer = viewer(4, false);

        let list = build_shopping_list(&repo, Some(&viewer), today()).expect("expected success");

        assert!(list.items.is_empty());
        assert!(list.render().ends_with("Foodgram (2024)"));
    }

    #[test]
    fn anonymous_caller_is_unauthorized() {
        let repo = MockMembershipReader::new();

        let result = build_shopping_list(&repo, None, today());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }
}
