use chrono::Utc;

use crate::domain::tag::{Tag, TagListQuery};
use crate::domain::user::Viewer;
use crate::forms::tags::{AddTagForm, EditTagForm, TagFormError};
use crate::repository::{RepositoryError, TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult, require_admin};

const DUPLICATE_TAG: &str = "A tag with this name, color or slug already exists.";

/// All tags ordered by name.
pub fn list_tags<R>(repo: &R) -> ServiceResult<Vec<Tag>>
where
    R: TagReader + ?Sized,
{
    repo.list_tags(TagListQuery::new()).map_err(ServiceError::from)
}

pub fn get_tag<R>(repo: &R, tag_id: i32) -> ServiceResult<Tag>
where
    R: TagReader + ?Sized,
{
    repo.get_tag_by_id(tag_id)?
        .ok_or_else(|| ServiceError::not_found("Tag not found."))
}

/// Creates a new tag. Requires the service role.
pub fn create_tag<R>(repo: &R, viewer: Option<&Viewer>, form: AddTagForm) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    require_admin(viewer)?;

    let new_tag = form.into_new_tag().map_err(form_error)?;

    repo.create_tag(&new_tag).map_err(write_error)
}

/// Updates an existing tag. Requires the service role.
pub fn modify_tag<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    tag_id: i32,
    form: EditTagForm,
) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    require_admin(viewer)?;

    let update = form
        .into_update_tag(Utc::now().naive_utc())
        .map_err(form_error)?;

    repo.update_tag(tag_id, &update).map_err(write_error)
}

/// Deletes a tag. Requires the service role.
pub fn remove_tag<R>(repo: &R, viewer: Option<&Viewer>, tag_id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    require_admin(viewer)?;

    repo.delete_tag(tag_id).map_err(write_error)
}

fn form_error(err: TagFormError) -> ServiceError {
    ServiceError::invalid_field(err.field(), err.to_string())
}

fn write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::AlreadyExists => ServiceError::already_exists(DUPLICATE_TAG),
        RepositoryError::NotFound => ServiceError::not_found("Tag not found."),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::{MockTagReader, MockTagWriter};
    use crate::services::test_support::{sample_tag, viewer};

    fn add_form() -> AddTagForm {
        AddTagForm {
            name: "Breakfast".to_string(),
            color: "#E26C2D".to_string(),
            slug: "breakfast".to_string(),
        }
    }

    #[test]
    fn create_tag_requires_authentication() {
        let repo = MockTagWriter::new();

        let result = create_tag(&repo, None, add_form());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn create_tag_requires_role() {
        let repo = MockTagWriter::new();
        let viewer = viewer(1, false);

        let result = create_tag(&repo, Some(&viewer), add_form());

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn create_tag_persists_sanitized_tag() {
        let mut repo = MockTagWriter::new();
        repo.expect_create_tag()
            .times(1)
            .withf(|new_tag| new_tag.color == "#e26c2d" && new_tag.slug == "breakfast")
            .returning(|_| Ok(sample_tag(1, "breakfast")));
        let viewer = viewer(1, true);

        let tag = create_tag(&repo, Some(&viewer), add_form()).expect("expected success");

        assert_eq!(tag.slug, "breakfast");
    }

    #[test]
    fn duplicate_tag_is_reported() {
        let mut repo = MockTagWriter::new();
        repo.expect_create_tag()
            .returning(|_| Err(RepositoryError::AlreadyExists));
        let viewer = viewer(1, true);

        let result = create_tag(&repo, Some(&viewer), add_form());

        assert!(matches!(result, Err(ServiceError::AlreadyExists(_))));
    }

    #[test]
    fn invalid_color_names_the_field() {
        let repo = MockTagWriter::new();
        let viewer = viewer(1, true);
        let mut form = add_form();
        form.color = "orange".to_string();

        let result = create_tag(&repo, Some(&viewer), form);

        assert!(matches!(
            result,
            Err(ServiceError::InvalidField { ref field, .. }) if field == "color"
        ));
    }

    #[test]
    fn remove_missing_tag_is_not_found() {
        let mut repo = MockTagWriter::new();
        repo.expect_delete_tag()
            .returning(|_| Err(RepositoryError::NotFound));
        let viewer = viewer(1, true);

        let result = remove_tag(&repo, Some(&viewer), 5);

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn get_tag_reports_missing_tag() {
        let mut repo = MockTagReader::new();
        repo.expect_get_tag_by_id().returning(|_| Ok(None));

        assert!(matches!(get_tag(&repo, 3), Err(ServiceError::NotFound(_))));
    }
}
