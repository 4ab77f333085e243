use serde::Serialize;

use crate::domain::ingredient::{
    Ingredient, IngredientListQuery, rank_by_name_match, translate_keyboard_layout,
    unquote_search_term,
};
use crate::domain::user::Viewer;
use crate::forms::ingredients::{UploadIngredientsForm, parse_ingredients};
use crate::repository::{IngredientReader, IngredientWriter};
use crate::services::{ServiceError, ServiceResult, require_admin};

/// Outcome of a bulk ingredient import.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows read from the file.
    pub parsed: usize,
    /// Rows that were not stored before.
    pub inserted: usize,
}

/// Ingredients whose name contains `name`, prefix matches first.
///
/// Without a term the whole reference set is returned ordered by name. A term
/// starting with `%` is percent-decoded first. When nothing matches, the term
/// is retried as if typed with the Russian keyboard layout.
pub fn search_ingredients<R>(repo: &R, name: Option<&str>) -> ServiceResult<Vec<Ingredient>>
where
    R: IngredientReader + ?Sized,
{
    let term = name
        .map(|name| unquote_search_term(name.trim()))
        .filter(|term| !term.trim().is_empty());

    let Some(term) = term else {
        return repo
            .list_ingredients(IngredientListQuery::new())
            .map_err(ServiceError::from);
    };

    let matches = search_by_term(repo, &term)?;
    if !matches.is_empty() {
        return Ok(matches);
    }

    match translate_keyboard_layout(&term) {
        Some(retyped) => search_by_term(repo, &retyped),
        None => Ok(matches),
    }
}

fn search_by_term<R>(repo: &R, term: &str) -> ServiceResult<Vec<Ingredient>>
where
    R: IngredientReader + ?Sized,
{
    let candidates = repo.list_ingredients(IngredientListQuery::new().search(term))?;
    Ok(rank_by_name_match(term, candidates))
}

pub fn get_ingredient<R>(repo: &R, ingredient_id: i32) -> ServiceResult<Ingredient>
where
    R: IngredientReader + ?Sized,
{
    repo.get_ingredient_by_id(ingredient_id)?
        .ok_or_else(|| ServiceError::not_found("Ingredient not found."))
}

/// Imports a CSV or JSON ingredient list. Already known ingredients are skipped.
pub fn import_ingredients<R>(repo: &R, bytes: &[u8]) -> ServiceResult<ImportSummary>
where
    R: IngredientWriter + ?Sized,
{
    let ingredients =
        parse_ingredients(bytes).map_err(|err| ServiceError::invalid_field("file", err.to_string()))?;

    let inserted = repo.upsert_ingredients(&ingredients)?;
    log::info!(
        "Imported ingredients: {} parsed, {} inserted",
        ingredients.len(),
        inserted
    );

    Ok(ImportSummary {
        parsed: ingredients.len(),
        inserted,
    })
}

/// Imports an uploaded ingredient file. Requires the service role.
pub fn upload_ingredients<R>(
    repo: &R,
    viewer: Option<&Viewer>,
    mut form: UploadIngredientsForm,
) -> ServiceResult<ImportSummary>
where
    R: IngredientWriter + ?Sized,
{
    require_admin(viewer)?;

    let ingredients = form
        .parse()
        .map_err(|err| ServiceError::invalid_field("file", err.to_string()))?;

    let inserted = repo.upsert_ingredients(&ingredients)?;
    log::info!(
        "Uploaded ingredients: {} parsed, {} inserted",
        ingredients.len(),
        inserted
    );

    Ok(ImportSummary {
        parsed: ingredients.len(),
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Seek, SeekFrom, Write};

    use actix_multipart::form::tempfile::TempFile;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::repository::mock::{MockIngredientReader, MockIngredientWriter};
    use crate::services::test_support::{sample_ingredient, viewer};

    fn build_upload_form(contents: &str) -> UploadIngredientsForm {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write upload contents");
        file.as_file_mut()
            .seek(SeekFrom::Start(0))
            .expect("rewind upload");

        UploadIngredientsForm {
            file: TempFile {
                file,
                content_type: None,
                file_name: Some("ingredients.csv".to_string()),
                size: contents.len(),
            },
        }
    }

    #[test]
    fn search_ranks_prefix_matches_first() {
        let mut repo = MockIngredientReader::new();
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.as_deref() == Some("sal"))
            .returning(|_| {
                Ok(vec![
                    sample_ingredient(1, "Green salad", "g"),
                    sample_ingredient(2, "Salad", "g"),
                    sample_ingredient(3, "Salt", "g"),
                    sample_ingredient(4, "Sea salt", "g"),
                ])
            });

        let items = search_ingredients(&repo, Some(" Sal")).expect("expected success");

        let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Salad", "Salt", "Green salad", "Sea salt"]);
    }

    #[test]
    fn search_retries_with_russian_layout_when_nothing_matches() {
        let mut repo = MockIngredientReader::new();
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.as_deref() == Some("cjkm"))
            .returning(|_| Ok(vec![]));
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.as_deref() == Some("соль"))
            .returning(|_| Ok(vec![sample_ingredient(5, "Соль", "г")]));

        let items = search_ingredients(&repo, Some("Cjkm")).expect("expected success");

        let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Соль"]);
    }

    #[test]
    fn literal_matches_skip_the_layout_retry() {
        let mut repo = MockIngredientReader::new();
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.as_deref() == Some("rice"))
            .returning(|_| Ok(vec![sample_ingredient(1, "Rice", "g")]));

        let items = search_ingredients(&repo, Some("rice")).expect("expected success");

        assert_eq!(items.len(), 1);
    }

    #[test]
    fn percent_encoded_search_is_decoded() {
        let mut repo = MockIngredientReader::new();
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.as_deref() == Some("соль"))
            .returning(|_| Ok(vec![sample_ingredient(5, "Соль", "г")]));

        let items =
            search_ingredients(&repo, Some("%D1%81%D0%BE%D0%BB%D1%8C")).expect("expected success");

        assert_eq!(items.len(), 1);
    }

    #[test]
    fn empty_search_returns_everything() {
        let mut repo = MockIngredientReader::new();
        repo.expect_list_ingredients()
            .times(1)
            .withf(|query| query.search.is_none())
            .returning(|_| Ok(vec![sample_ingredient(1, "Basil", "g")]));

        let items = search_ingredients(&repo, Some("  ")).expect("expected success");

        assert_eq!(items.len(), 1);
    }

    #[test]
    fn import_reports_inserted_rows() {
        let mut repo = MockIngredientWriter::new();
        repo.expect_upsert_ingredients()
            .times(1)
            .withf(|items| items.len() == 2)
            .returning(|_| Ok(1));

        let summary = import_ingredients(&repo, b"Salt,g\nMilk,ml\n").expect("expected success");

        assert_eq!(
            summary,
            ImportSummary {
                parsed: 2,
                inserted: 1
            }
        );
    }

    #[test]
    fn malformed_import_names_the_file_field() {
        let repo = MockIngredientWriter::new();

        let result = import_ingredients(&repo, b"Salt\n");

        assert!(matches!(
            result,
            Err(ServiceError::InvalidField { ref field, .. }) if field == "file"
        ));
    }

    #[test]
    fn upload_requires_role() {
        let repo = MockIngredientWriter::new();
        let viewer = viewer(1, false);

        let result = upload_ingredients(&repo, Some(&viewer), build_upload_form("Salt,g\n"));

        assert!(matches!(result, Err(ServiceError::Forbidden)));
    }

    #[test]
    fn upload_parses_and_stores_file() {
        let mut repo = MockIngredientWriter::new();
        repo.expect_upsert_ingredients()
            .times(1)
            .returning(|items| Ok(items.len()));
        let viewer = viewer(1, true);

        let summary = upload_ingredients(
            &repo,
            Some(&viewer),
            build_upload_form("name,measurement_unit\nSalt,g\nRice,g\n"),
        )
        .expect("expected success");

        assert_eq!(summary.inserted, 2);
    }
}
