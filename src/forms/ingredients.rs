use std::io::{Cursor, Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{StringRecord, Trim};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::ingredient::NewIngredient;
use crate::forms::sanitize_inline_text;

/// Result type returned by the ingredient import helpers.
pub type IngredientImportResult<T> = Result<T, IngredientImportError>;

/// Errors raised while parsing an ingredient import file.
#[derive(Debug, Error)]
pub enum IngredientImportError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("row {row} is missing an ingredient name")]
    MissingName { row: usize },
    #[error("row {row} is missing a measurement unit")]
    MissingUnit { row: usize },
    #[error("upload contains no ingredients")]
    EmptyUpload,
}

#[derive(MultipartForm)]
/// Multipart form carrying a CSV or JSON ingredient list.
pub struct UploadIngredientsForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

impl UploadIngredientsForm {
    /// Parse the uploaded file, choosing the format from its content.
    pub fn parse(&mut self) -> IngredientImportResult<Vec<NewIngredient>> {
        self.file.file.rewind()?;
        let mut bytes = Vec::new();
        self.file.file.read_to_end(&mut bytes)?;
        parse_ingredients(&bytes)
    }
}

/// Parses a JSON array when the payload starts with `[`, CSV otherwise.
pub fn parse_ingredients(bytes: &[u8]) -> IngredientImportResult<Vec<NewIngredient>> {
    let is_json = bytes
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|&byte| byte == b'[');

    let ingredients = if is_json {
        parse_ingredients_json(bytes)?
    } else {
        parse_ingredients_csv(Cursor::new(bytes))?
    };

    if ingredients.is_empty() {
        return Err(IngredientImportError::EmptyUpload);
    }

    Ok(ingredients)
}

/// Reads `name,measurement_unit` rows. A leading header row is skipped.
pub fn parse_ingredients_csv<R: Read>(reader: R) -> IngredientImportResult<Vec<NewIngredient>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut ingredients = Vec::new();

    for (index, row) in csv_reader.records().enumerate() {
        let record = row?;
        let row_number = record
            .position()
            .map_or(index + 1, |position| position.line() as usize);

        if is_blank(&record) || (index == 0 && is_header(&record)) {
            continue;
        }

        let name = record.get(0).unwrap_or_default();
        let unit = record.get(1).unwrap_or_default();
        ingredients.push(build_ingredient(row_number, name, unit)?);
    }

    Ok(ingredients)
}

#[derive(Deserialize)]
struct IngredientRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    measurement_unit: String,
}

/// Reads a JSON array of `{"name": .., "measurement_unit": ..}` objects.
pub fn parse_ingredients_json(bytes: &[u8]) -> IngredientImportResult<Vec<NewIngredient>> {
    let records: Vec<IngredientRecord> = serde_json::from_slice(bytes)?;

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            !(record.name.trim().is_empty() && record.measurement_unit.trim().is_empty())
        })
        .map(|(index, record)| build_ingredient(index + 1, &record.name, &record.measurement_unit))
        .collect()
}

fn build_ingredient(row: usize, name: &str, unit: &str) -> IngredientImportResult<NewIngredient> {
    let name = sanitize_inline_text(name);
    if name.is_empty() {
        return Err(IngredientImportError::MissingName { row });
    }

    let unit = sanitize_inline_text(unit);
    if unit.is_empty() {
        return Err(IngredientImportError::MissingUnit { row });
    }

    Ok(NewIngredient::new(name, unit))
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.is_empty())
}

fn is_header(record: &StringRecord) -> bool {
    matches!(
        (record.get(0), record.get(1)),
        (Some(name), Some(unit))
            if name.eq_ignore_ascii_case("name") && unit.eq_ignore_ascii_case("measurement_unit")
    )
}
