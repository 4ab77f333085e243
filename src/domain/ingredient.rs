use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Reference ingredient identified by its name and measurement unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

/// Payload used when importing reference ingredients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
    /// Lowercased name used for case-insensitive lookups.
    pub search_name: String,
}

impl NewIngredient {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        let measurement_unit = measurement_unit.into().trim().to_string();
        let search_name = normalize_search_term(&name);
        Self {
            name,
            measurement_unit,
            search_name,
        }
    }
}

/// Query definition used to list ingredients.
#[derive(Debug, Clone, Default)]
pub struct IngredientListQuery {
    /// Lowercased substring the ingredient name must contain.
    pub search: Option<String>,
}

impl IngredientListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the results to names containing `term`, ignoring case.
    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(normalize_search_term(term));
        self
    }
}

/// Lowercases and trims a name or query so that lookups ignore case.
pub fn normalize_search_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Latin keys and the Cyrillic letters found on the same keys of a Russian
/// keyboard layout.
const LATIN_KEYS: &str = "qwertyuiop[]asdfghjkl;'zxcvbnm,./";
const CYRILLIC_KEYS: &str = "йцукенгшщзхъфывапролджэячсмитьбю.";

/// Decodes a term that arrives percent-encoded, recognised by a leading `%`.
///
/// Terms that do not start with `%` or fail to decode are returned unchanged.
pub fn unquote_search_term(term: &str) -> String {
    if !term.starts_with('%') {
        return term.to_string();
    }
    urlencoding::decode(term)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| term.to_string())
}

/// Retypes a lowercased term as if it had been entered with the Russian
/// keyboard layout active. `None` when no character changes.
pub fn translate_keyboard_layout(term: &str) -> Option<String> {
    let lowered = normalize_search_term(term);
    let mut changed = false;
    let translated: String = lowered
        .chars()
        .map(|ch| {
            match LATIN_KEYS
                .chars()
                .zip(CYRILLIC_KEYS.chars())
                .find(|(latin, _)| *latin == ch)
            {
                Some((_, cyrillic)) if cyrillic != ch => {
                    changed = true;
                    cyrillic
                }
                _ => ch,
            }
        })
        .collect();

    changed.then_some(translated)
}

/// Orders ingredient matches for `query`: names starting with the query come
/// first, followed by the remaining names that merely contain it.
///
/// `candidates` are expected in name-ascending order; that order is kept within
/// each group. Candidates that do not contain the query are dropped and an
/// ingredient is never returned twice.
pub fn rank_by_name_match(query: &str, candidates: Vec<Ingredient>) -> Vec<Ingredient> {
    let needle = normalize_search_term(query);
    if needle.is_empty() {
        return candidates;
    }

    let mut seen = HashSet::new();
    let mut starts_with = Vec::new();
    let mut contains = Vec::new();

    for ingredient in candidates {
        if !seen.insert(ingredient.id) {
            continue;
        }
        let haystack = normalize_search_term(&ingredient.name);
        if haystack.starts_with(&needle) {
            starts_with.push(ingredient);
        } else if haystack.contains(&needle) {
            contains.push(ingredient);
        }
    }

    starts_with.extend(contains);
    starts_with
}
