//! Exercise catalog with localized display names
//!
//! FitNotes has no translation table; localized names live in the exercise
//! notes as lines like `i18n/pt: supino reto`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::ExerciseRow;

pub const FALLBACK_LANGUAGE: &str = "en";
const I18N_PREFIX: &str = "i18n/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseNames {
    /// Lower-case language code to title-cased name
    pub localized: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseCatalog {
    exercises: BTreeMap<i64, ExerciseNames>,
}

impl ExerciseCatalog {
    pub fn from_rows(rows: &[ExerciseRow]) -> Self {
        let exercises = rows
            .iter()
            .map(|row| (row.id, names_for(row)))
            .collect();
        Self { exercises }
    }

    /// Name in `language`, else English, else `#<id>` for unknown exercises
    pub fn display_name(&self, exercise_id: i64, language: &str) -> String {
        let language = language.to_lowercase();
        self.exercises
            .get(&exercise_id)
            .and_then(|names| {
                names
                    .localized
                    .get(&language)
                    .or_else(|| names.localized.get(FALLBACK_LANGUAGE))
            })
            .cloned()
            .unwrap_or_else(|| format!("#{}", exercise_id))
    }

    /// Ids whose name in any language contains `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<i64> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.exercises
            .iter()
            .filter(|(_, names)| {
                names
                    .localized
                    .values()
                    .any(|name| name.to_lowercase().contains(&needle))
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// All known exercise ids, ascending
    pub fn ids(&self) -> Vec<i64> {
        self.exercises.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

fn names_for(row: &ExerciseRow) -> ExerciseNames {
    let mut localized: BTreeMap<String, String> = row
        .notes
        .as_deref()
        .map(|notes| notes.lines().filter_map(parse_i18n_line).collect())
        .unwrap_or_default();

    if !localized.contains_key(FALLBACK_LANGUAGE) {
        if let Some(name) = row.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            localized.insert(FALLBACK_LANGUAGE.to_string(), title_case(name));
        }
    }

    ExerciseNames { localized }
}

/// Parse `i18n/<lang>[:]* <value>`; the prefix is case-insensitive and at
/// least one whitespace must separate the language from the value.
pub fn parse_i18n_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    let prefix = line.get(..I18N_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(I18N_PREFIX) {
        return None;
    }
    let rest = &line[I18N_PREFIX.len()..];

    let lang_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if lang_end == 0 {
        return None;
    }
    let (lang, rest) = rest.split_at(lang_end);

    let rest = rest.trim_start_matches(':');
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let value = rest.trim();
    if value.is_empty() {
        return None;
    }

    Some((lang.to_lowercase(), title_case(value)))
}

/// Upper-case the first character of each whitespace-separated word and
/// lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
