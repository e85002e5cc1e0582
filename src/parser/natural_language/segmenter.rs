//! Keyword-based field segmentation
//!
//! Splits the text left over after date/time removal into a title, an
//! optional location and an optional description. This is a heuristic, not a
//! grammar: the first indicator word of each kind wins.

use crate::event::UNTITLED_EVENT;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_LOCATION_INDICATORS: &[&str] =
    &["at", "in", "on", "location", "place", "room", "address"];

pub const DEFAULT_DESCRIPTION_INDICATORS: &[&str] =
    &["about", "regarding", "for", "desc", "details", "re"];

/// Which field an indicator word introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Location,
    Description,
}

/// Mapping from (stemmed) indicator word to the field it introduces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorTable {
    words: HashMap<String, FieldKind>,
}

impl Default for IndicatorTable {
    fn default() -> Self {
        Self::from_lists(DEFAULT_LOCATION_INDICATORS, DEFAULT_DESCRIPTION_INDICATORS)
    }
}

impl IndicatorTable {
    pub fn from_lists<L, D>(location: &[L], description: &[D]) -> Self
    where
        L: AsRef<str>,
        D: AsRef<str>,
    {
        let mut table = Self { words: HashMap::new() };
        for word in location {
            table.insert(word.as_ref(), FieldKind::Location);
        }
        for word in description {
            table.insert(word.as_ref(), FieldKind::Description);
        }
        table
    }

    /// Register an indicator. A word already present keeps its first kind.
    pub fn insert(&mut self, word: &str, kind: FieldKind) {
        let stem = stem(word);
        if !stem.is_empty() {
            self.words.entry(stem).or_insert(kind);
        }
    }

    pub fn kind_of(&self, token: &str) -> Option<FieldKind> {
        self.words.get(&stem(token)).copied()
    }
}

/// Title, location and description pulled out of free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FieldSegmenter {
    indicators: IndicatorTable,
    untitled: String,
}

impl Default for FieldSegmenter {
    fn default() -> Self {
        Self::new(IndicatorTable::default())
    }
}

impl FieldSegmenter {
    pub fn new(indicators: IndicatorTable) -> Self {
        Self { indicators, untitled: UNTITLED_EVENT.to_string() }
    }

    /// Use a different placeholder when no title is left
    pub fn with_untitled(mut self, untitled: impl Into<String>) -> Self {
        self.untitled = untitled.into();
        self
    }

    pub fn segment(&self, remaining: &str) -> Segments {
        let tokens: Vec<&str> = remaining.split_whitespace().collect();

        let location_at = self.first_indicator(&tokens, FieldKind::Location);
        let description_at = self.first_indicator(&tokens, FieldKind::Description);

        // A field runs until the other kind's indicator or the end of the text
        let field_end = |start: usize, other: Option<usize>| match other {
            Some(other) if other > start => other,
            _ => tokens.len(),
        };

        let mut taken = vec![false; tokens.len()];
        let mut take = |start: Option<usize>, other: Option<usize>| -> Option<String> {
            let start = start?;
            let end = field_end(start, other);
            taken[start..end].iter_mut().for_each(|t| *t = true);
            let value = tokens[start + 1..end].join(" ");
            let value = value.trim_matches(|c: char| c == ',' || c.is_whitespace()).to_string();
            (!value.is_empty()).then_some(value)
        };

        let location = take(location_at, description_at);
        let description = take(description_at, location_at);

        let title = tokens
            .iter()
            .zip(&taken)
            .filter(|(_, taken)| !**taken)
            .map(|(token, _)| *token)
            .collect::<Vec<_>>()
            .join(" ");
        let title = title.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace());
        let title = if title.is_empty() { self.untitled.clone() } else { title.to_string() };

        debug!("Segmented '{}' -> title '{}', location {:?}, description {:?}", remaining, title, location, description);

        Segments { title, location, description }
    }

    /// Position of the first indicator of `kind` that still has a value after it
    fn first_indicator(&self, tokens: &[&str], kind: FieldKind) -> Option<usize> {
        tokens
            .iter()
            .position(|token| self.indicators.kind_of(token) == Some(kind))
            .filter(|&i| i + 1 < tokens.len())
    }
}

/// Light stemmer: case folding, edge punctuation and common suffixes
///
/// Enough to treat "meeting"/"meet" or "rooms"/"room" as the same word.
pub fn stem(word: &str) -> String {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    let keep = |rest: &str| rest.chars().count() >= 3;

    if let Some(rest) = word.strip_suffix("ing").filter(|r| keep(r)) {
        return rest.to_string();
    }
    if let Some(rest) = word.strip_suffix("ed").filter(|r| keep(r)) {
        return rest.to_string();
    }
    if let Some(rest) = word.strip_suffix("es").filter(|r| keep(r)) {
        if ["s", "x", "z", "ch", "sh"].iter().any(|s| rest.ends_with(s)) {
            return rest.to_string();
        }
    }
    if let Some(rest) = word.strip_suffix('s').filter(|r| keep(r) && !r.ends_with('s')) {
        return rest.to_string();
    }
    word
}
