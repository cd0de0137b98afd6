//! Import of candidate cards with fingerprint-based duplicate detection.
//!
//! A fingerprint joins title, topic and type (optionally category) with a
//! sentinel. Fingerprint hits are advisory: with [`ImportStrategy::ReplaceAll`]
//! duplicates are imported anyway under a fresh id.

use crate::ident::IdGenerator;
use crate::{Card, CardCategory, CardType, Error, NewCard, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// Joins fingerprint fields. Not escaped: a field containing it can collide.
pub const FINGERPRINT_SEPARATOR: &str = "|||";

/// Which fields make up a fingerprint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FingerprintMode {
    /// title, topic, type
    #[default]
    Basic,
    /// title, topic, type, category
    CategoryAware,
}

/// What to do with candidates whose fingerprint is already present
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ImportStrategy {
    #[default]
    SkipDuplicates,
    ReplaceAll,
}

/// Outcome of an import pass
#[derive(Clone, Debug, Default)]
pub struct ImportReport {
    pub imported_count: usize,
    pub duplicate_count: usize,
    pub imported_cards: Vec<Card>,
}

/// Build a fingerprint from its parts
pub fn fingerprint(
    title: &str,
    topic: &str,
    card_type: &CardType,
    category: &CardCategory,
    mode: FingerprintMode,
) -> String {
    let mut parts = vec![title, topic, card_type.as_str()];
    if mode == FingerprintMode::CategoryAware {
        parts.push(category.as_str());
    }
    parts.join(FINGERPRINT_SEPARATOR)
}

impl Card {
    pub fn fingerprint(&self, mode: FingerprintMode) -> String {
        fingerprint(
            &self.title,
            &self.topic,
            &self.card_type,
            &self.category,
            mode,
        )
    }
}

/// Settings for one import pass
#[derive(Clone, Debug)]
pub struct Importer<'a> {
    pub generator: &'a IdGenerator,
    pub strategy: ImportStrategy,
    pub mode: FingerprintMode,
    pub default_category: CardCategory,
}

impl<'a> Importer<'a> {
    pub fn new(generator: &'a IdGenerator) -> Self {
        Self {
            generator,
            strategy: ImportStrategy::default(),
            mode: FingerprintMode::default(),
            default_category: CardCategory::default(),
        }
    }

    pub fn strategy(mut self, strategy: ImportStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(mut self, mode: FingerprintMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn default_category(mut self, category: CardCategory) -> Self {
        self.default_category = category;
        self
    }

    /// Classify and convert candidates against the current collection.
    ///
    /// `reserved_ids` are ids that must never be handed out again even
    /// though no card carries them any more. Candidates are assumed to be
    /// well-formed (see [`parse_import_json`]). Never fails.
    pub fn import<S: AsRef<str>>(
        &self,
        candidates: Vec<NewCard>,
        existing: &[Card],
        reserved_ids: &[S],
    ) -> ImportReport {
        let known: HashSet<String> = existing.iter().map(|c| c.fingerprint(self.mode)).collect();
        let mut id_pool: HashSet<String> = existing
            .iter()
            .map(|c| c.id.clone())
            .chain(reserved_ids.iter().map(|id| id.as_ref().to_string()))
            .collect();

        let mut report = ImportReport::default();

        for candidate in candidates {
            let category = candidate.resolved_category(&self.default_category);
            let print = fingerprint(
                &candidate.title,
                &candidate.topic,
                &candidate.card_type,
                &category,
                self.mode,
            );

            if known.contains(&print) {
                report.duplicate_count += 1;
                if self.strategy == ImportStrategy::SkipDuplicates {
                    tracing::debug!("Skipping duplicate card {:?}", candidate.title);
                    continue;
                }
            }

            let id = match candidate.id.as_deref() {
                Some(id) if !id.trim().is_empty() && !id_pool.contains(id) => id.to_string(),
                _ => self
                    .generator
                    .generate(&candidate.topic, &candidate.card_type, &id_pool),
            };
            id_pool.insert(id.clone());

            tracing::debug!("Importing card {} ({:?})", id, candidate.title);
            report.imported_cards.push(candidate.into_card(id, &self.default_category));
            report.imported_count += 1;
        }

        tracing::info!(
            "Import pass: {} imported, {} duplicates",
            report.imported_count,
            report.duplicate_count
        );
        report
    }
}

/// Accepted top-level shapes of an import document
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    List(Vec<serde_json::Value>),
    Wrapped { cards: Vec<serde_json::Value> },
}

/// Parse a JSON import document into validated candidates.
///
/// Accepts a bare array or `{"cards": [...]}`. A record that does not
/// deserialize, or has a blank title, topic or type, rejects the whole
/// document with an error naming the record.
pub fn parse_import_json(input: &str) -> Result<Vec<NewCard>> {
    let records = match serde_json::from_str::<ImportDocument>(input)? {
        ImportDocument::List(records) => records,
        ImportDocument::Wrapped { cards } => cards,
    };

    let mut candidates = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let candidate: NewCard = serde_json::from_value(record)
            .map_err(|e| Error::Import(format!("record {}: {}", index + 1, e)))?;

        if let Some(field) = candidate.blank_field() {
            return Err(Error::Import(format!(
                "record {}: field '{}' must not be empty",
                index + 1,
                field
            )));
        }
        candidates.push(candidate);
    }

    tracing::debug!("Parsed {} import records", candidates.len());
    Ok(candidates)
}
