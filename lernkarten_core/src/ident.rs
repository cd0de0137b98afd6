//! Card identifier generation.
//!
//! Ids look like `ZUG-F-001`: a three-letter topic abbreviation, the type
//! initial, and a per-prefix sequence number. The sequence is derived by
//! scanning every id already in use and taking the maximum, so ids imported
//! out of band with gaps are respected.

use crate::{CardType, Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Length of the topic abbreviation
pub const ABBREVIATION_LEN: usize = 3;

/// Pads abbreviations of topics with fewer than three usable letters
pub const FILLER: char = 'X';

/// Minimum width of the zero-padded sequence number
const SEQUENCE_WIDTH: usize = 3;

/// Cached default generator, built once from the German table
static DEFAULT_GENERATOR: Lazy<IdGenerator> =
    Lazy::new(|| IdGenerator::new(Transliterations::german()));

/// Substitution table applied to topics before non-ASCII letters are dropped
#[derive(Clone, Debug)]
pub struct Transliterations {
    table: HashMap<char, String>,
}

impl Transliterations {
    /// An empty table: every non-ASCII letter is dropped
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Umlauts and sharp s, mapped to their plain uppercase base letter
    pub fn german() -> Self {
        Self::empty()
            .with('ä', "A")
            .with('ö', "O")
            .with('ü', "U")
            .with('Ä', "A")
            .with('Ö', "O")
            .with('Ü', "U")
            .with('ß', "S")
    }

    /// Add or replace a single entry
    pub fn with(mut self, from: char, to: impl Into<String>) -> Self {
        self.table.insert(from, to.into());
        self
    }

    /// Merge entries keyed by strings, as they come out of the config file.
    ///
    /// Keys must be exactly one character.
    pub fn extend_from_config(mut self, entries: &HashMap<String, String>) -> Result<Self> {
        for (from, to) in entries {
            let mut chars = from.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    self.table.insert(c, to.clone());
                }
                _ => {
                    return Err(Error::Config(format!(
                        "transliteration key {:?} must be a single character",
                        from
                    )))
                }
            }
        }
        Ok(self)
    }

    fn apply(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            match self.table.get(&c) {
                Some(replacement) => out.push_str(replacement),
                None => out.push(c),
            }
        }
        out
    }
}

impl Default for Transliterations {
    fn default() -> Self {
        Self::german()
    }
}

/// Derives card ids from topic and type
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    transliterations: Transliterations,
}

impl IdGenerator {
    pub fn new(transliterations: Transliterations) -> Self {
        Self { transliterations }
    }

    /// Three uppercase ASCII letters identifying a topic.
    ///
    /// Known special letters are transliterated, everything that is not an
    /// ASCII letter is dropped, and short results are padded with `X`.
    pub fn topic_abbreviation(&self, topic: &str) -> String {
        let mut abbr: String = self
            .transliterations
            .apply(topic)
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_uppercase())
            .take(ABBREVIATION_LEN)
            .collect();

        while abbr.len() < ABBREVIATION_LEN {
            abbr.push(FILLER);
        }
        abbr
    }

    /// Namespace shared by every card with this topic abbreviation and type
    pub fn prefix(&self, topic: &str, card_type: &CardType) -> String {
        format!(
            "{}-{}-",
            self.topic_abbreviation(topic),
            card_type.initial()
        )
    }

    /// Next free id for `topic`/`card_type`, given every id currently in use.
    ///
    /// Never fails. When generating several ids in one pass, each result must
    /// be added to `existing` before the next call.
    pub fn generate<I, S>(&self, topic: &str, card_type: &CardType, existing: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefix = self.prefix(topic, card_type);
        let max = existing
            .into_iter()
            .filter_map(|id| sequence_number(id.as_ref(), &prefix))
            .max()
            .unwrap_or(0);

        let id = format!(
            "{}{:0width$}",
            prefix,
            max.saturating_add(1),
            width = SEQUENCE_WIDTH
        );
        tracing::trace!("Generated id {} (previous max {})", id, max);
        id
    }
}

/// Sequence number of `id` under `prefix`, if the remainder is all digits
fn sequence_number(id: &str, prefix: &str) -> Option<u64> {
    let suffix = id.strip_prefix(prefix)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Values beyond u64 are treated like any other unparsable suffix
    suffix.parse().ok()
}

/// Ordering key that sorts `ZUG-F-999` before `ZUG-F-1000`.
///
/// Ids not shaped like `<prefix>-<digits>` sort by their raw text.
pub fn id_sort_key(id: &str) -> (&str, u64, &str) {
    match id.rfind('-') {
        Some(pos) => {
            let (prefix, rest) = id.split_at(pos + 1);
            match sequence_number(rest, "") {
                Some(seq) => (prefix, seq, id),
                None => (id, 0, id),
            }
        }
        None => (id, 0, id),
    }
}

/// Topic abbreviation using the default German table
pub fn topic_abbreviation(topic: &str) -> String {
    DEFAULT_GENERATOR.topic_abbreviation(topic)
}

/// Generate an id using the default German table
pub fn generate_card_id<I, S>(topic: &str, card_type: &CardType, existing: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    DEFAULT_GENERATOR.generate(topic, card_type, existing)
}
