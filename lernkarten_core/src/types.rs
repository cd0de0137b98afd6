//! Core domain types for the Lernkarten system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Cards and their closed-but-extensible type and category sets
//! - Import candidates and in-place edits
//! - Recorded review sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Card Type and Category
// ============================================================================

/// Kind of knowledge a card carries.
///
/// Serialized as its German display name. Values this build does not know
/// about are kept verbatim in `Other` so stores written by newer builds still
/// load and round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardType {
    Formel,
    Definition,
    Graph,
    Erklaerung,
    Other(String),
}

impl CardType {
    /// Display name, as stored on disk
    pub fn as_str(&self) -> &str {
        match self {
            CardType::Formel => "Formel",
            CardType::Definition => "Definition",
            CardType::Graph => "Graph",
            CardType::Erklaerung => "Erklärung",
            CardType::Other(s) => s,
        }
    }

    /// Single-letter namespace marker used inside card ids.
    ///
    /// Unknown types fall back to their first character upper-cased, and an
    /// empty type string maps to the filler `X`.
    pub fn initial(&self) -> String {
        match self {
            CardType::Formel => "F".into(),
            CardType::Definition => "D".into(),
            CardType::Graph => "G".into(),
            CardType::Erklaerung => "E".into(),
            CardType::Other(s) => match s.chars().next() {
                Some(c) => c.to_uppercase().collect(),
                None => "X".into(),
            },
        }
    }
}

/// Parse a card type, accepting the German names, an ASCII spelling of
/// "Erklärung" and the English equivalents used by older exports.
impl From<String> for CardType {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "formel" | "formula" => CardType::Formel,
            "definition" => CardType::Definition,
            "graph" => CardType::Graph,
            "erklärung" | "erklaerung" | "explanation" => CardType::Erklaerung,
            _ => CardType::Other(s),
        }
    }
}

impl From<&str> for CardType {
    fn from(s: &str) -> Self {
        CardType::from(s.to_string())
    }
}

impl From<CardType> for String {
    fn from(t: CardType) -> Self {
        match t {
            CardType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Course section a card belongs to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum CardCategory {
    #[default]
    Theorie,
    Klausuraufgaben,
    Other(String),
}

impl CardCategory {
    pub fn as_str(&self) -> &str {
        match self {
            CardCategory::Theorie => "Theorie",
            CardCategory::Klausuraufgaben => "Klausuraufgaben",
            CardCategory::Other(s) => s,
        }
    }
}

impl From<String> for CardCategory {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "theorie" | "theory" => CardCategory::Theorie,
            "klausuraufgaben" | "exam" => CardCategory::Klausuraufgaben,
            _ => CardCategory::Other(s),
        }
    }
}

impl From<&str> for CardCategory {
    fn from(s: &str) -> Self {
        CardCategory::from(s.to_string())
    }
}

impl From<CardCategory> for String {
    fn from(c: CardCategory) -> Self {
        match c {
            CardCategory::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Card Payload
// ============================================================================

/// A formula variable, e.g. `σ` / "Spannung" / "MPa"
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
}

/// Axis labels of a graph card
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Axes {
    pub x: String,
    pub y: String,
}

/// Optional presentation fields, shared by stored cards and import candidates
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct CardDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Axes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_features: Vec<String>,
    /// Data URI of an attached image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub image_needed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
}

/// A study card. `id` is assigned once and never changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(default)]
    pub category: CardCategory,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub details: CardDetails,
}

/// A card that has not been assigned an id yet (single insert or import record)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewCard {
    /// Kept when present and not already taken; generated otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub topic: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Falls back to the configured default category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CardCategory>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub details: CardDetails,
}

impl NewCard {
    /// Minimal candidate with only the fields duplicate detection looks at
    pub fn new(title: impl Into<String>, topic: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: None,
            topic: topic.into(),
            card_type,
            category: None,
            title: title.into(),
            content: String::new(),
            details: CardDetails::default(),
        }
    }

    /// First required field (title, topic, type) that is blank, if any
    pub fn blank_field(&self) -> Option<&'static str> {
        [
            ("title", self.title.as_str()),
            ("topic", self.topic.as_str()),
            ("type", self.card_type.as_str()),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }

    /// Category this candidate will be stored under
    pub fn resolved_category(&self, default_category: &CardCategory) -> CardCategory {
        self.category.clone().unwrap_or_else(|| default_category.clone())
    }

    /// Turn the candidate into a stored card under the given id
    pub fn into_card(self, id: String, default_category: &CardCategory) -> Card {
        let category = self.resolved_category(default_category);
        Card {
            id,
            topic: self.topic,
            card_type: self.card_type,
            category,
            title: self.title,
            content: self.content,
            details: self.details,
        }
    }
}

/// In-place edit of a stored card. `None` leaves a field untouched.
///
/// There is deliberately no id field: changing topic or type keeps the id.
#[derive(Clone, Debug, Default)]
pub struct CardPatch {
    pub topic: Option<String>,
    pub card_type: Option<CardType>,
    pub category: Option<CardCategory>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub latex: Option<String>,
    pub image_needed: Option<bool>,
}

impl CardPatch {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.card_type.is_none()
            && self.category.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.latex.is_none()
            && self.image_needed.is_none()
    }

    /// Apply the edit to a card
    pub fn apply(self, card: &mut Card) {
        if let Some(topic) = self.topic {
            card.topic = topic;
        }
        if let Some(card_type) = self.card_type {
            card.card_type = card_type;
        }
        if let Some(category) = self.category {
            card.category = category;
        }
        if let Some(title) = self.title {
            card.title = title;
        }
        if let Some(content) = self.content {
            card.content = content;
        }
        if let Some(latex) = self.latex {
            card.details.latex = if latex.is_empty() { None } else { Some(latex) };
        }
        if let Some(image_needed) = self.image_needed {
            card.details.image_needed = image_needed;
        }
    }
}

// ============================================================================
// Review Sessions
// ============================================================================

/// A finished drill session, as appended to the review log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub card_count: usize,
    pub known_count: usize,
    pub total_seen: usize,
    pub percentage: u32,
}
