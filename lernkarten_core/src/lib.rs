#![forbid(unsafe_code)]

//! Core domain model and business logic for Lernkarten study cards.
//!
//! This crate provides:
//! - Domain types (cards, import candidates, review sessions)
//! - Card id generation and import-time duplicate detection
//! - The review deck controller
//! - Persistence (locked card store, review log, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod ident;
pub mod import;
pub mod filter;
pub mod deck;
pub mod store;
pub mod review_log;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use ident::{generate_card_id, topic_abbreviation, IdGenerator, Transliterations};
pub use import::{parse_import_json, FingerprintMode, ImportReport, ImportStrategy, Importer};
pub use filter::CardFilter;
pub use deck::{completion_percentage, DeckSnapshot, Phase, ReviewDeck};
pub use store::{CardCollection, CardStore};
pub use review_log::{JsonlReviewLog, ReviewSink};
pub use history::{load_recent_sessions, summarize, HistorySummary};
pub use export::export_cards_csv;
