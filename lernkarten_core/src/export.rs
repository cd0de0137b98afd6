//! CSV export of cards.
//!
//! Writes the flat card fields; nested payload (variables, axes, images) is
//! left to the JSON store.

use crate::{Card, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    topic: &'a str,
    #[serde(rename = "type")]
    card_type: &'a str,
    category: &'a str,
    title: &'a str,
    content: &'a str,
    latex: Option<&'a str>,
    result_unit: Option<&'a str>,
    image_needed: bool,
}

impl<'a> From<&'a Card> for CsvRow<'a> {
    fn from(card: &'a Card) -> Self {
        CsvRow {
            id: &card.id,
            topic: &card.topic,
            card_type: card.card_type.as_str(),
            category: card.category.as_str(),
            title: &card.title,
            content: &card.content,
            latex: card.details.latex.as_deref(),
            result_unit: card.details.result_unit.as_deref(),
            image_needed: card.details.image_needed,
        }
    }
}

/// Write cards to a new CSV file (replacing any existing one) and fsync it.
///
/// Returns the number of rows written.
pub fn export_cards_csv<'a, I>(cards: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Card>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(File::create(path)?);

    let mut count = 0;
    for card in cards {
        writer.serialize(CsvRow::from(card))?;
        count += 1;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} cards to {:?}", count, path);
    Ok(count)
}
