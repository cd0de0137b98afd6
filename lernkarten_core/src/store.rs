//! Card store persistence with file locking.
//!
//! Cards live in a single JSON document next to a `cards.lock` file. Readers
//! take a shared lock; every mutation runs load → modify → save under one
//! exclusive lock, so "read all ids, generate, write" is atomic across
//! processes and two concurrent imports cannot hand out the same id.

use crate::ident::IdGenerator;
use crate::import::{ImportReport, Importer};
use crate::{Card, CardCategory, CardPatch, Error, NewCard, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const CARDS_FILE: &str = "cards.json";
const LOCK_FILE: &str = "cards.lock";

/// Every stored card plus the ids of deleted ones
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CardCollection {
    #[serde(default)]
    pub cards: Vec<Card>,

    /// Ids of deleted cards. They stay in the id pool so sequence numbers are
    /// never handed out twice.
    #[serde(default)]
    pub retired_ids: Vec<String>,
}

impl CardCollection {
    /// Every id that must not be generated again
    pub fn id_pool(&self) -> impl Iterator<Item = &str> {
        self.cards
            .iter()
            .map(|c| c.id.as_str())
            .chain(self.retired_ids.iter().map(String::as_str))
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Store a single new card, assigning an id unless a free one is supplied.
    ///
    /// No duplicate check: fingerprints only matter during import.
    pub fn insert(
        &mut self,
        new_card: NewCard,
        generator: &IdGenerator,
        default_category: &CardCategory,
    ) -> &Card {
        let id = match new_card.id.as_deref() {
            Some(id) if !id.trim().is_empty() && !self.id_pool().any(|used| used == id) => {
                id.to_string()
            }
            _ => generator.generate(&new_card.topic, &new_card.card_type, self.id_pool()),
        };

        tracing::info!("Inserted card {}", id);
        self.cards.push(new_card.into_card(id, default_category));
        &self.cards[self.cards.len() - 1]
    }

    /// Run an import pass against this collection and keep the imported cards
    pub fn import(&mut self, candidates: Vec<NewCard>, importer: &Importer<'_>) -> ImportReport {
        let report = importer.import(candidates, &self.cards, &self.retired_ids);
        self.cards.extend(report.imported_cards.iter().cloned());
        report
    }

    /// Edit a card in place. The id never changes.
    pub fn update(&mut self, id: &str, patch: CardPatch) -> Result<&Card> {
        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::CardNotFound(id.to_string()))?;
        patch.apply(card);
        tracing::info!("Updated card {}", id);
        Ok(&*card)
    }

    /// Remove a card permanently and retire its id
    pub fn delete(&mut self, id: &str) -> Result<Card> {
        let pos = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::CardNotFound(id.to_string()))?;
        let card = self.cards.remove(pos);
        self.retired_ids.push(card.id.clone());
        tracing::info!("Deleted card {}", id);
        Ok(card)
    }
}

/// File-backed card store
#[derive(Clone, Debug)]
pub struct CardStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl CardStore {
    /// Store using `cards.json` inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CARDS_FILE),
            lock_path: data_dir.join(LOCK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection under a shared lock.
    ///
    /// A missing file is an empty collection. Unlike review history, a file
    /// that does not parse is an error: card data is never replaced by
    /// defaults.
    pub fn load(&self) -> Result<CardCollection> {
        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.read_unlocked();
        lock.unlock()?;
        result
    }

    /// Load, modify and save under one exclusive lock.
    ///
    /// Nothing is written if `f` fails.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut CardCollection) -> Result<T>,
    {
        let lock = self.open_lock()?;
        lock.lock_exclusive()?;

        let result = self.read_unlocked().and_then(|mut collection| {
            let value = f(&mut collection)?;
            self.write_unlocked(&collection)?;
            Ok(value)
        });

        lock.unlock()?;
        result
    }

    fn open_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)?;
        Ok(file)
    }

    fn read_unlocked(&self) -> Result<CardCollection> {
        if !self.path.exists() {
            tracing::debug!("No card store at {:?}, starting empty", self.path);
            return Ok(CardCollection::default());
        }

        let mut contents = String::new();
        File::open(&self.path)?.read_to_string(&mut contents)?;

        let collection: CardCollection = serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!("{} is not a valid card store: {}", self.path.display(), e))
        })?;
        tracing::debug!(
            "Loaded {} cards from {:?}",
            collection.cards.len(),
            self.path
        );
        Ok(collection)
    }

    /// Atomically replace the store: temp file, fsync, rename
    fn write_unlocked(&self, collection: &CardCollection) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, collection)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!(
            "Saved {} cards to {:?}",
            collection.cards.len(),
            self.path
        );
        Ok(())
    }
}
