//! Review deck controller for flashcard drills.
//!
//! A session walks a shuffled deck once. "Know" advances past the current
//! card; "again" moves it to the back of the deck. The session is done once
//! every card has been answered "know". No intervals, no scheduling.
//!
//! `know`/`again` are ignored unless a session is running and the current
//! card has been flipped, so stray key presses never corrupt a session.

use rand::seq::SliceRandom;
use rand::Rng;

/// Session phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No active session
    Setup,
    /// Deck loaded, one card current
    Learning,
    /// Every card answered "know"
    Done,
}

/// Observable state after a transition
#[derive(Debug, PartialEq)]
pub struct DeckSnapshot<'a, C> {
    pub phase: Phase,
    pub current: Option<&'a C>,
    pub current_index: usize,
    pub deck_len: usize,
    pub flipped: bool,
    pub known_count: usize,
    pub total_seen: usize,
}

/// Drives one drill session over an ordered list of cards
#[derive(Clone, Debug)]
pub struct ReviewDeck<C> {
    phase: Phase,
    /// Cards as passed to `start`, reshuffled on `restart`
    source: Vec<C>,
    deck: Vec<C>,
    current_index: usize,
    flipped: bool,
    known_count: usize,
    total_seen: usize,
}

impl<C: Clone> Default for ReviewDeck<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> ReviewDeck<C> {
    pub fn new() -> Self {
        Self {
            phase: Phase::Setup,
            source: Vec::new(),
            deck: Vec::new(),
            current_index: 0,
            flipped: false,
            known_count: 0,
            total_seen: 0,
        }
    }

    /// Start a session over `cards` in random order. No-op for an empty list.
    pub fn start(&mut self, cards: Vec<C>) -> bool {
        self.start_with_rng(cards, &mut rand::rng())
    }

    /// `start` with a caller-supplied RNG
    pub fn start_with_rng<R: Rng + ?Sized>(&mut self, cards: Vec<C>, rng: &mut R) -> bool {
        if cards.is_empty() {
            tracing::debug!("Ignoring start with an empty card list");
            return false;
        }
        self.source = cards;
        self.deal(rng);
        true
    }

    /// Reshuffle the original card list and begin again (Done only)
    pub fn restart(&mut self) -> bool {
        self.restart_with_rng(&mut rand::rng())
    }

    pub fn restart_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.phase != Phase::Done {
            return false;
        }
        self.deal(rng);
        true
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.deck = self.source.clone();
        self.deck.shuffle(rng);
        self.current_index = 0;
        self.flipped = false;
        self.known_count = 0;
        self.total_seen = 0;
        self.phase = Phase::Learning;
        tracing::debug!("Dealt deck of {} cards", self.deck.len());
    }

    /// Return to setup. Allowed from Done and, to abandon a session, from Learning.
    pub fn back(&mut self) -> bool {
        if self.phase == Phase::Setup {
            return false;
        }
        self.phase = Phase::Setup;
        self.deck.clear();
        self.current_index = 0;
        self.flipped = false;
        true
    }

    /// Toggle between front and back of the current card
    pub fn flip(&mut self) -> bool {
        if self.phase != Phase::Learning {
            return false;
        }
        self.flipped = !self.flipped;
        true
    }

    /// Answer "known": count it and move past the current card
    pub fn know(&mut self) -> bool {
        if !self.can_answer() {
            return false;
        }
        self.known_count += 1;
        self.total_seen += 1;
        self.flipped = false;
        self.current_index += 1;

        if self.current_index >= self.deck.len() {
            self.phase = Phase::Done;
            tracing::debug!(
                "Session done: {} known, {} seen",
                self.known_count,
                self.total_seen
            );
        }
        true
    }

    /// Answer "again": move the current card to the back of the deck.
    ///
    /// The index does not advance; whichever card slides into the slot is
    /// shown next. The index is clamped to the last slot afterwards, so a
    /// missed last card is simply shown again.
    pub fn again(&mut self) -> bool {
        if !self.can_answer() {
            return false;
        }
        self.total_seen += 1;
        self.flipped = false;

        let card = self.deck.remove(self.current_index);
        self.deck.push(card);
        self.current_index = self.current_index.min(self.deck.len() - 1);
        true
    }

    fn can_answer(&self) -> bool {
        self.phase == Phase::Learning && self.flipped
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current card, while learning
    pub fn current(&self) -> Option<&C> {
        match self.phase {
            Phase::Learning => self.deck.get(self.current_index),
            _ => None,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn deck(&self) -> &[C] {
        &self.deck
    }

    pub fn known_count(&self) -> usize {
        self.known_count
    }

    pub fn total_seen(&self) -> usize {
        self.total_seen
    }

    /// Cards in the session as started
    pub fn total_cards(&self) -> usize {
        self.source.len()
    }

    /// `round(known / total × 100)`, 0 without cards
    pub fn percentage(&self) -> u32 {
        completion_percentage(self.known_count, self.total_cards())
    }

    pub fn snapshot(&self) -> DeckSnapshot<'_, C> {
        DeckSnapshot {
            phase: self.phase,
            current: self.current(),
            current_index: self.current_index,
            deck_len: self.deck.len(),
            flipped: self.flipped,
            known_count: self.known_count,
            total_seen: self.total_seen,
        }
    }
}

/// Rounded completion percentage
pub fn completion_percentage(known: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (known as f64 / total as f64 * 100.0).round() as u32
}
