use rand::Rng;
use tracing::{debug, warn};

use super::card::CardRef;

/// Return a uniformly shuffled copy of `items` (Fisher–Yates). The input is
/// left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.gen_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// The drawable cards, their current shuffled order and the draw cursor.
///
/// An empty `order` means "not shuffled yet"; the first draw shuffles lazily.
/// The cursor is always reduced modulo the order length, so drawing cycles
/// through the same permutation until [`DeckState::reshuffle`] replaces it.
#[derive(Debug, Clone)]
pub struct DeckState {
    cards: Vec<CardRef>,
    order: Vec<CardRef>,
    cursor: usize,
    fallback: CardRef,
    warned_empty: bool,
}

impl DeckState {
    pub fn new(cards: Vec<CardRef>, fallback: CardRef) -> Self {
        Self {
            cards,
            order: Vec::new(),
            cursor: 0,
            fallback,
            warned_empty: false,
        }
    }

    pub fn cards(&self) -> &[CardRef] {
        &self.cards
    }

    #[cfg(test)]
    pub fn order(&self) -> &[CardRef] {
        &self.order
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn is_shuffled(&self) -> bool {
        !self.order.is_empty()
    }

    /// Replace the order with a fresh permutation and rewind the cursor.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.order = shuffle(&self.cards, rng);
        self.cursor = 0;
        debug!("Deck reshuffled ({} cards)", self.order.len());
    }

    /// Deal the next card in place.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> CardRef {
        if self.order.is_empty() {
            self.order = shuffle(&self.cards, rng);
        }

        let total = self.order.len();
        if total == 0 {
            if !self.warned_empty {
                warn!(
                    "No drawable cards in catalog; dealing fallback \"{}\"",
                    self.fallback.id
                );
                self.warned_empty = true;
            }
            return self.fallback.clone();
        }

        let index = self.cursor % total;
        self.cursor = (index + 1) % total;
        self.order[index].clone()
    }
}

/// Functional form of [`DeckState::draw`]: returns the advanced state and
/// the dealt card without touching `state`.
pub fn draw_next<R: Rng + ?Sized>(state: &DeckState, rng: &mut R) -> (DeckState, CardRef) {
    let mut next = state.clone();
    let card = next.draw(rng);
    (next, card)
}
