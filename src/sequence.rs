//! Pairing-game card sequence.
//!
//! The generated sequence is consumed front to back: the first `capacity` cards are
//! shown, and every matched pair pulls the next two. The construction keeps a fixed
//! number of unmatched "spare" halves in flight so that any `capacity`-long run of the
//! sequence holds at least [`required_pairs`] complete pairs.

use crate::config::PlacementConfig;
use crate::geometry::Canvas;
use crate::item::{ItemId, PracticeItem};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Below this many items the sequence is a plain shuffle.
pub const MIN_CONSTRAINED_ITEMS: usize = 3;
/// Upper bound on the pairs a window is required to hold.
pub const MAX_REQUIRED_PAIRS: usize = 3;

pub type SlotId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardSide {
    Prompt,
    Answer,
}

impl CardSide {
    pub fn opposite(&self) -> CardSide {
        match self {
            CardSide::Prompt => CardSide::Answer,
            CardSide::Answer => CardSide::Prompt,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> CardSide {
        if rng.gen_bool(0.5) {
            CardSide::Prompt
        } else {
            CardSide::Answer
        }
    }
}

/// One side of a practice item shown as a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub slot_id: SlotId,
    pub item_id: ItemId,
    pub side: CardSide,
}

impl Card {
    pub fn matches(&self, other: &Card) -> bool {
        self.slot_id != other.slot_id && self.item_id == other.item_id && self.side != other.side
    }
}

/// Number of cards that fit on `canvas`, even and clamped to the configured bounds.
pub fn capacity_for(canvas: Canvas, cfg: &PlacementConfig) -> usize {
    let cell = (cfg.card_width + cfg.spacing) * (cfg.card_height + cfg.spacing);
    let fits = if cell > 0.0 {
        (canvas.area() / cell * cfg.fill_ratio).floor() as usize
    } else {
        0
    };
    let even = fits - fits % 2;
    let min = cfg.min_capacity + cfg.min_capacity % 2;
    let max = cfg.max_capacity - cfg.max_capacity % 2;
    even.clamp(min, max.max(min))
}

/// Complete pairs every window of `capacity` cards must contain.
pub fn required_pairs(capacity: usize) -> usize {
    MAX_REQUIRED_PAIRS.min(capacity / 2)
}

/// Number of items with both sides present in `cards`.
pub fn complete_pairs(cards: &[Card]) -> usize {
    let mut sides: HashMap<ItemId, (bool, bool)> = HashMap::new();
    for card in cards {
        let entry = sides.entry(card.item_id).or_default();
        match card.side {
            CardSide::Prompt => entry.0 = true,
            CardSide::Answer => entry.1 = true,
        }
    }
    sides.values().filter(|(p, a)| *p && *a).count()
}

#[derive(Debug, Clone)]
pub struct SequenceGenerator {
    capacity: usize,
}

impl SequenceGenerator {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds the 2N-card sequence for `items`.
    pub fn generate<R: Rng + ?Sized>(&self, items: &[PracticeItem], rng: &mut R) -> Vec<Card> {
        let mut ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        ids.shuffle(rng);

        let mut builder = Builder::default();

        if ids.len() < MIN_CONSTRAINED_ITEMS {
            for id in ids {
                builder.push_pair(id, rng);
            }
            builder.cards.shuffle(rng);
            return builder.finish();
        }

        let pairs = required_pairs(self.capacity);
        let spare_room = self.capacity.saturating_sub(2 * pairs);
        let mut unused = ids.into_iter();

        // Seed window: complete pairs first, then single spare halves.
        for id in unused.by_ref().take(pairs) {
            builder.push_pair(id, rng);
        }
        let mut spares: Vec<Card> = Vec::with_capacity(spare_room);
        for id in unused.by_ref().take(spare_room) {
            spares.push(builder.push(id, CardSide::random(rng)));
        }

        // Each replenishment completes the newest spare and opens a new one.
        for id in unused.by_ref() {
            match spares.pop() {
                Some(spare) => {
                    builder.push(spare.item_id, spare.side.opposite());
                    spares.push(builder.push(id, CardSide::random(rng)));
                }
                None => builder.push_pair(id, rng),
            }
        }

        while let Some(spare) = spares.pop() {
            builder.push(spare.item_id, spare.side.opposite());
        }

        builder.finish()
    }
}

#[derive(Debug, Default)]
struct Builder {
    cards: Vec<Card>,
}

impl Builder {
    fn push(&mut self, item_id: ItemId, side: CardSide) -> Card {
        let card = Card {
            slot_id: 0,
            item_id,
            side,
        };
        self.cards.push(card);
        card
    }

    fn push_pair<R: Rng + ?Sized>(&mut self, item_id: ItemId, rng: &mut R) {
        let side = CardSide::random(rng);
        self.push(item_id, side);
        self.push(item_id, side.opposite());
    }

    /// Slot ids follow final sequence order.
    fn finish(mut self) -> Vec<Card> {
        for (idx, card) in self.cards.iter_mut().enumerate() {
            card.slot_id = idx as SlotId;
        }
        self.cards
    }
}
