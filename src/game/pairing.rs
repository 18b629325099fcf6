use super::{Attempt, DragSource, DropTarget, GameKind, GameStrategy, Settlement};
use crate::config::{Config, PlacementConfig, Timing};
use crate::geometry::{Canvas, Rect, Size};
use crate::ids::{TargetId, TokenId};
use crate::item::PracticeItem;
use crate::placement::SpatialPlacer;
use crate::sequence::{capacity_for, Card, SequenceGenerator, SlotId};
use crate::stats::Outcome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cards consumed from the sequence per cleared pair.
const REPLENISH_BATCH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardState {
    Unresolved,
    /// Showing "correct" before leaving the board.
    Matched,
    /// Showing "incorrect" before flipping back.
    Mismatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCard {
    pub card: Card,
    pub rect: Rect,
    pub state: CardState,
}

impl VisibleCard {
    pub fn slot_id(&self) -> SlotId {
        self.card.slot_id
    }
}

/// On-screen cards plus the rest of the session's card sequence.
#[derive(Debug, Clone)]
pub struct PairingBoard {
    capacity: usize,
    sequence: Vec<Card>,
    next: usize,
    visible: Vec<VisibleCard>,
    fallback_placements: usize,
}

impl PairingBoard {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sequence(&self) -> &[Card] {
        &self.sequence
    }

    /// Index of the first card not yet shown.
    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn visible(&self) -> &[VisibleCard] {
        &self.visible
    }

    pub fn remaining(&self) -> usize {
        self.sequence.len() - self.next
    }

    /// How many cards had to use the grid fallback so far.
    pub fn fallback_placements(&self) -> usize {
        self.fallback_placements
    }

    pub fn card(&self, slot: SlotId) -> Option<&VisibleCard> {
        self.visible.iter().find(|c| c.card.slot_id == slot)
    }

    fn card_mut(&mut self, slot: SlotId) -> Option<&mut VisibleCard> {
        self.visible.iter_mut().find(|c| c.card.slot_id == slot)
    }
}

#[derive(Debug, Clone)]
pub struct PairingGame {
    placement: PlacementConfig,
    timing: Timing,
    placer: SpatialPlacer,
}

impl PairingGame {
    pub fn new(config: &Config) -> Self {
        let placement = config.placement.clone();
        let placer = SpatialPlacer::new(placement.card(), placement.spacing, placement.max_attempts);
        Self {
            placement,
            timing: config.timing.clone(),
            placer,
        }
    }

    /// Shows up to `count` more cards from the sequence.
    fn reveal<R: Rng + ?Sized>(
        &self,
        board: &mut PairingBoard,
        count: usize,
        canvas: Canvas,
        rng: &mut R,
    ) {
        let end = (board.next + count).min(board.sequence.len());
        let fresh: Vec<Card> = board.sequence[board.next..end].to_vec();
        board.next = end;

        let existing: Vec<Rect> = board.visible.iter().map(|c| c.rect).collect();
        let ids: Vec<SlotId> = fresh.iter().map(|c| c.slot_id).collect();
        let placements = self.placer.place(&ids, canvas, &existing, rng);

        for (card, placement) in fresh.into_iter().zip(placements) {
            if placement.fallback {
                board.fallback_placements += 1;
            }
            board.visible.push(VisibleCard {
                card,
                rect: placement.rect,
                state: CardState::Unresolved,
            });
        }
    }
}

impl GameStrategy for PairingGame {
    type Board = PairingBoard;

    fn kind(&self) -> GameKind {
        GameKind::Pairing
    }

    fn footprint(&self) -> Size {
        self.placement.card()
    }

    fn incorrect_hold(&self) -> Duration {
        self.timing.pairing_incorrect_hold()
    }

    fn new_board<R: Rng + ?Sized>(
        &self,
        items: &[PracticeItem],
        canvas: Canvas,
        rng: &mut R,
    ) -> PairingBoard {
        let capacity = capacity_for(canvas, &self.placement);
        let sequence = SequenceGenerator::new(capacity).generate(items, rng);
        let mut board = PairingBoard {
            capacity,
            sequence,
            next: 0,
            visible: Vec::with_capacity(capacity),
            fallback_placements: 0,
        };
        self.reveal(&mut board, capacity, canvas, rng);
        board
    }

    fn relayout<R: Rng + ?Sized>(
        &self,
        board: &PairingBoard,
        canvas: Canvas,
        rng: &mut R,
    ) -> PairingBoard {
        let ids: Vec<SlotId> = board.visible.iter().map(|c| c.card.slot_id).collect();
        let placements = self.placer.place(&ids, canvas, &[], rng);

        let mut next = board.clone();
        for (card, placement) in next.visible.iter_mut().zip(placements) {
            card.rect = placement.rect;
            if placement.fallback {
                next.fallback_placements += 1;
            }
        }
        next
    }

    fn can_drag(&self, board: &PairingBoard, token: TokenId) -> bool {
        board
            .card(token.0)
            .is_some_and(|c| c.state == CardState::Unresolved)
    }

    fn drag_sources(&self, board: &PairingBoard) -> Vec<DragSource> {
        board
            .visible
            .iter()
            .filter(|c| c.state == CardState::Unresolved)
            .map(|c| DragSource {
                id: TokenId(c.card.slot_id),
                center: c.rect.center(),
            })
            .collect()
    }

    fn drop_targets(&self, board: &PairingBoard, token: TokenId) -> Vec<DropTarget> {
        board
            .visible
            .iter()
            .filter(|c| c.state == CardState::Unresolved && c.card.slot_id != token.0)
            .map(|c| DropTarget {
                id: TargetId(c.card.slot_id),
                center: c.rect.center(),
            })
            .collect()
    }

    fn validate(&self, board: &PairingBoard, attempt: Attempt) -> bool {
        match (board.card(attempt.token.0), board.card(attempt.target.0)) {
            (Some(dragged), Some(target)) => dragged.card.matches(&target.card),
            _ => false,
        }
    }

    fn mark(&self, board: &mut PairingBoard, attempt: Attempt, correct: bool) -> Option<Outcome> {
        let state = if correct {
            CardState::Matched
        } else {
            CardState::Mismatched
        };
        let item_id = board.card(attempt.token.0)?.card.item_id;
        for slot in [attempt.token.0, attempt.target.0] {
            if let Some(card) = board.card_mut(slot) {
                card.state = state;
            }
        }
        Some(Outcome {
            item_id,
            success: correct,
            game: GameKind::Pairing,
        })
    }

    fn revert(&self, board: &mut PairingBoard, attempt: Attempt) {
        for slot in [attempt.token.0, attempt.target.0] {
            if let Some(card) = board.card_mut(slot) {
                if card.state == CardState::Mismatched {
                    card.state = CardState::Unresolved;
                }
            }
        }
    }

    fn settle<R: Rng + ?Sized>(
        &self,
        board: &mut PairingBoard,
        attempt: Attempt,
        canvas: Canvas,
        rng: &mut R,
    ) -> Settlement {
        let before = board.visible.len();
        board.visible.retain(|c| {
            !(c.state == CardState::Matched
                && (c.card.slot_id == attempt.token.0 || c.card.slot_id == attempt.target.0))
        });
        if board.visible.len() == before {
            return Settlement::Continue;
        }
        self.reveal(board, REPLENISH_BATCH, canvas, rng);
        Settlement::Cleared
    }

    fn is_complete(&self, board: &PairingBoard) -> bool {
        board.next >= board.sequence.len() && board.visible.is_empty()
    }

    fn total(&self, board: &PairingBoard) -> usize {
        board.sequence.len() / 2
    }
}
