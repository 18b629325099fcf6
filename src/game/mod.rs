//! Per-game rules plugged into the shared session flow.

pub mod fill;
pub mod pairing;
pub mod path;
pub mod spelling;

use crate::geometry::{Canvas, Point, Size};
use crate::ids::{TargetId, TokenId};
use crate::item::PracticeItem;
use crate::stats::Outcome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub use fill::FillGame;
pub use pairing::PairingGame;
pub use path::PathGame;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Pairing,
    Fill,
    Path,
}

impl GameKind {
    pub fn from_name(name: &str) -> Option<GameKind> {
        match name {
            "pairing" => Some(GameKind::Pairing),
            "fill" => Some(GameKind::Fill),
            "path" => Some(GameKind::Path),
            _ => None,
        }
    }
}

/// A dragged token released over a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt {
    pub token: TokenId,
    pub target: TargetId,
}

/// A token the player can pick up, at its logical (un-jittered) position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSource {
    pub id: TokenId,
    pub center: Point,
}

/// Somewhere the dragged token may currently be dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTarget {
    pub id: TargetId,
    pub center: Point,
}

/// What runs between finishing a word and moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Celebration {
    /// A single fixed hold.
    Hold(Duration),
    /// A stepped walk over the word, one frame per `step`.
    Walk { step: Duration },
}

/// Result of a correct attempt once its feedback hold is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Settlement {
    /// Nothing else to do yet.
    Continue,
    /// A pair left the board and was replenished.
    Cleared,
    /// The current word is fully spelled.
    WordComplete {
        outcome: Outcome,
        celebration: Celebration,
    },
}

/// Rules of one game kind.
///
/// The board is the game-specific part of the session state. Strategies are
/// stateless apart from configuration; all randomness comes in through `rng`.
pub trait GameStrategy {
    type Board: fmt::Debug + Clone;

    fn kind(&self) -> GameKind;

    /// Size used to scale the drop radius.
    fn footprint(&self) -> Size;

    fn incorrect_hold(&self) -> Duration;

    fn new_board<R: Rng + ?Sized>(
        &self,
        items: &[PracticeItem],
        canvas: Canvas,
        rng: &mut R,
    ) -> Self::Board;

    /// Positions everything for a new canvas, keeping resolved state.
    fn relayout<R: Rng + ?Sized>(
        &self,
        board: &Self::Board,
        canvas: Canvas,
        rng: &mut R,
    ) -> Self::Board;

    fn can_drag(&self, board: &Self::Board, token: TokenId) -> bool;

    /// Tokens that can be picked up right now.
    fn drag_sources(&self, board: &Self::Board) -> Vec<DragSource>;

    /// Targets `token` may be dropped on right now.
    fn drop_targets(&self, board: &Self::Board, token: TokenId) -> Vec<DropTarget>;

    fn validate(&self, board: &Self::Board, attempt: Attempt) -> bool;

    /// Shows the attempt on the board. Returns an outcome to report immediately.
    fn mark(&self, board: &mut Self::Board, attempt: Attempt, correct: bool) -> Option<Outcome>;

    /// Undoes an incorrect attempt.
    fn revert(&self, board: &mut Self::Board, attempt: Attempt);

    fn settle<R: Rng + ?Sized>(
        &self,
        board: &mut Self::Board,
        attempt: Attempt,
        canvas: Canvas,
        rng: &mut R,
    ) -> Settlement;

    /// Advances the celebration walk. Returns true while frames remain.
    fn animation_step(&self, _board: &mut Self::Board) -> bool {
        false
    }

    /// Moves past a finished word.
    fn advance<R: Rng + ?Sized>(&self, _board: &mut Self::Board, _canvas: Canvas, _rng: &mut R) {}

    fn is_complete(&self, board: &Self::Board) -> bool;

    /// Pairs or words in the session.
    fn total(&self, board: &Self::Board) -> usize;
}
