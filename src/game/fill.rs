use super::spelling::{SpellingBoard, SpellingGame, SpellingVariant};
use super::{Celebration, GameKind};
use crate::config::Timing;
use crate::layout::LayoutMode;

/// Fill-in-the-blank: a few letters of the word are missing from a wrapped grid.
#[derive(Debug, Clone, Copy)]
pub struct FillRules;

impl SpellingVariant for FillRules {
    const KIND: GameKind = GameKind::Fill;
    const MODE: LayoutMode = LayoutMode::Grid;
    const SUBSET: bool = true;

    fn celebration(_board: &mut SpellingBoard, timing: &Timing) -> Celebration {
        Celebration::Hold(timing.celebration_hold())
    }
}

pub type FillGame = SpellingGame<FillRules>;
