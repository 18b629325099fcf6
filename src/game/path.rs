use super::spelling::{SpellingBoard, SpellingGame, SpellingVariant};
use super::{Celebration, GameKind};
use crate::config::Timing;
use crate::layout::LayoutMode;

/// Path spelling: every letter is dragged onto slots strung along a wave, and a
/// walker follows the finished word.
#[derive(Debug, Clone, Copy)]
pub struct PathRules;

impl SpellingVariant for PathRules {
    const KIND: GameKind = GameKind::Path;
    const MODE: LayoutMode = LayoutMode::Curve;
    const SUBSET: bool = false;

    fn celebration(board: &mut SpellingBoard, timing: &Timing) -> Celebration {
        board.start_walk(timing.path_steps_per_segment);
        Celebration::Walk {
            step: timing.path_step_delay(),
        }
    }
}

pub type PathGame = SpellingGame<PathRules>;
