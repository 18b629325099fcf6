//! Shared rules of the two spelling games.
//!
//! Both games walk through a shuffled list of words and let the player drag letters
//! into slots; they differ in slot arrangement, blanking and the celebration that
//! follows a finished word. Those differences live in [`SpellingVariant`].

use super::{Attempt, Celebration, DragSource, DropTarget, GameKind, GameStrategy, Settlement};
use crate::animation::PathTraversal;
use crate::config::{Config, Timing};
use crate::geometry::{Canvas, Point, Size};
use crate::ids::{IdSeq, TokenId};
use crate::item::{ItemId, PracticeItem};
use crate::layout::{normalize_word, same_letter, LayoutMode, SlotLayoutGenerator, Verdict, WordLayout};
use crate::stats::Outcome;
use rand::seq::SliceRandom;
use rand::Rng;
use std::marker::PhantomData;
use std::time::Duration;

/// What sets one spelling game apart from the other.
pub trait SpellingVariant {
    const KIND: GameKind;
    const MODE: LayoutMode;
    /// Blank only a few letters instead of the whole word.
    const SUBSET: bool;

    fn celebration(board: &mut SpellingBoard, timing: &Timing) -> Celebration;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub item_id: ItemId,
    pub word: String,
}

#[derive(Debug, Clone)]
pub struct SpellingBoard {
    words: Vec<WordEntry>,
    current: usize,
    layout: Option<WordLayout>,
    mistakes: u32,
    celebrating: bool,
    walk: Option<PathTraversal>,
    ids: IdSeq,
}

impl SpellingBoard {
    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.words.get(self.current)
    }

    pub fn layout(&self) -> Option<&WordLayout> {
        self.layout.as_ref()
    }

    /// Incorrect drops on the current word.
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebrating
    }

    /// Where the celebration walker currently stands.
    pub fn walker(&self) -> Option<Point> {
        self.walk.as_ref().and_then(PathTraversal::position)
    }

    /// Starts a walk over the current word's slots.
    pub fn start_walk(&mut self, steps_per_segment: usize) {
        let waypoints: Vec<Point> = self
            .layout
            .iter()
            .flat_map(|l| l.targets.iter().map(|t| t.position))
            .collect();
        self.walk = Some(PathTraversal::new(&waypoints, steps_per_segment));
    }
}

/// Words playable in a spelling game, in item order.
pub fn playable_words(items: &[PracticeItem]) -> Vec<WordEntry> {
    items
        .iter()
        .filter_map(|item| {
            let word = normalize_word(&item.answer);
            word.chars().any(char::is_alphabetic).then(|| WordEntry {
                item_id: item.id,
                word,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct SpellingGame<V> {
    generator: SlotLayoutGenerator,
    timing: Timing,
    variant: PhantomData<V>,
}

impl<V: SpellingVariant> SpellingGame<V> {
    pub fn new(config: &Config) -> Self {
        Self {
            generator: SlotLayoutGenerator::new(config.layout.clone()),
            timing: config.timing.clone(),
            variant: PhantomData,
        }
    }

    fn layout_current<R: Rng + ?Sized>(&self, board: &mut SpellingBoard, canvas: Canvas, rng: &mut R) {
        board.layout = board.words.get(board.current).map(|entry| {
            self.generator
                .generate(&entry.word, canvas, V::MODE, V::SUBSET, &mut board.ids, rng)
        });
    }
}

impl<V: SpellingVariant> GameStrategy for SpellingGame<V> {
    type Board = SpellingBoard;

    fn kind(&self) -> GameKind {
        V::KIND
    }

    fn footprint(&self) -> Size {
        self.generator.config().token()
    }

    fn incorrect_hold(&self) -> Duration {
        self.timing.spelling_incorrect_hold()
    }

    fn new_board<R: Rng + ?Sized>(
        &self,
        items: &[PracticeItem],
        canvas: Canvas,
        rng: &mut R,
    ) -> SpellingBoard {
        let mut words = playable_words(items);
        words.shuffle(rng);
        let mut board = SpellingBoard {
            words,
            current: 0,
            layout: None,
            mistakes: 0,
            celebrating: false,
            walk: None,
            ids: IdSeq::default(),
        };
        self.layout_current(&mut board, canvas, rng);
        board
    }

    fn relayout<R: Rng + ?Sized>(
        &self,
        board: &SpellingBoard,
        canvas: Canvas,
        rng: &mut R,
    ) -> SpellingBoard {
        let mut next = board.clone();
        next.layout = board
            .layout
            .as_ref()
            .map(|layout| self.generator.regenerate(layout, canvas, rng));
        next
    }

    fn can_drag(&self, board: &SpellingBoard, token: TokenId) -> bool {
        !board.celebrating
            && board
                .layout
                .as_ref()
                .and_then(|l| l.token(token))
                .is_some_and(|t| !t.held)
    }

    fn drag_sources(&self, board: &SpellingBoard) -> Vec<DragSource> {
        if board.celebrating {
            return Vec::new();
        }
        board
            .layout
            .iter()
            .flat_map(|l| l.tokens.iter())
            .filter(|t| !t.held)
            .map(|t| DragSource {
                id: t.id,
                center: t.slot,
            })
            .collect()
    }

    fn drop_targets(&self, board: &SpellingBoard, _token: TokenId) -> Vec<DropTarget> {
        board
            .layout
            .iter()
            .flat_map(|l| l.open_targets())
            .map(|t| DropTarget {
                id: t.id,
                center: t.position,
            })
            .collect()
    }

    fn validate(&self, board: &SpellingBoard, attempt: Attempt) -> bool {
        let Some(layout) = board.layout.as_ref() else {
            return false;
        };
        match (layout.token(attempt.token), layout.target(attempt.target)) {
            (Some(token), Some(target)) => same_letter(token.letter, target.expected),
            _ => false,
        }
    }

    fn mark(&self, board: &mut SpellingBoard, attempt: Attempt, correct: bool) -> Option<Outcome> {
        let layout = board.layout.as_mut()?;
        let letter = layout.token(attempt.token)?.letter;
        let target = layout.target_mut(attempt.target)?;

        if correct {
            target.filled = Some(target.expected);
            target.verdict = Some(Verdict::Correct);
            layout.tokens.retain(|t| t.id != attempt.token);
        } else {
            target.filled = Some(letter);
            target.verdict = Some(Verdict::Incorrect);
            if let Some(token) = layout.token_mut(attempt.token) {
                token.held = true;
            }
            board.mistakes += 1;
        }
        // Spelling outcomes are reported per finished word.
        None
    }

    fn revert(&self, board: &mut SpellingBoard, attempt: Attempt) {
        let Some(layout) = board.layout.as_mut() else {
            return;
        };
        if let Some(target) = layout.target_mut(attempt.target) {
            if target.verdict == Some(Verdict::Incorrect) {
                target.filled = None;
                target.verdict = None;
            }
        }
        if let Some(token) = layout.token_mut(attempt.token) {
            token.held = false;
        }
    }

    fn settle<R: Rng + ?Sized>(
        &self,
        board: &mut SpellingBoard,
        _attempt: Attempt,
        _canvas: Canvas,
        _rng: &mut R,
    ) -> Settlement {
        if board.celebrating {
            return Settlement::Continue;
        }
        let complete = board.layout.as_ref().is_some_and(WordLayout::is_complete);
        let Some(entry) = board.words.get(board.current).filter(|_| complete) else {
            return Settlement::Continue;
        };

        let outcome = Outcome {
            item_id: entry.item_id,
            success: board.mistakes == 0,
            game: V::KIND,
        };
        board.celebrating = true;
        let celebration = V::celebration(board, &self.timing);
        Settlement::WordComplete {
            outcome,
            celebration,
        }
    }

    fn animation_step(&self, board: &mut SpellingBoard) -> bool {
        match board.walk.as_mut() {
            Some(walk) => walk.advance() && !walk.is_finished(),
            None => false,
        }
    }

    fn advance<R: Rng + ?Sized>(&self, board: &mut SpellingBoard, canvas: Canvas, rng: &mut R) {
        board.current += 1;
        board.mistakes = 0;
        board.celebrating = false;
        board.walk = None;
        self.layout_current(board, canvas, rng);
    }

    fn is_complete(&self, board: &SpellingBoard) -> bool {
        board.current >= board.words.len()
    }

    fn total(&self, board: &SpellingBoard) -> usize {
        board.words.len()
    }
}
