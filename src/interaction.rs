//! Drag-and-drop interaction, written as a reducer.
//!
//! Every handler takes the current [`SessionState`] by value and returns the next
//! one, together with the side effects the caller has to carry out: outcomes to
//! report and delayed actions to schedule. Input that arrives while the state is
//! blocked is dropped at the top of each handler.

use crate::config::{Config, Timing};
use crate::game::{Attempt, Celebration, GameStrategy, Settlement};
use crate::geometry::{Canvas, Point};
use crate::ids::{TargetId, TokenId};
use crate::item::PracticeItem;
use crate::layout::Verdict;
use crate::schedule::TimedAction;
use crate::state::{DragState, Feedback, SessionState};
use crate::stats::Outcome;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Work left to the session owner after a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Record(Outcome),
    Schedule { delay: Duration, action: TimedAction },
}

pub type Step<B> = (SessionState<B>, Vec<Effect>);

pub struct InteractionStateMachine<'a, G> {
    game: &'a G,
    timing: &'a Timing,
    snap_radius: f64,
}

impl<'a, G: GameStrategy> InteractionStateMachine<'a, G> {
    pub fn new(game: &'a G, config: &'a Config) -> Self {
        Self {
            game,
            timing: &config.timing,
            snap_radius: config.snap_factor * game.footprint().width,
        }
    }

    /// Largest pointer distance at which a target still counts as hovered.
    pub fn snap_radius(&self) -> f64 {
        self.snap_radius
    }

    /// Builds a fresh state for `items`.
    pub fn begin<R: Rng + ?Sized>(
        &self,
        generation: u64,
        items: &[PracticeItem],
        canvas: Canvas,
        rng: &mut R,
    ) -> SessionState<G::Board> {
        let board = self.game.new_board(items, canvas, rng);
        let total = self.game.total(&board);
        let complete = self.game.is_complete(&board);
        SessionState::new(generation, canvas, board, total, complete)
    }

    pub fn drag_start(
        &self,
        mut state: SessionState<G::Board>,
        token: TokenId,
        pointer: Point,
    ) -> SessionState<G::Board> {
        if state.input_blocked || state.complete {
            trace!(%token, "drag start ignored, input blocked");
            return state;
        }
        if !self.game.can_drag(&state.board, token) {
            trace!(%token, "drag start ignored, token not draggable");
            return state;
        }
        state.drag = DragState::Dragging {
            token,
            pointer,
            hovered: None,
        };
        state
    }

    pub fn drag_move(&self, mut state: SessionState<G::Board>, pointer: Point) -> SessionState<G::Board> {
        if state.input_blocked {
            return state;
        }
        let DragState::Dragging { token, .. } = state.drag else {
            return state;
        };
        let hovered = self.nearest_target(&state.board, token, pointer);
        trace!(x = pointer.x, y = pointer.y, ?hovered, "drag move");
        state.drag = DragState::Dragging {
            token,
            pointer,
            hovered,
        };
        state
    }

    fn nearest_target(&self, board: &G::Board, token: TokenId, pointer: Point) -> Option<TargetId> {
        self.game
            .drop_targets(board, token)
            .into_iter()
            .map(|t| (t.id, t.center.distance_to(pointer)))
            .filter(|(_, distance)| *distance <= self.snap_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    pub fn drag_end(&self, mut state: SessionState<G::Board>) -> Step<G::Board> {
        if state.input_blocked {
            return (state, Vec::new());
        }
        let DragState::Dragging { token, hovered, .. } = std::mem::replace(&mut state.drag, DragState::Idle)
        else {
            return (state, Vec::new());
        };
        let Some(target) = hovered else {
            debug!(%token, "dropped away from any target");
            return (state, Vec::new());
        };
        // The board may have moved on since the hover was computed.
        let still_open = self
            .game
            .drop_targets(&state.board, token)
            .iter()
            .any(|t| t.id == target);
        if !still_open || !self.game.can_drag(&state.board, token) {
            debug!(%token, %target, "drop target no longer available");
            return (state, Vec::new());
        }

        let attempt = Attempt { token, target };
        let correct = self.game.validate(&state.board, attempt);
        debug!(%token, %target, correct, "attempt validated");

        let mut effects = Vec::new();
        if let Some(outcome) = self.game.mark(&mut state.board, attempt, correct) {
            effects.push(Effect::Record(outcome));
        }
        if correct {
            state.progress.correct += 1;
            state.feedback.push(Feedback {
                attempt,
                verdict: Verdict::Correct,
            });
            effects.push(Effect::Schedule {
                delay: self.timing.correct_hold(),
                action: TimedAction::SettleCorrect(attempt),
            });
        } else {
            state.progress.incorrect += 1;
            state.feedback.push(Feedback {
                attempt,
                verdict: Verdict::Incorrect,
            });
            state.input_blocked = true;
            effects.push(Effect::Schedule {
                delay: self.game.incorrect_hold(),
                action: TimedAction::RevertIncorrect(attempt),
            });
        }
        (state, effects)
    }

    pub fn cancel_drag(&self, mut state: SessionState<G::Board>) -> SessionState<G::Board> {
        state.drag = DragState::Idle;
        state
    }

    /// Applies a timed action scheduled under `generation`.
    ///
    /// Actions from an older generation are dropped without touching the state.
    pub fn fire<R: Rng + ?Sized>(
        &self,
        mut state: SessionState<G::Board>,
        generation: u64,
        action: TimedAction,
        rng: &mut R,
    ) -> Step<G::Board> {
        if generation != state.generation {
            debug!(generation, current = state.generation, ?action, "stale timer dropped");
            return (state, Vec::new());
        }
        debug!(?action, "timer fired");

        let mut effects = Vec::new();
        match action {
            TimedAction::SettleCorrect(attempt) => {
                state.feedback.retain(|f| f.attempt != attempt);
                let canvas = state.canvas;
                match self.game.settle(&mut state.board, attempt, canvas, rng) {
                    Settlement::Continue => {}
                    Settlement::Cleared => {
                        state.progress.resolved += 1;
                        state.complete = self.game.is_complete(&state.board);
                    }
                    Settlement::WordComplete {
                        outcome,
                        celebration,
                    } => {
                        info!(item = outcome.item_id, success = outcome.success, "word complete");
                        effects.push(Effect::Record(outcome));
                        state.progress.resolved += 1;
                        state.animating = true;
                        state.input_blocked = true;
                        state.drag = DragState::Idle;
                        let (delay, action) = match celebration {
                            Celebration::Hold(hold) => (hold, TimedAction::AdvanceWord),
                            Celebration::Walk { step } => (step, TimedAction::AnimationStep),
                        };
                        effects.push(Effect::Schedule { delay, action });
                    }
                }
            }
            TimedAction::RevertIncorrect(attempt) => {
                self.game.revert(&mut state.board, attempt);
                state.feedback.retain(|f| f.attempt != attempt);
                state.input_blocked = state.animating;
            }
            TimedAction::AnimationStep => {
                if self.game.animation_step(&mut state.board) {
                    effects.push(Effect::Schedule {
                        delay: self.timing.path_step_delay(),
                        action: TimedAction::AnimationStep,
                    });
                } else {
                    state = self.advance_word(state, rng);
                }
            }
            TimedAction::AdvanceWord => {
                state = self.advance_word(state, rng);
            }
        }
        (state, effects)
    }

    fn advance_word<R: Rng + ?Sized>(
        &self,
        mut state: SessionState<G::Board>,
        rng: &mut R,
    ) -> SessionState<G::Board> {
        let canvas = state.canvas;
        self.game.advance(&mut state.board, canvas, rng);
        state.animating = false;
        state.input_blocked = false;
        state.feedback.clear();
        state.complete = self.game.is_complete(&state.board);
        state
    }

    /// Lays the board out for `canvas`, or parks the request until the state settles.
    pub fn resize<R: Rng + ?Sized>(
        &self,
        mut state: SessionState<G::Board>,
        canvas: Canvas,
        rng: &mut R,
    ) -> SessionState<G::Board> {
        if !state.is_settled() {
            debug!(width = canvas.width, height = canvas.height, "relayout deferred");
            state.pending_canvas = Some(canvas);
            return state;
        }
        state.board = self.game.relayout(&state.board, canvas, rng);
        state.canvas = canvas;
        state.pending_canvas = None;
        state
    }

    /// Applies a parked resize once nothing is in flight.
    pub fn apply_pending<R: Rng + ?Sized>(
        &self,
        state: SessionState<G::Board>,
        rng: &mut R,
    ) -> SessionState<G::Board> {
        match state.pending_canvas {
            Some(canvas) if state.is_settled() => self.resize(state, canvas, rng),
            _ => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::pairing::{CardState, PairingBoard};
    use crate::game::{FillGame, PairingGame};
    use crate::item::ItemId;
    use crate::state::Phase;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn items(n: usize) -> Vec<PracticeItem> {
        (0..n)
            .map(|i| PracticeItem::new(i as ItemId, format!("p{i}"), format!("a{i}")))
            .collect()
    }

    fn canvas() -> Canvas {
        Canvas::new(800.0, 1200.0)
    }

    fn pair(board: &PairingBoard, matching: bool) -> (TokenId, TargetId, Point) {
        let cards = board.visible();
        let a = &cards[0];
        let b = cards
            .iter()
            .find(|b| b.slot_id() != a.slot_id() && a.card.matches(&b.card) == matching)
            .unwrap();
        (TokenId(a.slot_id()), TargetId(b.slot_id()), b.rect.center())
    }

    fn drop_on(
        machine: &InteractionStateMachine<'_, PairingGame>,
        state: SessionState<PairingBoard>,
        token: TokenId,
        at: Point,
    ) -> Step<PairingBoard> {
        let state = machine.drag_start(state, token, at);
        let state = machine.drag_move(state, at);
        machine.drag_end(state)
    }

    #[test]
    fn test_correct_match_records_and_schedules_settle() {
        let config = Config::default();
        let game = PairingGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let state = machine.begin(0, &items(10), canvas(), &mut rng);
        let (token, target, at) = pair(&state.board, true);

        let (state, effects) = drop_on(&machine, state, token, at);
        assert_eq!(state.progress.correct, 1);
        assert_eq!(state.phase(), Phase::FeedbackCorrect);
        assert!(!state.input_blocked);
        assert_matches!(effects[0], Effect::Record(o) if o.success);
        assert_eq!(
            effects[1],
            Effect::Schedule {
                delay: Duration::from_millis(1000),
                action: TimedAction::SettleCorrect(Attempt { token, target }),
            }
        );

        let shown = state.board.visible().len();
        let (state, effects) = machine.fire(
            state,
            0,
            TimedAction::SettleCorrect(Attempt { token, target }),
            &mut rng,
        );
        assert!(effects.is_empty());
        assert_eq!(state.progress.resolved, 1);
        assert_eq!(state.board.visible().len(), shown);
        assert!(state.board.card(token.0).is_none());
        assert!(state.is_settled());
    }

    #[test]
    fn test_incorrect_match_blocks_then_reverts() {
        let config = Config::default();
        let game = PairingGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(2);
        let state = machine.begin(0, &items(10), canvas(), &mut rng);
        let (token, target, at) = pair(&state.board, false);

        let (state, effects) = drop_on(&machine, state, token, at);
        assert_eq!(state.progress.incorrect, 1);
        assert!(state.input_blocked);
        assert_matches!(effects[0], Effect::Record(o) if !o.success);
        assert_matches!(
            effects[1],
            Effect::Schedule { delay, action: TimedAction::RevertIncorrect(_) }
                if delay == Duration::from_millis(1500)
        );

        // Blocked input is ignored outright.
        let other = TokenId(state.board.visible()[2].slot_id());
        let state = machine.drag_start(state, other, at);
        assert_eq!(state.drag, DragState::Idle);

        let (state, _) = machine.fire(
            state,
            0,
            TimedAction::RevertIncorrect(Attempt { token, target }),
            &mut rng,
        );
        assert!(!state.input_blocked);
        assert_eq!(state.board.card(token.0).unwrap().state, CardState::Unresolved);
        assert_eq!(state.board.card(target.0).unwrap().state, CardState::Unresolved);
        assert_eq!(state.progress.correct, 0);
    }

    #[test]
    fn test_drop_far_from_targets_cancels() {
        let config = Config::default();
        let game = PairingGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(3);
        let state = machine.begin(0, &items(10), canvas(), &mut rng);
        let token = TokenId(state.board.visible()[0].slot_id());

        let state = machine.drag_start(state, token, Point::new(0.0, 0.0));
        let state = machine.drag_move(state, Point::new(-5000.0, -5000.0));
        assert_eq!(state.hovered(), None);
        let (state, effects) = machine.drag_end(state);
        assert!(effects.is_empty());
        assert_eq!(state.drag, DragState::Idle);
        assert_eq!(state.progress.attempts(), 0);
    }

    #[test]
    fn test_stale_generation_is_a_no_op() {
        let config = Config::default();
        let game = PairingGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(4);
        let state = machine.begin(3, &items(10), canvas(), &mut rng);
        let (token, target, at) = pair(&state.board, false);
        let (state, _) = drop_on(&machine, state, token, at);

        let (state, effects) = machine.fire(
            state,
            2,
            TimedAction::RevertIncorrect(Attempt { token, target }),
            &mut rng,
        );
        assert!(effects.is_empty());
        assert!(state.input_blocked);
        assert_eq!(state.board.card(token.0).unwrap().state, CardState::Mismatched);
    }

    #[test]
    fn test_resize_waits_for_settled_state() {
        let config = Config::default();
        let game = PairingGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(5);
        let state = machine.begin(0, &items(10), canvas(), &mut rng);
        let (token, target, at) = pair(&state.board, false);
        let (state, _) = drop_on(&machine, state, token, at);

        let wide = Canvas::new(1200.0, 800.0);
        let state = machine.resize(state, wide, &mut rng);
        assert_eq!(state.canvas, canvas());
        assert_eq!(state.pending_canvas, Some(wide));

        let (state, _) = machine.fire(
            state,
            0,
            TimedAction::RevertIncorrect(Attempt { token, target }),
            &mut rng,
        );
        let state = machine.apply_pending(state, &mut rng);
        assert_eq!(state.canvas, wide);
        assert_eq!(state.pending_canvas, None);
    }

    #[test]
    fn test_fill_word_completion_celebrates_then_advances() {
        let config = Config::default();
        let game = FillGame::new(&config);
        let machine = InteractionStateMachine::new(&game, &config);
        let mut rng = StdRng::seed_from_u64(6);
        let words = vec![PracticeItem::new(7, "sea", "mar"), PracticeItem::new(8, "sun", "sol")];
        let mut state = machine.begin(0, &words, Canvas::new(420.0, 900.0), &mut rng);
        assert_eq!(state.progress.total, 2);

        let mut recorded = Vec::new();
        let mut pending = Vec::new();
        loop {
            let layout = state.board.layout().unwrap();
            let Some(target) = layout.open_targets().next() else {
                break;
            };
            let center = target.position;
            let token = layout
                .tokens
                .iter()
                .find(|t| t.letter == target.expected)
                .unwrap()
                .id;
            state = machine.drag_start(state, token, center);
            state = machine.drag_move(state, center);
            let (next, effects) = machine.drag_end(state);
            state = next;
            pending.extend(effects);
        }

        for effect in std::mem::take(&mut pending) {
            if let Effect::Schedule { action, .. } = effect {
                let (next, effects) = machine.fire(state, 0, action, &mut rng);
                state = next;
                for e in effects {
                    match e {
                        Effect::Record(o) => recorded.push(o),
                        Effect::Schedule { action, .. } => pending.push(Effect::Schedule {
                            delay: Duration::ZERO,
                            action,
                        }),
                    }
                }
            }
        }
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].success);
        assert_eq!(state.phase(), Phase::Celebrating);
        assert!(state.input_blocked);
        assert_eq!(pending.len(), 1);
        assert_matches!(pending[0], Effect::Schedule { action: TimedAction::AdvanceWord, .. });

        let (state, _) = machine.fire(state, 0, TimedAction::AdvanceWord, &mut rng);
        assert!(state.is_settled());
        assert_eq!(state.board.current_index(), 1);
        assert!(!state.complete);
    }
}
