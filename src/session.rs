//! Owner of one practice session.
//!
//! The controller holds the only copy of the [`SessionState`], routes pointer
//! events and due timers through the [`InteractionStateMachine`], and carries out
//! the effects it returns.

use crate::config::Config;
use crate::game::GameStrategy;
use crate::geometry::{Canvas, Point};
use crate::ids::TokenId;
use crate::interaction::{Effect, InteractionStateMachine};
use crate::item::{FocusMode, ItemSource, ListSelection, PracticeItem};
use crate::runtime::{Clock, SystemClock};
use crate::schedule::Scheduler;
use crate::stats::{MemoryRecorder, OutcomeRecorder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use crate::state::{DragState, Feedback, Phase, Progress, SessionState};

pub struct SessionController<G: GameStrategy, R = MemoryRecorder> {
    game: G,
    config: Config,
    items: Vec<PracticeItem>,
    recorder: R,
    clock: Box<dyn Clock>,
    scheduler: Scheduler,
    rng: StdRng,
    state: Option<SessionState<G::Board>>,
    generation: u64,
}

impl<G: GameStrategy> SessionController<G, MemoryRecorder> {
    pub fn in_memory(game: G, config: Config) -> Self {
        Self::new(game, config, MemoryRecorder::new())
    }
}

impl<G: GameStrategy, R: OutcomeRecorder> SessionController<G, R> {
    pub fn new(game: G, config: Config, recorder: R) -> Self {
        Self {
            game,
            config,
            items: Vec::new(),
            recorder,
            clock: Box::new(SystemClock::new()),
            scheduler: Scheduler::new(),
            rng: StdRng::from_entropy(),
            state: None,
            generation: 0,
        }
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Makes every shuffle and placement reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replaces the session's items. A running session restarts with them.
    pub fn set_items(&mut self, items: Vec<PracticeItem>) {
        self.items = items;
        if self.state.is_some() {
            self.reset_session();
        }
    }

    /// Pulls items from `source` and returns how many were found.
    pub fn load_items<S: ItemSource + ?Sized>(
        &mut self,
        source: &S,
        selection: &ListSelection,
        focus: FocusMode,
    ) -> usize {
        let items = source.items(selection, focus);
        info!(count = items.len(), ?focus, "items loaded");
        let count = items.len();
        self.set_items(items);
        count
    }

    /// Starts the session once the canvas is known.
    ///
    /// Calling this again with the same canvas does nothing; a different canvas is
    /// treated as a resize.
    pub fn initialize(&mut self, canvas: Canvas) {
        if let Some(state) = self.state.as_ref() {
            if state.pending_canvas.unwrap_or(state.canvas) == canvas {
                debug!("initialize ignored, canvas unchanged");
            } else {
                self.resize(canvas);
            }
            return;
        }
        self.start(canvas);
    }

    fn start(&mut self, canvas: Canvas) {
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        let state = machine.begin(self.generation, &self.items, canvas, &mut self.rng);
        info!(
            game = %self.game.kind(),
            generation = self.generation,
            items = self.items.len(),
            total = state.progress.total,
            width = canvas.width,
            height = canvas.height,
            "session started"
        );
        if state.complete {
            info!("session has nothing to play");
        }
        self.state = Some(state);
    }

    pub fn resize(&mut self, canvas: Canvas) {
        let Some(state) = self.state.take() else {
            self.start(canvas);
            return;
        };
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        self.state = Some(machine.resize(state, canvas, &mut self.rng));
    }

    /// Starts over with a fresh shuffle of the same items.
    ///
    /// Timers already scheduled stay queued but belong to the old generation, so
    /// they are dropped when they come due.
    pub fn reset_session(&mut self) {
        self.generation += 1;
        let Some(canvas) = self.state.as_ref().map(|s| s.pending_canvas.unwrap_or(s.canvas)) else {
            return;
        };
        info!(generation = self.generation, "session reset");
        self.state = None;
        self.start(canvas);
    }

    pub fn drag_start(&mut self, token: TokenId, pointer: Point) {
        let Some(state) = self.state.take() else {
            return;
        };
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        self.state = Some(machine.drag_start(state, token, pointer));
    }

    pub fn drag_move(&mut self, pointer: Point) {
        let Some(state) = self.state.take() else {
            return;
        };
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        self.state = Some(machine.drag_move(state, pointer));
    }

    pub fn drag_end(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        let (state, effects) = machine.drag_end(state);
        let state = machine.apply_pending(state, &mut self.rng);
        self.commit(state, effects, self.clock.now());
    }

    pub fn cancel_drag(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        let machine = InteractionStateMachine::new(&self.game, &self.config);
        let state = machine.cancel_drag(state);
        self.state = Some(machine.apply_pending(state, &mut self.rng));
    }

    /// Runs every timer that is due. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(now) {
            let Some(state) = self.state.take() else {
                break;
            };
            fired += 1;
            let machine = InteractionStateMachine::new(&self.game, &self.config);
            let (state, effects) = machine.fire(state, timer.generation, timer.action, &mut self.rng);
            let state = machine.apply_pending(state, &mut self.rng);
            // Follow-ups count from when the timer was due, not when it was noticed.
            self.commit(state, effects, timer.due);
        }
        fired
    }

    fn commit(&mut self, state: SessionState<G::Board>, effects: Vec<Effect>, base: Duration) {
        let finished = state.complete
            && !self
                .state
                .as_ref()
                .is_some_and(|previous| previous.complete);
        let generation = state.generation;
        for effect in effects {
            match effect {
                Effect::Record(outcome) => {
                    if let Err(err) = self.recorder.record_outcome(&outcome) {
                        warn!(item = outcome.item_id, "failed to record outcome: {err}");
                    }
                }
                Effect::Schedule { delay, action } => {
                    self.scheduler.schedule(base, delay, generation, action);
                }
            }
        }
        if finished {
            info!(
                correct = state.progress.correct,
                incorrect = state.progress.incorrect,
                accuracy = state.progress.accuracy(),
                "session complete"
            );
        }
        self.state = Some(state);
    }

    pub fn state(&self) -> Option<&SessionState<G::Board>> {
        self.state.as_ref()
    }

    pub fn board(&self) -> Option<&G::Board> {
        self.state.as_ref().map(|s| &s.board)
    }

    pub fn progress(&self) -> Progress {
        self.state.as_ref().map(|s| s.progress).unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.complete)
    }

    /// Nothing to play for the current selection.
    pub fn is_empty(&self) -> bool {
        match self.state.as_ref() {
            Some(state) => state.progress.total == 0,
            None => self.items.is_empty(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn items(&self) -> &[PracticeItem] {
        &self.items
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut R {
        &mut self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// When the next queued timer comes due, stale ones included.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }
}
