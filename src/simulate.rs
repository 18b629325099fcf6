//! Headless player that drives a session through the same pointer calls a UI makes.

use crate::game::{Attempt, GameStrategy};
use crate::geometry::Point;
use crate::ids::TokenId;
use crate::runtime::{Clock, ManualClock};
use crate::session::{Progress, SessionController};
use crate::stats::OutcomeRecorder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_MAX_MOVES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Move {
    token: TokenId,
    from: Point,
    to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayReport {
    pub moves: usize,
    pub progress: Progress,
    /// Simulated time spent, feedback holds included.
    pub elapsed: Duration,
    pub completed: bool,
}

pub struct Autoplayer {
    rng: StdRng,
    mistake_rate: f64,
    max_moves: usize,
}

impl Autoplayer {
    /// `mistake_rate` is the chance of deliberately dropping on a wrong target.
    pub fn new(seed: u64, mistake_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mistake_rate: mistake_rate.clamp(0.0, 1.0),
            max_moves: DEFAULT_MAX_MOVES,
        }
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Plays until the session completes, gets stuck, or runs out of moves.
    ///
    /// `clock` must be the clock the session was built with; it is moved forward
    /// to each timer as the player waits out holds and animations.
    pub fn play<G: GameStrategy, R: OutcomeRecorder>(
        &mut self,
        session: &mut SessionController<G, R>,
        clock: &ManualClock,
    ) -> PlayReport {
        let started = session.now();
        let mut moves = 0;

        while !session.is_complete() && moves < self.max_moves {
            let settled = session.state().is_some_and(|s| s.is_settled());
            if !settled {
                let Some(due) = session.next_due() else {
                    warn!("session busy with nothing scheduled");
                    break;
                };
                if due > clock.now() {
                    clock.set(due);
                }
                session.tick();
                continue;
            }

            let Some(next) = self.choose(session) else {
                warn!(moves, "no move available");
                break;
            };
            debug!(token = %next.token, "autoplayer move");
            session.drag_start(next.token, next.from);
            session.drag_move(next.to);
            session.drag_end();
            moves += 1;
        }

        PlayReport {
            moves,
            progress: session.progress(),
            elapsed: session.now().saturating_sub(started),
            completed: session.is_complete(),
        }
    }

    fn choose<G: GameStrategy, R: OutcomeRecorder>(
        &mut self,
        session: &SessionController<G, R>,
    ) -> Option<Move> {
        let state = session.state()?;
        let game = session.game();

        let mut right = Vec::new();
        let mut wrong = Vec::new();
        for source in game.drag_sources(&state.board) {
            for target in game.drop_targets(&state.board, source.id) {
                let attempt = Attempt {
                    token: source.id,
                    target: target.id,
                };
                let candidate = Move {
                    token: source.id,
                    from: source.center,
                    to: target.center,
                };
                if game.validate(&state.board, attempt) {
                    right.push(candidate);
                } else {
                    wrong.push(candidate);
                }
            }
        }

        let blunder = !wrong.is_empty() && self.rng.gen_bool(self.mistake_rate);
        let pool = if blunder || right.is_empty() {
            &wrong
        } else {
            &right
        };
        pool.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::{FillGame, PairingGame, PathGame};
    use crate::geometry::Canvas;
    use crate::item::{ItemId, PracticeItem};

    fn words() -> Vec<PracticeItem> {
        ["casa", "perro", "gato", "sol", "luna"]
            .iter()
            .enumerate()
            .map(|(i, w)| PracticeItem::new(i as ItemId, format!("en{i}"), *w))
            .collect()
    }

    fn session<G: GameStrategy>(game: G, clock: &ManualClock, items: Vec<PracticeItem>) -> SessionController<G> {
        let mut session = SessionController::in_memory(game, Config::default())
            .with_clock(clock.clone())
            .with_seed(5);
        session.set_items(items);
        session.initialize(Canvas::new(420.0, 900.0));
        session
    }

    #[test]
    fn test_perfect_pairing_run() {
        let clock = ManualClock::new();
        let items: Vec<PracticeItem> = (0..14)
            .map(|i| PracticeItem::new(i, format!("p{i}"), format!("a{i}")))
            .collect();
        let mut s = session(PairingGame::new(&Config::default()), &clock, items);

        let report = Autoplayer::new(1, 0.0).play(&mut s, &clock);
        assert!(report.completed);
        assert_eq!(report.progress.correct, 14);
        assert_eq!(report.progress.incorrect, 0);
        assert_eq!(report.progress.resolved, 14);
        assert_eq!(s.recorder().outcomes().len(), 14);
        assert!(report.elapsed >= Duration::from_secs(14));
        assert_eq!(clock.now(), report.elapsed);
    }

    #[test]
    fn test_clumsy_fill_run_still_finishes() {
        let clock = ManualClock::new();
        let mut s = session(FillGame::new(&Config::default()), &clock, words());

        let report = Autoplayer::new(2, 0.4).play(&mut s, &clock);
        assert!(report.completed);
        assert_eq!(report.progress.resolved, 5);
        let outcomes = s.recorder().outcomes();
        assert_eq!(outcomes.len(), 5);
        if report.progress.incorrect > 0 {
            assert!(outcomes.iter().any(|o| !o.success));
        }
    }

    #[test]
    fn test_path_run_waits_for_walk() {
        let clock = ManualClock::new();
        let mut s = session(PathGame::new(&Config::default()), &clock, words());

        let report = Autoplayer::new(3, 0.0).play(&mut s, &clock);
        assert!(report.completed);
        assert!(s.recorder().outcomes().iter().all(|o| o.success));
        assert_eq!(report.progress.correct as usize, "casaperrogatosolluna".len());
    }

    #[test]
    fn test_move_cap_stops_early() {
        let clock = ManualClock::new();
        let mut s = session(FillGame::new(&Config::default()), &clock, words());
        let report = Autoplayer::new(4, 0.0).with_max_moves(1).play(&mut s, &clock);
        assert_eq!(report.moves, 1);
        assert!(!report.completed);
    }
}
