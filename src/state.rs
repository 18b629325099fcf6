use crate::game::Attempt;
use crate::geometry::{Canvas, Point};
use crate::ids::{TargetId, TokenId};
use crate::layout::Verdict;
use serde::{Deserialize, Serialize};

/// Attempt counters shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub correct: u32,
    pub incorrect: u32,
    /// Pairs cleared or words finished.
    pub resolved: u32,
    /// Pairs or words in the session.
    pub total: u32,
}

impl Progress {
    pub fn with_total(total: usize) -> Self {
        Self {
            total: total as u32,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Share of correct attempts, in percent.
    pub fn accuracy(&self) -> f64 {
        match self.attempts() {
            0 => 0.0,
            n => (self.correct as f64 / n as f64 * 100.0).round(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        token: TokenId,
        pointer: Point,
        hovered: Option<TargetId>,
    },
}

/// A feedback hold currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub attempt: Attempt,
    pub verdict: Verdict,
}

/// Coarse interaction phase, derived from the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Dragging,
    FeedbackCorrect,
    FeedbackIncorrect,
    Celebrating,
}

/// Everything the presentation layer reads, replaced wholesale on every transition.
#[derive(Debug, Clone)]
pub struct SessionState<B> {
    pub generation: u64,
    pub canvas: Canvas,
    pub board: B,
    pub drag: DragState,
    pub feedback: Vec<Feedback>,
    pub input_blocked: bool,
    pub animating: bool,
    pub progress: Progress,
    pub complete: bool,
    /// Resize received while the session was busy.
    pub pending_canvas: Option<Canvas>,
}

impl<B> SessionState<B> {
    pub fn new(generation: u64, canvas: Canvas, board: B, total: usize, complete: bool) -> Self {
        Self {
            generation,
            canvas,
            board,
            drag: DragState::Idle,
            feedback: Vec::new(),
            input_blocked: false,
            animating: false,
            progress: Progress::with_total(total),
            complete,
            pending_canvas: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if matches!(self.drag, DragState::Dragging { .. }) {
            Phase::Dragging
        } else if self.animating {
            Phase::Celebrating
        } else if self.feedback.iter().any(|f| f.verdict == Verdict::Incorrect) {
            Phase::FeedbackIncorrect
        } else if !self.feedback.is_empty() {
            Phase::FeedbackCorrect
        } else {
            Phase::Idle
        }
    }

    pub fn hovered(&self) -> Option<TargetId> {
        match self.drag {
            DragState::Dragging { hovered, .. } => hovered,
            DragState::Idle => None,
        }
    }

    pub fn selected(&self) -> Option<TokenId> {
        match self.drag {
            DragState::Dragging { token, .. } => Some(token),
            DragState::Idle => None,
        }
    }

    pub fn pointer(&self) -> Option<Point> {
        match self.drag {
            DragState::Dragging { pointer, .. } => Some(pointer),
            DragState::Idle => None,
        }
    }

    /// No drag, hold or animation in progress.
    pub fn is_settled(&self) -> bool {
        self.drag == DragState::Idle
            && self.feedback.is_empty()
            && !self.input_blocked
            && !self.animating
    }
}
