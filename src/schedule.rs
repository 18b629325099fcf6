//! Deferred session transitions.
//!
//! Timers are never cancelled. Each one carries the session generation it was
//! scheduled under, and the session ignores timers from an older generation.

use crate::game::Attempt;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    /// The "correct" hold elapsed; replenish or check the word.
    SettleCorrect(Attempt),
    /// The "incorrect" hold elapsed; put things back and unblock input.
    RevertIncorrect(Attempt),
    /// Next frame of the word-completion walk.
    AnimationStep,
    /// Celebration finished; move to the next word or finish.
    AdvanceWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub due: Duration,
    pub generation: u64,
    pub action: TimedAction,
    seq: u64,
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending timers ordered by due time, ties in scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, generation: u64, action: TimedAction) {
        let timer = Timer {
            due: now + delay,
            generation,
            action,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.push(Reverse(timer));
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer> {
        match self.queue.peek() {
            Some(Reverse(timer)) if timer.due <= now => self.queue.pop().map(|Reverse(t)| t),
            _ => None,
        }
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(t)| t.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
