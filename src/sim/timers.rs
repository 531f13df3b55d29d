//! One-shot timers keyed to the session clock
//!
//! Every timer carries a clone of the owning session's `CancelToken`. Once
//! the token is cancelled, due timers are discarded instead of fired.

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag for a session and everything it scheduled
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Reopen the shoot gate
    RearmShot,
    /// Return to level select after a cleared level
    ExitLevel,
}

#[derive(Debug, Clone)]
struct Timer {
    due_ms: f64,
    seq: u64,
    action: TimerAction,
    token: CancelToken,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    /// Sorted by (due_ms, seq)
    timers: Vec<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, action: TimerAction, token: &CancelToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self
            .timers
            .partition_point(|t| (t.due_ms, t.seq) <= (due_ms, seq));
        self.timers.insert(
            idx,
            Timer {
                due_ms,
                seq,
                action,
                token: token.clone(),
            },
        );
    }

    /// Pop every timer due at or before `now_ms`, in due order, skipping
    /// cancelled ones
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerAction> {
        let split = self.timers.partition_point(|t| t.due_ms <= now_ms);
        self.timers
            .drain(..split)
            .filter(|t| !t.token.is_cancelled())
            .map(|t| t.action)
            .collect()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let token = CancelToken::new();
        let mut timers = TimerQueue::new();
        timers.schedule(2000.0, TimerAction::ExitLevel, &token);
        timers.schedule(600.0, TimerAction::RearmShot, &token);

        assert!(timers.take_due(599.0).is_empty());
        assert_eq!(timers.take_due(600.0), vec![TimerAction::RearmShot]);
        assert_eq!(timers.take_due(5000.0), vec![TimerAction::ExitLevel]);
        assert!(timers.take_due(f64::INFINITY).is_empty());
    }

    #[test]
    fn test_cancelled_timers_are_noops() {
        let token = CancelToken::new();
        let mut timers = TimerQueue::new();
        timers.schedule(600.0, TimerAction::RearmShot, &token);
        token.cancel();
        assert!(timers.take_due(1000.0).is_empty());
        assert!(timers.take_due(f64::INFINITY).is_empty());
    }
}
