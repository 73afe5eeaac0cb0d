//! Three-stage pipeline for executing synthetic input on the render thread.
//!
//! The render loop cannot perform pointer/keyboard injection synchronously
//! inside a rendezvous call without risking deadlock against its own frame
//! pump, so the decision to act (update phase) is split from the side effect
//! (draw phase, after the frame's visual state is finalized):
//!
//! ```text
//! Idle --stage--> Requested --commit--> Committed --complete--> Completed
//!   ^                                                              |
//!   +------------------- waiter consumes result -------------------+
//! ```
//!
//! Every transition whose precondition is unmet is an explicit no-op: the
//! render loop must never stall because the tester is out of step.

use crate::input::PendingAction;
use std::sync::{Condvar, Mutex};

/// Lifecycle of the single staged action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No action in flight
    Idle,
    /// An action has been requested and awaits the update phase's decision
    Requested,
    /// The update phase approved execution during the coming draw phase
    Committed,
    /// The draw phase dispatched the action; the waiter has not consumed yet
    Completed,
}

#[derive(Debug)]
struct Inner {
    state: State,
    action: Option<PendingAction>,
}

/// Single-slot action pipeline between the test thread and the render loop.
///
/// One producer (the test thread) and one consumer (the render loop). The
/// tester blocks in [`request`](Self::request) until the loop has observably
/// executed the action, which guarantees the input event happened before the
/// next assertion runs.
#[derive(Debug)]
pub struct ActionSequencer {
    inner: Mutex<Inner>,
    turnstile: Condvar,
}

impl Default for ActionSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSequencer {
    /// Create an idle sequencer
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Idle,
                action: None,
            }),
            turnstile: Condvar::new(),
        }
    }

    /// Mark an action pending. No-op (returns `false`) if one already is.
    pub fn stage(&self, action: PendingAction) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != State::Idle {
            return false;
        }
        inner.state = State::Requested;
        inner.action = Some(action);
        true
    }

    /// Approve the staged action for execution during the coming draw phase.
    ///
    /// Update phase only. No-op unless an action is staged.
    pub fn commit(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != State::Requested {
            return false;
        }
        inner.state = State::Committed;
        true
    }

    /// Signal that the committed action has been dispatched.
    ///
    /// Draw phase only, after injection. No-op unless an action is
    /// committed. Wakes the blocked requester.
    pub fn complete(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state != State::Committed {
            return false;
        }
        inner.state = State::Completed;
        self.turnstile.notify_all();
        true
    }

    /// The staged action awaiting the update phase's decision, if any
    #[must_use]
    pub fn staged(&self) -> Option<PendingAction> {
        let inner = self.inner.lock().unwrap();
        (inner.state == State::Requested)
            .then(|| inner.action.clone())
            .flatten()
    }

    /// The committed action awaiting dispatch, if any
    #[must_use]
    pub fn committed(&self) -> Option<PendingAction> {
        let inner = self.inner.lock().unwrap();
        (inner.state == State::Committed)
            .then(|| inner.action.clone())
            .flatten()
    }

    /// Request an action and block until the render loop has executed it.
    ///
    /// Operations are strictly one-at-a-time: a request issued while another
    /// is in flight waits for the slot to free before staging. Shares the
    /// liveness contract of [`Rendezvous::ping`](crate::Rendezvous::ping):
    /// the render loop must keep running until the request completes.
    pub fn request(&self, action: PendingAction) {
        let mut inner = self.inner.lock().unwrap();
        while inner.state != State::Idle {
            inner = self.turnstile.wait(inner).unwrap();
        }
        inner.state = State::Requested;
        inner.action = Some(action);
        while inner.state != State::Completed {
            inner = self.turnstile.wait(inner).unwrap();
        }
        inner.state = State::Idle;
        inner.action = None;
        self.turnstile.notify_all();
    }
}
