//! Mutex/condvar owner of the control state.

use super::transition::{next_state, InvalidTransition};
use super::{ControlAction, ControlState};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Shared control state of one robot instance.
///
/// Construct once and hand out behind an `Arc`; every thread that raises or
/// observes control requests goes through the same instance. All transitions
/// are linearized by the inner mutex.
#[derive(Debug, Default)]
pub struct ControlStateMachine {
    state: Mutex<ControlState>,
    changed: Condvar,
}

impl ControlStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts in `state` instead of `NoRequest`.
    pub fn with_state(state: ControlState) -> Self {
        Self {
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    /// Takes the control lock for a read-then-act sequence.
    ///
    /// While the guard lives no `switch` from another thread can complete.
    pub fn lock(&self) -> ControlGuard<'_> {
        // The guarded value is a plain enum, a panic elsewhere cannot leave it torn.
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        ControlGuard {
            machine: self,
            state,
        }
    }

    pub fn switch(&self, action: ControlAction) -> Result<ControlState, InvalidTransition> {
        self.lock().switch(action)
    }

    pub fn current_state(&self) -> ControlState {
        self.lock().state()
    }

    /// Parks the caller while a pause is pending and returns the state that
    /// released it. Returns at once when no pause is pending.
    pub fn wait_for_resume(&self) -> ControlState {
        self.lock().wait_for_resume().state()
    }
}

/// Exclusive access to the control state.
pub struct ControlGuard<'a> {
    machine: &'a ControlStateMachine,
    state: MutexGuard<'a, ControlState>,
}

impl<'a> ControlGuard<'a> {
    pub fn state(&self) -> ControlState {
        *self.state
    }

    /// Applies `action` and wakes every thread parked in `wait_for_resume`.
    pub fn switch(&mut self, action: ControlAction) -> Result<ControlState, InvalidTransition> {
        let current = *self.state;
        match next_state(current, action) {
            Ok(next) => {
                *self.state = next;
                self.machine.changed.notify_all();
                tracing::debug!(from = %current, %action, to = %next, "Control transition");
                Ok(next)
            }
            Err(err) => {
                tracing::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Acknowledges a pending pause, then waits until it is lifted.
    ///
    /// The predicate is re-checked after every wakeup, and a resume or stop
    /// that landed before the call is seen without waiting at all.
    pub fn wait_for_resume(mut self) -> ControlGuard<'a> {
        if *self.state == ControlState::PauseRequested
            && self.switch(ControlAction::MotionPaused).is_ok()
        {
            tracing::info!("Start wait for resume");
        }

        let machine = self.machine;
        let mut state = self.state;
        while *state == ControlState::PauseRequested {
            state = machine
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        tracing::debug!(state = %*state, "Wait for resume finished");
        ControlGuard { machine, state }
    }
}
