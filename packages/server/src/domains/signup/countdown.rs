//! Resend cooldown timer.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::WizardState;

pub(crate) fn lock_state(state: &Mutex<WizardState>) -> MutexGuard<'_, WizardState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Handle to a running one-second countdown on a [`WizardState`].
///
/// The ticking task only holds a weak reference to the state and is
/// aborted when the handle is dropped, so a torn-down wizard is never
/// mutated afterwards.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Set `countdown_seconds` and start ticking it down to zero.
    pub fn start(state: &Arc<Mutex<WizardState>>, seconds: u32) -> Self {
        lock_state(state).countdown_seconds = seconds;

        let weak = Arc::downgrade(state);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(state) = weak.upgrade() else {
                    break;
                };
                if !lock_state(&state).tick() {
                    break;
                }
            }
        });

        Self { handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop ticking. The remaining seconds are left as they are.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
