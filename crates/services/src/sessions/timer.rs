use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One fire-once timer owned by a session.
///
/// Each arm gets a generation number. Cancelling bumps the generation and
/// aborts the task, and a firing task must `claim` its generation under the
/// session lock before acting, so a cancelled timer never reaches the session
/// even if its task already woke up.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    /// Arm the timer, replacing any pending one. `on_fire` receives the
    /// generation to pass back to `claim`.
    ///
    /// Outside a tokio runtime the timer stays disarmed.
    pub(crate) fn arm<F>(&mut self, name: &'static str, after: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let Ok(runtime) = Handle::try_current() else {
            warn!(timer = name, "no tokio runtime available; timer not armed");
            return;
        };
        let generation = self.generation;
        debug!(timer = name, ?after, generation, "timer armed");
        self.handle = Some(runtime.spawn(async move {
            tokio::time::sleep(after).await;
            on_fire(generation);
        }));
    }

    /// Cancel the pending fire, if any.
    pub(crate) fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Take ownership of a fire. Returns false for stale generations.
    pub(crate) fn claim(&mut self, generation: u64) -> bool {
        if self.handle.is_none() || self.generation != generation {
            return false;
        }
        self.handle = None;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}
