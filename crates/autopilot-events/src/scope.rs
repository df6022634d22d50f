//! Cancellable suspension points for one session.
//!
//! Every task that waits (a correlation token, a settling delay) is spawned
//! through the session's [`TaskScope`]. [`TaskScope::reset`] cancels them all
//! at once and starts a new generation; code resuming after a suspension
//! point checks [`TaskScope::is_current`] before mutating session state.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::WaitError;

struct ScopeState {
    token: CancellationToken,
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
}

/// Owner of every pending task of one session.
pub struct TaskScope {
    label: String,
    parent: CancellationToken,
    state: Mutex<ScopeState>,
}

impl TaskScope {
    /// Create a scope whose tasks are cancelled when `parent` is.
    pub fn new(label: impl Into<String>, parent: &CancellationToken) -> Self {
        Self {
            label: label.into(),
            parent: parent.clone(),
            state: Mutex::new(ScopeState {
                token: parent.child_token(),
                generation: 0,
                tasks: Vec::new(),
            }),
        }
    }

    /// Create a scope with no parent token.
    pub fn detached(label: impl Into<String>) -> Self {
        Self::new(label, &CancellationToken::new())
    }

    /// Current generation. Bumped by every [`reset`](Self::reset).
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Whether `generation` is still the live one.
    pub fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    /// Cancellation token of the current generation.
    pub fn token(&self) -> CancellationToken {
        self.state.lock().token.clone()
    }

    /// Spawn `fut` on the runtime. It is dropped at its next suspension
    /// point once the scope is reset or its parent is cancelled.
    pub fn spawn<F>(&self, task: &'static str, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.lock();
        state.tasks.retain(|handle| !handle.is_finished());
        let token = state.token.clone();
        let label = self.label.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(target: "autopilot::bus", scope = %label, task, "Scoped task cancelled");
                }
                () = fut => {}
            }
        });
        state.tasks.push(handle);
    }

    /// Sleep for `duration` unless the scope is reset first.
    ///
    /// The token is captured now, so a reset between this call and the
    /// first poll still cancels the delay.
    pub fn settle(
        &self,
        duration: Duration,
    ) -> impl Future<Output = Result<(), WaitError>> + Send + 'static {
        let token = self.token();
        async move {
            tokio::select! {
                biased;
                () = token.cancelled() => Err(WaitError::Cancelled),
                () = tokio::time::sleep(duration) => Ok(()),
            }
        }
    }

    /// Cancel and abort every pending task and start a new generation.
    /// Returns the new generation.
    pub fn reset(&self) -> u64 {
        let mut state = self.state.lock();
        state.token.cancel();
        for handle in state.tasks.drain(..) {
            handle.abort();
        }
        state.token = self.parent.child_token();
        state.generation = state.generation.wrapping_add(1);
        debug!(
            target: "autopilot::bus",
            scope = %self.label,
            generation = state.generation,
            "Task scope reset"
        );
        state.generation
    }

    /// Cancel every pending task without starting a new generation.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        state.token.cancel();
        for handle in state.tasks.drain(..) {
            handle.abort();
        }
    }

    /// Number of tasks that have not finished yet.
    pub fn pending(&self) -> usize {
        let mut state = self.state.lock();
        state.tasks.retain(|handle| !handle.is_finished());
        state.tasks.len()
    }
}

impl core::fmt::Debug for TaskScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskScope")
            .field("label", &self.label)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
