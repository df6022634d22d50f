//! Deferred correlation of fire-and-forget commands with later events.
//!
//! A waiter is registered *before* the command is sent, so a reply that
//! arrives immediately cannot be missed. Each waiter resolves at most once,
//! with the first event it accepts, and is then removed; waiters on different
//! predicates never consume each other's events.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::WaitError;
use crate::event::Event;

/// Returns `true` once the waiter is finished and should be removed.
type Waiter<T> = Box<dyn FnMut(&Arc<Event<T>>) -> bool + Send>;

struct Waiters<T> {
    next_id: u64,
    entries: Vec<(u64, Waiter<T>)>,
}

struct Inner<T> {
    waiters: Mutex<Waiters<T>>,
}

/// Removal hook held by tokens, erasing the event type.
trait Registry: Send + Sync {
    fn remove(&self, id: u64);
}

impl<T: Send + Sync + 'static> Registry for Inner<T> {
    fn remove(&self, id: u64) {
        self.waiters.lock().entries.retain(|(waiter_id, _)| *waiter_id != id);
    }
}

/// Registry of pending one-shot waiters for one session.
pub struct Correlator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Correlator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Default for Correlator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Correlator<T> {
    /// Create an empty correlator.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                waiters: Mutex::new(Waiters {
                    next_id: 0,
                    entries: Vec::new(),
                }),
            }),
        }
    }

    /// Wait for the first future event for which `f` returns `Some`.
    ///
    /// `f` sees every event published after this call until it matches; the
    /// token then resolves with the extracted value.
    pub fn await_map<R, F>(&self, mut f: F) -> CorrelationToken<R>
    where
        R: Send + 'static,
        F: FnMut(&Event<T>) -> Option<R> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let waiter: Waiter<T> = Box::new(move |event| match f(event) {
            Some(value) => {
                if let Some(tx) = tx.take() {
                    // Receiver may already be gone; nothing to deliver to.
                    let _ = tx.send(value);
                }
                true
            }
            None => tx.as_ref().is_none_or(oneshot::Sender::is_closed),
        });
        self.register(waiter, rx)
    }

    /// Wait for the first future event whose payload satisfies `predicate`.
    pub fn await_one<P>(&self, predicate: P) -> CorrelationToken<Arc<Event<T>>>
    where
        P: Fn(&T) -> bool + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let mut tx = Some(tx);
        let waiter: Waiter<T> = Box::new(move |event| {
            if predicate(&event.payload) {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(Arc::clone(event));
                }
                true
            } else {
                tx.as_ref().is_none_or(oneshot::Sender::is_closed)
            }
        });
        self.register(waiter, rx)
    }

    fn register<R>(&self, waiter: Waiter<T>, rx: oneshot::Receiver<R>) -> CorrelationToken<R> {
        let id = {
            let mut waiters = self.inner.waiters.lock();
            let id = waiters.next_id;
            waiters.next_id = id.wrapping_add(1);
            waiters.entries.push((id, waiter));
            id
        };

        let registry: Arc<dyn Registry> = self.inner.clone();
        CorrelationToken {
            id,
            rx: Some(rx),
            registry: Arc::downgrade(&registry),
        }
    }

    /// Offer `event` to every pending waiter. Returns how many resolved or
    /// were discarded because their token was dropped.
    pub fn resolve(&self, event: &Arc<Event<T>>) -> usize {
        let mut waiters = self.inner.waiters.lock();
        let before = waiters.entries.len();
        waiters.entries.retain_mut(|(_, waiter)| !waiter(event));
        before.saturating_sub(waiters.entries.len())
    }

    /// Drop every pending waiter. Their tokens complete with
    /// [`WaitError::Cancelled`].
    pub fn cancel_all(&self) -> usize {
        let mut waiters = self.inner.waiters.lock();
        let dropped = waiters.entries.len();
        waiters.entries.clear();
        dropped
    }

    /// Number of waiters still pending.
    pub fn pending(&self) -> usize {
        self.inner.waiters.lock().entries.len()
    }
}

impl<T> core::fmt::Debug for Correlator<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Correlator").finish_non_exhaustive()
    }
}

/// Single-use handle on a pending correlation.
///
/// Dropping the token unregisters its waiter.
#[must_use = "a correlation token does nothing unless awaited"]
pub struct CorrelationToken<R> {
    id: u64,
    rx: Option<oneshot::Receiver<R>>,
    registry: Weak<dyn Registry>,
}

impl<R> CorrelationToken<R> {
    /// Wait for the correlated event.
    ///
    /// With `timeout = None` the wait is unbounded. With a watchdog the wait
    /// fails with [`WaitError::Stalled`] once it expires.
    pub async fn wait(mut self, timeout: Option<Duration>) -> Result<R, WaitError> {
        let Some(rx) = self.rx.take() else {
            return Err(WaitError::Cancelled);
        };
        match timeout {
            None => Ok(rx.await?),
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => Ok(received?),
                Err(_elapsed) => Err(WaitError::Stalled {
                    after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }),
            },
        }
    }
}

impl<R> Drop for CorrelationToken<R> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl<R> core::fmt::Debug for CorrelationToken<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CorrelationToken")
            .field("id", &self.id)
            .field("pending", &self.rx.is_some())
            .finish()
    }
}
