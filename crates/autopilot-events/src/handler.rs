//! Event handlers.

use crate::event::Event;

/// A subscriber to one or more event tags.
///
/// Handlers run synchronously inside [`EventBus::publish`](crate::EventBus::publish)
/// and must not block. Work that needs to wait is spawned onto the session's
/// [`TaskScope`](crate::TaskScope).
pub trait EventHandler<T>: Send + Sync {
    /// Handler name, used when reporting failures.
    fn handler_name(&self) -> &str;

    /// Handle one event.
    fn handle(&self, event: &Event<T>) -> anyhow::Result<()>;
}

/// Adapter turning a closure into an [`EventHandler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F> {
    /// Wrap `f` under the given handler name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<T, F> EventHandler<T> for FnHandler<F>
where
    F: Fn(&Event<T>) -> anyhow::Result<()> + Send + Sync,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn handle(&self, event: &Event<T>) -> anyhow::Result<()> {
        (self.f)(event)
    }
}

impl<F> core::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish_non_exhaustive()
    }
}
