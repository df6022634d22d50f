//! Typed publish/subscribe for one session.
//!
//! Subscriptions are fixed when the bus is built. `publish` assigns the next
//! arrival sequence number, offers the event to pending correlation waiters,
//! then runs the subscribed handlers in registration order. A failing handler
//! is reported and never stops delivery to the others.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::correlator::{CorrelationToken, Correlator};
use crate::error::HandlerError;
use crate::event::{Event, Tagged};
use crate::handler::{EventHandler, FnHandler};

/// Number of recent events retained by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

type HandlerList<T> = Vec<Arc<dyn EventHandler<T>>>;

/// Outcome of one [`EventBus::publish`] call.
#[derive(Debug)]
pub struct PublishReport<Tag> {
    /// Sequence number assigned to the event.
    pub seq: u64,
    /// Tag of the event.
    pub tag: Tag,
    /// Number of correlation waiters that consumed the event.
    pub resolved: usize,
    /// Number of handlers that ran successfully.
    pub delivered: usize,
    /// Handlers that failed.
    pub failures: Vec<HandlerError>,
}

struct Journal<T> {
    next_seq: u64,
    capacity: usize,
    recent: VecDeque<Arc<Event<T>>>,
}

/// Builder collecting subscriptions before the bus goes live.
pub struct EventBusBuilder<T: Tagged> {
    correlator: Correlator<T>,
    handlers: HashMap<T::Tag, HandlerList<T>>,
    history_capacity: usize,
}

impl<T> EventBusBuilder<T>
where
    T: Tagged + Send + Sync + 'static,
{
    /// Start a builder around the session's correlator.
    pub fn new(correlator: Correlator<T>) -> Self {
        Self {
            correlator,
            handlers: HashMap::new(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }

    /// Register `handler` for every future event tagged `tag`.
    #[must_use]
    pub fn subscribe(mut self, tag: T::Tag, handler: Arc<dyn EventHandler<T>>) -> Self {
        self.handlers.entry(tag).or_default().push(handler);
        self
    }

    /// Register a closure for every future event tagged `tag`.
    #[must_use]
    pub fn subscribe_fn<F>(self, tag: T::Tag, name: &str, f: F) -> Self
    where
        F: Fn(&Event<T>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(tag, Arc::new(FnHandler::new(name, f)))
    }

    /// Retain at most `capacity` recent events.
    #[must_use]
    pub const fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Freeze the subscriptions.
    pub fn build(self) -> EventBus<T> {
        EventBus {
            correlator: self.correlator,
            handlers: self.handlers,
            journal: Mutex::new(Journal {
                next_seq: 0,
                capacity: self.history_capacity,
                recent: VecDeque::new(),
            }),
        }
    }
}

/// Per-session event bus.
pub struct EventBus<T: Tagged> {
    correlator: Correlator<T>,
    handlers: HashMap<T::Tag, HandlerList<T>>,
    journal: Mutex<Journal<T>>,
}

impl<T> EventBus<T>
where
    T: Tagged + Send + Sync + 'static,
{
    /// Start building a bus around `correlator`.
    pub fn builder(correlator: Correlator<T>) -> EventBusBuilder<T> {
        EventBusBuilder::new(correlator)
    }

    /// Publish `payload` and fan it out.
    ///
    /// Correlation waiters are offered the event before any handler runs, so
    /// a waiter registered by a handler only sees later events.
    pub fn publish(&self, payload: T) -> PublishReport<T::Tag> {
        let tag = payload.tag();
        let event = {
            let mut journal = self.journal.lock();
            let seq = journal.next_seq;
            journal.next_seq = seq.wrapping_add(1);
            let event = Arc::new(Event {
                seq,
                received_at: Utc::now(),
                payload,
            });
            if journal.capacity > 0 {
                if journal.recent.len() >= journal.capacity {
                    journal.recent.pop_front();
                }
                journal.recent.push_back(Arc::clone(&event));
            }
            event
        };

        let resolved = self.correlator.resolve(&event);

        let mut delivered: usize = 0;
        let mut failures = Vec::new();
        for handler in self.handlers.get(&tag).into_iter().flatten() {
            match handler.handle(&event) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(source) => {
                    let failure = HandlerError {
                        handler: handler.handler_name().to_owned(),
                        seq: event.seq,
                        source,
                    };
                    warn!(
                        target: "autopilot::bus",
                        ?tag,
                        seq = event.seq,
                        error = %failure,
                        "Event handler failed"
                    );
                    failures.push(failure);
                }
            }
        }

        trace!(
            target: "autopilot::bus",
            ?tag,
            seq = event.seq,
            resolved,
            delivered,
            "Event published"
        );

        PublishReport {
            seq: event.seq,
            tag,
            resolved,
            delivered,
            failures,
        }
    }

    /// Wait for the first future event whose payload satisfies `predicate`.
    pub fn await_one<P>(&self, predicate: P) -> CorrelationToken<Arc<Event<T>>>
    where
        P: Fn(&T) -> bool + Send + 'static,
    {
        self.correlator.await_one(predicate)
    }

    /// Invalidate every pending correlation token.
    pub fn cancel_waiters(&self) -> usize {
        self.correlator.cancel_all()
    }

    /// The correlator shared with this bus.
    pub const fn correlator(&self) -> &Correlator<T> {
        &self.correlator
    }

    /// Recently published events, oldest first.
    pub fn history(&self) -> Vec<Arc<Event<T>>> {
        self.journal.lock().recent.iter().cloned().collect()
    }

    /// Total number of events published so far.
    pub fn published(&self) -> u64 {
        self.journal.lock().next_seq
    }
}

impl<T: Tagged> core::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("tags", &self.handlers.len())
            .finish_non_exhaustive()
    }
}
