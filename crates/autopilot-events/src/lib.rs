//! Event distribution and correlation for a single account session.
//!
//! Every session owns one [`EventBus`]: inbound notifications are published
//! in arrival order and fanned out synchronously to the handlers subscribed
//! to their tag. Commands sent to the server never get a direct reply, so
//! code that needs the eventual answer registers a [`CorrelationToken`] on
//! the bus *before* sending, then awaits it. Everything that suspends
//! (correlation waits, settling delays) runs inside the session's
//! [`TaskScope`] so a reset can cancel it deterministically.
//!
//! # Modules
//!
//! - [`event`] -- The [`Tagged`] trait and the immutable [`Event`] envelope
//! - [`handler`] -- The [`EventHandler`] trait and a closure adapter
//! - [`correlator`] -- One-shot predicate waiters and [`CorrelationToken`]
//! - [`bus`] -- [`EventBus`] and its builder
//! - [`scope`] -- [`TaskScope`], the per-session cancellation handle
//! - [`error`] -- [`WaitError`] and [`HandlerError`]

pub mod bus;
pub mod correlator;
pub mod error;
pub mod event;
pub mod handler;
pub mod scope;

pub use bus::{DEFAULT_HISTORY_CAPACITY, EventBus, EventBusBuilder, PublishReport};
pub use correlator::{CorrelationToken, Correlator};
pub use error::{HandlerError, WaitError};
pub use event::{Event, Tagged};
pub use handler::{EventHandler, FnHandler};
pub use scope::TaskScope;
