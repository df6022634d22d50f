//! Event envelope and tagging.

use core::fmt::Debug;
use core::hash::Hash;

use chrono::{DateTime, Utc};

/// A payload that can be routed by tag.
pub trait Tagged {
    /// Subscription key identifying the payload kind.
    type Tag: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Tag of this payload.
    fn tag(&self) -> Self::Tag;
}

/// An immutable, published event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event<T> {
    /// Arrival order within the session, starting at zero.
    pub seq: u64,
    /// Wall-clock time the event was published.
    pub received_at: DateTime<Utc>,
    /// Decoded payload.
    pub payload: T,
}

impl<T: Tagged> Event<T> {
    /// Tag of the payload.
    pub fn tag(&self) -> T::Tag {
        self.payload.tag()
    }
}
