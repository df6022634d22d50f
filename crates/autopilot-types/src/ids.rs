//! Type-safe identifier wrappers.
//!
//! The game server addresses everything by plain integers. Wrapping each kind
//! in its own newtype keeps a map id from ever being passed where a character
//! id is expected. Sessions are the only entity minted locally and use UUID v7.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a raw server identifier.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Wrap a raw server identifier.
            pub const fn new(raw: $inner) -> Self {
                Self(raw)
            }

            /// Return the raw server identifier.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }
    };
}

define_id! {
    /// Server identifier of a character.
    CharacterId(i64)
}

define_id! {
    /// Identifier of a playable breed (class).
    BreedId(u8)
}

define_id! {
    /// Identifier of a head cosmetic.
    CosmeticId(u32)
}

define_id! {
    /// Identifier of a map.
    MapId(i64)
}

define_id! {
    /// A cell index on a map grid.
    CellId(u16)
}

define_id! {
    /// Contextual identifier of an NPC placed on the current map.
    NpcId(i32)
}

define_id! {
    /// Generic (template) identifier of an item.
    ItemGid(u32)
}

define_id! {
    /// Identifier of a quest.
    QuestId(u32)
}

define_id! {
    /// Identifier of a quest step. Used as the de-duplication key for
    /// re-delivered step notifications.
    StepId(u32)
}

define_id! {
    /// Identifier of a quest objective.
    ObjectiveId(u32)
}

define_id! {
    /// Identifier of a spell.
    SpellId(u32)
}

/// Locally minted identifier of one logged-in account session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new session identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
