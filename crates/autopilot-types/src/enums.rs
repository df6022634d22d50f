//! Enumeration types shared by notifications, commands, and configuration.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Character creation
// ---------------------------------------------------------------------------

/// Character sex. Selects the default color palette and head cosmetics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male character.
    Male,
    /// Female character.
    Female,
}

impl Sex {
    /// Both variants, in protocol order.
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];
}

/// Outcome of a character creation request, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreationResult {
    /// The character was created.
    Ok,
    /// Rejected without a reason.
    NoReason,
    /// The name failed server-side validation.
    InvalidName,
    /// Another character already uses this name.
    NameAlreadyExists,
    /// The account holds the maximum number of characters.
    TooManyCharacters,
    /// Creation is not allowed for this account.
    NotAllowed,
    /// New players are not accepted on this server.
    NewPlayerNotAllowed,
    /// The requested breed is restricted on this server.
    RestrictedZone,
    /// The account community does not match the server community.
    InconsistentCommunity,
}

impl CreationResult {
    /// Whether the server accepted the creation.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

// ---------------------------------------------------------------------------
// Progression
// ---------------------------------------------------------------------------

/// A characteristic that can be raised by spending stat points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostableStat {
    /// Raises earth damage and pods.
    Strength,
    /// Raises life points.
    Vitality,
    /// Raises experience gain and AP/MP dodge.
    Wisdom,
    /// Raises water damage and prospecting.
    Chance,
    /// Raises air damage, dodge, and lock.
    Agility,
    /// Raises fire damage and heals.
    Intelligence,
}

impl BoostableStat {
    /// Every boostable stat in protocol order.
    pub const ALL: [Self; 6] = [
        Self::Strength,
        Self::Vitality,
        Self::Wisdom,
        Self::Chance,
        Self::Agility,
        Self::Intelligence,
    ];

    /// Numeric identifier carried by the stats upgrade command.
    pub const fn protocol_id(self) -> u8 {
        match self {
            Self::Strength => 10,
            Self::Vitality => 11,
            Self::Wisdom => 12,
            Self::Chance => 13,
            Self::Agility => 14,
            Self::Intelligence => 15,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Edge of the current map used to change map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapDirection {
    /// Northern neighbour.
    Top,
    /// Southern neighbour.
    Bottom,
    /// Western neighbour.
    Left,
    /// Eastern neighbour.
    Right,
}
