//! Stat point planning.

use autopilot_types::{BoostableStat, Command};
use serde::{Deserialize, Serialize};

use crate::table::{CostTable, TierLookup};

/// A planned stat point spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSpend {
    /// Stat points to send in one upgrade command.
    pub points: u32,
    /// Number of base increments bought.
    pub increments: u32,
    /// Base value the stat reaches once the server applies the spend.
    pub final_base: u32,
    /// Points left over in the working budget.
    pub remaining: u32,
}

impl StatSpend {
    /// Upgrade command carrying this spend.
    pub const fn command(&self, stat: BoostableStat) -> Command {
        Command::StatsUpgrade {
            stat,
            boost_points: self.points,
        }
    }
}

/// Whether `budget` covers the next increment at `base`.
pub fn can_afford(table: &CostTable, base: u32, budget: u32, lookup: TierLookup) -> bool {
    table
        .active_cost(base, lookup)
        .is_some_and(|cost| budget >= cost)
}

/// Plan a spend of `budget` stat points on a stat currently at `base`.
///
/// With `requested_increments > 0` the tier at `base` prices every
/// increment and at most that many are bought. With `requested_increments
/// == 0` as many increments as the budget allows are bought, re-deriving
/// the tier after each one. Returns `None` when not even one increment is
/// affordable.
pub fn plan_stat_boost(
    table: &CostTable,
    base: u32,
    budget: u32,
    requested_increments: u32,
    lookup: TierLookup,
) -> Option<StatSpend> {
    let cost = table.active_cost(base, lookup)?;
    if budget < cost {
        return None;
    }

    if requested_increments > 0 {
        let increments = requested_increments.min(budget.checked_div(cost)?);
        let points = increments.checked_mul(cost)?;
        return Some(StatSpend {
            points,
            increments,
            final_base: base.saturating_add(increments),
            remaining: budget.checked_sub(points)?,
        });
    }

    let mut working_base = base;
    let mut remaining = budget;
    let mut points: u32 = 0;
    let mut increments: u32 = 0;
    while let Some(cost) = table.active_cost(working_base, lookup) {
        let Some(left) = remaining.checked_sub(cost) else {
            break;
        };
        let Some(next_base) = working_base.checked_add(1) else {
            break;
        };
        remaining = left;
        working_base = next_base;
        points = points.saturating_add(cost);
        increments = increments.saturating_add(1);
    }

    (increments > 0).then_some(StatSpend {
        points,
        increments,
        final_base: working_base,
        remaining,
    })
}
