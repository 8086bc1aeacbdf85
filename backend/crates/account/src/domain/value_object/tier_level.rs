//! Referrer Tier
//!
//! A tier is the number of ladder thresholds a referrer's direct referee count
//! has reached. Stored tiers only ever grow.

use std::fmt;

use serde::Serialize;

/// Referee counts at which the next tier unlocks
pub const TIER_LADDER: [u64; 15] = [2, 5, 8, 11, 14, 17, 20, 23, 26, 29, 32, 35, 38, 41, 44];

/// Tier at which a referrer starts owning the attribution of its referees
pub const ATTRIBUTION_TIER: TierLevel = TierLevel(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct TierLevel(i16);

impl TierLevel {
    pub const MAX: TierLevel = TierLevel(TIER_LADDER.len() as i16);

    /// Tier reached with `referees` direct referees
    pub fn for_referee_count(referees: u64) -> Self {
        let reached = TIER_LADDER.iter().take_while(|&&t| t <= referees).count();
        Self(reached as i16)
    }

    /// Restore from database, clamped into the ladder range
    pub fn from_db(value: i16) -> Self {
        Self(value.clamp(0, Self::MAX.0))
    }

    pub fn value(&self) -> i16 {
        self.0
    }

    /// Keep the higher of the stored and the recomputed tier
    pub fn raise_to(self, computed: TierLevel) -> TierLevel {
        self.max(computed)
    }
}

impl fmt::Display for TierLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
