//! Branch delivery fee schedule
//!
//! Read-only per-branch data: a district -> base fee map with a fallback
//! "other" tier, plus flat surcharges for item size and express handling.

use super::order::ItemSize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fallback tier used when the destination district is not in the map
pub const FALLBACK_DISTRICT: &str = "other";

/// Per-branch delivery fee schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchFeeSchedule {
    pub branch_id: i64,
    /// District name -> base fee (won). Should contain the "other" tier.
    pub district_fees: HashMap<String, i64>,
    /// Surcharge for medium-size items
    #[serde(default)]
    pub medium_surcharge: i64,
    /// Surcharge for large-size items
    #[serde(default)]
    pub large_surcharge: i64,
    /// Surcharge for express delivery
    #[serde(default)]
    pub express_surcharge: i64,
}

impl BranchFeeSchedule {
    /// Base fee for a district, falling back to the "other" tier
    pub fn district_fee(&self, district: &str) -> i64 {
        self.district_fees
            .get(district)
            .or_else(|| self.district_fees.get(FALLBACK_DISTRICT))
            .copied()
            .unwrap_or(0)
    }

    /// Size surcharge lookup
    pub fn size_surcharge(&self, size: ItemSize) -> i64 {
        match size {
            ItemSize::Small => 0,
            ItemSize::Medium => self.medium_surcharge,
            ItemSize::Large => self.large_surcharge,
        }
    }
}
