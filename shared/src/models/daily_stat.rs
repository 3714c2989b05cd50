//! Daily aggregate statistics (日结统计)
//!
//! `DailyStat` is derived state keyed by (branch, calendar day). It is
//! never the source of truth: it must stay reconstructible from the full
//! order history, but in steady state it is maintained exclusively through
//! signed delta application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg};

/// Aggregate bucket key
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatKey {
    pub branch_id: i64,
    pub day: NaiveDate,
}

impl StatKey {
    pub fn new(branch_id: i64, day: NaiveDate) -> Self {
        Self { branch_id, day }
    }
}

/// Per-branch/day running aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyStat {
    pub branch_id: i64,
    pub day: NaiveDate,
    /// 营业额 - recognized at settlement
    #[serde(default)]
    pub revenue: i64,
    /// 订单数 - counted at the order date
    #[serde(default)]
    pub order_count: i64,
    /// 已结算金额
    #[serde(default)]
    pub settled_amount: i64,
    pub updated_at: i64,
}

impl DailyStat {
    /// Empty bucket for a key
    pub fn empty(key: StatKey) -> Self {
        Self {
            branch_id: key.branch_id,
            day: key.day,
            revenue: 0,
            order_count: 0,
            settled_amount: 0,
            updated_at: crate::util::now_millis(),
        }
    }

    pub fn key(&self) -> StatKey {
        StatKey::new(self.branch_id, self.day)
    }

    /// Fold a signed delta into the bucket
    pub fn apply(&mut self, delta: StatDelta) {
        self.revenue += delta.revenue;
        self.order_count += delta.order_count;
        self.settled_amount += delta.settled_amount;
        self.updated_at = crate::util::now_millis();
    }

    /// Whether every field is zero (bucket can be dropped)
    pub fn is_empty(&self) -> bool {
        self.revenue == 0 && self.order_count == 0 && self.settled_amount == 0
    }
}

/// Signed increment applied to an aggregate bucket
///
/// Deltas form an abelian group: application commutes and associates, and
/// `apply(d)` followed by `apply(-d)` restores the bucket exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatDelta {
    pub revenue: i64,
    pub order_count: i64,
    pub settled_amount: i64,
}

impl StatDelta {
    pub const ZERO: StatDelta = StatDelta {
        revenue: 0,
        order_count: 0,
        settled_amount: 0,
    };

    /// Count-only delta (order-date axis)
    pub fn count(n: i64) -> Self {
        Self {
            revenue: 0,
            order_count: n,
            settled_amount: 0,
        }
    }

    /// Money-only delta (settlement axis)
    pub fn money(amount: i64) -> Self {
        Self {
            revenue: amount,
            order_count: 0,
            settled_amount: amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Neg for StatDelta {
    type Output = StatDelta;

    fn neg(self) -> StatDelta {
        StatDelta {
            revenue: -self.revenue,
            order_count: -self.order_count,
            settled_amount: -self.settled_amount,
        }
    }
}

impl Add for StatDelta {
    type Output = StatDelta;

    fn add(self, rhs: StatDelta) -> StatDelta {
        StatDelta {
            revenue: self.revenue + rhs.revenue,
            order_count: self.order_count + rhs.order_count,
            settled_amount: self.settled_amount + rhs.settled_amount,
        }
    }
}
