//! Per-order aggregate contributions and the old/new diff
//!
//! The two temporal axes are reconciled independently:
//!
//! - `order_count` rides the **order-date** axis and exists for every
//!   non-canceled order;
//! - `revenue` and `settled_amount` ride the **settlement** axis and exist
//!   only while the order is settled.
//!
//! An edit is expressed as the diff between the old and new contribution
//! footprints. A bucket move always comes out as a paired decrement at the
//! old key and increment at the new key - never a flat delta that would
//! double-count when both axes shift at once.

use chrono_tz::Tz;
use shared::models::{Order, StatDelta, StatKey};

use crate::utils::time::{order_day, settlement_day};

/// The aggregate footprint one order currently has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatContribution {
    /// Bucket carrying this order's `order_count`; None once canceled
    pub count_bucket: Option<StatKey>,
    /// Bucket carrying this order's `revenue`/`settled_amount`;
    /// None while unsettled or canceled
    pub money_bucket: Option<StatKey>,
    /// Amount contributed to the money bucket
    pub total: i64,
}

impl StatContribution {
    /// Footprint of an order in its current state
    pub fn of(order: &Order, tz: Tz) -> Self {
        if order.is_canceled() {
            return Self {
                count_bucket: None,
                money_bucket: None,
                total: 0,
            };
        }
        let count_bucket = Some(StatKey::new(order.branch_id, order_day(order, tz)));
        let money_bucket =
            settlement_day(order, tz).map(|day| StatKey::new(order.branch_id, day));
        Self {
            count_bucket,
            money_bucket,
            total: order.summary.total,
        }
    }

    /// Footprint of "no order" (pre-creation / post-deletion)
    pub fn absent() -> Self {
        Self {
            count_bucket: None,
            money_bucket: None,
            total: 0,
        }
    }
}

/// Diff two contribution footprints into bucketed deltas.
///
/// Decrements are emitted before increments; deltas landing on the same
/// bucket are merged, so an in-place amount change produces one net delta
/// while a bucket move produces the explicit -/+ pair. Zero deltas are
/// dropped.
pub fn diff(old: StatContribution, new: StatContribution) -> Vec<(StatKey, StatDelta)> {
    let mut deltas: Vec<(StatKey, StatDelta)> = Vec::new();

    let mut push = |key: StatKey, delta: StatDelta| {
        if let Some(existing) = deltas.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = existing.1 + delta;
        } else {
            deltas.push((key, delta));
        }
    };

    // Withdraw the old footprint first
    if let Some(key) = old.count_bucket {
        push(key, StatDelta::count(-1));
    }
    if let Some(key) = old.money_bucket {
        push(key, StatDelta::money(-old.total));
    }

    // Then deposit the new one
    if let Some(key) = new.count_bucket {
        push(key, StatDelta::count(1));
    }
    if let Some(key) = new.money_bucket {
        push(key, StatDelta::money(new.total));
    }

    deltas.retain(|(_, d)| !d.is_zero());
    deltas
}

/// Deltas for a freshly created order
pub fn creation_deltas(order: &Order, tz: Tz) -> Vec<(StatKey, StatDelta)> {
    diff(StatContribution::absent(), StatContribution::of(order, tz))
}

/// Deltas for an edit, computed between the old and new snapshots
pub fn edit_deltas(old: &Order, new: &Order, tz: Tz) -> Vec<(StatKey, StatDelta)> {
    diff(StatContribution::of(old, tz), StatContribution::of(new, tz))
}

/// Deltas removing an order's footprint entirely (cancel / delete)
pub fn removal_deltas(order: &Order, tz: Tz) -> Vec<(StatKey, StatDelta)> {
    diff(StatContribution::of(order, tz), StatContribution::absent())
}
