//! Row change events consumed by the real-time propagation layer
//!
//! The change feed is ordered per order id but carries no cross-order
//! ordering guarantee. Every event ships the full current snapshot, so
//! consumers apply it as an atomic upsert/remove and never merge.

use crate::models::Order;
use serde::{Deserialize, Serialize};

/// Row change action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// Order row change event - full snapshot per event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChangeEvent {
    pub action: ChangeAction,
    /// Full current snapshot (for Delete: the last state before removal)
    pub order: Order,
    /// Server timestamp (Unix millis)
    pub timestamp: i64,
}

impl OrderChangeEvent {
    pub fn insert(order: Order) -> Self {
        Self {
            action: ChangeAction::Insert,
            order,
            timestamp: crate::util::now_millis(),
        }
    }

    pub fn update(order: Order) -> Self {
        Self {
            action: ChangeAction::Update,
            order,
            timestamp: crate::util::now_millis(),
        }
    }

    pub fn delete(order: Order) -> Self {
        Self {
            action: ChangeAction::Delete,
            order,
            timestamp: crate::util::now_millis(),
        }
    }

    pub fn order_id(&self) -> i64 {
        self.order.id
    }
}
