//! Viewer-scoped visible order view
//!
//! An in-memory collection kept consistent by applying row change events
//! as atomic upserts/removes. No merging: the later event's snapshot fully
//! replaces local state ("last event wins" per order id).

use dashmap::DashMap;
use shared::event::{ChangeAction, OrderChangeEvent};
use shared::models::Order;

/// Who is looking at the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewScope {
    /// Single-branch visibility: orders that originated at this branch or
    /// are currently being processed here via transfer
    Branch(i64),
    /// Unrestricted (administrator)
    Admin,
}

impl ViewScope {
    /// Whether an order belongs in a view with this scope
    pub fn allows(&self, order: &Order) -> bool {
        match self {
            ViewScope::Admin => true,
            ViewScope::Branch(branch_id) => order.visible_to_branch(*branch_id),
        }
    }
}

/// In-memory visible-order collection for one viewer
#[derive(Debug)]
pub struct VisibleOrders {
    scope: ViewScope,
    orders: DashMap<i64, Order>,
}

impl VisibleOrders {
    pub fn new(scope: ViewScope) -> Self {
        Self {
            scope,
            orders: DashMap::new(),
        }
    }

    pub fn scope(&self) -> ViewScope {
        self.scope
    }

    /// Apply one change event atomically.
    ///
    /// Insert of an already-present id behaves as update. An update that
    /// moves the order out of scope (e.g. transfer handed elsewhere)
    /// removes it from the view.
    pub fn apply(&self, event: &OrderChangeEvent) {
        match event.action {
            ChangeAction::Insert | ChangeAction::Update => {
                if self.scope.allows(&event.order) {
                    self.orders.insert(event.order.id, event.order.clone());
                } else {
                    self.orders.remove(&event.order.id);
                }
            }
            ChangeAction::Delete => {
                self.orders.remove(&event.order.id);
            }
        }
    }

    pub fn get(&self, order_id: i64) -> Option<Order> {
        self.orders.get(&order_id).map(|o| o.clone())
    }

    pub fn contains(&self, order_id: i64) -> bool {
        self.orders.contains_key(&order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Current snapshot of every visible order
    pub fn snapshot(&self) -> Vec<Order> {
        self.orders.iter().map(|entry| entry.clone()).collect()
    }
}
