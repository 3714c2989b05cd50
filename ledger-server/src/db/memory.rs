//! In-memory repository implementations
//!
//! DashMap-backed stores with the same per-row atomicity the real substrate
//! offers. Used by tests and by local single-process deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::{Customer, DailyStat, Order, StatDelta, StatKey};
use std::sync::Arc;

use super::repository::{
    CustomerRepository, DailyStatRepository, OrderRepository, RepoError, RepoResult,
};

/// In-memory order store
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    rows: Arc<DashMap<i64, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> RepoResult<Order> {
        use dashmap::mapref::entry::Entry;
        match self.rows.entry(order.id) {
            Entry::Occupied(_) => Err(RepoError::Duplicate(format!("Order {}", order.id))),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(order)
            }
        }
    }

    async fn update(&self, order: Order) -> RepoResult<Order> {
        match self.rows.get_mut(&order.id) {
            Some(mut row) => {
                *row = order.clone();
                Ok(order)
            }
            None => Err(RepoError::NotFound(format!("Order {}", order.id))),
        }
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        Ok(self.rows.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn find_by_date_range(
        &self,
        branch_id: Option<i64>,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .rows
            .iter()
            .filter(|row| {
                row.ordered_at >= start
                    && row.ordered_at < end
                    && branch_id.is_none_or(|b| row.branch_id == b)
            })
            .map(|row| row.clone())
            .collect();
        orders.sort_by_key(|o| o.ordered_at);
        Ok(orders)
    }

    async fn find_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .rows
            .iter()
            .filter(|row| row.customer_id == Some(customer_id))
            .map(|row| row.clone())
            .collect();
        orders.sort_by_key(|o| o.ordered_at);
        Ok(orders)
    }

    async fn find_for_settlement(
        &self,
        branch_id: Option<i64>,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .rows
            .iter()
            .filter(|row| {
                row.settlement_ts()
                    .is_some_and(|ts| ts >= start && ts < end)
                    && branch_id.is_none_or(|b| row.branch_id == b)
            })
            .map(|row| row.clone())
            .collect();
        orders.sort_by_key(|o| o.settlement_ts());
        Ok(orders)
    }

    async fn find_all(&self) -> RepoResult<Vec<Order>> {
        Ok(self.rows.iter().map(|row| row.clone()).collect())
    }
}

/// In-memory customer store
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerRepository {
    rows: Arc<DashMap<i64, Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Customer>> {
        Ok(self.rows.get(&id).map(|row| row.clone()))
    }

    async fn save(&self, customer: Customer) -> RepoResult<Customer> {
        self.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn add_points(&self, id: i64, delta: i64) -> RepoResult<i64> {
        match self.rows.get_mut(&id) {
            Some(mut row) => {
                row.points_balance += delta;
                row.updated_at = shared::util::now_millis();
                Ok(row.points_balance)
            }
            None => Err(RepoError::NotFound(format!("Customer {}", id))),
        }
    }

    async fn add_stats(&self, id: i64, spent_delta: i64, count_delta: i64) -> RepoResult<()> {
        match self.rows.get_mut(&id) {
            Some(mut row) => {
                row.total_spent += spent_delta;
                row.order_count += count_delta;
                row.updated_at = shared::util::now_millis();
                Ok(())
            }
            None => Err(RepoError::NotFound(format!("Customer {}", id))),
        }
    }
}

/// In-memory daily aggregate store
#[derive(Debug, Clone, Default)]
pub struct InMemoryDailyStatRepository {
    rows: Arc<DashMap<StatKey, DailyStat>>,
}

impl InMemoryDailyStatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DailyStatRepository for InMemoryDailyStatRepository {
    async fn apply_delta(&self, key: StatKey, delta: StatDelta) -> RepoResult<DailyStat> {
        let mut bucket = self
            .rows
            .entry(key)
            .or_insert_with(|| DailyStat::empty(key));
        bucket.apply(delta);
        Ok(bucket.clone())
    }

    async fn get(&self, key: StatKey) -> RepoResult<Option<DailyStat>> {
        Ok(self.rows.get(&key).map(|row| row.clone()))
    }

    async fn range(
        &self,
        branch_id: i64,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> RepoResult<Vec<DailyStat>> {
        let mut stats: Vec<DailyStat> = self
            .rows
            .iter()
            .filter(|row| row.branch_id == branch_id && row.day >= start && row.day <= end)
            .map(|row| row.clone())
            .collect();
        stats.sort_by_key(|s| s.day);
        Ok(stats)
    }

    async fn clear(&self) -> RepoResult<()> {
        self.rows.clear();
        Ok(())
    }
}
