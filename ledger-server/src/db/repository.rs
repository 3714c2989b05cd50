//! Repository interfaces
//!
//! The storage substrate is a collaborator, not part of the core: it only
//! needs to offer per-row atomic CRUD. The engine talks to these traits and
//! is injected with an implementation; tests and local runs use the
//! in-memory ones in [`crate::db::memory`].

use async_trait::async_trait;
use shared::models::{Customer, DailyStat, Order, StatDelta, StatKey};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Order row store
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert a new order; fails on duplicate id
    async fn insert(&self, order: Order) -> RepoResult<Order>;

    /// Replace an existing order row atomically
    async fn update(&self, order: Order) -> RepoResult<Order>;

    /// Remove a row; returns false when absent
    async fn delete(&self, id: i64) -> RepoResult<bool>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>>;

    /// Orders whose order date falls in [start, end) millis,
    /// optionally scoped to one branch
    async fn find_by_date_range(
        &self,
        branch_id: Option<i64>,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Order>>;

    async fn find_by_customer(&self, customer_id: i64) -> RepoResult<Vec<Order>>;

    /// Settled orders whose settlement timestamp falls in [start, end)
    async fn find_for_settlement(
        &self,
        branch_id: Option<i64>,
        start: i64,
        end: i64,
    ) -> RepoResult<Vec<Order>>;

    /// Every row (repair/rebuild path only)
    async fn find_all(&self) -> RepoResult<Vec<Order>>;
}

/// Customer row store
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Customer>>;

    /// Insert or replace the row
    async fn save(&self, customer: Customer) -> RepoResult<Customer>;

    /// Atomically add to the points balance; the caller guarantees the
    /// result stays non-negative. Returns the new balance.
    async fn add_points(&self, id: i64, delta: i64) -> RepoResult<i64>;

    /// Atomically bump cumulative spend/order counters
    async fn add_stats(&self, id: i64, spent_delta: i64, count_delta: i64) -> RepoResult<()>;
}

/// Daily aggregate store
#[async_trait]
pub trait DailyStatRepository: Send + Sync {
    /// Atomically fold a signed delta into a bucket, creating it if absent
    async fn apply_delta(&self, key: StatKey, delta: StatDelta) -> RepoResult<DailyStat>;

    async fn get(&self, key: StatKey) -> RepoResult<Option<DailyStat>>;

    /// Buckets for one branch over an inclusive day range
    async fn range(
        &self,
        branch_id: i64,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> RepoResult<Vec<DailyStat>>;

    /// Drop every bucket (repair/rebuild path only)
    async fn clear(&self) -> RepoResult<()>;
}
