//! Incremental aggregation engine
//!
//! Maintains (branch, day) `DailyStat` buckets through signed delta
//! application only. Full recomputation survives as a repair path
//! (`rebuild_from_orders`) and is never the steady-state mechanism.

use chrono_tz::Tz;
use shared::models::{Order, StatDelta, StatKey};
use std::sync::Arc;

use super::contribution::{self, StatContribution};
use crate::db::repository::{DailyStatRepository, OrderRepository, RepoResult};

/// Aggregation engine over the daily stat store
#[derive(Clone)]
pub struct AggregationEngine {
    stats: Arc<dyn DailyStatRepository>,
    tz: Tz,
}

impl AggregationEngine {
    pub fn new(stats: Arc<dyn DailyStatRepository>, tz: Tz) -> Self {
        Self { stats, tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Apply a batch of bucketed deltas in order
    pub async fn apply(&self, deltas: Vec<(StatKey, StatDelta)>) -> RepoResult<()> {
        for (key, delta) in deltas {
            let bucket = self.stats.apply_delta(key, delta).await?;
            tracing::debug!(
                branch_id = key.branch_id,
                day = %key.day,
                revenue = bucket.revenue,
                order_count = bucket.order_count,
                settled_amount = bucket.settled_amount,
                "Aggregate bucket updated"
            );
        }
        Ok(())
    }

    /// Record a freshly created order
    pub async fn on_created(&self, order: &Order) -> RepoResult<()> {
        self.apply(contribution::creation_deltas(order, self.tz)).await
    }

    /// Record an edit as the diff between the old and new snapshots
    pub async fn on_edited(&self, old: &Order, new: &Order) -> RepoResult<()> {
        self.apply(contribution::edit_deltas(old, new, self.tz)).await
    }

    /// Withdraw an order's footprint (cancel / delete)
    pub async fn on_removed(&self, order: &Order) -> RepoResult<()> {
        self.apply(contribution::removal_deltas(order, self.tz)).await
    }

    /// Repair path: drop every bucket and refold the full order history.
    /// Valid for reconciliation, never for steady-state maintenance.
    pub async fn rebuild_from_orders(&self, orders: &dyn OrderRepository) -> RepoResult<usize> {
        self.stats.clear().await?;
        let all = orders.find_all().await?;
        let mut applied = 0;
        for order in &all {
            let deltas = contribution::diff(
                StatContribution::absent(),
                StatContribution::of(order, self.tz),
            );
            applied += deltas.len();
            self.apply(deltas).await?;
        }
        tracing::info!(orders = all.len(), deltas = applied, "Daily stats rebuilt");
        Ok(all.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryDailyStatRepository;
    use chrono::NaiveDate;

    fn engine() -> (AggregationEngine, Arc<InMemoryDailyStatRepository>) {
        let repo = Arc::new(InMemoryDailyStatRepository::new());
        (
            AggregationEngine::new(repo.clone(), chrono_tz::Asia::Seoul),
            repo,
        )
    }

    fn key(d: u32) -> StatKey {
        StatKey::new(1, NaiveDate::from_ymd_opt(2024, 4, d).unwrap())
    }

    #[tokio::test]
    async fn test_apply_then_inverse_is_identity() {
        let (engine, repo) = engine();
        let delta = StatDelta::money(8_000) + StatDelta::count(1);

        engine.apply(vec![(key(1), delta)]).await.unwrap();
        engine.apply(vec![(key(1), -delta)]).await.unwrap();

        let bucket = repo.get(key(1)).await.unwrap().unwrap();
        assert!(bucket.is_empty());
    }

    #[tokio::test]
    async fn test_cross_order_application_commutes() {
        let (a_engine, a_repo) = engine();
        let (b_engine, b_repo) = engine();

        let d1 = vec![(key(1), StatDelta::money(5_000) + StatDelta::count(1))];
        let d2 = vec![(key(1), StatDelta::money(3_000)), (key(2), StatDelta::count(1))];

        a_engine.apply(d1.clone()).await.unwrap();
        a_engine.apply(d2.clone()).await.unwrap();
        b_engine.apply(d2).await.unwrap();
        b_engine.apply(d1).await.unwrap();

        for k in [key(1), key(2)] {
            let a = a_repo.get(k).await.unwrap().unwrap();
            let b = b_repo.get(k).await.unwrap().unwrap();
            assert_eq!(
                (a.revenue, a.order_count, a.settled_amount),
                (b.revenue, b.order_count, b.settled_amount)
            );
        }
    }
}
