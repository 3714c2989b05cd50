//! Loyalty points ledger (积分台账)
//!
//! The only legitimate writer of `Customer::points_balance`. Every movement
//! is tied to a specific order; cancellation reverses the amounts that were
//! actually applied (read from the order's persisted summary), so the net
//! effect of create -> edits -> cancel returns the balance to its pre-order
//! baseline exactly once.

use std::sync::Arc;

use crate::db::repository::{CustomerRepository, RepoResult};

/// Points ledger over the customer store
#[derive(Clone)]
pub struct PointsLedger {
    customers: Arc<dyn CustomerRepository>,
}

impl PointsLedger {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Current balance, 0 for unknown customers
    pub async fn balance(&self, customer_id: i64) -> RepoResult<i64> {
        Ok(self
            .customers
            .find_by_id(customer_id)
            .await?
            .map(|c| c.points_balance)
            .unwrap_or(0))
    }

    /// Credit points to a customer. Amounts <= 0 are a no-op.
    pub async fn credit(&self, customer_id: i64, amount: i64) -> RepoResult<i64> {
        if amount <= 0 {
            return self.balance(customer_id).await;
        }
        let balance = self.customers.add_points(customer_id, amount).await?;
        tracing::debug!(customer_id, amount, balance, "Points credited");
        Ok(balance)
    }

    /// Debit points from a customer, clamping the balance at 0.
    ///
    /// Never fails on insufficient balance - the shortfall is logged and
    /// only the available amount is taken. Returns the new balance.
    pub async fn debit(&self, customer_id: i64, amount: i64) -> RepoResult<i64> {
        if amount <= 0 {
            return self.balance(customer_id).await;
        }
        let balance = self.balance(customer_id).await?;
        let applied = amount.min(balance);
        if applied < amount {
            tracing::warn!(
                customer_id,
                requested = amount,
                available = balance,
                shortfall = amount - applied,
                "Point debit clamped at zero balance"
            );
        }
        if applied == 0 {
            return Ok(balance);
        }
        let balance = self.customers.add_points(customer_id, -applied).await?;
        tracing::debug!(customer_id, amount = applied, balance, "Points debited");
        Ok(balance)
    }

    /// Apply an order's point movements: redeem `points_used`, then credit
    /// `points_earned`
    pub async fn apply(&self, customer_id: i64, points_used: i64, points_earned: i64) -> RepoResult<()> {
        self.debit(customer_id, points_used).await?;
        self.credit(customer_id, points_earned).await?;
        Ok(())
    }

    /// Reverse a previously applied movement on cancellation: give back
    /// what was debited, take back what was credited
    pub async fn reverse(
        &self,
        customer_id: i64,
        credited_amount: i64,
        debited_amount: i64,
    ) -> RepoResult<()> {
        self.credit(customer_id, debited_amount).await?;
        self.debit(customer_id, credited_amount).await?;
        Ok(())
    }

    /// Bump cumulative spend/order counters when a settlement flips
    pub async fn record_spend(
        &self,
        customer_id: i64,
        spent_delta: i64,
        count_delta: i64,
    ) -> RepoResult<()> {
        self.customers
            .add_stats(customer_id, spent_delta, count_delta)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryCustomerRepository;
    use crate::db::repository::CustomerRepository as _;
    use shared::models::Customer;

    async fn ledger_with_balance(balance: i64) -> (PointsLedger, Arc<InMemoryCustomerRepository>) {
        let repo = Arc::new(InMemoryCustomerRepository::new());
        let mut customer = Customer::new(1, "김민지");
        customer.points_balance = balance;
        repo.save(customer).await.unwrap();
        (PointsLedger::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_credit_and_debit() {
        let (ledger, _) = ledger_with_balance(1_000).await;
        assert_eq!(ledger.credit(1, 500).await.unwrap(), 1_500);
        assert_eq!(ledger.debit(1, 700).await.unwrap(), 800);
    }

    #[tokio::test]
    async fn test_debit_clamps_at_zero() {
        let (ledger, _) = ledger_with_balance(300).await;
        // Asking for more than available drains to zero, never negative
        assert_eq!(ledger.debit(1, 1_000).await.unwrap(), 0);
        assert_eq!(ledger.balance(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_apply_then_reverse_restores_baseline() {
        let (ledger, _) = ledger_with_balance(2_000).await;

        // Order used 1,500 points and earned 120
        ledger.apply(1, 1_500, 120).await.unwrap();
        assert_eq!(ledger.balance(1).await.unwrap(), 620);

        // Cancellation reverses exactly what was applied
        ledger.reverse(1, 120, 1_500).await.unwrap();
        assert_eq!(ledger.balance(1).await.unwrap(), 2_000);
    }

    #[tokio::test]
    async fn test_zero_amounts_are_noops() {
        let (ledger, _) = ledger_with_balance(500).await;
        assert_eq!(ledger.credit(1, 0).await.unwrap(), 500);
        assert_eq!(ledger.debit(1, 0).await.unwrap(), 500);
    }
}
