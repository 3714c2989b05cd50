//! External expense ledger reconciliation
//!
//! The external ledger holds at most one live entry per (order, entry type)
//! key. Reconciliation is declarative: the desired amounts are derived from
//! the order, positive amounts are upserted, and zero/absent amounts delete
//! the entry so no zero-value row ever lingers.

use shared::models::{LedgerEntry, LedgerEntryKey, LedgerEntryType, Order};
use std::sync::Arc;

use crate::db::repository::RepoResult;
use crate::services::ExpenseLedgerClient;

/// Reconciles an order's expense footprint with the external ledger
#[derive(Clone)]
pub struct ExpenseReconciler {
    ledger: Arc<dyn ExpenseLedgerClient>,
}

impl ExpenseReconciler {
    pub fn new(ledger: Arc<dyn ExpenseLedgerClient>) -> Self {
        Self { ledger }
    }

    /// Desired expense amount for one entry type, read off the order
    fn desired_amount(order: &Order, entry_type: LedgerEntryType) -> Option<i64> {
        let amount = match entry_type {
            LedgerEntryType::StandardDeliveryFee => order.actual_delivery_cost,
            LedgerEntryType::DriverCashPayment => order.driver_cash_fee,
        };
        amount.filter(|a| *a > 0)
    }

    /// Bring both entry types in line with the order's current state.
    ///
    /// Attribution follows the responsible branch, so re-running after a
    /// transfer acceptance moves the expenses to the processing branch.
    pub async fn reconcile(&self, order: &Order) -> RepoResult<()> {
        for entry_type in [
            LedgerEntryType::StandardDeliveryFee,
            LedgerEntryType::DriverCashPayment,
        ] {
            let key = LedgerEntryKey {
                order_id: order.id,
                entry_type,
            };
            match Self::desired_amount(order, entry_type) {
                Some(amount) => {
                    self.ledger
                        .upsert(LedgerEntry {
                            order_id: order.id,
                            entry_type,
                            branch_id: order.responsible_branch(),
                            amount,
                            occurred_at: order.ordered_at,
                            updated_at: shared::util::now_millis(),
                        })
                        .await?;
                    tracing::debug!(
                        order_id = order.id,
                        entry_type = entry_type.label(),
                        amount,
                        branch_id = order.responsible_branch(),
                        "Expense entry upserted"
                    );
                }
                None => {
                    self.ledger.delete(key).await?;
                }
            }
        }
        Ok(())
    }

    /// Remove every entry for an order (cancellation / deletion)
    pub async fn remove_all(&self, order_id: i64) -> RepoResult<()> {
        for entry_type in [
            LedgerEntryType::StandardDeliveryFee,
            LedgerEntryType::DriverCashPayment,
        ] {
            self.ledger
                .delete(LedgerEntryKey {
                    order_id,
                    entry_type,
                })
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryExpenseLedger;
    use shared::models::{OrderStatus, OrderSummary, Payment, ReceiptType};

    fn order(id: i64) -> Order {
        Order {
            id,
            branch_id: 10,
            ordered_at: 1_700_000_000_000,
            status: OrderStatus::Processing,
            items: vec![],
            summary: OrderSummary::default(),
            customer_id: None,
            receipt_type: ReceiptType::DeliveryReservation,
            pickup: None,
            delivery: None,
            payment: Payment::default(),
            transfer: None,
            actual_delivery_cost: None,
            driver_cash_fee: None,
            delivery_profit: None,
            extensions: vec![],
            canceled_at: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    fn fee_key(order_id: i64) -> LedgerEntryKey {
        LedgerEntryKey {
            order_id,
            entry_type: LedgerEntryType::StandardDeliveryFee,
        }
    }

    #[tokio::test]
    async fn test_setting_cost_creates_exactly_one_entry() {
        let ledger = Arc::new(InMemoryExpenseLedger::new());
        let reconciler = ExpenseReconciler::new(ledger.clone());

        let mut o = order(1);
        o.actual_delivery_cost = Some(5_000);
        reconciler.reconcile(&o).await.unwrap();
        // Idempotent: reconciling again keeps a single entry
        reconciler.reconcile(&o).await.unwrap();

        let entries = ledger.list_for_order(1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, LedgerEntryType::StandardDeliveryFee);
        assert_eq!(entries[0].amount, 5_000);
    }

    #[tokio::test]
    async fn test_zeroing_cost_deletes_the_entry() {
        let ledger = Arc::new(InMemoryExpenseLedger::new());
        let reconciler = ExpenseReconciler::new(ledger.clone());

        let mut o = order(1);
        o.actual_delivery_cost = Some(5_000);
        reconciler.reconcile(&o).await.unwrap();
        assert!(ledger.get(fee_key(1)).await.unwrap().is_some());

        o.actual_delivery_cost = Some(0);
        reconciler.reconcile(&o).await.unwrap();
        assert!(ledger.get(fee_key(1)).await.unwrap().is_none());
        assert!(ledger.is_empty(), "no zero-value residue allowed");
    }

    #[tokio::test]
    async fn test_attribution_follows_responsible_branch() {
        use shared::models::{TransferInfo, TransferStatus};

        let ledger = Arc::new(InMemoryExpenseLedger::new());
        let reconciler = ExpenseReconciler::new(ledger.clone());

        let mut o = order(1);
        o.actual_delivery_cost = Some(4_000);
        o.driver_cash_fee = Some(1_500);
        reconciler.reconcile(&o).await.unwrap();
        assert!(
            ledger
                .list_for_order(1)
                .await
                .unwrap()
                .iter()
                .all(|e| e.branch_id == 10)
        );

        o.transfer = Some(TransferInfo {
            origin_branch_id: 10,
            processing_branch_id: 20,
            status: TransferStatus::Accepted,
        });
        reconciler.reconcile(&o).await.unwrap();
        let entries = ledger.list_for_order(1).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.branch_id == 20));
    }

    #[tokio::test]
    async fn test_remove_all_clears_the_order() {
        let ledger = Arc::new(InMemoryExpenseLedger::new());
        let reconciler = ExpenseReconciler::new(ledger.clone());

        let mut o = order(1);
        o.actual_delivery_cost = Some(4_000);
        o.driver_cash_fee = Some(1_500);
        reconciler.reconcile(&o).await.unwrap();

        reconciler.remove_all(1).await.unwrap();
        assert!(ledger.is_empty());
    }
}
