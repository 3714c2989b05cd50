//! View worker - drives a visible-order view from the change feed
//!
//! One tokio task per viewer. The view is eventually consistent: it lags
//! the ledger by "until the next event arrives". A lagged receiver skips
//! the dropped events and keeps going; full resync is a client concern.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::feed::ChangeFeed;
use super::view::{ViewScope, VisibleOrders};

/// Handle to a running view worker
pub struct ViewWorker {
    view: Arc<VisibleOrders>,
    handle: JoinHandle<()>,
}

impl ViewWorker {
    /// Subscribe a new view to the feed and start consuming
    pub fn spawn(feed: &ChangeFeed, scope: ViewScope) -> Self {
        let view = Arc::new(VisibleOrders::new(scope));
        let receiver = feed.subscribe();
        let token = feed.shutdown_token().clone();
        let handle = tokio::spawn(run(view.clone(), receiver, token));
        Self { view, handle }
    }

    pub fn view(&self) -> Arc<VisibleOrders> {
        self.view.clone()
    }

    /// Stop the worker without waiting for feed shutdown
    pub fn abort(&self) {
        self.handle.abort();
    }
}

async fn run(
    view: Arc<VisibleOrders>,
    mut receiver: broadcast::Receiver<shared::event::OrderChangeEvent>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("View worker stopped by shutdown token");
                break;
            }
            result = receiver.recv() => match result {
                Ok(event) => view.apply(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "View worker lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Change feed closed, view worker exiting");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::event::OrderChangeEvent;
    use shared::models::{Order, OrderStatus, OrderSummary, Payment, ReceiptType};

    fn order(id: i64, branch: i64) -> Order {
        Order {
            id,
            branch_id: branch,
            ordered_at: 1_700_000_000_000,
            status: OrderStatus::Processing,
            items: vec![],
            summary: OrderSummary::default(),
            customer_id: None,
            receipt_type: ReceiptType::PickupReservation,
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

    #[tokio::test]
    async fn test_worker_applies_published_events() {
        let feed = ChangeFeed::with_capacity(16);
        let worker = ViewWorker::spawn(&feed, ViewScope::Branch(10));

        feed.publish(OrderChangeEvent::insert(order(1, 10)));
        feed.publish(OrderChangeEvent::insert(order(2, 99)));
        feed.publish(OrderChangeEvent::delete(order(1, 10)));

        // Give the consumer task a moment to drain
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let view = worker.view();
        assert!(!view.contains(1));
        assert!(!view.contains(2)); // foreign branch, filtered
        worker.abort();
    }

    #[tokio::test]
    async fn test_worker_stops_on_shutdown() {
        let feed = ChangeFeed::with_capacity(16);
        let worker = ViewWorker::spawn(&feed, ViewScope::Admin);

        feed.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        feed.publish(OrderChangeEvent::insert(order(1, 10)));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(worker.view().is_empty());
    }
}
