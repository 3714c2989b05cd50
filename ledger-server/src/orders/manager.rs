//! OrdersManager - the order state machine and its side-effect orchestration
//!
//! # Mutation Flow
//!
//! ```text
//! operation(input)
//!     ├─ 1. Validate (no partial state on rejection)
//!     ├─ 2. Load current snapshot / resolve customer + fee schedule
//!     ├─ 3. Price the new snapshot (pure)
//!     ├─ 4. Persist the order row (failure stops everything after it)
//!     ├─ 5. Points ledger movement (amounts actually applied)
//!     ├─ 6. Aggregate deltas (old/new contribution diff)
//!     ├─ 7. Expense ledger reconciliation
//!     ├─ 8. Non-fatal side effects (stock, notification)
//!     └─ 9. Publish change event
//! ```
//!
//! Within one order the engine assumes a single concurrent writer; cross
//! order mutations need no coordination because aggregate deltas commute.

use chrono::NaiveDate;
use chrono_tz::Tz;
use std::sync::Arc;

use shared::event::OrderChangeEvent;
use shared::models::{
    Customer, Order, OrderStatus, OrderSummary, Payment, PaymentStatus, PickupInfo,
    SplitPayment,
};
use shared::util::{now_millis, snowflake_id};

use super::draft::{OrderDraft, OrderPatch, validate_fulfillment};
use super::error::{OrderError, OrderResult};
use crate::db::repository::{CustomerRepository, OrderRepository};
use crate::live::ChangeFeed;
use crate::loyalty::PointsLedger;
use crate::pricing::{DiscountRate, PricingConfig, PricingInput, compute_summary};
use crate::services::{
    FeeScheduleProvider, NoopNotifier, NoopStockService, Notifier, StaticFeeScheduleProvider,
    StockService,
};
use crate::stats::AggregationEngine;
use crate::transfer::{self, ExpenseReconciler};
use crate::utils::time::day_range_millis;

/// Order state machine over the injected stores and collaborators
#[derive(Clone)]
pub struct OrdersManager {
    orders: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerRepository>,
    points: PointsLedger,
    stats: AggregationEngine,
    reconciler: ExpenseReconciler,
    feed: ChangeFeed,
    stock: Arc<dyn StockService>,
    notifier: Arc<dyn Notifier>,
    fees: Arc<dyn FeeScheduleProvider>,
    pricing: PricingConfig,
    tz: Tz,
}

impl OrdersManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerRepository>,
        points: PointsLedger,
        stats: AggregationEngine,
        reconciler: ExpenseReconciler,
        feed: ChangeFeed,
        pricing: PricingConfig,
        tz: Tz,
    ) -> Self {
        Self {
            orders,
            customers,
            points,
            stats,
            reconciler,
            feed,
            stock: Arc::new(NoopStockService),
            notifier: Arc::new(NoopNotifier),
            fees: Arc::new(StaticFeeScheduleProvider::new()),
            pricing,
            tz,
        }
    }

    /// Wire the stock collaborator
    pub fn with_stock(mut self, stock: Arc<dyn StockService>) -> Self {
        self.stock = stock;
        self
    }

    /// Wire the notification collaborator
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Wire the fee schedule provider
    pub fn with_fees(mut self, fees: Arc<dyn FeeScheduleProvider>) -> Self {
        self.fees = fees;
        self
    }

    pub fn change_feed(&self) -> &ChangeFeed {
        &self.feed
    }

    // ========== Mutations ==========

    /// Capture a new order
    pub async fn create_order(&self, draft: OrderDraft) -> OrderResult<Order> {
        draft.validate_draft()?;

        let customer = self.load_customer(draft.customer_id).await?;
        let schedule = self.fees.schedule_for(draft.branch_id).await;

        let items: Vec<_> = draft
            .items
            .into_iter()
            .map(|i| i.into_line_item())
            .collect();
        let discount = match draft.discount_rate {
            Some(rate) => DiscountRate::Custom(rate),
            None => DiscountRate::Tier(
                customer.as_ref().map(|c| c.grade.discount_rate()).unwrap_or(0),
            ),
        };
        let summary = compute_summary(
            &PricingInput {
                items: &items,
                discount,
                requested_points: draft.requested_points,
                point_balance: customer.as_ref().map(|c| c.points_balance).unwrap_or(0),
                receipt_type: draft.receipt_type,
                delivery: draft.delivery.as_ref(),
                fee_schedule: schedule.as_ref(),
            },
            &self.pricing,
        );

        let now = now_millis();
        // Immediate store pickup short-circuits straight to Completed
        let status = if draft.receipt_type.completes_immediately() {
            OrderStatus::Completed
        } else {
            OrderStatus::Processing
        };
        let payment = Payment {
            method: draft.payment_method,
            status: if draft.paid {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Pending
            },
            paid_at: draft.paid.then_some(now),
            split: None,
        };

        let order = Order {
            id: snowflake_id(),
            branch_id: draft.branch_id,
            ordered_at: draft.ordered_at.unwrap_or(now),
            status,
            items,
            summary,
            customer_id: draft.customer_id,
            receipt_type: draft.receipt_type,
            pickup: draft.pickup,
            delivery: draft.delivery,
            payment,
            transfer: None,
            actual_delivery_cost: None,
            driver_cash_fee: None,
            delivery_profit: None,
            extensions: draft.extensions,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        };

        // Persist first - a failed write must leave no trace anywhere else
        let order = self.orders.insert(order).await?;

        if let Some(customer_id) = order.customer_id {
            self.points
                .apply(
                    customer_id,
                    order.summary.points_used,
                    order.summary.points_earned,
                )
                .await?;
        }
        self.stats.on_created(&order).await?;
        self.sync_spend_counters(None, Some(&order)).await;

        // Non-fatal side effects
        self.stock.decrement(&order.items).await;
        if order.status == OrderStatus::Completed {
            self.notifier.order_completed(&order).await;
        }

        self.feed.publish(OrderChangeEvent::insert(order.clone()));
        tracing::info!(
            order_id = order.id,
            branch_id = order.branch_id,
            total = order.summary.total,
            status = ?order.status,
            "Order created"
        );
        Ok(order)
    }

    /// Edit an order. Old and new snapshots are diffed under the same rules
    /// used at creation; the order-date and settlement axes move
    /// independently.
    pub async fn update_order(&self, id: i64, patch: OrderPatch) -> OrderResult<Order> {
        patch.validate_patch()?;

        let old = self.load_order(id).await?;
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }

        let mut new = old.clone();
        if let Some(branch_id) = patch.branch_id {
            new.branch_id = branch_id;
        }
        if let Some(ordered_at) = patch.ordered_at {
            new.ordered_at = ordered_at;
        }
        if let Some(items) = patch.items {
            new.items = items.into_iter().map(|i| i.into_line_item()).collect();
        }
        if let Some(receipt_type) = patch.receipt_type {
            new.receipt_type = receipt_type;
        }
        if let Some(pickup) = patch.pickup {
            new.pickup = Some(pickup);
            new.delivery = None;
        }
        if let Some(delivery) = patch.delivery {
            new.delivery = Some(delivery);
            new.pickup = None;
        }
        if let Some(method) = patch.payment_method {
            new.payment.method = method;
        }
        if let Some(extensions) = patch.extensions {
            new.extensions = extensions;
        }
        validate_fulfillment(new.receipt_type, new.pickup.as_ref(), new.delivery.as_ref())?;

        // Re-price against the same rules used at creation. The points the
        // old snapshot already redeemed are usable again for the new one.
        let customer = self.load_customer(old.customer_id).await?;
        let schedule = self.fees.schedule_for(new.branch_id).await;
        let discount = match patch.discount_rate {
            Some(rate) => DiscountRate::Custom(rate),
            None => DiscountRate::Custom(old.summary.discount_rate),
        };
        let requested_points = patch
            .requested_points
            .unwrap_or(old.summary.points_used);
        let balance = customer.as_ref().map(|c| c.points_balance).unwrap_or(0)
            + old.summary.points_used;
        new.summary = compute_summary(
            &PricingInput {
                items: &new.items,
                discount,
                requested_points,
                point_balance: balance,
                receipt_type: new.receipt_type,
                delivery: new.delivery.as_ref(),
                fee_schedule: schedule.as_ref(),
            },
            &self.pricing,
        );
        if let Some(cost) = new.actual_delivery_cost {
            new.delivery_profit = Some(new.summary.delivery_fee - cost);
        }
        new.updated_at = now_millis();

        let new = self.orders.update(new).await?;

        // Net point adjustment between the snapshots
        if let Some(customer_id) = old.customer_id {
            self.adjust_points(customer_id, &old.summary, &new.summary)
                .await?;
        }
        self.stats.on_edited(&old, &new).await?;
        self.sync_spend_counters(Some(&old), Some(&new)).await;
        self.reconciler.reconcile(&new).await?;

        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(order_id = id, total = new.summary.total, "Order updated");
        Ok(new)
    }

    /// Cancel an order. Canceling an already-canceled order is a no-op,
    /// not an error.
    pub async fn cancel_order(&self, id: i64) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        if old.is_canceled() {
            tracing::info!(order_id = id, "Cancel on already-canceled order - no-op");
            return Ok(old);
        }

        let now = now_millis();
        let mut canceled = old.clone();
        canceled.status = OrderStatus::Canceled;
        canceled.canceled_at = Some(now);
        // Audit marker: summary zeroed; the reversal below uses the
        // last-known amounts from the old snapshot
        canceled.summary = OrderSummary::zeroed();
        canceled.updated_at = now;

        let canceled = self.orders.update(canceled).await?;

        // Reverse exactly what was previously applied
        if let Some(customer_id) = old.customer_id {
            self.points
                .reverse(
                    customer_id,
                    old.summary.points_earned,
                    old.summary.points_used,
                )
                .await?;
        }
        self.stats.on_removed(&old).await?;
        self.sync_spend_counters(Some(&old), None).await;
        self.reconciler.remove_all(id).await?;

        self.feed.publish(OrderChangeEvent::update(canceled.clone()));
        tracing::info!(order_id = id, reversed_total = old.summary.total, "Order canceled");
        Ok(canceled)
    }

    /// Remove an order entirely. Reversal runs only if the order was not
    /// already canceled (a canceled order has already been reversed).
    pub async fn delete_order(&self, id: i64) -> OrderResult<()> {
        let old = self.load_order(id).await?;

        if !self.orders.delete(id).await? {
            return Err(OrderError::OrderNotFound(id));
        }

        if !old.is_canceled() {
            if let Some(customer_id) = old.customer_id {
                self.points
                    .reverse(
                        customer_id,
                        old.summary.points_earned,
                        old.summary.points_used,
                    )
                    .await?;
            }
            self.stats.on_removed(&old).await?;
            self.sync_spend_counters(Some(&old), None).await;
        }
        self.reconciler.remove_all(id).await?;

        self.feed.publish(OrderChangeEvent::delete(old));
        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    /// Lifecycle transition. Cancellation routes through [`cancel_order`].
    pub async fn transition_status(&self, id: i64, target: OrderStatus) -> OrderResult<Order> {
        if target == OrderStatus::Canceled {
            return self.cancel_order(id).await;
        }

        let old = self.load_order(id).await?;
        if old.status == target {
            return Ok(old);
        }
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }
        if old.status == OrderStatus::Completed && target == OrderStatus::Processing {
            return Err(OrderError::InvalidTransition(format!(
                "order {} cannot move back from COMPLETED to PROCESSING",
                id
            )));
        }

        let mut new = old.clone();
        new.status = target;
        new.updated_at = now_millis();
        let new = self.orders.update(new).await?;

        if new.status == OrderStatus::Completed {
            self.notifier.order_completed(&new).await;
        }
        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(order_id = id, status = ?new.status, "Order status changed");
        Ok(new)
    }

    /// Payment sub-state transition. Flipping the settled predicate moves
    /// money into or out of the settlement-day bucket.
    pub async fn transition_payment_status(
        &self,
        id: i64,
        target: PaymentStatus,
        split: Option<SplitPayment>,
        paid_at: Option<i64>,
    ) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }

        let mut new = old.clone();
        new.payment.status = target;
        match target {
            PaymentStatus::Paid | PaymentStatus::Completed => {
                new.payment.paid_at = paid_at.or(old.payment.paid_at).or_else(|| Some(now_millis()));
                new.payment.split = None;
            }
            PaymentStatus::Pending => {
                new.payment.paid_at = None;
                new.payment.split = None;
            }
            PaymentStatus::SplitPayment => {
                let split = split.or(old.payment.split.clone()).ok_or_else(|| {
                    OrderError::InvalidPaymentTransition(format!(
                        "order {} needs a split payment record",
                        id
                    ))
                })?;
                new.payment.paid_at = None;
                new.payment.split = Some(split);
            }
        }
        new.updated_at = now_millis();

        let new = self.orders.update(new).await?;

        self.stats.on_edited(&old, &new).await?;
        self.sync_spend_counters(Some(&old), Some(&new)).await;

        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(
            order_id = id,
            payment_status = ?new.payment.status,
            settled = new.is_settled(),
            "Payment status changed"
        );
        Ok(new)
    }

    /// Mark fulfillment done: flags the pickup/delivery sub-record,
    /// completes the order, and propagates to a linked transfer.
    pub async fn complete_fulfillment(&self, id: i64) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }

        let now = now_millis();
        let mut new = old.clone();
        if new.receipt_type.is_delivery() {
            let delivery = new
                .delivery
                .as_mut()
                .ok_or_else(|| OrderError::Validation(format!("order {} has no delivery record", id)))?;
            delivery.completed = true;
            delivery.completed_at = Some(now);
        } else {
            let pickup = new.pickup.get_or_insert_with(PickupInfo::default);
            pickup.completed = true;
            pickup.completed_at = Some(now);
        }
        new.status = OrderStatus::Completed;
        if new
            .transfer
            .as_ref()
            .is_some_and(|t| t.status == shared::models::TransferStatus::Accepted)
        {
            transfer::complete(&mut new)?;
        }
        new.updated_at = now;

        let new = self.orders.update(new).await?;

        self.notifier.order_completed(&new).await;
        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(order_id = id, "Fulfillment completed");
        Ok(new)
    }

    /// Ask another branch to take over fulfillment
    pub async fn request_transfer(&self, id: i64, processing_branch_id: i64) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        let mut new = old.clone();
        transfer::request(&mut new, processing_branch_id)?;
        new.updated_at = now_millis();

        let new = self.orders.update(new).await?;
        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(order_id = id, processing_branch_id, "Transfer requested");
        Ok(new)
    }

    /// Accept a pending transfer; expense attribution moves to the
    /// processing branch.
    pub async fn accept_transfer(&self, id: i64) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }
        let mut new = old.clone();
        transfer::accept(&mut new)?;
        new.updated_at = now_millis();

        let new = self.orders.update(new).await?;
        self.reconciler.reconcile(&new).await?;

        self.feed.publish(OrderChangeEvent::update(new.clone()));
        tracing::info!(
            order_id = id,
            processing_branch_id = new.transfer.as_ref().map(|t| t.processing_branch_id),
            "Transfer accepted"
        );
        Ok(new)
    }

    /// Record the actual delivery cost / driver cash and reconcile the
    /// external expense entries. Zero or absent amounts delete the entries.
    pub async fn set_actual_delivery_cost(
        &self,
        id: i64,
        actual_cost: Option<i64>,
        driver_cash: Option<i64>,
    ) -> OrderResult<Order> {
        let old = self.load_order(id).await?;
        if old.is_canceled() {
            return Err(OrderError::Immutable(id));
        }
        if actual_cost.is_some_and(|c| c < 0) || driver_cash.is_some_and(|c| c < 0) {
            return Err(OrderError::Validation(
                "delivery cost amounts must not be negative".to_string(),
            ));
        }

        let mut new = old.clone();
        new.actual_delivery_cost = actual_cost;
        new.driver_cash_fee = driver_cash;
        new.delivery_profit = actual_cost.map(|c| new.summary.delivery_fee - c);
        new.updated_at = now_millis();

        let new = self.orders.update(new).await?;
        self.reconciler.reconcile(&new).await?;

        self.feed.publish(OrderChangeEvent::update(new.clone()));
        Ok(new)
    }

    // ========== Reads ==========

    pub async fn get_order(&self, id: i64) -> OrderResult<Order> {
        self.load_order(id).await
    }

    /// Orders whose order date falls within [start, end] (inclusive days)
    pub async fn fetch_by_date_range(
        &self,
        branch_id: Option<i64>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> OrderResult<Vec<Order>> {
        let (range_start, _) = day_range_millis(start, self.tz);
        let (_, range_end) = day_range_millis(end, self.tz);
        Ok(self
            .orders
            .find_by_date_range(branch_id, range_start, range_end)
            .await?)
    }

    pub async fn fetch_by_customer(&self, customer_id: i64) -> OrderResult<Vec<Order>> {
        Ok(self.orders.find_by_customer(customer_id).await?)
    }

    /// Orders settled on one business day
    pub async fn fetch_for_settlement(
        &self,
        branch_id: Option<i64>,
        day: NaiveDate,
    ) -> OrderResult<Vec<Order>> {
        let (start, end) = day_range_millis(day, self.tz);
        Ok(self
            .orders
            .find_for_settlement(branch_id, start, end)
            .await?)
    }

    // ========== Internals ==========

    async fn load_order(&self, id: i64) -> OrderResult<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))
    }

    async fn load_customer(&self, customer_id: Option<i64>) -> OrderResult<Option<Customer>> {
        match customer_id {
            Some(id) => {
                let customer = self.customers.find_by_id(id).await?.ok_or_else(|| {
                    OrderError::Validation(format!("customer {} does not exist", id))
                })?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    /// Apply the net point difference between two summaries
    async fn adjust_points(
        &self,
        customer_id: i64,
        old: &OrderSummary,
        new: &OrderSummary,
    ) -> OrderResult<()> {
        let used_delta = new.points_used - old.points_used;
        if used_delta > 0 {
            self.points.debit(customer_id, used_delta).await?;
        } else if used_delta < 0 {
            self.points.credit(customer_id, -used_delta).await?;
        }

        let earned_delta = new.points_earned - old.points_earned;
        if earned_delta > 0 {
            self.points.credit(customer_id, earned_delta).await?;
        } else if earned_delta < 0 {
            self.points.debit(customer_id, -earned_delta).await?;
        }
        Ok(())
    }

    /// Keep the customer's cumulative spend/order counters in line with
    /// the settled predicate. Counter drift is non-fatal: failures are
    /// logged and swallowed.
    async fn sync_spend_counters(&self, old: Option<&Order>, new: Option<&Order>) {
        let customer_id = match new.or(old).and_then(|o| o.customer_id) {
            Some(id) => id,
            None => return,
        };
        let settled_amount = |order: Option<&Order>| -> i64 {
            order
                .filter(|o| o.is_settled())
                .map(|o| o.summary.total)
                .unwrap_or(0)
        };
        let settled_count = |order: Option<&Order>| -> i64 {
            order.filter(|o| o.is_settled()).map(|_| 1).unwrap_or(0)
        };

        let spent_delta = settled_amount(new) - settled_amount(old);
        let count_delta = settled_count(new) - settled_count(old);
        if spent_delta == 0 && count_delta == 0 {
            return;
        }
        if let Err(e) = self
            .points
            .record_spend(customer_id, spent_delta, count_delta)
            .await
        {
            tracing::warn!(customer_id, error = %e, "Spend counter update failed");
        }
    }
}
