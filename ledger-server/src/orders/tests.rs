//! End-to-end scenarios over the full manager wiring
//!
//! Everything runs against the in-memory stores, so each test observes the
//! same conservation invariants the production stack must hold.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use shared::models::*;

use super::draft::{LineItemInput, OrderDraft, OrderPatch};
use super::error::OrderError;
use super::manager::OrdersManager;
use crate::db::memory::{
    InMemoryCustomerRepository, InMemoryDailyStatRepository, InMemoryOrderRepository,
};
use crate::db::repository::{CustomerRepository as _, DailyStatRepository as _};
use crate::live::ChangeFeed;
use crate::loyalty::PointsLedger;
use crate::pricing::PricingConfig;
use crate::services::{
    ExpenseLedgerClient as _, InMemoryExpenseLedger, InMemoryStockService,
    StaticFeeScheduleProvider,
};
use crate::stats::AggregationEngine;
use crate::transfer::ExpenseReconciler;

const TZ: Tz = chrono_tz::Asia::Seoul;

struct Fixture {
    manager: OrdersManager,
    customers: Arc<InMemoryCustomerRepository>,
    stats: Arc<InMemoryDailyStatRepository>,
    expenses: Arc<InMemoryExpenseLedger>,
    stock: Arc<InMemoryStockService>,
}

async fn fixture() -> Fixture {
    fixture_with_pricing(PricingConfig {
        accumulation_enabled: false,
        earn_rate: rust_decimal::Decimal::ZERO,
    })
    .await
}

async fn fixture_with_pricing(pricing: PricingConfig) -> Fixture {
    let orders = Arc::new(InMemoryOrderRepository::new());
    let customers = Arc::new(InMemoryCustomerRepository::new());
    let stats = Arc::new(InMemoryDailyStatRepository::new());
    let expenses = Arc::new(InMemoryExpenseLedger::new());
    let stock = Arc::new(InMemoryStockService::new());

    let fees = StaticFeeScheduleProvider::new();
    let mut district_fees = HashMap::new();
    district_fees.insert("gangnam".to_string(), 3_000);
    district_fees.insert(FALLBACK_DISTRICT.to_string(), 5_000);
    fees.set(BranchFeeSchedule {
        branch_id: 1,
        district_fees,
        medium_surcharge: 3_000,
        large_surcharge: 6_000,
        express_surcharge: 10_000,
    });

    let manager = OrdersManager::new(
        orders,
        customers.clone(),
        PointsLedger::new(customers.clone()),
        AggregationEngine::new(stats.clone(), TZ),
        ExpenseReconciler::new(expenses.clone()),
        ChangeFeed::with_capacity(64),
        pricing,
        TZ,
    )
    .with_stock(stock.clone())
    .with_fees(Arc::new(fees));

    Fixture {
        manager,
        customers,
        stats,
        expenses,
        stock,
    }
}

async fn seed_customer(fix: &Fixture, id: i64, balance: i64) {
    let mut customer = Customer::new(id, "박서연");
    customer.points_balance = balance;
    fix.customers.save(customer).await.unwrap();
}

fn millis_of(y: i32, m: u32, d: u32) -> i64 {
    use chrono::TimeZone;
    TZ.with_ymd_and_hms(y, m, d, 14, 0, 0).unwrap().timestamp_millis()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn items(price: i64, quantity: i32) -> Vec<LineItemInput> {
    vec![LineItemInput {
        product_id: 100,
        name: "수국 바구니".to_string(),
        quantity,
        unit_price: price,
        external_source: false,
    }]
}

fn pickup_draft(branch: i64, price: i64, quantity: i32) -> OrderDraft {
    OrderDraft {
        branch_id: branch,
        customer_id: None,
        ordered_at: None,
        items: items(price, quantity),
        discount_rate: None,
        requested_points: 0,
        receipt_type: ReceiptType::PickupReservation,
        pickup: Some(PickupInfo::default()),
        delivery: None,
        payment_method: "card".to_string(),
        paid: false,
        extensions: vec![],
    }
}

async fn bucket(fix: &Fixture, branch: i64, day: NaiveDate) -> (i64, i64, i64) {
    fix.stats
        .get(StatKey::new(branch, day))
        .await
        .unwrap()
        .map(|s| (s.revenue, s.order_count, s.settled_amount))
        .unwrap_or((0, 0, 0))
}


#[tokio::test]
async fn test_store_pickup_completes_immediately() {
    let fix = fixture().await;
    let mut draft = pickup_draft(1, 8_000, 1);
    draft.receipt_type = ReceiptType::StorePickup;
    draft.pickup = None;
    draft.paid = true;

    let order = fix.manager.create_order(draft).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.is_settled());
}


#[tokio::test]
async fn test_discount_points_and_pickup_pricing() {
    // 10,000 - 10% = 9,000; 2,000 points; pickup -> total 7,000
    let fix = fixture().await;
    seed_customer(&fix, 7, 2_000).await;

    let mut draft = pickup_draft(1, 5_000, 2);
    draft.customer_id = Some(7);
    draft.discount_rate = Some(10);
    draft.requested_points = 2_000;

    let order = fix.manager.create_order(draft).await.unwrap();
    assert_eq!(order.summary.subtotal, 10_000);
    assert_eq!(order.summary.discount_amount, 1_000);
    assert_eq!(order.summary.points_used, 2_000);
    assert_eq!(order.summary.delivery_fee, 0);
    assert_eq!(order.summary.total, 7_000);
    assert!(order.summary.is_consistent());

    // Points were actually debited
    let customer = fix.customers.find_by_id(7).await.unwrap().unwrap();
    assert_eq!(customer.points_balance, 0);
}


#[tokio::test]
async fn test_create_then_cancel_round_trip() {
    let fix = fixture_with_pricing(PricingConfig::default()).await;
    seed_customer(&fix, 7, 2_000).await;

    let mut draft = pickup_draft(1, 6_000, 2);
    draft.customer_id = Some(7);
    draft.requested_points = 1_000;
    draft.paid = true;

    let order = fix.manager.create_order(draft).await.unwrap();
    let day = shared::util::business_date(order.ordered_at, TZ);
    assert_ne!(bucket(&fix, 1, day).await, (0, 0, 0));
    let balance_after_create = fix
        .customers
        .find_by_id(7)
        .await
        .unwrap()
        .unwrap()
        .points_balance;
    assert_ne!(balance_after_create, 2_000);

    let canceled = fix.manager.cancel_order(order.id).await.unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);
    assert_eq!(canceled.summary, OrderSummary::zeroed());
    assert!(canceled.canceled_at.is_some());

    // Points balance and the affected buckets return to baseline
    let customer = fix.customers.find_by_id(7).await.unwrap().unwrap();
    assert_eq!(customer.points_balance, 2_000);
    assert_eq!(bucket(&fix, 1, day).await, (0, 0, 0));
}


#[tokio::test]
async fn test_cancel_is_idempotent() {
    let fix = fixture().await;
    seed_customer(&fix, 7, 5_000).await;

    let mut draft = pickup_draft(1, 6_000, 1);
    draft.customer_id = Some(7);
    draft.requested_points = 1_000;
    draft.paid = true;

    let order = fix.manager.create_order(draft).await.unwrap();
    fix.manager.cancel_order(order.id).await.unwrap();

    let balance = fix
        .customers
        .find_by_id(7)
        .await
        .unwrap()
        .unwrap()
        .points_balance;
    let day = shared::util::business_date(order.ordered_at, TZ);
    let stats_before = bucket(&fix, 1, day).await;

    // Second cancel: no-op, no further ledger/aggregate movement
    let again = fix.manager.cancel_order(order.id).await.unwrap();
    assert_eq!(again.status, OrderStatus::Canceled);
    assert_eq!(
        fix.customers
            .find_by_id(7)
            .await
            .unwrap()
            .unwrap()
            .points_balance,
        balance
    );
    assert_eq!(bucket(&fix, 1, day).await, stats_before);
}


#[tokio::test]
async fn test_canceled_order_is_immutable() {
    let fix = fixture().await;
    let order = fix
        .manager
        .create_order(pickup_draft(1, 6_000, 1))
        .await
        .unwrap();
    fix.manager.cancel_order(order.id).await.unwrap();

    let result = fix
        .manager
        .update_order(order.id, OrderPatch::default())
        .await;
    assert!(matches!(result, Err(OrderError::Immutable(_))));
}


#[tokio::test]
async fn test_order_date_move_shifts_count_only() {
    let fix = fixture().await;

    // Ordered on March 5, paid on March 5
    let mut draft = pickup_draft(1, 9_000, 1);
    draft.ordered_at = Some(millis_of(2024, 3, 5));
    draft.paid = true;
    let order = fix.manager.create_order(draft).await.unwrap();
    let settle_day = shared::util::business_date(order.payment.paid_at.unwrap(), TZ);
    let day_a = date(2024, 3, 5);
    let day_b = date(2024, 3, 8);

    let (rev_a0, cnt_a0, set_a0) = bucket(&fix, 1, day_a).await;
    assert_eq!(cnt_a0, 1);
    let money_before = bucket(&fix, 1, settle_day).await;

    // Move the order date only; settlement date unchanged
    let patch = OrderPatch {
        ordered_at: Some(millis_of(2024, 3, 8)),
        ..Default::default()
    };
    fix.manager.update_order(order.id, patch).await.unwrap();

    let (rev_a, cnt_a, set_a) = bucket(&fix, 1, day_a).await;
    let (_, cnt_b, _) = bucket(&fix, 1, day_b).await;
    assert_eq!(cnt_a, cnt_a0 - 1, "count leaves day A exactly once");
    assert_eq!(cnt_b, 1, "count arrives at day B exactly once");
    // Revenue and settled amount stay keyed to the settlement date
    assert_eq!(rev_a, rev_a0);
    assert_eq!(set_a, set_a0);
    let money_after = bucket(&fix, 1, settle_day).await;
    assert_eq!(money_after.0, money_before.0);
    assert_eq!(money_after.2, money_before.2);
}


#[tokio::test]
async fn test_payment_transition_moves_settlement_bucket() {
    let fix = fixture().await;

    let mut draft = pickup_draft(1, 12_000, 1);
    draft.ordered_at = Some(millis_of(2024, 3, 5));
    let order = fix.manager.create_order(draft).await.unwrap();
    let day_a = date(2024, 3, 5);

    // Unsettled: count only
    assert_eq!(bucket(&fix, 1, day_a).await, (0, 1, 0));

    // Settle with an explicit settlement timestamp on March 6
    let paid = fix
        .manager
        .transition_payment_status(
            order.id,
            PaymentStatus::Paid,
            None,
            Some(millis_of(2024, 3, 6)),
        )
        .await
        .unwrap();
    assert!(paid.is_settled());
    assert_eq!(bucket(&fix, 1, day_a).await, (0, 1, 0));
    assert_eq!(bucket(&fix, 1, date(2024, 3, 6)).await, (12_000, 0, 12_000));

    // Back to pending withdraws the money again
    fix.manager
        .transition_payment_status(order.id, PaymentStatus::Pending, None, None)
        .await
        .unwrap();
    assert_eq!(bucket(&fix, 1, date(2024, 3, 6)).await, (0, 0, 0));
}


#[tokio::test]
async fn test_split_payment_requires_record_and_settles_late() {
    let fix = fixture().await;
    let order = fix
        .manager
        .create_order(pickup_draft(1, 10_000, 1))
        .await
        .unwrap();

    // No split record -> rejected
    let err = fix
        .manager
        .transition_payment_status(order.id, PaymentStatus::SplitPayment, None, None)
        .await;
    assert!(matches!(err, Err(OrderError::InvalidPaymentTransition(_))));

    // Half-paid split is not settled yet
    let half = SplitPayment {
        first_method: "card".to_string(),
        first_amount: 6_000,
        first_paid_at: Some(millis_of(2024, 3, 6)),
        second_method: "cash".to_string(),
        second_amount: 4_000,
        second_paid_at: None,
    };
    let order = fix
        .manager
        .transition_payment_status(order.id, PaymentStatus::SplitPayment, Some(half.clone()), None)
        .await
        .unwrap();
    assert!(!order.is_settled());

    // Completing the second portion settles at the later timestamp
    let full = SplitPayment {
        second_paid_at: Some(millis_of(2024, 3, 7)),
        ..half
    };
    let order = fix
        .manager
        .transition_payment_status(order.id, PaymentStatus::SplitPayment, Some(full), None)
        .await
        .unwrap();
    assert!(order.is_settled());
    assert_eq!(
        bucket(&fix, 1, date(2024, 3, 7)).await,
        (10_000, 0, 10_000)
    );
}


#[tokio::test]
async fn test_edit_adjusts_points_by_net_difference() {
    let fix = fixture().await;
    seed_customer(&fix, 7, 3_000).await;

    let mut draft = pickup_draft(1, 10_000, 1);
    draft.customer_id = Some(7);
    draft.requested_points = 2_000;
    let order = fix.manager.create_order(draft).await.unwrap();
    assert_eq!(
        fix.customers.find_by_id(7).await.unwrap().unwrap().points_balance,
        1_000
    );

    // Lower the redemption to 500 - the difference comes back
    let patch = OrderPatch {
        requested_points: Some(500),
        ..Default::default()
    };
    let order = fix.manager.update_order(order.id, patch).await.unwrap();
    assert_eq!(order.summary.points_used, 500);
    assert_eq!(
        fix.customers.find_by_id(7).await.unwrap().unwrap().points_balance,
        2_500
    );

    // Raise it to 3,000 - the extra 2,500 is debited
    let patch = OrderPatch {
        requested_points: Some(3_000),
        ..Default::default()
    };
    let order = fix.manager.update_order(order.id, patch).await.unwrap();
    assert_eq!(order.summary.points_used, 3_000);
    assert_eq!(
        fix.customers.find_by_id(7).await.unwrap().unwrap().points_balance,
        0
    );

    // Cancellation still returns to the pre-order baseline exactly once
    fix.manager.cancel_order(order.id).await.unwrap();
    assert_eq!(
        fix.customers.find_by_id(7).await.unwrap().unwrap().points_balance,
        3_000
    );
}


#[tokio::test]
async fn test_delivery_order_with_fee_schedule() {
    let fix = fixture().await;
    let draft = OrderDraft {
        branch_id: 1,
        customer_id: None,
        ordered_at: None,
        items: items(20_000, 1),
        discount_rate: None,
        requested_points: 0,
        receipt_type: ReceiptType::DeliveryReservation,
        pickup: None,
        delivery: Some(DeliveryInfo {
            district: "gangnam".to_string(),
            size: ItemSize::Medium,
            express: true,
            address: "강남구 테헤란로".to_string(),
            recipient_name: "이하늘".to_string(),
            ..Default::default()
        }),
        payment_method: "transfer".to_string(),
        paid: false,
        extensions: vec![],
    };

    let order = fix.manager.create_order(draft).await.unwrap();
    // 3,000 base + 3,000 medium + 10,000 express
    assert_eq!(order.summary.delivery_fee, 16_000);
    assert_eq!(order.summary.total, 36_000);
}


#[tokio::test]
async fn test_delivery_cost_reconciles_expense_entries() {
    let fix = fixture().await;
    let mut draft = pickup_draft(1, 20_000, 1);
    draft.receipt_type = ReceiptType::DeliveryReservation;
    draft.pickup = None;
    draft.delivery = Some(DeliveryInfo {
        district: "gangnam".to_string(),
        address: "x".to_string(),
        recipient_name: "y".to_string(),
        ..Default::default()
    });
    let order = fix.manager.create_order(draft).await.unwrap();

    // Setting the cost creates exactly one delivery-fee entry
    let updated = fix
        .manager
        .set_actual_delivery_cost(order.id, Some(5_000), None)
        .await
        .unwrap();
    assert_eq!(updated.delivery_profit, Some(updated.summary.delivery_fee - 5_000));
    let entries = fix.expenses.list_for_order(order.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_type, LedgerEntryType::StandardDeliveryFee);
    assert_eq!(entries[0].amount, 5_000);

    // Zeroing it deletes the entry - no zero-value residue
    fix.manager
        .set_actual_delivery_cost(order.id, Some(0), None)
        .await
        .unwrap();
    assert!(fix.expenses.list_for_order(order.id).await.unwrap().is_empty());
}


#[tokio::test]
async fn test_transfer_accept_moves_expense_attribution() {
    let fix = fixture().await;
    let mut draft = pickup_draft(1, 20_000, 1);
    draft.receipt_type = ReceiptType::DeliveryReservation;
    draft.pickup = None;
    draft.delivery = Some(DeliveryInfo {
        district: "gangnam".to_string(),
        address: "x".to_string(),
        recipient_name: "y".to_string(),
        ..Default::default()
    });
    let order = fix.manager.create_order(draft).await.unwrap();
    fix.manager
        .set_actual_delivery_cost(order.id, Some(4_000), Some(1_000))
        .await
        .unwrap();

    fix.manager.request_transfer(order.id, 2).await.unwrap();
    let entries = fix.expenses.list_for_order(order.id).await.unwrap();
    assert!(entries.iter().all(|e| e.branch_id == 1), "request alone moves nothing");

    let accepted = fix.manager.accept_transfer(order.id).await.unwrap();
    assert_eq!(accepted.responsible_branch(), 2);
    let entries = fix.expenses.list_for_order(order.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.branch_id == 2));
}


#[tokio::test]
async fn test_complete_fulfillment_marks_record_and_transfer() {
    let fix = fixture().await;
    let order = fix
        .manager
        .create_order(pickup_draft(1, 9_000, 1))
        .await
        .unwrap();
    fix.manager.request_transfer(order.id, 2).await.unwrap();
    fix.manager.accept_transfer(order.id).await.unwrap();

    let done = fix.manager.complete_fulfillment(order.id).await.unwrap();
    assert_eq!(done.status, OrderStatus::Completed);
    assert!(done.pickup.as_ref().unwrap().completed);
    assert_eq!(
        done.transfer.as_ref().unwrap().status,
        TransferStatus::Completed
    );
}


#[tokio::test]
async fn test_delete_order_reverses_and_removes() {
    let fix = fixture().await;
    seed_customer(&fix, 7, 2_000).await;

    let mut draft = pickup_draft(1, 8_000, 1);
    draft.customer_id = Some(7);
    draft.requested_points = 1_000;
    draft.paid = true;
    let order = fix.manager.create_order(draft).await.unwrap();
    let day = shared::util::business_date(order.ordered_at, TZ);

    fix.manager.delete_order(order.id).await.unwrap();

    assert!(matches!(
        fix.manager.get_order(order.id).await,
        Err(OrderError::OrderNotFound(_))
    ));
    assert_eq!(
        fix.customers.find_by_id(7).await.unwrap().unwrap().points_balance,
        2_000
    );
    assert_eq!(bucket(&fix, 1, day).await, (0, 0, 0));
}


#[tokio::test]
async fn test_stock_decrement_skips_external_source() {
    let fix = fixture().await;
    let mut draft = pickup_draft(1, 5_000, 2);
    draft.items.push(LineItemInput {
        product_id: 200,
        name: "외부 상품".to_string(),
        quantity: 3,
        unit_price: 1_000,
        external_source: true,
    });

    fix.manager.create_order(draft).await.unwrap();
    assert_eq!(fix.stock.decremented(100), 2);
    assert_eq!(fix.stock.decremented(200), 0);
}


#[tokio::test]
async fn test_fetch_reads() {
    let fix = fixture().await;
    seed_customer(&fix, 7, 0).await;

    let mut a = pickup_draft(1, 5_000, 1);
    a.ordered_at = Some(millis_of(2024, 3, 5));
    a.customer_id = Some(7);
    a.paid = true;
    let mut b = pickup_draft(1, 6_000, 1);
    b.ordered_at = Some(millis_of(2024, 3, 9));
    let a = fix.manager.create_order(a).await.unwrap();
    fix.manager.create_order(b).await.unwrap();

    let in_range = fix
        .manager
        .fetch_by_date_range(Some(1), date(2024, 3, 4), date(2024, 3, 6))
        .await
        .unwrap();
    assert_eq!(in_range.len(), 1);
    assert_eq!(in_range[0].id, a.id);

    let by_customer = fix.manager.fetch_by_customer(7).await.unwrap();
    assert_eq!(by_customer.len(), 1);

    let settle_day = shared::util::business_date(a.payment.paid_at.unwrap(), TZ);
    let settled = fix
        .manager
        .fetch_for_settlement(Some(1), settle_day)
        .await
        .unwrap();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].id, a.id);
}


#[tokio::test]
async fn test_completed_cannot_reopen() {
    let fix = fixture().await;
    let order = fix
        .manager
        .create_order(pickup_draft(1, 5_000, 1))
        .await
        .unwrap();
    fix.manager
        .transition_status(order.id, OrderStatus::Completed)
        .await
        .unwrap();

    let result = fix
        .manager
        .transition_status(order.id, OrderStatus::Processing)
        .await;
    assert!(matches!(result, Err(OrderError::InvalidTransition(_))));

    // Voiding a completed order is still allowed
    let canceled = fix
        .manager
        .transition_status(order.id, OrderStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, OrderStatus::Canceled);
}
