//! Order model - the ledger's unit of record
//!
//! An order owns its financial summary and its fulfillment sub-record
//! exclusively. All monetary amounts are integer won (i64); fractional
//! arithmetic only happens inside the pricing calculator.

use serde::{Deserialize, Serialize};

/// 收货方式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptType {
    /// 到店自取 - 立即取货，下单即完成
    #[default]
    StorePickup,
    /// 到店自取 - 预约取货
    PickupReservation,
    /// 配送预约
    DeliveryReservation,
}

impl ReceiptType {
    /// Whether this receipt type carries a delivery fee
    pub fn is_delivery(&self) -> bool {
        matches!(self, ReceiptType::DeliveryReservation)
    }

    /// Whether creation short-circuits straight to Completed
    pub fn completes_immediately(&self) -> bool {
        matches!(self, ReceiptType::StorePickup)
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 处理中
    #[default]
    Processing,
    /// 已完成 (terminal, may still be voided later)
    Completed,
    /// 已取消 (terminal; immutable except audit fields)
    Canceled,
}

/// Payment sub-state, evolves independently of the order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Completed,
    SplitPayment,
}

impl PaymentStatus {
    /// Whether this scalar status counts as settled on its own
    pub fn is_paid_class(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Completed)
    }
}

/// Split payment record - two portions settled independently
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SplitPayment {
    pub first_method: String,
    pub first_amount: i64,
    /// Settlement timestamp of the first portion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_paid_at: Option<i64>,
    pub second_method: String,
    pub second_amount: i64,
    /// Settlement timestamp of the second portion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_paid_at: Option<i64>,
}

impl SplitPayment {
    /// Dedicated settled predicate: both portions recorded paid
    pub fn is_settled(&self) -> bool {
        self.first_paid_at.is_some() && self.second_paid_at.is_some()
    }

    /// Settlement timestamp of the whole split (latest portion)
    pub fn settled_at(&self) -> Option<i64> {
        match (self.first_paid_at, self.second_paid_at) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        }
    }
}

/// Payment record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Payment {
    /// 支付方式 (card, cash, transfer, ...)
    pub method: String,
    pub status: PaymentStatus,
    /// Settlement timestamp (Unix millis), set when the status enters
    /// a paid class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    /// Split-payment sub-record, present only for SPLIT_PAYMENT status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitPayment>,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Product ID
    pub id: i64,
    /// Product name snapshot
    pub name: String,
    pub quantity: i32,
    /// Unit price in won
    pub unit_price: i64,
    /// Manually entered / external-source line - stock is not decremented
    #[serde(default)]
    pub external_source: bool,
}

impl LineItem {
    pub fn line_total(&self) -> i64 {
        self.quantity as i64 * self.unit_price
    }
}

/// Financial summary, computed by the pricing calculator
///
/// Invariant: `total = subtotal - discount_amount - points_used + delivery_fee`
/// and `total >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OrderSummary {
    pub subtotal: i64,
    pub discount_amount: i64,
    /// Discount rate in percent actually applied
    pub discount_rate: i64,
    pub delivery_fee: i64,
    /// Points actually redeemed against this order
    pub points_used: i64,
    /// Points actually credited for this order
    pub points_earned: i64,
    pub total: i64,
    /// 供给价 (不含税): round(total / 1.1)
    pub supply_price: i64,
    /// 附加税: total - supply_price
    pub vat: i64,
}

impl OrderSummary {
    /// Verify the financial invariant
    pub fn is_consistent(&self) -> bool {
        self.total == self.subtotal - self.discount_amount - self.points_used + self.delivery_fee
            && self.total >= 0
    }

    /// Audit marker written on cancellation: all amounts zeroed
    pub fn zeroed() -> Self {
        Self::default()
    }
}

/// 商品规格 (配送附加费分级)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSize {
    #[default]
    Small,
    Medium,
    Large,
}

/// Pickup fulfillment sub-record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PickupInfo {
    /// Reserved pickup time (Unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Delivery fulfillment sub-record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeliveryInfo {
    /// Destination district used for fee lookup
    pub district: String,
    #[serde(default)]
    pub size: ItemSize,
    #[serde(default)]
    pub express: bool,
    pub address: String,
    pub recipient_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_phone: Option<String>,
    /// Reserved delivery time (Unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<i64>,
    /// Manual fee override - used verbatim when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_fee: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// 调拨状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// 已申请
    #[default]
    Requested,
    /// 已接受 - 财务责任转移到处理门店
    Accepted,
    /// 已完成
    Completed,
    /// 已拒绝
    Rejected,
}

/// Branch transfer record - reassignment of fulfillment and financial
/// responsibility to another branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferInfo {
    pub origin_branch_id: i64,
    pub processing_branch_id: i64,
    #[serde(default)]
    pub status: TransferStatus,
}

impl TransferInfo {
    /// Whether financial attribution has shifted to the processing branch
    pub fn is_attributed_to_processor(&self) -> bool {
        matches!(
            self.status,
            TransferStatus::Accepted | TransferStatus::Completed
        )
    }
}

/// Tagged extension entries - explicit, validated replacements for the
/// open-ended extra-data bag of the legacy record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderExtension {
    /// Free-form staff memo
    Memo { text: String },
    /// Gift card message printed with the order
    GiftMessage { text: String },
    /// Marketing / acquisition channel tag
    SourceChannel { name: String },
}

/// Order - unit of record of the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Snowflake ID
    pub id: i64,
    /// Originating branch
    pub branch_id: i64,
    /// 下单时间 (Unix millis) - the order-date axis
    pub ordered_at: i64,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
    /// Orderer reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub receipt_type: ReceiptType,
    /// Pickup sub-record (mutually exclusive with `delivery`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<PickupInfo>,
    /// Delivery sub-record (mutually exclusive with `pickup`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryInfo>,
    pub payment: Payment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferInfo>,
    /// Actual cost paid to the delivery provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_delivery_cost: Option<i64>,
    /// Cash handed to the driver on delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_cash_fee: Option<i64>,
    /// delivery_fee - actual_delivery_cost, recomputed on each cost change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_profit: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<OrderExtension>,
    /// Audit field - set on cancellation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn is_canceled(&self) -> bool {
        self.status == OrderStatus::Canceled
    }

    /// Settled predicate: payment in a paid class and order not canceled.
    /// Split payments settle through their own sub-record.
    pub fn is_settled(&self) -> bool {
        if self.is_canceled() {
            return false;
        }
        match self.payment.status {
            PaymentStatus::Paid | PaymentStatus::Completed => true,
            PaymentStatus::SplitPayment => {
                self.payment.split.as_ref().is_some_and(SplitPayment::is_settled)
            }
            PaymentStatus::Pending => false,
        }
    }

    /// Settlement timestamp (Unix millis) - the settlement-date axis.
    /// None while the order is unsettled.
    pub fn settlement_ts(&self) -> Option<i64> {
        if !self.is_settled() {
            return None;
        }
        match self.payment.status {
            PaymentStatus::SplitPayment => {
                self.payment.split.as_ref().and_then(SplitPayment::settled_at)
            }
            _ => self.payment.paid_at,
        }
    }

    /// The branch financially responsible for fulfillment expenses
    pub fn responsible_branch(&self) -> i64 {
        match &self.transfer {
            Some(t) if t.is_attributed_to_processor() => t.processing_branch_id,
            _ => self.branch_id,
        }
    }

    /// Branch-scoped visibility: the order originated here, or this
    /// branch is currently processing its transfer
    pub fn visible_to_branch(&self, branch_id: i64) -> bool {
        if self.branch_id == branch_id {
            return true;
        }
        self.transfer
            .as_ref()
            .is_some_and(|t| t.processing_branch_id == branch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order() -> Order {
        Order {
            id: 1,
            branch_id: 10,
            ordered_at: 1_700_000_000_000,
            status: OrderStatus::Processing,
            items: vec![],
            summary: OrderSummary::default(),
            customer_id: None,
            receipt_type: ReceiptType::PickupReservation,
            pickup: Some(PickupInfo::default()),
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

    #[test]
    fn test_summary_invariant() {
        let summary = OrderSummary {
            subtotal: 10_000,
            discount_amount: 1_000,
            discount_rate: 10,
            delivery_fee: 0,
            points_used: 2_000,
            points_earned: 0,
            total: 7_000,
            supply_price: 6_364,
            vat: 636,
        };
        assert!(summary.is_consistent());
    }

    #[test]
    fn test_settled_requires_paid_class_and_not_canceled() {
        let mut order = base_order();
        assert!(!order.is_settled());

        order.payment.status = PaymentStatus::Paid;
        order.payment.paid_at = Some(1_700_000_100_000);
        assert!(order.is_settled());
        assert_eq!(order.settlement_ts(), Some(1_700_000_100_000));

        order.status = OrderStatus::Canceled;
        assert!(!order.is_settled());
        assert_eq!(order.settlement_ts(), None);
    }

    #[test]
    fn test_split_payment_settles_via_sub_record() {
        let mut order = base_order();
        order.payment.status = PaymentStatus::SplitPayment;
        order.payment.split = Some(SplitPayment {
            first_method: "card".into(),
            first_amount: 4_000,
            first_paid_at: Some(100),
            second_method: "cash".into(),
            second_amount: 3_000,
            second_paid_at: None,
        });
        assert!(!order.is_settled());

        order.payment.split.as_mut().unwrap().second_paid_at = Some(200);
        assert!(order.is_settled());
        assert_eq!(order.settlement_ts(), Some(200));
    }

    #[test]
    fn test_transfer_shifts_responsibility_only_once_accepted() {
        let mut order = base_order();
        order.transfer = Some(TransferInfo {
            origin_branch_id: 10,
            processing_branch_id: 20,
            status: TransferStatus::Requested,
        });
        assert_eq!(order.responsible_branch(), 10);
        assert!(order.visible_to_branch(20));

        order.transfer.as_mut().unwrap().status = TransferStatus::Accepted;
        assert_eq!(order.responsible_branch(), 20);
        assert!(order.visible_to_branch(10));
        assert!(!order.visible_to_branch(30));
    }
}
