//! Order inputs - creation drafts and edit patches
//!
//! All validation happens here, before any mutation runs, so a rejected
//! input never leaves partial state behind.

use serde::{Deserialize, Serialize};
use shared::models::{
    DeliveryInfo, LineItem, OrderExtension, PickupInfo, ReceiptType,
};
use validator::Validate;

use super::error::{OrderError, OrderResult};

/// Line item input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    /// Manually keyed / external-source line - no stock decrement
    #[serde(default)]
    pub external_source: bool,
}

impl LineItemInput {
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.product_id,
            name: self.name,
            quantity: self.quantity,
            unit_price: self.unit_price,
            external_source: self.external_source,
        }
    }
}

/// Creation draft
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderDraft {
    #[validate(range(min = 1, message = "branch reference is required"))]
    pub branch_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    /// Order timestamp; defaults to now
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered_at: Option<i64>,
    #[validate(length(min = 1, message = "order needs at least one line item"))]
    pub items: Vec<LineItemInput>,
    /// Custom discount rate in percent; None selects the customer's tier rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<i64>,
    /// Points the customer asks to redeem
    #[serde(default)]
    #[validate(range(min = 0, message = "requested points must not be negative"))]
    pub requested_points: i64,
    pub receipt_type: ReceiptType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<PickupInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryInfo>,
    /// 支付方式 (card, cash, transfer, ...)
    pub payment_method: String,
    /// Whether payment was collected at capture time
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<OrderExtension>,
}

impl OrderDraft {
    /// Full validation: derive-level constraints plus the cross-field rules
    pub fn validate_draft(&self) -> OrderResult<()> {
        self.validate()
            .map_err(|e| OrderError::Validation(e.to_string()))?;
        validate_items(&self.items)?;
        validate_rate(self.discount_rate)?;
        if self.requested_points > 0 && self.customer_id.is_none() {
            return Err(OrderError::Validation(
                "points cannot be redeemed without a customer".to_string(),
            ));
        }
        validate_fulfillment(self.receipt_type, self.pickup.as_ref(), self.delivery.as_ref())
    }
}

/// Edit patch - None leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItemInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<ReceiptType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<PickupInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<OrderExtension>>,
}

impl OrderPatch {
    pub fn validate_patch(&self) -> OrderResult<()> {
        if let Some(items) = &self.items {
            if items.is_empty() {
                return Err(OrderError::Validation(
                    "order needs at least one line item".to_string(),
                ));
            }
            validate_items(items)?;
        }
        if let Some(branch_id) = self.branch_id
            && branch_id < 1
        {
            return Err(OrderError::Validation(
                "branch reference is required".to_string(),
            ));
        }
        if let Some(points) = self.requested_points
            && points < 0
        {
            return Err(OrderError::Validation(
                "requested points must not be negative".to_string(),
            ));
        }
        validate_rate(self.discount_rate)
    }
}

fn validate_items(items: &[LineItemInput]) -> OrderResult<()> {
    for item in items {
        if item.quantity <= 0 {
            return Err(OrderError::Validation(format!(
                "item '{}' has non-positive quantity",
                item.name
            )));
        }
        if item.unit_price < 0 {
            return Err(OrderError::Validation(format!(
                "item '{}' has negative unit price",
                item.name
            )));
        }
    }
    Ok(())
}

fn validate_rate(rate: Option<i64>) -> OrderResult<()> {
    if let Some(rate) = rate
        && !(0..=100).contains(&rate)
    {
        return Err(OrderError::Validation(format!(
            "discount rate {} out of range 0..=100",
            rate
        )));
    }
    Ok(())
}

/// Fulfillment sub-records are mutually exclusive and must match the
/// receipt type
pub fn validate_fulfillment(
    receipt_type: ReceiptType,
    pickup: Option<&PickupInfo>,
    delivery: Option<&DeliveryInfo>,
) -> OrderResult<()> {
    match receipt_type {
        ReceiptType::DeliveryReservation => {
            if delivery.is_none() {
                return Err(OrderError::Validation(
                    "delivery order needs a delivery record".to_string(),
                ));
            }
            if pickup.is_some() {
                return Err(OrderError::Validation(
                    "delivery order cannot carry a pickup record".to_string(),
                ));
            }
        }
        ReceiptType::StorePickup | ReceiptType::PickupReservation => {
            if delivery.is_some() {
                return Err(OrderError::Validation(
                    "pickup order cannot carry a delivery record".to_string(),
                ));
            }
        }
    }
    Ok(())
}
