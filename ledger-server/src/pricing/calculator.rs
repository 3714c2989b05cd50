//! Order Pricing Calculator
//!
//! Pure function: line items + discount/points/delivery context -> financial
//! summary. All amounts are integer won; rust_decimal handles the VAT split
//! and the point accumulation product.

use rust_decimal::prelude::*;
use shared::models::{BranchFeeSchedule, DeliveryInfo, LineItem, OrderSummary, ReceiptType};

use super::delivery::compute_delivery_fee;

/// Minimum discounted subtotal before points become usable
pub const POINTS_MIN_PURCHASE: i64 = 5_000;

/// Discount rate selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountRate {
    /// Rate taken from the customer's grade tier
    Tier(i64),
    /// Caller-supplied custom rate
    Custom(i64),
}

impl DiscountRate {
    /// Rate in percent regardless of provenance
    pub fn percent(&self) -> i64 {
        match self {
            DiscountRate::Tier(rate) | DiscountRate::Custom(rate) => *rate,
        }
    }
}

/// Global accumulation settings
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Whether point accumulation is enabled at all
    pub accumulation_enabled: bool,
    /// Earn rate applied to the paid amount (e.g. 0.02)
    pub earn_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            accumulation_enabled: true,
            earn_rate: Decimal::new(2, 2),
        }
    }
}

/// Everything the calculator needs to price one order
#[derive(Debug, Clone)]
pub struct PricingInput<'a> {
    pub items: &'a [LineItem],
    pub discount: DiscountRate,
    /// Points the customer asked to redeem
    pub requested_points: i64,
    /// Customer's current balance (0 for anonymous orders)
    pub point_balance: i64,
    pub receipt_type: ReceiptType,
    pub delivery: Option<&'a DeliveryInfo>,
    pub fee_schedule: Option<&'a BranchFeeSchedule>,
}

/// Compute the financial summary for an order
///
/// Negative quantities, prices, or rates are rejected by validation before
/// this is reached; the calculator itself only clamps.
pub fn compute_summary(input: &PricingInput<'_>, config: &PricingConfig) -> OrderSummary {
    let subtotal: i64 = input.items.iter().map(LineItem::line_total).sum();

    let rate = input.discount.percent();
    // floor(subtotal * rate / 100) - integer division floors for
    // non-negative amounts
    let discount_amount = subtotal * rate / 100;
    let discounted_subtotal = subtotal - discount_amount;

    // Points are usable only above the minimum-purchase gate
    let points_used = if discounted_subtotal >= POINTS_MIN_PURCHASE {
        input
            .requested_points
            .min(input.point_balance)
            .min(discounted_subtotal)
            .max(0)
    } else {
        0
    };

    let delivery_fee = compute_delivery_fee(input.receipt_type, input.delivery, input.fee_schedule);

    let total = (discounted_subtotal - points_used + delivery_fee).max(0);

    // VAT split: supply = round(total / 1.1), half-up
    let supply_price = (Decimal::from(total) / Decimal::new(11, 1))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(total);
    let vat = total - supply_price;

    // floor((total - points_used) * earn_rate), never negative
    let points_earned = if config.accumulation_enabled {
        let base = (total - points_used).max(0);
        (Decimal::from(base) * config.earn_rate)
            .floor()
            .to_i64()
            .unwrap_or(0)
    } else {
        0
    };

    OrderSummary {
        subtotal,
        discount_amount,
        discount_rate: rate,
        delivery_fee,
        points_used,
        points_earned,
        total,
        supply_price,
        vat,
    }
}
