//! Delivery fee computation
//!
//! Pickup receipt types never carry a fee. For delivery orders a manual
//! override wins verbatim; otherwise the fee is the branch schedule's
//! district base fee (with the "other" fallback tier) plus size and
//! express surcharges.

use shared::models::{BranchFeeSchedule, DeliveryInfo, ReceiptType};

/// Compute the delivery fee for an order
pub fn compute_delivery_fee(
    receipt_type: ReceiptType,
    delivery: Option<&DeliveryInfo>,
    schedule: Option<&BranchFeeSchedule>,
) -> i64 {
    if !receipt_type.is_delivery() {
        return 0;
    }
    let Some(info) = delivery else {
        return 0;
    };
    if let Some(fee) = info.manual_fee {
        return fee;
    }
    let Some(schedule) = schedule else {
        tracing::warn!("No fee schedule available, delivery fee defaults to 0");
        return 0;
    };

    let base = schedule.district_fee(&info.district);
    let size = schedule.size_surcharge(info.size);
    let express = if info.express {
        schedule.express_surcharge
    } else {
        0
    };
    base + size + express
}
