//! Branch transfer & external ledger reconciliation
//!
//! A transfer hands fulfillment of an order to another branch. Once the
//! processing branch accepts, financial attribution (delivery expenses)
//! shifts from the originating branch to the processor; the expense
//! reconciler re-runs to move the external entries.

pub mod reconciler;

pub use reconciler::ExpenseReconciler;

use shared::models::{Order, TransferInfo, TransferStatus};

use crate::orders::error::{OrderError, OrderResult};

/// Attach a transfer request to an order
pub fn request(order: &mut Order, processing_branch_id: i64) -> OrderResult<()> {
    if order.is_canceled() {
        return Err(OrderError::Immutable(order.id));
    }
    if processing_branch_id == order.branch_id {
        return Err(OrderError::Transfer(
            "Cannot transfer an order to its own branch".to_string(),
        ));
    }
    if let Some(existing) = &order.transfer
        && existing.status != TransferStatus::Rejected
    {
        return Err(OrderError::Transfer(format!(
            "Order {} already has an active transfer",
            order.id
        )));
    }
    order.transfer = Some(TransferInfo {
        origin_branch_id: order.branch_id,
        processing_branch_id,
        status: TransferStatus::Requested,
    });
    Ok(())
}

/// Accept a pending transfer - financial attribution shifts here
pub fn accept(order: &mut Order) -> OrderResult<()> {
    let transfer = order
        .transfer
        .as_mut()
        .ok_or_else(|| OrderError::Transfer(format!("Order {} has no transfer", order.id)))?;
    if transfer.status != TransferStatus::Requested {
        return Err(OrderError::Transfer(format!(
            "Transfer for order {} is not pending",
            order.id
        )));
    }
    transfer.status = TransferStatus::Accepted;
    Ok(())
}

/// Mark an accepted transfer completed (fulfillment done at the processor)
pub fn complete(order: &mut Order) -> OrderResult<()> {
    let transfer = order
        .transfer
        .as_mut()
        .ok_or_else(|| OrderError::Transfer(format!("Order {} has no transfer", order.id)))?;
    if transfer.status != TransferStatus::Accepted {
        return Err(OrderError::Transfer(format!(
            "Transfer for order {} was never accepted",
            order.id
        )));
    }
    transfer.status = TransferStatus::Completed;
    Ok(())
}
