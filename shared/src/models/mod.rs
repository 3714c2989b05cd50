//! Domain models

pub mod customer;
pub mod daily_stat;
pub mod fee_schedule;
pub mod ledger_entry;
pub mod order;

// Re-exports
pub use customer::{Customer, CustomerGrade};
pub use daily_stat::{DailyStat, StatDelta, StatKey};
pub use fee_schedule::{BranchFeeSchedule, FALLBACK_DISTRICT};
pub use ledger_entry::{LedgerEntry, LedgerEntryKey, LedgerEntryType};
pub use order::{
    DeliveryInfo, ItemSize, LineItem, Order, OrderExtension, OrderStatus, OrderSummary, Payment,
    PaymentStatus, PickupInfo, ReceiptType, SplitPayment, TransferInfo, TransferStatus,
};
