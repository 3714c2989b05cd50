//! External expense ledger entries
//!
//! Entries live in an external simple-ledger service and are keyed by
//! (order, entry type). At most one live entry per key; a zero or absent
//! amount means the entry is deleted, never stored as a zero row.

use serde::{Deserialize, Serialize};

/// Expense entry type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    /// 配送费 (paid to the delivery provider)
    StandardDeliveryFee,
    /// 司机现金垫付
    DriverCashPayment,
}

impl LedgerEntryType {
    /// Human-readable label used in the external ledger
    pub fn label(&self) -> &'static str {
        match self {
            LedgerEntryType::StandardDeliveryFee => "delivery_fee",
            LedgerEntryType::DriverCashPayment => "driver_cash",
        }
    }
}

/// Key of an external expense entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LedgerEntryKey {
    pub order_id: i64,
    pub entry_type: LedgerEntryType,
}

/// External expense record derived from an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub order_id: i64,
    pub entry_type: LedgerEntryType,
    /// Branch the expense is attributed to (moves with branch transfer)
    pub branch_id: i64,
    /// Always positive; zero-amount entries are deleted instead
    pub amount: i64,
    /// Expense date (Unix millis)
    pub occurred_at: i64,
    pub updated_at: i64,
}

impl LedgerEntry {
    pub fn key(&self) -> LedgerEntryKey {
        LedgerEntryKey {
            order_id: self.order_id,
            entry_type: self.entry_type,
        }
    }
}
