//! Customer model (积分会员)

use serde::{Deserialize, Serialize};

/// 会员等级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerGrade {
    #[default]
    Basic,
    Silver,
    Gold,
    Vip,
}

impl CustomerGrade {
    /// Tier discount rate in percent
    pub fn discount_rate(&self) -> i64 {
        match self {
            CustomerGrade::Basic => 0,
            CustomerGrade::Silver => 3,
            CustomerGrade::Gold => 5,
            CustomerGrade::Vip => 10,
        }
    }
}

/// Customer entity
///
/// `points_balance` is shared mutable state; only the points ledger's
/// credit/debit operations may change it. Invariant: `points_balance >= 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub points_balance: i64,
    /// 累计消费金额
    #[serde(default)]
    pub total_spent: i64,
    /// 累计订单数
    #[serde(default)]
    pub order_count: i64,
    #[serde(default)]
    pub grade: CustomerGrade,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let now = crate::util::now_millis();
        Self {
            id,
            name: name.into(),
            phone: None,
            points_balance: 0,
            total_spent: 0,
            order_count: 0,
            grade: CustomerGrade::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
