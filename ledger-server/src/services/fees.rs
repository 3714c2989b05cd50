//! Branch fee schedule provider
//!
//! Read-only lookup of a branch's district fee map and surcharge schedule.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::BranchFeeSchedule;
use std::sync::Arc;

/// Fee schedule lookup boundary
#[async_trait]
pub trait FeeScheduleProvider: Send + Sync {
    async fn schedule_for(&self, branch_id: i64) -> Option<BranchFeeSchedule>;
}

/// Static provider backed by a shared map
#[derive(Debug, Clone, Default)]
pub struct StaticFeeScheduleProvider {
    schedules: Arc<DashMap<i64, BranchFeeSchedule>>,
}

impl StaticFeeScheduleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, schedule: BranchFeeSchedule) {
        self.schedules.insert(schedule.branch_id, schedule);
    }
}

#[async_trait]
impl FeeScheduleProvider for StaticFeeScheduleProvider {
    async fn schedule_for(&self, branch_id: i64) -> Option<BranchFeeSchedule> {
        self.schedules.get(&branch_id).map(|s| s.clone())
    }
}
