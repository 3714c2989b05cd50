//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是订单台账服务的核心数据结构，持有所有组件的共享引用。
//! 使用 Arc 实现浅拷贝，所有权成本极低。
//!
//! # 服务组件
//!
//! | 字段 | 类型 | 说明 |
//! |------|------|------|
//! | config | Config | 配置项 (不可变) |
//! | manager | Arc<OrdersManager> | 订单状态机 |
//! | engine | AggregationEngine | 增量聚合引擎 |
//! | orders | Arc<dyn OrderRepository> | 订单仓储 |
//! | stats | Arc<dyn DailyStatRepository> | 日结统计仓储 |
//! | feed | ChangeFeed | 变更事件总线 |
//! | admin_view | Arc<VisibleOrders> | 管理员可见订单视图 |

use std::sync::Arc;

use crate::core::Config;
use crate::db::repository::{DailyStatRepository, OrderRepository};
use crate::db::{
    InMemoryCustomerRepository, InMemoryDailyStatRepository, InMemoryOrderRepository,
};
use crate::live::{ChangeFeed, FeedConfig, ViewScope, ViewWorker, VisibleOrders};
use crate::loyalty::PointsLedger;
use crate::orders::OrdersManager;
use crate::pricing::PricingConfig;
use crate::services::{InMemoryExpenseLedger, NoopNotifier, Notifier, WebhookNotifier};
use crate::stats::AggregationEngine;
use crate::transfer::ExpenseReconciler;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// Server instance epoch - unique ID generated on startup.
    /// Clients compare it to detect restarts and trigger full resync.
    pub epoch: String,
    /// 订单状态机
    pub manager: Arc<OrdersManager>,
    /// 增量聚合引擎
    pub engine: AggregationEngine,
    /// 订单仓储 (统计重建用)
    pub orders: Arc<dyn OrderRepository>,
    /// 日结统计仓储
    pub stats: Arc<dyn DailyStatRepository>,
    /// 变更事件总线
    pub feed: ChangeFeed,
    /// 管理员可见订单视图 (由后台 worker 驱动)
    pub admin_view: Arc<VisibleOrders>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序装配：仓储 -> 积分台账 -> 聚合引擎 -> 对账器 -> 事件总线
    /// -> 订单状态机 -> 管理员视图 worker。
    pub async fn initialize(config: &Config) -> Self {
        let orders: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
        let customers = Arc::new(InMemoryCustomerRepository::new());
        let stats: Arc<dyn DailyStatRepository> = Arc::new(InMemoryDailyStatRepository::new());
        let expenses = Arc::new(InMemoryExpenseLedger::new());

        let feed = ChangeFeed::from_config(FeedConfig {
            channel_capacity: config.channel_capacity,
        });
        let engine = AggregationEngine::new(stats.clone(), config.timezone);
        let pricing = PricingConfig {
            accumulation_enabled: config.points_accumulation,
            earn_rate: config.points_earn_rate,
        };
        let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
            None => Arc::new(NoopNotifier),
        };

        let manager = OrdersManager::new(
            orders.clone(),
            customers.clone(),
            PointsLedger::new(customers),
            engine.clone(),
            ExpenseReconciler::new(expenses),
            feed.clone(),
            pricing,
            config.timezone,
        )
        .with_notifier(notifier);

        // Admin view: unrestricted visibility, driven from the change feed
        let admin_worker = ViewWorker::spawn(&feed, ViewScope::Admin);
        let admin_view = admin_worker.view();

        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            epoch = %epoch,
            timezone = %config.timezone,
            accumulation = config.points_accumulation,
            "Server state initialized"
        );

        Self {
            config: config.clone(),
            epoch,
            manager: Arc::new(manager),
            engine,
            orders,
            stats,
            feed,
            admin_view,
        }
    }
}
