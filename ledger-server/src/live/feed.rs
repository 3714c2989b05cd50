//! 变更事件总线
//!
//! # 消息流
//!
//! ```text
//! OrdersManager ──▶ publish() ──▶ broadcast::Sender ──▶ ViewWorker(s)
//!                                            │
//!                                            └──▶ 其他订阅者 (推送网关等)
//! ```
//!
//! 事件按订单 id 有序（同一订单的变更由单一写入方产生），跨订单无全局
//! 顺序保证。每个事件携带完整快照，消费端以覆盖方式应用。

use shared::event::OrderChangeEvent;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Configuration for the change feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// 变更事件总线 - 负责把订单行变更广播给所有订阅者
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<OrderChangeEvent>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl ChangeFeed {
    /// 创建默认容量的事件总线
    pub fn new() -> Self {
        Self::from_config(FeedConfig::default())
    }

    /// 从配置创建事件总线
    pub fn from_config(config: FeedConfig) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 创建指定容量的事件总线
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(FeedConfig {
            channel_capacity: capacity,
        })
    }

    /// 发布变更事件 (服务器 -> 所有订阅者)
    ///
    /// 无在线订阅者时事件被丢弃并记录 warn - 推送是尽力而为的，
    /// 台账本身的正确性不依赖于事件送达。
    pub fn publish(&self, event: OrderChangeEvent) {
        if self.tx.send(event).is_err() {
            tracing::warn!("Change event dropped: no active receivers");
        }
    }

    /// 订阅变更事件
    pub fn subscribe(&self) -> broadcast::Receiver<OrderChangeEvent> {
        self.tx.subscribe()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭事件总线
    pub fn shutdown(&self) {
        tracing::info!("Shutting down change feed");
        self.shutdown_token.cancel();
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
