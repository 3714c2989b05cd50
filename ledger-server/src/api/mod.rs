//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单管理接口
//! - [`statistics`] - 日结统计接口

pub mod health;
pub mod orders;
pub mod statistics;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(statistics::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
