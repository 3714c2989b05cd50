//! Statistics API 模块 (日结统计)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/daily", get(handler::get_daily_stats))
        // 对账修复路径：从订单全量重建统计
        .route("/rebuild", post(handler::rebuild))
}
