use ledger_server::{Config, ServerState, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    ledger_server::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        config.log_dir.as_deref(),
    );

    // 打印横幅
    print_banner();

    tracing::info!("Ledger server starting...");

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config).await;
    let feed = state.feed.clone();

    // 3. 启动 HTTP 服务器
    let app = ledger_server::api::router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            feed.shutdown();
        })
        .await?;

    Ok(())
}
