use std::net::{IpAddr, SocketAddr};

use attendance_proxy::{AppState, config::Config, create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        "Portal: {} (session TTL {}s, filter unscheduled: {})",
        config.portal_base_url,
        config.session_ttl_secs,
        config.filter_unscheduled
    );

    if config.expose_error_details {
        tracing::warn!("Error details are exposed to clients and debug routes are enabled");
    }

    // 设置应用状态
    let state = AppState::new(config).expect("Failed to build portal client");

    // 预先获取会话，失败时不阻止启动
    if state.config.warmup_session {
        match state.sessions.acquire().await {
            Ok(session) => tracing::info!("Warm-up session ready ({:?})", session.source),
            Err(e) => tracing::warn!("Warm-up session failed, will retry lazily: {}", e),
        }
    }

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = create_router(state);

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Endpoints: POST /api/consultar-curso, GET /api/consultar-curso/{{nrc}}, GET /health");
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
