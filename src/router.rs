use std::any::Any;

use axum::{
    Router,
    http::HeaderValue,
    response::Response,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    trace::TraceLayer,
};

use crate::{AppState, config::Config, error::AppError, middleware::log_errors, routes};

// 课程查询与会话管理接口
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/consultar-curso", post(routes::course::consult_by_body))
        .route("/consultar-curso/{nrc}", get(routes::course::consult_by_path))
        .route("/renovar-sesion", post(routes::session::renew_session))
        .route("/login", post(routes::session::login))
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config.cors_allow_origin.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(CorsAny)
                .allow_headers(CorsAny),
            Err(_) => {
                tracing::warn!("Invalid CORS_ALLOW_ORIGIN {:?}, allowing any origin", origin);
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    }
}

/// Turns a handler panic into the generic internal error body.
fn panic_reply(expose_details: bool) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic| {
        let message = panic
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!("Handler panicked: {}", message);
        AppError::Internal(message).into_reply(expose_details)
    }
}

fn with_layers(router: Router<AppState>, config: &Config) -> Router<AppState> {
    router.fallback(routes::system::not_found).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(config))
            .layer(axum::middleware::from_fn(log_errors))
            .layer(CatchPanicLayer::custom(panic_reply(config.expose_error_details))),
    )
}

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api_routes());

    // 仅在调试模式下暴露原始结果
    if state.config.expose_error_details {
        tracing::debug!("Mounting debug routes");
        router = router.route("/debug/test-nrc/{nrc}", get(routes::debug::test_nrc));
    }

    with_layers(router, &state.config).with_state(state)
}
