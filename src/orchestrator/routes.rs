//! 路由配置

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::handlers;
use super::server::AppState;

/// 创建路由
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/detect", post(handlers::detect))
        .route("/detect-components", post(handlers::detect_components))
        .route("/generate-layout", post(handlers::generate_layout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 由允许的来源列表构造 CORS 层，`*` 表示允许任意来源
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o.trim() == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ 忽略无效的跨域来源: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(origins)
}
