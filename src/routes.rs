//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{auth::middleware::jwt_auth_middleware, config::ServerConfig, handlers, middleware::AppState};

/// 请求体上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
///
/// 认证中间件只挂在受保护的路由上；同一路径的公开方法（如 GET /events）不经过认证
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let health_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 公开 API
    let public_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/events", get(handlers::event::list_events))
        .route("/events/{id}", get(handlers::event::get_event));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 活动管理（组织者）
        .route("/events", post(handlers::event::create_event))
        .route(
            "/events/{id}",
            put(handlers::event::update_event).delete(handlers::event::delete_event),
        )
        // 预订（任意角色）
        .route(
            "/reservations",
            get(handlers::reservation::list_reservations)
                .post(handlers::reservation::create_reservation),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(authenticated_routes);

    // 组合所有路由
    let mut router = Router::new()
        .merge(health_routes)
        .nest("/api/v1", api_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    if let Some(cors) = cors_layer(&state.config.server) {
        router = router.layer(cors);
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// 根据允许列表构建 CORS 层，列表为空时不启用
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE]),
    )
}
