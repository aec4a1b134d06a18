//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id、日志、指标）

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    error::{AppError, ErrorResponse},
    repository::{EventRepository, HealthCheckRepository, Repositories, ReservationRepository},
    services::AuthService,
};
use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_LENGTH, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 请求之间只共享只读的签名密钥和连接池，不缓存身份或资源状态
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub events: Arc<dyn EventRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub health: Arc<dyn HealthCheckRepository>,
}

impl AppState {
    /// 根据配置和存储构建应用状态
    pub fn new(config: AppConfig, repositories: Repositories) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let hasher = Arc::new(PasswordHasher::from_config(&config)?);
        let auth_service = Arc::new(AuthService::new(
            repositories.users,
            jwt_service.clone(),
            hasher,
        ));

        Ok(Self {
            config,
            jwt_service,
            auth_service,
            events: repositories.events,
            reservations: repositories.reservations,
            health: repositories.health,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    // 生成或提取 trace_id/request_id
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        // 继续处理请求
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        // 记录指标 - 使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            _ => "OTHER",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        // 记录日志
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 错误响应体使用与响应头一致的 request_id
        stamp_request_id(&mut response, &request_id);

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 用本次请求的 request_id 重新渲染错误响应体
fn stamp_request_id(response: &mut Response, request_id: &str) {
    let Some(mut error) = response.extensions_mut().remove::<ErrorResponse>() else {
        return;
    };
    error.error.request_id = request_id.to_string();

    match serde_json::to_vec(&error) {
        Ok(bytes) => {
            response.headers_mut().remove(CONTENT_LENGTH);
            *response.body_mut() = Body::from(bytes);
        }
        Err(e) => tracing::warn!(error = %e, "Failed to re-render error body"),
    }
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
