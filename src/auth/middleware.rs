//! JWT 认证中间件

use super::context::{Identity, RequestContext};
use crate::{auth::jwt::JwtService, error::AppError};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 从 Authorization 头提取令牌
///
/// 必须恰好是 `Bearer <token>` 两段，否则拒绝
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized),
    }
}

/// JWT 认证中间件 - 必须认证
///
/// 失败时直接返回 401，不调用后续 handler
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 从 Authorization 头提取令牌
    let token = extract_token(req.headers()).map_err(|e| {
        tracing::debug!(uri = %req.uri(), "Missing or malformed Authorization header");
        e
    })?;

    // 验证令牌
    let claims = jwt_service.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        AppError::from(e)
    })?;

    // 派生新的请求上下文
    let parent = req
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default();
    let context = parent.with_identity(Identity::from(claims));

    // 附加到请求扩展
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
