//! 请求级身份上下文
//!
//! 认证中间件派生携带已验证 [`Identity`] 的子 [`RequestContext`]，放入请求扩展；
//! handler 通过提取器读取，公开路由得到匿名上下文。每个请求独立构建，不跨请求共享。

use super::jwt::Claims;
use crate::models::Role;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use std::sync::Arc;

/// 已验证的调用者身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
    /// 令牌过期时间（unix 秒）
    pub expires_at: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            expires_at: claims.exp,
        }
    }
}

/// 不可变的请求级上下文
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    identity: Option<Arc<Identity>>,
}

impl RequestContext {
    /// 无身份的上下文（公开路由）
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// 派生携带 `identity` 的子上下文，`self` 保持不变
    pub fn with_identity(&self, identity: Identity) -> Self {
        Self {
            identity: Some(Arc::new(identity)),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}
