//! handler 侧授权：角色与归属检查
//!
//! 认证中间件只负责认证；handler 提取 [`RequestContext`] 后调用这里判断是否放行

use super::context::{Identity, RequestContext};
use crate::{error::AppError, models::Role};

/// 任意已认证调用者，无身份返回 401
pub fn require_identity(ctx: &RequestContext) -> Result<&Identity, AppError> {
    ctx.identity().ok_or(AppError::Unauthorized)
}

/// 持有 `role` 的已认证调用者，无身份或角色不符返回 403
pub fn require_role(ctx: &RequestContext, role: Role) -> Result<&Identity, AppError> {
    match ctx.identity() {
        Some(identity) if identity.role == role => Ok(identity),
        Some(identity) => {
            tracing::warn!(
                user_id = identity.user_id,
                role = %identity.role,
                required = %role,
                "Role check failed"
            );
            Err(AppError::Forbidden)
        }
        None => Err(AppError::Forbidden),
    }
}

pub fn require_organizer(ctx: &RequestContext) -> Result<&Identity, AppError> {
    require_role(ctx, Role::Organizer)
}

/// 按资源的存储所有者做归属检查
///
/// 资源不存在（`None`）与所有者不同都返回 403，调用者无法据此判断 ID 是否存在
pub fn ensure_owner(identity: &Identity, stored_owner: Option<i64>) -> Result<(), AppError> {
    match stored_owner {
        Some(owner) if owner == identity.user_id => Ok(()),
        other => {
            tracing::warn!(
                user_id = identity.user_id,
                found = other.is_some(),
                "Ownership check failed"
            );
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(user_id: i64, role: Role) -> RequestContext {
        RequestContext::anonymous().with_identity(Identity {
            user_id,
            role,
            expires_at: i64::MAX,
        })
    }

    #[test]
    fn test_require_identity() {
        assert!(matches!(
            require_identity(&RequestContext::anonymous()),
            Err(AppError::Unauthorized)
        ));
        assert_eq!(require_identity(&ctx(3, Role::Participant)).unwrap().user_id, 3);
    }

    #[test]
    fn test_require_organizer() {
        assert!(require_organizer(&ctx(1, Role::Organizer)).is_ok());
        assert!(matches!(
            require_organizer(&ctx(1, Role::Participant)),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            require_organizer(&RequestContext::anonymous()),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_ensure_owner_collapses_missing_and_foreign() {
        let context = ctx(1, Role::Organizer);
        let identity = context.identity().unwrap();

        assert!(ensure_owner(identity, Some(1)).is_ok());

        let foreign = ensure_owner(identity, Some(2)).unwrap_err();
        let missing = ensure_owner(identity, None).unwrap_err();
        assert_eq!(foreign.code(), 403);
        assert_eq!(foreign.code(), missing.code());
        assert_eq!(foreign.user_message(), missing.user_message());
    }
}
