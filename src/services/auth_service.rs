//! 认证服务：注册、登录

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher},
    error::AppError,
    models::{auth::*, NewUser},
    repository::UserRepository,
};
use std::sync::Arc;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_service: Arc<JwtService>,
    hasher: Arc<PasswordHasher>,
    /// 未知邮箱时用于比对的摘要，与真实摘要使用相同参数
    dummy_digest: Option<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jwt_service: Arc<JwtService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        let dummy_digest = hasher
            .hash("eventhub-unknown-account")
            .map_err(|e| tracing::warn!(error = %e, "Failed to prepare dummy password digest"))
            .ok();

        Self {
            users,
            jwt_service,
            hasher,
            dummy_digest,
        }
    }

    /// 用户注册，返回新用户 ID
    pub async fn register(&self, req: RegisterRequest) -> Result<i64, AppError> {
        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .users
            .create(NewUser {
                email: req.email,
                password_hash,
                role: req.role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user.id)
    }

    /// 用户登录
    ///
    /// 未知邮箱和密码错误返回同一个 401；未知邮箱同样执行一次哈希比对，
    /// 两种失败的耗时一致
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = self.users.find_by_email(&req.email).await?;

        let verified = match &user {
            Some(user) => self.hasher.verify(&user.password_hash, &req.password),
            None => {
                if let Some(digest) = &self.dummy_digest {
                    self.hasher.verify(digest, &req.password);
                }
                false
            }
        };

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!(email = %req.email, "Login failed");
                return Err(AppError::Unauthorized);
            }
        };

        let token = self.jwt_service.issue(user.id, user.role)?;

        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(LoginResponse { token })
    }
}
