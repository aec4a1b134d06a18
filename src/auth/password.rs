//! 密码哈希与验证（Argon2id）

use crate::{config::AppConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// 可配置开销参数的密码哈希器
///
/// 摘要为 PHC 字符串（`$argon2id$v=19$m=...,t=...,p=...$salt$hash`），
/// 盐和参数随摘要保存，验证时不依赖哈希器自身的参数
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// 使用 OWASP 最低参数创建（m=19MiB, t=2, p=1）
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// 使用指定参数创建
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 从配置创建
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::with_params(
            config.security.password_hash_memory_kib,
            config.security.password_hash_iterations,
            config.security.password_hash_parallelism,
        )
    }

    /// 使用随机盐哈希密码
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// 验证密码与已存摘要
    ///
    /// 不匹配或摘要无法解析时返回 `false`，不返回错误
    pub fn verify(&self, digest: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
