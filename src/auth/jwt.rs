//! JWT 令牌签发与验证（HS256）

use crate::{config::AppConfig, error::AppError, models::Role};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 默认令牌有效期（72 小时）
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 72 * 3600;

/// JWT 声明
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// 用户 ID，序列化为 `id`（前端直接解码该字段）
    #[serde(rename = "id")]
    pub sub: i64,

    /// 用户角色
    pub role: Role,

    /// 签发时间
    pub iat: i64,

    /// 过期时间
    pub exp: i64,
}

/// 令牌验证错误
///
/// 除 `Encoding` 外全部映射为同一个 401
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Encoding(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized,
        }
    }
}

/// JWT 服务，持有签名密钥；启动时构建一次并共享
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// 使用密钥和有效期创建 JWT 服务
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AppError> {
        // HS256 密钥至少 32 字节
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        // 过期时间自行校验，便于指定当前时间
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// 从配置创建 JWT 服务
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            config.security.jwt_secret.expose_secret(),
            Duration::seconds(config.security.token_ttl_secs as i64),
        )
    }

    /// 配置的令牌有效期
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 按配置的有效期签发令牌
    pub fn issue(&self, subject_id: i64, role: Role) -> Result<String, TokenError> {
        self.issue_at(subject_id, role, self.ttl, Utc::now())
    }

    /// 按指定有效期签发令牌
    pub fn issue_with_ttl(
        &self,
        subject_id: i64,
        role: Role,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(subject_id, role, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject_id: i64,
        role: Role,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject_id,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// 按当前时间验证签名和有效期
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// 按 `now` 验证签名和有效期
    ///
    /// 仅在 `exp` 之前有效
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Malformed,
                }
            })?
            .claims;

        if now.timestamp() >= claims.exp {
            tracing::debug!(sub = claims.sub, exp = claims.exp, "Token expired");
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_32_characters_long!";

    fn service() -> JwtService {
        JwtService::new(SECRET, Duration::seconds(DEFAULT_TOKEN_TTL_SECS)).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();

        let token = service.issue(42, Role::Organizer).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, Role::Organizer);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_issue_with_explicit_ttl() {
        let service = service();
        assert_eq!(service.ttl(), Duration::hours(72));

        let token = service
            .issue_with_ttl(9, Role::Participant, Duration::minutes(5))
            .unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = service();
        let issued_at = Utc::now();
        let ttl = Duration::seconds(60);

        let token = service.issue_at(7, Role::Participant, ttl, issued_at).unwrap();

        assert!(service.verify_at(&token, issued_at + Duration::seconds(59)).is_ok());
        assert_eq!(
            service.verify_at(&token, issued_at + Duration::seconds(61)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_already_expired_token_fails_now() {
        let service = service();
        let token = service
            .issue_at(7, Role::Participant, Duration::hours(1), Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let issuer = service();
        let other =
            JwtService::new("another_secret_key_32_characters_long", Duration::hours(1)).unwrap();

        let token = issuer.issue(1, Role::Organizer).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = service();
        let token = service.issue(1, Role::Participant).unwrap();

        // 替换载荷为组织者角色，保留原签名
        let forged_claims = Claims {
            sub: 1,
            role: Role::Organizer,
            iat: 0,
            exp: i64::MAX / 2,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"attacker-controlled-secret-32-chars!!"),
        )
        .unwrap();

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let tampered = parts.join(".");

        assert_eq!(service.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = service();
        assert_eq!(service.verify("invalid_token"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_claims_payload_uses_numeric_id() {
        let claims = Claims {
            sub: 9,
            role: Role::Participant,
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["role"], "participant");
    }

    #[test]
    fn test_secret_too_short() {
        assert!(JwtService::new("short", Duration::hours(1)).is_err());
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        for e in [TokenError::InvalidSignature, TokenError::Expired, TokenError::Malformed] {
            assert_eq!(AppError::from(e).code(), 401);
        }
        assert_eq!(AppError::from(TokenError::Encoding("x".into())).code(), 500);
    }
}
