//! 认证与授权模块

pub mod context;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use context::{Identity, RequestContext};
pub use jwt::{Claims, JwtService, TokenError};
pub use middleware::{extract_token, jwt_auth_middleware};
pub use password::PasswordHasher;
