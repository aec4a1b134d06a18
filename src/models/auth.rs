//! 认证相关模型

use super::user::Role;
use serde::{Deserialize, Serialize};

/// 注册请求
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// 注册响应
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}
