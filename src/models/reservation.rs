//! 预订模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已存储的预订，创建后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub tickets: i32,
    pub created_at: DateTime<Utc>,
}

/// `POST /reservations` 请求体，不含 `user_id`，预订者取自调用者身份
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub event_id: i64,
    pub tickets: i32,
}
