//! Reservation repository (数据库访问层)

use super::ReservationRepository;
use crate::{error::AppError, models::Reservation};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PgReservationRepository {
    db: PgPool,
}

impl PgReservationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    /// 创建预约；未知活动由外键约束拒绝
    async fn create(&self, user_id: i64, event_id: i64, tickets: i32) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reservations (user_id, event_id, tickets)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .bind(tickets)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::from_store_write)?;

        Ok(id)
    }

    /// 列出用户自己的预约
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT id, user_id, event_id, tickets, created_at
            FROM reservations
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(reservations)
    }

    async fn count_for_event(&self, event_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}
