//! Event repository (数据库访问层)

use super::EventRepository;
use crate::{
    error::AppError,
    models::{Event, EventInput},
};
use async_trait::async_trait;
use sqlx::PgPool;

const EVENT_COLUMNS: &str = "id, title, description, date_time, capacity, organizer_id, image_url";

pub struct PgEventRepository {
    db: PgPool,
}

impl PgEventRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    /// 列出所有活动
    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY date_time, id",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(events)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(event)
    }

    async fn find_organizer_id(&self, id: i64) -> Result<Option<i64>, AppError> {
        let owner = sqlx::query_scalar::<_, i64>("SELECT organizer_id FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(owner)
    }

    /// 创建活动
    async fn create(&self, organizer_id: i64, input: &EventInput) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO events (title, description, date_time, capacity, organizer_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.date_time)
        .bind(input.capacity)
        .bind(organizer_id)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(AppError::from_store_write)?;

        Ok(id)
    }

    /// 更新活动
    async fn update(&self, id: i64, input: &EventInput) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET
                title = $2,
                description = $3,
                date_time = $4,
                capacity = $5,
                image_url = $6
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.date_time)
        .bind(input.capacity)
        .bind(&input.image_url)
        .fetch_optional(&self.db)
        .await
        .map_err(AppError::from_store_write)?;

        Ok(event)
    }

    /// 删除活动及其预约（同一事务）
    async fn delete_with_reservations(&self, id: i64) -> Result<u64, AppError> {
        let mut tx = self.db.begin().await?;

        let removed = sqlx::query("DELETE FROM reservations WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(event_id = id, reservations_removed = removed, "Event deleted");
        Ok(removed)
    }
}
