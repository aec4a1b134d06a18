//! 数据库仓库层
//!
//! trait 是访问存储的边界：`Pg*` 通过共享连接池访问 PostgreSQL，
//! [`memory::MemoryStore`] 在进程内保持相同语义，供测试使用

pub mod event_repo;
pub mod memory;
pub mod reservation_repo;
pub mod user_repo;

use crate::{
    error::AppError,
    models::{Event, EventInput, NewUser, Reservation, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub use event_repo::PgEventRepository;
pub use memory::MemoryStore;
pub use reservation_repo::PgReservationRepository;
pub use user_repo::PgUserRepository;

/// 用户凭据存储
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 插入用户，邮箱重复为约束错误
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;
    /// 活动的所有者，活动不存在时为 `None`
    async fn find_organizer_id(&self, id: i64) -> Result<Option<i64>, AppError>;
    /// 插入属于 `organizer_id` 的活动，返回新 ID
    async fn create(&self, organizer_id: i64, input: &EventInput) -> Result<i64, AppError>;
    /// 覆盖可修改字段，活动已不存在时为 `None`
    async fn update(&self, id: i64, input: &EventInput) -> Result<Option<Event>, AppError>;
    /// 原子地删除活动的全部预订和活动本身，返回删除的预订数
    async fn delete_with_reservations(&self, id: i64) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// 为 `user_id` 插入预订，返回新 ID
    async fn create(&self, user_id: i64, event_id: i64, tickets: i32) -> Result<i64, AppError>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError>;
    async fn count_for_event(&self, event_id: i64) -> Result<i64, AppError>;
}

#[async_trait]
pub trait HealthCheckRepository: Send + Sync {
    async fn check(&self) -> Result<(), AppError>;
}

/// PostgreSQL 健康探测
pub struct PgHealthCheckRepository {
    db: PgPool,
}

impl PgHealthCheckRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HealthCheckRepository for PgHealthCheckRepository {
    async fn check(&self) -> Result<(), AppError> {
        crate::db::ping(&self.db).await?;
        Ok(())
    }
}

/// 应用所需的全部存储句柄
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub health: Arc<dyn HealthCheckRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.clone())),
            events: Arc::new(PgEventRepository::new(db.clone())),
            reservations: Arc::new(PgReservationRepository::new(db.clone())),
            health: Arc::new(PgHealthCheckRepository::new(db)),
        }
    }

    pub fn in_memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            events: store.clone(),
            reservations: store.clone(),
            health: store,
        }
    }
}
