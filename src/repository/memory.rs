//! 内存存储
//!
//! 在一组互斥锁保护的表上实现全部仓库 trait，约束与 PostgreSQL 表结构一致：
//! 邮箱唯一、活动与预订的外键、活动删除原子执行

use super::{EventRepository, HealthCheckRepository, ReservationRepository, UserRepository};
use crate::{
    error::AppError,
    models::{Event, EventInput, NewUser, Reservation, User},
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    events: BTreeMap<i64, Event>,
    reservations: BTreeMap<i64, Reservation>,
    next_user_id: i64,
    next_event_id: i64,
    next_reservation_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.lock()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Constraint("Resource already exists".to_string()));
        }

        let id = next_id(&mut tables.next_user_id);
        let user = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let mut events: Vec<Event> = self.lock()?.events.values().cloned().collect();
        events.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn find_organizer_id(&self, id: i64) -> Result<Option<i64>, AppError> {
        Ok(self.lock()?.events.get(&id).map(|e| e.organizer_id))
    }

    async fn create(&self, organizer_id: i64, input: &EventInput) -> Result<i64, AppError> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&organizer_id) {
            return Err(AppError::Constraint(
                "Referenced resource does not exist".to_string(),
            ));
        }

        let id = next_id(&mut tables.next_event_id);
        tables.events.insert(
            id,
            Event {
                id,
                title: input.title.clone(),
                description: input.description.clone(),
                date_time: input.date_time,
                capacity: input.capacity,
                organizer_id,
                image_url: input.image_url.clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, input: &EventInput) -> Result<Option<Event>, AppError> {
        let mut tables = self.lock()?;

        Ok(tables.events.get_mut(&id).map(|event| {
            event.title = input.title.clone();
            event.description = input.description.clone();
            event.date_time = input.date_time;
            event.capacity = input.capacity;
            event.image_url = input.image_url.clone();
            event.clone()
        }))
    }

    async fn delete_with_reservations(&self, id: i64) -> Result<u64, AppError> {
        let mut tables = self.lock()?;

        let before = tables.reservations.len();
        tables.reservations.retain(|_, r| r.event_id != id);
        let removed = (before - tables.reservations.len()) as u64;

        tables.events.remove(&id);
        Ok(removed)
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn create(&self, user_id: i64, event_id: i64, tickets: i32) -> Result<i64, AppError> {
        let mut tables = self.lock()?;

        if !tables.users.contains_key(&user_id) || !tables.events.contains_key(&event_id) {
            return Err(AppError::Constraint(
                "Referenced resource does not exist".to_string(),
            ));
        }

        let id = next_id(&mut tables.next_reservation_id);
        tables.reservations.insert(
            id,
            Reservation {
                id,
                user_id,
                event_id,
                tickets,
                created_at: chrono::Utc::now(),
            },
        );
        Ok(id)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Reservation>, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn count_for_event(&self, event_id: i64) -> Result<i64, AppError> {
        let tables = self.lock()?;
        Ok(tables
            .reservations
            .values()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }
}

#[async_trait]
impl HealthCheckRepository for MemoryStore {
    async fn check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}
