//! Postgres 仓库层测试
//!
//! 需要数据库：设置 TEST_DATABASE_URL 后运行 `cargo test -- --ignored`

use eventhub::{
    error::AppError,
    models::{event::parse_date_time, EventInput, NewUser, Role},
    repository::{
        EventRepository, HealthCheckRepository, PgEventRepository, PgReservationRepository,
        PgUserRepository, ReservationRepository, UserRepository,
    },
};
use serial_test::serial;

mod common;
use common::{create_test_config, setup_test_db};

fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=256,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        role,
    }
}

fn input(title: &str, when: &str) -> EventInput {
    EventInput {
        title: title.to_string(),
        description: "desc".to_string(),
        date_time: parse_date_time(when).unwrap(),
        capacity: 20,
        image_url: None,
    }
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_user_repository_create_and_find() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserRepository::new(pool.clone());

    let user = users.create(new_user("o@x.com", Role::Organizer)).await.unwrap();
    assert_eq!(user.role, Role::Organizer);

    let found = users.find_by_email("o@x.com").await.unwrap().expect("User not found");
    assert_eq!(found.id, user.id);
    assert_eq!(found.role, Role::Organizer);

    let by_id = users.find_by_id(user.id).await.unwrap().expect("User not found");
    assert_eq!(by_id.email, "o@x.com");

    assert!(users.find_by_email("ghost@x.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_user_repository_duplicate_email() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserRepository::new(pool.clone());

    users.create(new_user("o@x.com", Role::Organizer)).await.unwrap();
    let err = users
        .create(new_user("o@x.com", Role::Participant))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Constraint(_)));
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_event_repository_crud() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserRepository::new(pool.clone());
    let events = PgEventRepository::new(pool.clone());

    let owner = users.create(new_user("o@x.com", Role::Organizer)).await.unwrap();

    let late = events.create(owner.id, &input("late", "2025-12-01T10:00")).await.unwrap();
    let early = events.create(owner.id, &input("early", "2025-01-01T10:00")).await.unwrap();

    let listed: Vec<i64> = events.list().await.unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(listed, vec![early, late]);

    assert_eq!(events.find_organizer_id(late).await.unwrap(), Some(owner.id));
    assert_eq!(events.find_organizer_id(999_999).await.unwrap(), None);

    let updated = events
        .update(late, &input("later", "2026-01-01T10:00"))
        .await
        .unwrap()
        .expect("event exists");
    assert_eq!(updated.title, "later");
    assert_eq!(updated.organizer_id, owner.id);

    assert!(events.update(999_999, &input("x", "2026-01-01T10:00")).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_event_delete_cascades_reservations() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserRepository::new(pool.clone());
    let events = PgEventRepository::new(pool.clone());
    let reservations = PgReservationRepository::new(pool.clone());

    let owner = users.create(new_user("o@x.com", Role::Organizer)).await.unwrap();
    let guest = users.create(new_user("p@x.com", Role::Participant)).await.unwrap();

    let doomed = events.create(owner.id, &input("a", "2025-06-01T09:00")).await.unwrap();
    let kept = events.create(owner.id, &input("b", "2025-06-02T09:00")).await.unwrap();

    for _ in 0..3 {
        reservations.create(guest.id, doomed, 1).await.unwrap();
    }
    reservations.create(guest.id, kept, 2).await.unwrap();

    assert_eq!(events.delete_with_reservations(doomed).await.unwrap(), 3);
    assert_eq!(reservations.count_for_event(doomed).await.unwrap(), 0);
    assert_eq!(reservations.count_for_event(kept).await.unwrap(), 1);
    assert!(events.find_by_id(doomed).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_reservation_repository_filters_by_user() {
    let pool = setup_test_db(&create_test_config()).await;
    let users = PgUserRepository::new(pool.clone());
    let events = PgEventRepository::new(pool.clone());
    let reservations = PgReservationRepository::new(pool.clone());

    let owner = users.create(new_user("o@x.com", Role::Organizer)).await.unwrap();
    let alice = users.create(new_user("a@x.com", Role::Participant)).await.unwrap();
    let bob = users.create(new_user("b@x.com", Role::Participant)).await.unwrap();
    let event = events.create(owner.id, &input("a", "2025-06-01T09:00")).await.unwrap();

    reservations.create(alice.id, event, 2).await.unwrap();
    reservations.create(bob.id, event, 5).await.unwrap();

    let mine = reservations.list_by_user(alice.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].tickets, 2);
    assert_eq!(mine[0].user_id, alice.id);

    let err = reservations.create(alice.id, 999_999, 1).await.unwrap_err();
    assert_eq!(err.code(), 400);
}

#[tokio::test]
#[ignore] // 需要数据库
#[serial]
async fn test_health_check_repository() {
    let pool = setup_test_db(&create_test_config()).await;
    let health = eventhub::repository::PgHealthCheckRepository::new(pool);

    assert!(health.check().await.is_ok());
}
