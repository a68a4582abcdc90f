//! Integration tests for the Subscription, Film and ViewingLog
//! repositories.

use chrono::{Duration, Utc};
use sciff_core::error::SciffError;
use sciff_core::models::film::CreateFilm;
use sciff_core::models::subscription::{CreateSubscription, UpdateSubscription};
use sciff_core::models::viewing_log::{CreateViewingLog, UpdateViewingLog};
use sciff_core::repository::{FilmRepository, SubscriptionRepository, ViewingLogRepository};
use sciff_db::repository::{
    SurrealFilmRepository, SurrealSubscriptionRepository, SurrealViewingLogRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sciff_db::run_migrations(&db).await.unwrap();
    db
}

fn grant(school_id: Uuid, category_id: Uuid, start_days: i64, expiry_days: i64) -> CreateSubscription {
    let now = Utc::now();
    CreateSubscription {
        school_id,
        category_id,
        start_date: now + Duration::days(start_days),
        expiry_date: now + Duration::days(expiry_days),
    }
}

// ---------------------------------------------------------------------------
// Subscription tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_in_force_honours_window_and_flag() {
    let db = setup().await;
    let repo = SurrealSubscriptionRepository::new(db);
    let school = Uuid::new_v4();
    let current = Uuid::new_v4();
    let expired = Uuid::new_v4();
    let future = Uuid::new_v4();
    let revoked = Uuid::new_v4();

    repo.create(grant(school, current, -5, 10)).await.unwrap();
    repo.create(grant(school, expired, -30, -1)).await.unwrap();
    repo.create(grant(school, future, 2, 30)).await.unwrap();
    let r = repo.create(grant(school, revoked, -5, 10)).await.unwrap();
    repo.update(
        r.id,
        UpdateSubscription {
            active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let in_force = repo.find_in_force(school, None, Utc::now()).await.unwrap();
    assert_eq!(in_force.len(), 1);
    assert_eq!(in_force[0].category_id, current);
}

#[tokio::test]
async fn find_in_force_filters_by_category_and_school() {
    let db = setup().await;
    let repo = SurrealSubscriptionRepository::new(db);
    let school = Uuid::new_v4();
    let other_school = Uuid::new_v4();
    let cat_a = Uuid::new_v4();
    let cat_b = Uuid::new_v4();

    repo.create(grant(school, cat_a, -1, 10)).await.unwrap();
    repo.create(grant(school, cat_b, -1, 10)).await.unwrap();
    repo.create(grant(other_school, cat_a, -1, 10)).await.unwrap();

    let only_a = repo
        .find_in_force(school, Some(cat_a), Utc::now())
        .await
        .unwrap();
    assert_eq!(only_a.len(), 1);
    assert_eq!(only_a[0].school_id, school);
    assert_eq!(only_a[0].category_id, cat_a);
}

#[tokio::test]
async fn expiry_before_start_is_rejected() {
    let db = setup().await;
    let repo = SurrealSubscriptionRepository::new(db);

    let err = repo
        .create(grant(Uuid::new_v4(), Uuid::new_v4(), 5, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, SciffError::Validation { .. }));
}

#[tokio::test]
async fn list_expiring_between_orders_by_expiry() {
    let db = setup().await;
    let repo = SurrealSubscriptionRepository::new(db);
    let school = Uuid::new_v4();

    let later = repo.create(grant(school, Uuid::new_v4(), -1, 6)).await.unwrap();
    let sooner = repo.create(grant(school, Uuid::new_v4(), -1, 2)).await.unwrap();
    repo.create(grant(school, Uuid::new_v4(), -1, 40)).await.unwrap();

    let now = Utc::now();
    let expiring = repo
        .list_expiring_between(now, now + Duration::days(7))
        .await
        .unwrap();
    let ids: Vec<_> = expiring.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);
}

// ---------------------------------------------------------------------------
// Film & viewing log tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_film() {
    let db = setup().await;
    let repo = SurrealFilmRepository::new(db);
    let category_id = Uuid::new_v4();

    let film = repo
        .create(CreateFilm {
            title: "The Kite".into(),
            category_id,
            external_url: "https://cdn.example.com/kite.mp4".into(),
        })
        .await
        .unwrap();
    assert!(film.is_active);

    let fetched = repo.get_by_id(film.id).await.unwrap();
    assert_eq!(fetched.category_id, category_id);
    assert_eq!(fetched.title, "The Kite");
}

#[tokio::test]
async fn viewing_log_progress_and_end() {
    let db = setup().await;
    let repo = SurrealViewingLogRepository::new(db);

    let log = repo
        .create(CreateViewingLog {
            school_id: Uuid::new_v4(),
            film_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            ip_address: None,
            device_info: Some("TestAgent".into()),
            watermark_id: "3c4d5e6f-1700000000000".into(),
        })
        .await
        .unwrap();
    assert_eq!(log.watched_seconds, 0);
    assert!(log.ended_at.is_none());

    let progressed = repo
        .update(
            log.id,
            UpdateViewingLog {
                watched_seconds: Some(95),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(progressed.watched_seconds, 95);
    assert!(progressed.ended_at.is_none());

    let ended = repo
        .update(
            log.id,
            UpdateViewingLog {
                watched_seconds: Some(600),
                ended_at: Some(Utc::now()),
            },
        )
        .await
        .unwrap();
    assert_eq!(ended.watched_seconds, 600);
    assert!(ended.ended_at.is_some());
}
