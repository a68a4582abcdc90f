//! Integration tests for the Account and LoginActivity repositories.

use chrono::Utc;
use sciff_core::error::SciffError;
use sciff_core::models::account::{AccountKind, CreateAccount, UpdateAccount};
use sciff_core::models::login_activity::CreateLoginActivity;
use sciff_core::repository::{AccountRepository, LoginActivityRepository};
use sciff_db::repository::{SurrealAccountRepository, SurrealLoginActivityRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    sciff_db::run_migrations(&db).await.unwrap();
    db
}

fn login(account_id: Uuid, token: &str) -> CreateLoginActivity {
    CreateLoginActivity {
        account_id,
        school_id: None,
        session_token: token.into(),
        ip_address: Some("10.0.0.1".into()),
        user_agent: Some("TestAgent".into()),
        country: Some("IN".into()),
        city: Some("Pune".into()),
    }
}

// ---------------------------------------------------------------------------
// Account tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_account() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);
    let school_id = Uuid::new_v4();

    let account = repo
        .create(CreateAccount {
            username: "school-a".into(),
            kind: AccountKind::Standard,
            school_id: Some(school_id),
        })
        .await
        .unwrap();

    assert_eq!(account.username, "school-a");
    assert_eq!(account.kind, AccountKind::Standard);
    assert_eq!(account.school_id, Some(school_id));
    assert!(account.session_token.is_none());
    assert!(account.is_active);

    let fetched = repo.get_by_id(account.id).await.unwrap();
    assert_eq!(fetched.id, account.id);
    assert_eq!(fetched.school_id, Some(school_id));
}

#[tokio::test]
async fn standard_account_requires_school() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let err = repo
        .create(CreateAccount {
            username: "orphan".into(),
            kind: AccountKind::Standard,
            school_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SciffError::Validation { .. }));
}

#[tokio::test]
async fn missing_account_is_not_found() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, SciffError::NotFound { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn update_sets_and_clears_session_token() {
    let db = setup().await;
    let repo = SurrealAccountRepository::new(db);

    let account = repo
        .create(CreateAccount {
            username: "admin".into(),
            kind: AccountKind::Privileged,
            school_id: None,
        })
        .await
        .unwrap();

    let now = Utc::now();
    let updated = repo
        .update(
            account.id,
            UpdateAccount {
                session_token: Some(Some("1700000000000-abc".into())),
                last_activity_at: Some(now),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.session_token.as_deref(), Some("1700000000000-abc"));
    assert!(updated.last_activity_at.is_some());

    let cleared = repo
        .update(
            account.id,
            UpdateAccount {
                session_token: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.session_token.is_none());
    // Untouched fields survive.
    assert!(cleared.last_activity_at.is_some());
}

// ---------------------------------------------------------------------------
// Login activity tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_login_activity_is_open() {
    let db = setup().await;
    let repo = SurrealLoginActivityRepository::new(db);
    let account_id = Uuid::new_v4();

    let record = repo.create(login(account_id, "t1")).await.unwrap();
    assert!(record.is_open());
    assert_eq!(record.account_id, account_id);
    assert_eq!(record.country.as_deref(), Some("IN"));

    let fetched = repo.get_by_id(record.id).await.unwrap();
    assert_eq!(fetched.session_token, "t1");
}

#[tokio::test]
async fn close_open_only_touches_matching_token() {
    let db = setup().await;
    let repo = SurrealLoginActivityRepository::new(db);
    let account_id = Uuid::new_v4();

    let r1 = repo.create(login(account_id, "t1")).await.unwrap();
    let r2 = repo.create(login(account_id, "t2")).await.unwrap();

    let closed = repo.close_open(account_id, "t1", Utc::now()).await.unwrap();
    assert_eq!(closed, 1);

    assert!(!repo.get_by_id(r1.id).await.unwrap().is_open());
    assert!(repo.get_by_id(r2.id).await.unwrap().is_open());

    let open = repo.list_open_for_account(account_id).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, r2.id);
}

#[tokio::test]
async fn close_open_twice_is_a_no_op() {
    let db = setup().await;
    let repo = SurrealLoginActivityRepository::new(db);
    let account_id = Uuid::new_v4();

    let record = repo.create(login(account_id, "t1")).await.unwrap();
    assert_eq!(repo.close_open(account_id, "t1", Utc::now()).await.unwrap(), 1);
    let first_close = repo.get_by_id(record.id).await.unwrap().logged_out_at;

    assert_eq!(repo.close_open(account_id, "t1", Utc::now()).await.unwrap(), 0);
    let second_close = repo.get_by_id(record.id).await.unwrap().logged_out_at;
    assert_eq!(first_close, second_close);
}

#[tokio::test]
async fn list_open_is_scoped_to_account() {
    let db = setup().await;
    let repo = SurrealLoginActivityRepository::new(db);
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    repo.create(login(a, "ta")).await.unwrap();
    repo.create(login(b, "tb")).await.unwrap();

    let open_a = repo.list_open_for_account(a).await.unwrap();
    assert_eq!(open_a.len(), 1);
    assert_eq!(open_a[0].session_token, "ta");
}
