//! SurrealDB implementation of [`AccountRepository`].

use chrono::{DateTime, Utc};
use sciff_core::error::{SciffError, SciffResult};
use sciff_core::models::account::{Account, AccountKind, CreateAccount, UpdateAccount};
use sciff_core::repository::AccountRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_opt_uuid;
use crate::error::DbError;

/// DB-side row struct; the record id is supplied by the caller.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    username: String,
    kind: String,
    school_id: Option<String>,
    session_token: Option<String>,
    last_activity_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<AccountKind, DbError> {
    match s {
        "Standard" => Ok(AccountKind::Standard),
        "Privileged" => Ok(AccountKind::Privileged),
        other => Err(DbError::Decode(format!("unknown account kind: {other}"))),
    }
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            username: self.username,
            kind: parse_kind(&self.kind)?,
            school_id: parse_opt_uuid(self.school_id.as_deref(), "school")?,
            session_token: self.session_token,
            last_activity_at: self.last_activity_at,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> SciffResult<Account> {
        if input.kind == AccountKind::Standard && input.school_id.is_none() {
            return Err(SciffError::Validation {
                message: "standard accounts must belong to a school".into(),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 username = $username, \
                 kind = $kind, \
                 school_id = $school_id, \
                 session_token = NONE, \
                 last_activity_at = NONE, \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("school_id", input.school_id.map(|s| s.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> SciffResult<Account> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        if input.session_token.is_some() {
            sets.push("session_token = $session_token");
        }
        if input.last_activity_at.is_some() {
            sets.push("last_activity_at = $last_activity_at");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('account', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }
        if let Some(session_token) = input.session_token {
            builder = builder.bind(("session_token", session_token));
        }
        if let Some(last_activity_at) = input.last_activity_at {
            builder = builder.bind(("last_activity_at", last_activity_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }
}
