//! SurrealDB implementation of [`LoginActivityRepository`].

use chrono::{DateTime, Utc};
use sciff_core::error::SciffResult;
use sciff_core::models::login_activity::{CreateLoginActivity, LoginActivity};
use sciff_core::repository::LoginActivityRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LoginActivityRow {
    account_id: String,
    school_id: Option<String>,
    session_token: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    country: Option<String>,
    city: Option<String>,
    logged_in_at: DateTime<Utc>,
    logged_out_at: Option<DateTime<Utc>>,
}

/// Row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct LoginActivityRowWithId {
    record_id: String,
    account_id: String,
    school_id: Option<String>,
    session_token: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    country: Option<String>,
    city: Option<String>,
    logged_in_at: DateTime<Utc>,
    logged_out_at: Option<DateTime<Utc>>,
}

impl LoginActivityRow {
    fn into_login_activity(self, id: Uuid) -> Result<LoginActivity, DbError> {
        Ok(LoginActivity {
            id,
            account_id: parse_uuid(&self.account_id, "account")?,
            school_id: parse_opt_uuid(self.school_id.as_deref(), "school")?,
            session_token: self.session_token,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            country: self.country,
            city: self.city,
            logged_in_at: self.logged_in_at,
            logged_out_at: self.logged_out_at,
        })
    }
}

impl LoginActivityRowWithId {
    fn try_into_login_activity(self) -> Result<LoginActivity, DbError> {
        let id = parse_uuid(&self.record_id, "login_activity")?;
        LoginActivityRow {
            account_id: self.account_id,
            school_id: self.school_id,
            session_token: self.session_token,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            country: self.country,
            city: self.city,
            logged_in_at: self.logged_in_at,
            logged_out_at: self.logged_out_at,
        }
        .into_login_activity(id)
    }
}

/// Projection used to count the records touched by `close_open`.
#[derive(Debug, SurrealValue)]
struct ClosedRow {
    #[allow(dead_code)]
    session_token: String,
}

/// SurrealDB implementation of the login activity repository.
#[derive(Clone)]
pub struct SurrealLoginActivityRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLoginActivityRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LoginActivityRepository for SurrealLoginActivityRepository<C> {
    async fn create(&self, input: CreateLoginActivity) -> SciffResult<LoginActivity> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('login_activity', $id) SET \
                 account_id = $account_id, \
                 school_id = $school_id, \
                 session_token = $session_token, \
                 ip_address = $ip_address, \
                 user_agent = $user_agent, \
                 country = $country, \
                 city = $city, \
                 logged_out_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("account_id", input.account_id.to_string()))
            .bind(("school_id", input.school_id.map(|s| s.to_string())))
            .bind(("session_token", input.session_token))
            .bind(("ip_address", input.ip_address))
            .bind(("user_agent", input.user_agent))
            .bind(("country", input.country))
            .bind(("city", input.city))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<LoginActivityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "login_activity".into(),
            id: id_str,
        })?;

        Ok(row.into_login_activity(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<LoginActivity> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('login_activity', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoginActivityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "login_activity".into(),
            id: id_str,
        })?;

        Ok(row.into_login_activity(id)?)
    }

    async fn list_open_for_account(&self, account_id: Uuid) -> SciffResult<Vec<LoginActivity>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM login_activity \
                 WHERE account_id = $account_id AND logged_out_at = NONE \
                 ORDER BY logged_in_at ASC",
            )
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoginActivityRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_login_activity())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn close_open(
        &self,
        account_id: Uuid,
        session_token: &str,
        at: DateTime<Utc>,
    ) -> SciffResult<u64> {
        let result = self
            .db
            .query(
                "UPDATE login_activity SET logged_out_at = $at \
                 WHERE account_id = $account_id \
                 AND session_token = $session_token \
                 AND logged_out_at = NONE",
            )
            .bind(("account_id", account_id.to_string()))
            .bind(("session_token", session_token.to_string()))
            .bind(("at", at))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ClosedRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
