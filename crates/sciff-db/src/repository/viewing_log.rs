//! SurrealDB implementation of [`ViewingLogRepository`].

use chrono::{DateTime, Utc};
use sciff_core::error::SciffResult;
use sciff_core::models::viewing_log::{CreateViewingLog, UpdateViewingLog, ViewingLog};
use sciff_core::repository::ViewingLogRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ViewingLogRow {
    school_id: String,
    film_id: String,
    account_id: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    watched_seconds: u64,
    ip_address: Option<String>,
    device_info: Option<String>,
    watermark_id: String,
}

impl ViewingLogRow {
    fn into_viewing_log(self, id: Uuid) -> Result<ViewingLog, DbError> {
        Ok(ViewingLog {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            film_id: parse_uuid(&self.film_id, "film")?,
            account_id: parse_uuid(&self.account_id, "account")?,
            started_at: self.started_at,
            ended_at: self.ended_at,
            watched_seconds: self.watched_seconds,
            ip_address: self.ip_address,
            device_info: self.device_info,
            watermark_id: self.watermark_id,
        })
    }
}

/// SurrealDB implementation of the viewing log repository.
#[derive(Clone)]
pub struct SurrealViewingLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealViewingLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ViewingLogRepository for SurrealViewingLogRepository<C> {
    async fn create(&self, input: CreateViewingLog) -> SciffResult<ViewingLog> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('viewing_log', $id) SET \
                 school_id = $school_id, \
                 film_id = $film_id, \
                 account_id = $account_id, \
                 ended_at = NONE, \
                 watched_seconds = 0, \
                 ip_address = $ip_address, \
                 device_info = $device_info, \
                 watermark_id = $watermark_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("film_id", input.film_id.to_string()))
            .bind(("account_id", input.account_id.to_string()))
            .bind(("ip_address", input.ip_address))
            .bind(("device_info", input.device_info))
            .bind(("watermark_id", input.watermark_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ViewingLogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "viewing_log".into(),
            id: id_str,
        })?;

        Ok(row.into_viewing_log(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<ViewingLog> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('viewing_log', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ViewingLogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "viewing_log".into(),
            id: id_str,
        })?;

        Ok(row.into_viewing_log(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateViewingLog) -> SciffResult<ViewingLog> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.watched_seconds.is_some() {
            sets.push("watched_seconds = $watched_seconds");
        }
        if input.ended_at.is_some() {
            sets.push("ended_at = $ended_at");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('viewing_log', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(watched_seconds) = input.watched_seconds {
            builder = builder.bind(("watched_seconds", watched_seconds));
        }
        if let Some(ended_at) = input.ended_at {
            builder = builder.bind(("ended_at", ended_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<ViewingLogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "viewing_log".into(),
            id: id_str,
        })?;

        Ok(row.into_viewing_log(id)?)
    }
}
