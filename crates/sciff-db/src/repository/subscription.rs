//! SurrealDB implementation of [`SubscriptionRepository`].
//!
//! The in-force predicate in [`find_in_force`] must stay in lockstep
//! with [`Subscription::is_in_force`].
//!
//! [`find_in_force`]: SubscriptionRepository::find_in_force

use chrono::{DateTime, Utc};
use sciff_core::error::{SciffError, SciffResult};
use sciff_core::models::subscription::{CreateSubscription, Subscription, UpdateSubscription};
use sciff_core::repository::SubscriptionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SubscriptionRow {
    school_id: String,
    category_id: String,
    start_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct SubscriptionRowWithId {
    record_id: String,
    school_id: String,
    category_id: String,
    start_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    fn into_subscription(self, id: Uuid) -> Result<Subscription, DbError> {
        Ok(Subscription {
            id,
            school_id: parse_uuid(&self.school_id, "school")?,
            category_id: parse_uuid(&self.category_id, "category")?,
            start_date: self.start_date,
            expiry_date: self.expiry_date,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl SubscriptionRowWithId {
    fn try_into_subscription(self) -> Result<Subscription, DbError> {
        Ok(Subscription {
            id: parse_uuid(&self.record_id, "subscription")?,
            school_id: parse_uuid(&self.school_id, "school")?,
            category_id: parse_uuid(&self.category_id, "category")?,
            start_date: self.start_date,
            expiry_date: self.expiry_date,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rows_into_subscriptions(rows: Vec<SubscriptionRowWithId>) -> Result<Vec<Subscription>, DbError> {
    rows.into_iter()
        .map(|row| row.try_into_subscription())
        .collect()
}

/// SurrealDB implementation of the subscription repository.
#[derive(Clone)]
pub struct SurrealSubscriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSubscriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SubscriptionRepository for SurrealSubscriptionRepository<C> {
    async fn create(&self, input: CreateSubscription) -> SciffResult<Subscription> {
        if input.expiry_date < input.start_date {
            return Err(SciffError::Validation {
                message: "subscription expiry precedes its start".into(),
            });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('school_subscription', $id) SET \
                 school_id = $school_id, \
                 category_id = $category_id, \
                 start_date = $start_date, \
                 expiry_date = $expiry_date, \
                 active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("school_id", input.school_id.to_string()))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("start_date", input.start_date))
            .bind(("expiry_date", input.expiry_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SubscriptionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "school_subscription".into(),
            id: id_str,
        })?;

        Ok(row.into_subscription(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<Subscription> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('school_subscription', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriptionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "school_subscription".into(),
            id: id_str,
        })?;

        Ok(row.into_subscription(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateSubscription) -> SciffResult<Subscription> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        if input.expiry_date.is_some() {
            sets.push("expiry_date = $expiry_date");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('school_subscription', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", start_date));
        }
        if let Some(expiry_date) = input.expiry_date {
            builder = builder.bind(("expiry_date", expiry_date));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<SubscriptionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "school_subscription".into(),
            id: id_str,
        })?;

        Ok(row.into_subscription(id)?)
    }

    async fn find_in_force(
        &self,
        school_id: Uuid,
        category_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> SciffResult<Vec<Subscription>> {
        let category_clause = if category_id.is_some() {
            " AND category_id = $category_id"
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM school_subscription \
             WHERE school_id = $school_id \
             AND active = true \
             AND start_date <= $at \
             AND expiry_date >= $at{category_clause} \
             ORDER BY expiry_date ASC"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("school_id", school_id.to_string()))
            .bind(("at", at));
        if let Some(category_id) = category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<SubscriptionRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows_into_subscriptions(rows)?)
    }

    async fn list_expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> SciffResult<Vec<Subscription>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM school_subscription \
                 WHERE active = true \
                 AND expiry_date >= $from \
                 AND expiry_date <= $until \
                 ORDER BY expiry_date ASC",
            )
            .bind(("from", from))
            .bind(("until", until))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriptionRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows_into_subscriptions(rows)?)
    }
}
