//! Film domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Film {
    pub id: Uuid,
    pub title: String,
    pub category_id: Uuid,
    pub external_url: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFilm {
    pub title: String,
    pub category_id: Uuid,
    pub external_url: String,
}
