//! Viewing log domain model.
//!
//! One record per playback, carrying the watermark identifier that was
//! overlaid on the stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewingLog {
    pub id: Uuid,
    pub school_id: Uuid,
    pub film_id: Uuid,
    pub account_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub watched_seconds: u64,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub watermark_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViewingLog {
    pub school_id: Uuid,
    pub film_id: Uuid,
    pub account_id: Uuid,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub watermark_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateViewingLog {
    pub watched_seconds: Option<u64>,
    pub ended_at: Option<DateTime<Utc>>,
}
