//! Login activity (session record) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One login instance. Open while `logged_out_at` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginActivity {
    pub id: Uuid,
    pub account_id: Uuid,
    pub school_id: Option<Uuid>,
    pub session_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub logged_in_at: DateTime<Utc>,
    pub logged_out_at: Option<DateTime<Utc>>,
}

impl LoginActivity {
    pub fn is_open(&self) -> bool {
        self.logged_out_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoginActivity {
    pub account_id: Uuid,
    pub school_id: Option<Uuid>,
    pub session_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}
