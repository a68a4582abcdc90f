//! Account domain model.
//!
//! An account is a single login identity. Standard accounts belong to a
//! school and are limited to one device at a time; privileged accounts
//! administer the platform and are exempt from device exclusivity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Privilege level of an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// School login, subject to single-device exclusivity.
    Standard,
    /// Administrative login, subject only to a time-based expiry.
    Privileged,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Standard => "Standard",
            AccountKind::Privileged => "Privileged",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub kind: AccountKind,
    /// Owning school. `None` for privileged accounts.
    pub school_id: Option<Uuid>,
    /// Token of the currently authorized device session.
    pub session_token: Option<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub username: String,
    pub kind: AccountKind,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccount {
    pub username: Option<String>,
    pub is_active: Option<bool>,
    /// `Some(Some(token))` = set, `Some(None)` = clear, `None` = no change.
    pub session_token: Option<Option<String>>,
    pub last_activity_at: Option<DateTime<Utc>>,
}
