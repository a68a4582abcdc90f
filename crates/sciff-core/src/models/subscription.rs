//! School subscription (entitlement grant) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A school's time-bounded, revocable access to one content category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub school_id: Uuid,
    pub category_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    /// Manual revocation switch, independent of the date window.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether this grant permits access at `at`.
    ///
    /// Both window bounds are inclusive.
    pub fn is_in_force(&self, at: DateTime<Utc>) -> bool {
        self.active && self.start_date <= at && at <= self.expiry_date
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub school_id: Uuid,
    pub category_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSubscription {
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}
