//! Entitlement checks: which content categories a school may use.
//!
//! Entitlement guards licensed content, so every store fault resolves
//! to denial. Nothing is cached: `has_access` and
//! `list_accessible_categories` read the same predicate from the store
//! on every call and therefore cannot disagree.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use sciff_core::error::SciffResult;
use sciff_core::models::subscription::Subscription;
use sciff_core::repository::SubscriptionRepository;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::deadline::within;

pub struct EntitlementService<S: SubscriptionRepository> {
    subscriptions: S,
    config: AccessConfig,
}

impl<S: SubscriptionRepository> EntitlementService<S> {
    pub fn new(subscriptions: S, config: AccessConfig) -> Self {
        Self {
            subscriptions,
            config,
        }
    }

    async fn in_force(
        &self,
        school_id: Uuid,
        category_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> SciffResult<Vec<Subscription>> {
        let grants = within(
            self.config.store_timeout(),
            self.subscriptions.find_in_force(school_id, category_id, now),
        )
        .await?;
        Ok(grants.into_iter().filter(|g| g.is_in_force(now)).collect())
    }

    /// Whether `school_id` currently holds a grant for `category_id`.
    pub async fn has_access(&self, school_id: Uuid, category_id: Uuid) -> bool {
        match self.in_force(school_id, Some(category_id), Utc::now()).await {
            Ok(grants) => {
                let granted = !grants.is_empty();
                debug!(%school_id, %category_id, granted, "Entitlement checked");
                granted
            }
            Err(e) => {
                warn!(%school_id, %category_id, error = %e, "Entitlement check failed; denying");
                false
            }
        }
    }

    /// Categories `school_id` may currently browse.
    pub async fn list_accessible_categories(&self, school_id: Uuid) -> BTreeSet<Uuid> {
        match self.in_force(school_id, None, Utc::now()).await {
            Ok(grants) => grants.into_iter().map(|g| g.category_id).collect(),
            Err(e) => {
                warn!(%school_id, error = %e, "Category listing failed; denying all");
                BTreeSet::new()
            }
        }
    }

    /// Active grants that are still valid but expire within
    /// `window_days` from now, soonest first.
    pub async fn list_expiring_soon(&self, window_days: u32) -> SciffResult<Vec<Subscription>> {
        let now = Utc::now();
        let until = now + Duration::days(i64::from(window_days));
        within(
            self.config.store_timeout(),
            self.subscriptions.list_expiring_between(now, until),
        )
        .await
    }
}
