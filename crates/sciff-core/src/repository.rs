//! Repository trait definitions for data access abstraction.
//!
//! These traits are the access core's view of the remote relational
//! store. All operations are async and may fail transiently; a missing
//! record is reported as [`SciffError::NotFound`], which callers treat
//! as a definitive answer rather than a fault.
//!
//! [`SciffError::NotFound`]: crate::error::SciffError::NotFound

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::SciffResult;
use crate::models::{
    account::{Account, CreateAccount, UpdateAccount},
    film::{CreateFilm, Film},
    login_activity::{CreateLoginActivity, LoginActivity},
    subscription::{CreateSubscription, Subscription, UpdateSubscription},
    viewing_log::{CreateViewingLog, UpdateViewingLog, ViewingLog},
};

// ---------------------------------------------------------------------------
// Accounts & login activity
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    fn create(&self, input: CreateAccount) -> impl Future<Output = SciffResult<Account>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SciffResult<Account>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateAccount,
    ) -> impl Future<Output = SciffResult<Account>> + Send;
}

pub trait LoginActivityRepository: Send + Sync {
    fn create(
        &self,
        input: CreateLoginActivity,
    ) -> impl Future<Output = SciffResult<LoginActivity>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SciffResult<LoginActivity>> + Send;
    /// Open records for an account, oldest first.
    fn list_open_for_account(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = SciffResult<Vec<LoginActivity>>> + Send;
    /// Set `logged_out_at` on every open record of `account_id` that
    /// carries `session_token`. Returns how many records were closed;
    /// zero is not an error.
    fn close_open(
        &self,
        account_id: Uuid,
        session_token: &str,
        at: DateTime<Utc>,
    ) -> impl Future<Output = SciffResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Entitlements
// ---------------------------------------------------------------------------

pub trait SubscriptionRepository: Send + Sync {
    fn create(
        &self,
        input: CreateSubscription,
    ) -> impl Future<Output = SciffResult<Subscription>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SciffResult<Subscription>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateSubscription,
    ) -> impl Future<Output = SciffResult<Subscription>> + Send;
    /// Grants of `school_id` that are in force at `at`
    /// (`active AND start_date <= at AND expiry_date >= at`), optionally
    /// restricted to one category.
    fn find_in_force(
        &self,
        school_id: Uuid,
        category_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> impl Future<Output = SciffResult<Vec<Subscription>>> + Send;
    /// Active grants whose expiry falls in `[from, until]`, soonest first.
    fn list_expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> impl Future<Output = SciffResult<Vec<Subscription>>> + Send;
}

// ---------------------------------------------------------------------------
// Catalog & playback
// ---------------------------------------------------------------------------

pub trait FilmRepository: Send + Sync {
    fn create(&self, input: CreateFilm) -> impl Future<Output = SciffResult<Film>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SciffResult<Film>> + Send;
}

pub trait ViewingLogRepository: Send + Sync {
    fn create(
        &self,
        input: CreateViewingLog,
    ) -> impl Future<Output = SciffResult<ViewingLog>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = SciffResult<ViewingLog>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateViewingLog,
    ) -> impl Future<Output = SciffResult<ViewingLog>> + Send;
}
