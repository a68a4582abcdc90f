//! In-process repository doubles with a switchable outage, for tests
//! that need to observe behaviour while the store is unreachable.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sciff_core::error::{SciffError, SciffResult};
use sciff_core::models::account::{Account, CreateAccount, UpdateAccount};
use sciff_core::models::login_activity::{CreateLoginActivity, LoginActivity};
use sciff_core::models::subscription::{CreateSubscription, Subscription, UpdateSubscription};
use sciff_core::repository::{AccountRepository, LoginActivityRepository, SubscriptionRepository};
use uuid::Uuid;

/// Shared outage switch; every double built from the same `Outage`
/// fails together.
#[derive(Clone, Default)]
pub struct Outage(Arc<AtomicBool>);

impl Outage {
    pub fn begin(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn end(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> SciffResult<()> {
        if self.0.load(Ordering::SeqCst) {
            Err(SciffError::Database("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

fn not_found(entity: &str, id: Uuid) -> SciffError {
    SciffError::NotFound {
        entity: entity.into(),
        id: id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemAccounts {
    rows: Arc<Mutex<HashMap<Uuid, Account>>>,
    outage: Outage,
}

impl MemAccounts {
    pub fn new(outage: Outage) -> Self {
        Self {
            rows: Arc::default(),
            outage,
        }
    }
}

impl AccountRepository for MemAccounts {
    async fn create(&self, input: CreateAccount) -> SciffResult<Account> {
        self.outage.check()?;
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            username: input.username,
            kind: input.kind,
            school_id: input.school_id,
            session_token: None,
            last_activity_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<Account> {
        self.outage.check()?;
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("account", id))
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> SciffResult<Account> {
        self.outage.check()?;
        let mut rows = self.rows.lock().unwrap();
        let account = rows.get_mut(&id).ok_or_else(|| not_found("account", id))?;
        if let Some(username) = input.username {
            account.username = username;
        }
        if let Some(is_active) = input.is_active {
            account.is_active = is_active;
        }
        if let Some(token) = input.session_token {
            account.session_token = token;
        }
        if let Some(at) = input.last_activity_at {
            account.last_activity_at = Some(at);
        }
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}

// ---------------------------------------------------------------------------
// Login activity
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemActivity {
    rows: Arc<Mutex<Vec<LoginActivity>>>,
    outage: Outage,
    close_outage: Outage,
}

impl MemActivity {
    pub fn new(outage: Outage) -> Self {
        Self {
            rows: Arc::default(),
            outage,
            close_outage: Outage::default(),
        }
    }

    /// Make `close_open` alone fail while `close_outage` is active.
    pub fn with_close_outage(mut self, close_outage: Outage) -> Self {
        self.close_outage = close_outage;
        self
    }

    pub fn snapshot(&self) -> Vec<LoginActivity> {
        self.rows.lock().unwrap().clone()
    }
}

impl LoginActivityRepository for MemActivity {
    async fn create(&self, input: CreateLoginActivity) -> SciffResult<LoginActivity> {
        self.outage.check()?;
        let record = LoginActivity {
            id: Uuid::new_v4(),
            account_id: input.account_id,
            school_id: input.school_id,
            session_token: input.session_token,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            country: input.country,
            city: input.city,
            logged_in_at: Utc::now(),
            logged_out_at: None,
        };
        self.rows.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<LoginActivity> {
        self.outage.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found("login_activity", id))
    }

    async fn list_open_for_account(&self, account_id: Uuid) -> SciffResult<Vec<LoginActivity>> {
        self.outage.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.account_id == account_id && r.is_open())
            .cloned()
            .collect())
    }

    async fn close_open(
        &self,
        account_id: Uuid,
        session_token: &str,
        at: DateTime<Utc>,
    ) -> SciffResult<u64> {
        self.outage.check()?;
        self.close_outage.check()?;
        let mut closed = 0;
        for r in self.rows.lock().unwrap().iter_mut() {
            if r.account_id == account_id && r.session_token == session_token && r.is_open() {
                r.logged_out_at = Some(at);
                closed += 1;
            }
        }
        Ok(closed)
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemSubscriptions {
    rows: Arc<Mutex<Vec<Subscription>>>,
    outage: Outage,
}

impl MemSubscriptions {
    pub fn new(outage: Outage) -> Self {
        Self {
            rows: Arc::default(),
            outage,
        }
    }
}

impl SubscriptionRepository for MemSubscriptions {
    async fn create(&self, input: CreateSubscription) -> SciffResult<Subscription> {
        self.outage.check()?;
        let now = Utc::now();
        let grant = Subscription {
            id: Uuid::new_v4(),
            school_id: input.school_id,
            category_id: input.category_id,
            start_date: input.start_date,
            expiry_date: input.expiry_date,
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(grant.clone());
        Ok(grant)
    }

    async fn get_by_id(&self, id: Uuid) -> SciffResult<Subscription> {
        self.outage.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| not_found("school_subscription", id))
    }

    async fn update(&self, id: Uuid, input: UpdateSubscription) -> SciffResult<Subscription> {
        self.outage.check()?;
        let mut rows = self.rows.lock().unwrap();
        let grant = rows
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| not_found("school_subscription", id))?;
        if let Some(start) = input.start_date {
            grant.start_date = start;
        }
        if let Some(expiry) = input.expiry_date {
            grant.expiry_date = expiry;
        }
        if let Some(active) = input.active {
            grant.active = active;
        }
        Ok(grant.clone())
    }

    async fn find_in_force(
        &self,
        school_id: Uuid,
        category_id: Option<Uuid>,
        at: DateTime<Utc>,
    ) -> SciffResult<Vec<Subscription>> {
        self.outage.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.school_id == school_id)
            .filter(|g| category_id.is_none_or(|c| g.category_id == c))
            .filter(|g| g.is_in_force(at))
            .cloned()
            .collect())
    }

    async fn list_expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> SciffResult<Vec<Subscription>> {
        self.outage.check()?;
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.active && g.expiry_date >= from && g.expiry_date <= until)
            .cloned()
            .collect();
        rows.sort_by_key(|g| g.expiry_date);
        Ok(rows)
    }
}
