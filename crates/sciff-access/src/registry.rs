//! Session registry: device exclusivity bookkeeping for logins,
//! periodic validity checks, heartbeats, and logout.
//!
//! Session bookkeeping is secondary to authentication: nothing in here
//! fails a login or surfaces a store fault to the caller. Validity
//! checks fail open; only a definitive answer read from the store
//! evicts a client.

use chrono::Utc;
use sciff_core::error::SciffResult;
use sciff_core::models::account::{Account, UpdateAccount};
use sciff_core::models::login_activity::CreateLoginActivity;
use sciff_core::repository::{AccountRepository, LoginActivityRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::deadline::within;
use crate::geo::GeoLookup;
use crate::policy::{SessionPolicy, SessionVerdict};
use crate::token::SessionToken;

/// The session a single client instance holds. Returned by
/// [`SessionRegistry::establish_session`] and passed back explicitly on
/// every later call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSession {
    pub account_id: Uuid,
    pub token: SessionToken,
}

/// Descriptors of the client performing a login.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub location: GeoLookup,
}

/// Session registry.
///
/// Generic over repository implementations so that the access layer
/// has no dependency on the database crate.
pub struct SessionRegistry<A: AccountRepository, L: LoginActivityRepository> {
    accounts: A,
    activity: L,
    config: AccessConfig,
}

impl<A: AccountRepository, L: LoginActivityRepository> SessionRegistry<A, L> {
    pub fn new(accounts: A, activity: L, config: AccessConfig) -> Self {
        Self {
            accounts,
            activity,
            config,
        }
    }

    /// Record a login for an account whose credentials were already
    /// verified, superseding its previous device session when the
    /// account kind requires exclusivity.
    ///
    /// Always returns the new session; bookkeeping failures are logged.
    pub async fn establish_session(&self, account_id: Uuid, client: &ClientInfo) -> ClientSession {
        let session = ClientSession {
            account_id,
            token: SessionToken::generate(),
        };

        let account = match within(self.config.store_timeout(), self.accounts.get_by_id(account_id)).await {
            Ok(account) => account,
            Err(e) => {
                warn!(%account_id, error = %e, "Could not load account; session bookkeeping skipped");
                return session;
            }
        };

        if let Err(e) = self.claim_device(&account, &session.token).await {
            warn!(%account_id, error = %e, "Session token update failed");
        }
        if let Err(e) = self.log_login(&account, &session.token, client).await {
            warn!(%account_id, error = %e, "Login activity logging failed");
        }

        info!(%account_id, kind = account.kind.as_str(), "Session established");
        session
    }

    async fn claim_device(&self, account: &Account, token: &SessionToken) -> SciffResult<()> {
        let policy = SessionPolicy::for_kind(account.kind, &self.config);
        let now = Utc::now();

        if policy.supersedes_prior_sessions() {
            if let Some(previous) = account
                .session_token
                .as_deref()
                .filter(|prev| *prev != token.as_str())
            {
                // The new token is stored even if the old record stays open.
                match within(
                    self.config.store_timeout(),
                    self.activity.close_open(account.id, previous, now),
                )
                .await
                {
                    Ok(closed) => {
                        info!(account_id = %account.id, closed, "Superseded previous device session");
                    }
                    Err(e) => {
                        warn!(account_id = %account.id, error = %e, "Could not close superseded session record");
                    }
                }
            }
        }

        within(
            self.config.store_timeout(),
            self.accounts.update(
                account.id,
                UpdateAccount {
                    session_token: Some(Some(token.to_string())),
                    last_activity_at: Some(now),
                    ..Default::default()
                },
            ),
        )
        .await?;

        Ok(())
    }

    async fn log_login(
        &self,
        account: &Account,
        token: &SessionToken,
        client: &ClientInfo,
    ) -> SciffResult<()> {
        let geo = client.location.info();
        within(
            self.config.store_timeout(),
            self.activity.create(CreateLoginActivity {
                account_id: account.id,
                school_id: account.school_id,
                session_token: token.to_string(),
                ip_address: Some(geo.ip),
                user_agent: client.user_agent.clone(),
                country: Some(geo.country),
                city: Some(geo.city),
            }),
        )
        .await?;
        Ok(())
    }

    /// Whether `session` is still the authorized session of its account.
    ///
    /// On `false` the session's login record has already been closed
    /// and the caller should drop its local login state. Transient
    /// store failures answer `true`.
    pub async fn is_session_still_valid(&self, session: &ClientSession) -> bool {
        let account_id = session.account_id;
        let account = match within(self.config.store_timeout(), self.accounts.get_by_id(account_id)).await {
            Ok(account) => account,
            Err(e) if e.is_transient() => {
                warn!(%account_id, error = %e, "Session check inconclusive; keeping session");
                return true;
            }
            Err(e) => {
                info!(%account_id, error = %e, "Session account unavailable; logging out");
                self.terminate_session(session).await;
                return false;
            }
        };

        let verdict = SessionPolicy::for_kind(account.kind, &self.config).verdict(
            &account,
            &session.token,
            Utc::now(),
        );

        match verdict {
            SessionVerdict::Valid => {
                debug!(%account_id, "Session valid");
                true
            }
            SessionVerdict::Evicted => {
                info!(%account_id, "Session token superseded by another device");
                self.terminate_session(session).await;
                false
            }
            SessionVerdict::Expired => {
                info!(%account_id, "Privileged session lifetime exceeded");
                self.terminate_session(session).await;
                false
            }
        }
    }

    /// Heartbeat: stamp the account's last activity.
    pub async fn refresh_activity(&self, account_id: Uuid) {
        let result = within(
            self.config.store_timeout(),
            self.accounts.update(
                account_id,
                UpdateAccount {
                    last_activity_at: Some(Utc::now()),
                    ..Default::default()
                },
            ),
        )
        .await;

        if let Err(e) = result {
            warn!(%account_id, error = %e, "Activity refresh failed");
        }
    }

    /// Close the login record of `session`. Idempotent; the account's
    /// stored token is left for the next login to overwrite.
    pub async fn terminate_session(&self, session: &ClientSession) {
        let account_id = session.account_id;
        let result = within(
            self.config.store_timeout(),
            self.activity
                .close_open(account_id, session.token.as_str(), Utc::now()),
        )
        .await;

        match result {
            Ok(closed) => debug!(%account_id, closed, "Session terminated"),
            Err(e) => warn!(%account_id, error = %e, "Failed to close login record"),
        }
    }
}
