//! Per-kind session policies.
//!
//! Standard accounts hold one device at a time: a newer login
//! supersedes the older one, and a client is valid only while its token
//! is the one stored on the account. Privileged accounts may hold any
//! number of sessions and expire only after a period without recorded
//! activity.

use chrono::{DateTime, Duration, Utc};
use sciff_core::models::account::{Account, AccountKind};

use crate::config::AccessConfig;
use crate::token::SessionToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionVerdict {
    Valid,
    /// Another login replaced this client's token.
    Evicted,
    /// Lifetime since last activity elapsed.
    Expired,
}

impl SessionVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionVerdict::Valid)
    }
}

/// Single-device exclusivity by token equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExclusivePolicy;

impl ExclusivePolicy {
    pub fn verdict(&self, stored: Option<&str>, local: &SessionToken) -> SessionVerdict {
        match stored {
            Some(stored) if stored == local.as_str() => SessionVerdict::Valid,
            _ => SessionVerdict::Evicted,
        }
    }
}

/// Time-boxed leniency: any token is accepted until `lifetime` passes
/// without activity.
#[derive(Debug, Clone, Copy)]
pub struct TimeBoxedPolicy {
    pub lifetime: Duration,
}

impl TimeBoxedPolicy {
    pub fn verdict(
        &self,
        last_activity_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> SessionVerdict {
        match last_activity_at {
            Some(last) if now - last > self.lifetime => SessionVerdict::Expired,
            _ => SessionVerdict::Valid,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum SessionPolicy {
    Exclusive(ExclusivePolicy),
    TimeBoxed(TimeBoxedPolicy),
}

impl SessionPolicy {
    pub fn for_kind(kind: AccountKind, config: &AccessConfig) -> Self {
        match kind {
            AccountKind::Standard => SessionPolicy::Exclusive(ExclusivePolicy),
            AccountKind::Privileged => SessionPolicy::TimeBoxed(TimeBoxedPolicy {
                lifetime: config.privileged_lifetime(),
            }),
        }
    }

    /// Whether a new login closes the account's previous session.
    pub fn supersedes_prior_sessions(&self) -> bool {
        matches!(self, SessionPolicy::Exclusive(_))
    }

    pub fn verdict(
        &self,
        account: &Account,
        local: &SessionToken,
        now: DateTime<Utc>,
    ) -> SessionVerdict {
        match self {
            SessionPolicy::Exclusive(p) => p.verdict(account.session_token.as_deref(), local),
            SessionPolicy::TimeBoxed(p) => p.verdict(account.last_activity_at, now),
        }
    }
}
