//! SurrealDB repository implementations.

mod account;
mod film;
mod login_activity;
mod subscription;
mod viewing_log;

pub use account::SurrealAccountRepository;
pub use film::SurrealFilmRepository;
pub use login_activity::SurrealLoginActivityRepository;
pub use subscription::SurrealSubscriptionRepository;
pub use viewing_log::SurrealViewingLogRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID stored as a string column.
fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_opt_uuid(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|s| parse_uuid(s, field)).transpose()
}
