//! Bounded waits on store calls.

use std::time::Duration;

use sciff_core::error::{SciffError, SciffResult};

/// Await `fut` for at most `limit`; expiry becomes [`SciffError::Timeout`],
/// which callers handle like any other transient store failure.
pub(crate) async fn within<T>(
    limit: Duration,
    fut: impl Future<Output = SciffResult<T>>,
) -> SciffResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SciffError::Timeout {
            millis: limit.as_millis() as u64,
        }),
    }
}
