//! Per-client session monitor.
//!
//! Drives the periodic validity check and keep-alive heartbeat for one
//! [`ClientSession`] until the session is evicted or the handle shuts
//! the monitor down. Calls already in flight at shutdown are allowed to
//! finish.

use std::sync::Arc;
use std::time::Duration;

use sciff_core::repository::{AccountRepository, LoginActivityRepository};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::registry::{ClientSession, SessionRegistry};

pub struct SessionMonitor;

impl SessionMonitor {
    pub fn spawn<A, L>(
        registry: Arc<SessionRegistry<A, L>>,
        session: ClientSession,
        config: MonitorConfig,
    ) -> MonitorHandle<A, L>
    where
        A: AccountRepository + 'static,
        L: LoginActivityRepository + 'static,
    {
        let (evicted_tx, evicted_rx) = watch::channel(false);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let validity_period = Duration::from_secs(config.validity_interval_secs);
        let keep_alive_period = Duration::from_secs(config.keep_alive_interval_secs);

        let task_registry = Arc::clone(&registry);
        let task_session = session.clone();
        let task = tokio::spawn(async move {
            let mut validity = interval_at(Instant::now() + validity_period, validity_period);
            let mut keep_alive = interval_at(Instant::now() + keep_alive_period, keep_alive_period);

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!(account_id = %task_session.account_id, "Session monitor stopped");
                            break;
                        }
                    }
                    _ = validity.tick() => {
                        if !task_registry.is_session_still_valid(&task_session).await {
                            info!(account_id = %task_session.account_id, "Session no longer valid");
                            let _ = evicted_tx.send(true);
                            break;
                        }
                    }
                    _ = keep_alive.tick() => {
                        task_registry.refresh_activity(task_session.account_id).await;
                    }
                }
            }
        });

        MonitorHandle {
            registry,
            session,
            evicted: evicted_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

pub struct MonitorHandle<A: AccountRepository, L: LoginActivityRepository> {
    registry: Arc<SessionRegistry<A, L>>,
    session: ClientSession,
    evicted: watch::Receiver<bool>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<A, L> MonitorHandle<A, L>
where
    A: AccountRepository + 'static,
    L: LoginActivityRepository + 'static,
{
    /// Fire an out-of-band heartbeat for a user-interaction event.
    pub fn touch(&self) -> JoinHandle<()> {
        let registry = Arc::clone(&self.registry);
        let account_id = self.session.account_id;
        tokio::spawn(async move { registry.refresh_activity(account_id).await })
    }

    /// Flips to `true` once the session is found invalid.
    pub fn evicted(&self) -> watch::Receiver<bool> {
        self.evicted.clone()
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// Stop scheduling further checks and wait for the monitor task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
