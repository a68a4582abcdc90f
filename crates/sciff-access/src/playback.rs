//! Playback authorization, viewing logs and watermark identifiers.

use chrono::{DateTime, Utc};
use sciff_core::error::SciffError;
use sciff_core::models::film::Film;
use sciff_core::models::viewing_log::{CreateViewingLog, UpdateViewingLog};
use sciff_core::repository::{FilmRepository, SubscriptionRepository, ViewingLogRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AccessConfig;
use crate::deadline::within;
use crate::entitlement::EntitlementService;
use crate::registry::{ClientInfo, ClientSession};

const WATERMARK_BRAND: &str = "SCIFF";
const WATERMARK_SCHOOL_CHARS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDenied {
    /// Film missing, deactivated, or unreadable.
    FilmUnavailable,
    /// School holds no grant in force for the film's category.
    NotEntitled,
}

#[derive(Debug, Clone)]
pub enum PlaybackDecision {
    Permitted(Film),
    Denied(PlaybackDenied),
}

/// Handle on an opened playback.
#[derive(Debug, Clone)]
pub struct ViewingTicket {
    pub film: Film,
    /// `None` when the viewing log could not be written.
    pub log_id: Option<Uuid>,
    pub watermark_id: String,
}

fn school_tail(school_id: Uuid) -> String {
    let s = school_id.to_string();
    s[s.len() - WATERMARK_SCHOOL_CHARS..].to_string()
}

/// `"{last 8 chars of school id}-{unix millis}"`.
pub fn watermark_id(school_id: Uuid, at: DateTime<Utc>) -> String {
    format!("{}-{}", school_tail(school_id), at.timestamp_millis())
}

/// Overlay text shown on top of the player. Accounts without a school
/// are labelled `ADMIN`.
pub fn watermark_label(school_id: Option<Uuid>, at: DateTime<Utc>) -> String {
    let who = school_id
        .map(school_tail)
        .unwrap_or_else(|| "ADMIN".to_string());
    format!(
        "{WATERMARK_BRAND} | {who} | {}",
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub struct PlaybackService<F, S, V>
where
    F: FilmRepository,
    S: SubscriptionRepository,
    V: ViewingLogRepository,
{
    films: F,
    entitlements: EntitlementService<S>,
    viewing_logs: V,
    config: AccessConfig,
}

impl<F, S, V> PlaybackService<F, S, V>
where
    F: FilmRepository,
    S: SubscriptionRepository,
    V: ViewingLogRepository,
{
    pub fn new(
        films: F,
        entitlements: EntitlementService<S>,
        viewing_logs: V,
        config: AccessConfig,
    ) -> Self {
        Self {
            films,
            entitlements,
            viewing_logs,
            config,
        }
    }

    /// Decide whether `school_id` may play `film_id`. Store faults deny.
    pub async fn authorize_playback(&self, school_id: Uuid, film_id: Uuid) -> PlaybackDecision {
        let film = match within(self.config.store_timeout(), self.films.get_by_id(film_id)).await {
            Ok(film) if film.is_active => film,
            Ok(_) | Err(SciffError::NotFound { .. }) => {
                return PlaybackDecision::Denied(PlaybackDenied::FilmUnavailable);
            }
            Err(e) => {
                warn!(%film_id, error = %e, "Film lookup failed; denying playback");
                return PlaybackDecision::Denied(PlaybackDenied::FilmUnavailable);
            }
        };

        if self.entitlements.has_access(school_id, film.category_id).await {
            PlaybackDecision::Permitted(film)
        } else {
            PlaybackDecision::Denied(PlaybackDenied::NotEntitled)
        }
    }

    /// Authorize and open a viewing log for `session`.
    pub async fn open_viewing(
        &self,
        session: &ClientSession,
        school_id: Uuid,
        film_id: Uuid,
        client: &ClientInfo,
    ) -> Result<ViewingTicket, PlaybackDenied> {
        let film = match self.authorize_playback(school_id, film_id).await {
            PlaybackDecision::Permitted(film) => film,
            PlaybackDecision::Denied(reason) => {
                info!(%school_id, %film_id, ?reason, "Playback denied");
                return Err(reason);
            }
        };

        let watermark = watermark_id(school_id, Utc::now());
        let created = within(
            self.config.store_timeout(),
            self.viewing_logs.create(CreateViewingLog {
                school_id,
                film_id,
                account_id: session.account_id,
                ip_address: Some(client.location.info().ip),
                device_info: client.user_agent.clone(),
                watermark_id: watermark.clone(),
            }),
        )
        .await;

        let log_id = match created {
            Ok(log) => Some(log.id),
            Err(e) => {
                warn!(%film_id, error = %e, "Failed to create viewing log");
                None
            }
        };

        Ok(ViewingTicket {
            film,
            log_id,
            watermark_id: watermark,
        })
    }

    /// Record how far playback got; `ended` also stamps the end time.
    pub async fn record_progress(&self, log_id: Uuid, watched_seconds: f64, ended: bool) {
        let update = UpdateViewingLog {
            watched_seconds: Some(watched_seconds.max(0.0).floor() as u64),
            ended_at: ended.then(Utc::now),
        };

        if let Err(e) = within(
            self.config.store_timeout(),
            self.viewing_logs.update(log_id, update),
        )
        .await
        {
            warn!(%log_id, error = %e, "Failed to update viewing log");
        }
    }
}
