//! Access-control configuration.

use std::time::Duration;

use crate::error::AccessError;
use crate::region::RegionFallback;

/// Configuration shared by the session registry, entitlement and
/// playback services.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// ISO country codes from which logins are admitted (default: `["IN"]`).
    pub allowed_countries: Vec<String>,
    /// Admission decision when the caller cannot be geolocated
    /// (default: allow).
    pub region_fallback: RegionFallback,
    /// Upper bound on any single store call in seconds (default: 5).
    pub store_timeout_secs: u64,
    /// Privileged session lifetime since last activity in seconds
    /// (default: 86_400 = 24 hours).
    pub privileged_lifetime_secs: u64,
    /// Geolocation endpoint returning `country_code`, `city` and `ip`.
    pub geolocation_url: String,
    /// Geolocation request timeout in seconds (default: 3).
    pub geolocation_timeout_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_countries: vec!["IN".into()],
            region_fallback: RegionFallback::Allow,
            store_timeout_secs: 5,
            privileged_lifetime_secs: 86_400,
            geolocation_url: "https://ipapi.co/json/".into(),
            geolocation_timeout_secs: 3,
        }
    }
}

impl AccessConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Privileged session lifetime. Values beyond what a
    /// `chrono::Duration` can hold saturate to the maximum.
    pub fn privileged_lifetime(&self) -> chrono::Duration {
        lifetime_from_secs(self.privileged_lifetime_secs).unwrap_or(chrono::TimeDelta::MAX)
    }

    /// Reject settings that cannot be represented.
    pub fn validate(&self) -> Result<(), AccessError> {
        if lifetime_from_secs(self.privileged_lifetime_secs).is_none() {
            return Err(AccessError::InvalidConfig(format!(
                "privileged lifetime of {} seconds is out of range",
                self.privileged_lifetime_secs
            )));
        }
        Ok(())
    }
}

fn lifetime_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

/// Cadence of the per-client session monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds between validity checks (default: 300 = 5 minutes).
    pub validity_interval_secs: u64,
    /// Seconds between keep-alive heartbeats (default: 120 = 2 minutes).
    pub keep_alive_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            validity_interval_secs: 300,
            keep_alive_interval_secs: 120,
        }
    }
}
