//! Environment overlay for the access configuration. Store settings
//! are read by `DbConfig::from_env`.

use std::env;
use std::str::FromStr;

use sciff_access::{AccessConfig, AccessError, RegionFallback};

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: FromStr>(key: &str) -> Result<Option<T>, AccessError> {
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| AccessError::InvalidConfig(format!("{key}: cannot parse '{raw}'")))
        })
        .transpose()
}

pub fn access_config() -> Result<AccessConfig, AccessError> {
    let mut config = AccessConfig::default();
    if let Some(countries) = var("SCIFF_ALLOWED_COUNTRIES") {
        config.allowed_countries = countries
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .collect();
    }
    if let Some(raw) = var("SCIFF_REGION_FALLBACK") {
        config.region_fallback = RegionFallback::from_str(&raw)?;
    }
    if let Some(secs) = parse::<u64>("SCIFF_STORE_TIMEOUT_SECS")? {
        config.store_timeout_secs = secs;
    }
    if let Some(hours) = parse::<u64>("SCIFF_PRIVILEGED_LIFETIME_HOURS")? {
        config.privileged_lifetime_secs = hours_to_secs(hours)?;
    }
    config.validate()?;
    Ok(config)
}

fn hours_to_secs(hours: u64) -> Result<u64, AccessError> {
    hours.checked_mul(3600).ok_or_else(|| {
        AccessError::InvalidConfig(format!(
            "SCIFF_PRIVILEGED_LIFETIME_HOURS: {hours} hours is out of range"
        ))
    })
}
