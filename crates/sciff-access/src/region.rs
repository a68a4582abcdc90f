//! Region admission gate applied before a login is accepted.

use std::str::FromStr;

use tracing::info;

use crate::config::AccessConfig;
use crate::error::AccessError;
use crate::geo::GeoLookup;

/// What to do when the caller could not be geolocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFallback {
    Allow,
    Deny,
}

impl FromStr for RegionFallback {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(RegionFallback::Allow),
            "deny" => Ok(RegionFallback::Deny),
            other => Err(AccessError::InvalidConfig(format!(
                "unknown region fallback: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionDecision {
    Admitted,
    /// `country` is `None` when the denial came from the fallback policy.
    Denied { country: Option<String> },
}

impl RegionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RegionDecision::Admitted)
    }
}

#[derive(Debug, Clone)]
pub struct RegionGate {
    allowed: Vec<String>,
    fallback: RegionFallback,
}

impl RegionGate {
    pub fn new(allowed: Vec<String>, fallback: RegionFallback) -> Self {
        let allowed = allowed
            .into_iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self { allowed, fallback }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(config.allowed_countries.clone(), config.region_fallback)
    }

    pub fn admit(&self, lookup: &GeoLookup) -> RegionDecision {
        match lookup {
            GeoLookup::Resolved(geo) => {
                let country = geo.country.to_ascii_uppercase();
                if self.allowed.contains(&country) {
                    RegionDecision::Admitted
                } else {
                    info!(%country, "Login refused: region not allowed");
                    RegionDecision::Denied {
                        country: Some(country),
                    }
                }
            }
            GeoLookup::Unavailable => match self.fallback {
                RegionFallback::Allow => RegionDecision::Admitted,
                RegionFallback::Deny => {
                    info!("Login refused: location unknown and fallback is deny");
                    RegionDecision::Denied { country: None }
                }
            },
        }
    }
}
