//! Best-effort geolocation of the calling client.
//!
//! A failed lookup never propagates: callers hold a [`GeoLookup`] and
//! read [`GeoLookup::info`], which substitutes [`GeoInfo::fallback`].

use std::time::Duration;

use sciff_core::error::SciffResult;
use serde::Deserialize;
use tracing::warn;

use crate::config::AccessConfig;
use crate::error::AccessError;

const FALLBACK_COUNTRY: &str = "IN";
const FALLBACK_CITY: &str = "Unknown";
const FALLBACK_IP: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub city: String,
    pub ip: String,
}

impl GeoInfo {
    /// Placeholder used whenever the lookup fails.
    pub fn fallback() -> Self {
        Self {
            country: FALLBACK_COUNTRY.into(),
            city: FALLBACK_CITY.into(),
            ip: FALLBACK_IP.into(),
        }
    }
}

/// Outcome of a geolocation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoLookup {
    Resolved(GeoInfo),
    Unavailable,
}

impl GeoLookup {
    /// Run `locator` once, logging and absorbing any failure.
    pub async fn resolve<G: GeoLocator>(locator: &G) -> Self {
        match locator.locate().await {
            Ok(info) => GeoLookup::Resolved(info),
            Err(e) => {
                warn!(error = %e, "Geolocation unavailable, using fallback location");
                GeoLookup::Unavailable
            }
        }
    }

    pub fn info(&self) -> GeoInfo {
        match self {
            GeoLookup::Resolved(info) => info.clone(),
            GeoLookup::Unavailable => GeoInfo::fallback(),
        }
    }
}

/// Capability that locates the caller from its network origin.
pub trait GeoLocator: Send + Sync {
    fn locate(&self) -> impl Future<Output = SciffResult<GeoInfo>> + Send;
}

/// Response body of an ipapi.co style endpoint. Missing fields fall
/// back individually.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    country_code: Option<String>,
    city: Option<String>,
    ip: Option<String>,
}

impl From<IpApiResponse> for GeoInfo {
    fn from(body: IpApiResponse) -> Self {
        Self {
            country: body.country_code.unwrap_or_else(|| FALLBACK_COUNTRY.into()),
            city: body.city.unwrap_or_else(|| FALLBACK_CITY.into()),
            ip: body.ip.unwrap_or_else(|| FALLBACK_IP.into()),
        }
    }
}

/// HTTP geolocation against an ipapi.co compatible endpoint.
#[derive(Clone)]
pub struct IpApiLocator {
    client: reqwest::Client,
    url: String,
}

impl IpApiLocator {
    pub fn new(config: &AccessConfig) -> Result<Self, AccessError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.geolocation_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.geolocation_url.clone(),
        })
    }
}

impl GeoLocator for IpApiLocator {
    async fn locate(&self) -> SciffResult<GeoInfo> {
        let body: IpApiResponse = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(AccessError::from)?
            .json()
            .await
            .map_err(AccessError::from)?;
        Ok(body.into())
    }
}
