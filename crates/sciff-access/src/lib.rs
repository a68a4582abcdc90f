//! SCIFF Access — single-device session enforcement, entitlement
//! checks, region admission, and playback authorization on top of the
//! `sciff-core` repository traits.

pub mod config;
mod deadline;
pub mod entitlement;
pub mod error;
pub mod geo;
pub mod monitor;
pub mod playback;
pub mod policy;
pub mod region;
pub mod registry;
pub mod token;

pub use config::{AccessConfig, MonitorConfig};
pub use entitlement::EntitlementService;
pub use error::AccessError;
pub use geo::{GeoInfo, GeoLocator, GeoLookup, IpApiLocator};
pub use monitor::{MonitorHandle, SessionMonitor};
pub use playback::{PlaybackDecision, PlaybackDenied, PlaybackService, ViewingTicket};
pub use policy::{SessionPolicy, SessionVerdict};
pub use region::{RegionDecision, RegionFallback, RegionGate};
pub use registry::{ClientInfo, ClientSession, SessionRegistry};
pub use token::SessionToken;
