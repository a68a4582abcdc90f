//! SCIFF access service entry point.

mod config;

use sciff_access::{EntitlementService, GeoLookup, IpApiLocator, RegionGate};
use sciff_db::repository::SurrealSubscriptionRepository;
use sciff_db::{DbConfig, DbManager};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EXPIRY_REPORT_DAYS: u32 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sciff=info".parse()?))
        .json()
        .init();

    info!("Starting SCIFF access service...");

    let access_config = config::access_config()?;
    let manager = DbManager::connect(&DbConfig::from_env()).await?;

    let entitlements = EntitlementService::new(
        SurrealSubscriptionRepository::new(manager.client().clone()),
        access_config.clone(),
    );
    let locator = IpApiLocator::new(&access_config)?;
    let gate = RegionGate::from_config(&access_config);

    let host = GeoLookup::resolve(&locator).await;
    info!(
        allowed_countries = ?access_config.allowed_countries,
        region_fallback = ?access_config.region_fallback,
        host_country = %host.info().country,
        host_admitted = gate.admit(&host).is_admitted(),
        "Access services ready"
    );

    match entitlements.list_expiring_soon(EXPIRY_REPORT_DAYS).await {
        Ok(grants) => {
            for grant in &grants {
                info!(
                    school_id = %grant.school_id,
                    category_id = %grant.category_id,
                    expiry_date = %grant.expiry_date,
                    "Subscription expiring soon"
                );
            }
            info!(count = grants.len(), days = EXPIRY_REPORT_DAYS, "Expiry report complete");
        }
        Err(e) => warn!(error = %e, "Expiry report failed"),
    }

    tokio::signal::ctrl_c().await?;
    info!("SCIFF access service stopped.");
    Ok(())
}
