//! Remote SurrealDB handle for the access core.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

const ENV_URL: &str = "SCIFF_DB_URL";
const ENV_NAMESPACE: &str = "SCIFF_DB_NAMESPACE";
const ENV_DATABASE: &str = "SCIFF_DB_DATABASE";
const ENV_USERNAME: &str = "SCIFF_DB_USERNAME";
const ENV_PASSWORD: &str = "SCIFF_DB_PASSWORD";

/// Where the account, subscription and viewing tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Host and port of the WebSocket endpoint (default `127.0.0.1:8000`).
    pub url: String,
    /// Default `sciff`.
    pub namespace: String,
    /// Default `ott`.
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "sciff".into(),
            database: "ott".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Defaults overlaid with the `SCIFF_DB_*` process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each
    /// `SCIFF_DB_*` key. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            url: get(ENV_URL).unwrap_or(defaults.url),
            namespace: get(ENV_NAMESPACE).unwrap_or(defaults.namespace),
            database: get(ENV_DATABASE).unwrap_or(defaults.database),
            username: get(ENV_USERNAME).unwrap_or(defaults.username),
            password: get(ENV_PASSWORD).unwrap_or(defaults.password),
        }
    }
}

/// Signed-in, schema-current connection.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open the connection, select `sciff`/`ott` (or the configured
    /// pair) and bring the schema up to date.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(url = %config.url, ns = %config.namespace, db = %config.database, "Opening store connection");

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        run_migrations(&db).await?;
        info!("Store ready");

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
