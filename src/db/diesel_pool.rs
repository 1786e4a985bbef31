// PostgreSQL connection pool: diesel-async connections managed by bb8

use bb8::{Pool, PooledConnection};
use diesel::sql_types::Integer;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{embed_migrations, EmbeddedMigrations};
use std::error::Error;
use std::time::Duration;

// Embed migrations at compile time
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/diesel");

pub type DieselPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// A connection checked out of [`DieselPool`]
pub type DieselConnection<'a> =
    PooledConnection<'a, AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct DieselDatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub test_on_checkout: bool,
}

impl DieselDatabaseConfig {
    pub fn from_app_config(config: &crate::app_config::AppConfig) -> Self {
        Self {
            url: config.database_url.clone(),
            max_connections: config.database_max_connections,
            min_connections: config.database_min_connections,
            connection_timeout: Duration::from_secs(config.database_connect_timeout),
            idle_timeout: Duration::from_secs(config.database_idle_timeout),
            max_lifetime: Duration::from_secs(config.database_max_lifetime),
            test_on_checkout: true,
        }
    }
}

impl Default for DieselDatabaseConfig {
    fn default() -> Self {
        Self::from_app_config(crate::app_config::config())
    }
}

/// Create Diesel connection pool and verify one connection can be opened
pub async fn create_diesel_pool(
    config: DieselDatabaseConfig,
) -> Result<DieselPool, Box<dyn Error + Send + Sync>> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(config.connection_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .test_on_check_out(config.test_on_checkout)
        .build(manager)
        .await?;

    let conn = pool.get().await?;
    drop(conn);

    tracing::info!(
        "Diesel pool initialized for {} with {} max connections",
        mask_connection_string(&config.url),
        config.max_connections
    );

    Ok(pool)
}

/// Round-trips `SELECT 1` through a pooled connection
pub async fn check_diesel_health(pool: &DieselPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get().await?;

    let one: i32 = diesel::select(diesel::dsl::sql::<Integer>("1"))
        .get_result(&mut *conn)
        .await?;

    if one != 1 {
        return Err("unexpected health check result".into());
    }

    Ok(())
}

/// Mask database connection string for logging
pub fn mask_connection_string(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = match parsed.scheme() {
                "postgres" => "postgresql",
                other => other,
            };
            let host = parsed.host_str().unwrap_or("***");
            let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
            let path = parsed.path();

            if parsed.username().is_empty() && parsed.password().is_none() {
                format!("{}://{}{}{}", scheme, host, port, path)
            } else {
                format!("{}://***:***@{}{}{}", scheme, host, port, path)
            }
        },
        Err(_) => "postgresql://***:***@***".to_string(),
    }
}
