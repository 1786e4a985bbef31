// Startup schema migrations
// Embedded in the application binary so deployments need no migration tooling

pub mod diesel;

use std::error::Error;
use tracing::{error, info};

/// Options for migration execution
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database_url: String,
    pub environment: String,
}

impl MigrationConfig {
    pub fn from_app_config(config: &crate::app_config::AppConfig) -> Self {
        Self {
            database_url: config.database_url.clone(),
            environment: config.environment.to_string(),
        }
    }
}

/// Apply all pending PostgreSQL migrations
pub async fn run_all_migrations(config: MigrationConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!(
        "[MIGRATIONS] Starting migration process for environment: {}",
        config.environment
    );

    let status = diesel::check_migration_status(config.database_url.clone()).await?;
    if status.is_up_to_date() {
        info!(
            "[MIGRATIONS] Schema up to date ({} applied)",
            status.applied_migrations.len()
        );
        return Ok(());
    }
    info!(
        "[MIGRATIONS] {} pending: {}",
        status.pending_migrations.len(),
        status.pending_migrations.join(", ")
    );

    match diesel::run_migrations(config.database_url).await {
        Ok(0) => info!("[MIGRATIONS] Schema up to date"),
        Ok(applied_count) => info!("[MIGRATIONS] Applied {} migrations", applied_count),
        Err(e) => {
            error!("[MIGRATIONS] Migration failed: {}", e);
            return Err(format!("Diesel migration failed: {}", e).into());
        },
    }

    Ok(())
}

/// Migrations run at startup unless `DISABLE_EMBEDDED_MIGRATIONS` is set
pub fn should_run_migrations(config: &crate::app_config::AppConfig) -> bool {
    !config.disable_embedded_migrations
}
