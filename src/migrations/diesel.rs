// Diesel migration runner for PostgreSQL
// diesel_migrations needs a sync connection, so the harness runs on the blocking pool

use crate::db::MIGRATIONS;
use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

/// Run all pending Diesel migrations, returning how many were applied
pub async fn run_migrations(database_url: String) -> Result<usize, Box<dyn Error + Send + Sync>> {
    tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
        debug!("[DIESEL] Establishing sync connection for migrations...");
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {}", e))?;

        for migration in &applied {
            debug!("[DIESEL] Applied migration: {}", migration);
        }
        info!("[DIESEL] Applied {} migrations", applied.len());

        Ok(applied.len())
    })
    .await
    .map_err(|e| format!("Migration task panicked: {}", e))?
}

/// Applied and pending migration names
#[derive(Debug)]
pub struct MigrationStatus {
    pub applied_migrations: Vec<String>,
    pub pending_migrations: Vec<String>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.pending_migrations.is_empty()
    }
}

/// Inspect the migration table without applying anything
pub async fn check_migration_status(
    database_url: String,
) -> Result<MigrationStatus, Box<dyn Error + Send + Sync>> {
    tokio::task::spawn_blocking(move || -> Result<MigrationStatus, Box<dyn Error + Send + Sync>> {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

        let applied = conn
            .applied_migrations()
            .map_err(|e| format!("Failed to get applied migrations: {}", e))?;
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to get pending migrations: {}", e))?;

        Ok(MigrationStatus {
            applied_migrations: applied.iter().map(|m| m.to_string()).collect(),
            pending_migrations: pending.iter().map(|m| m.name().to_string()).collect(),
        })
    })
    .await
    .map_err(|e| format!("Status check task panicked: {}", e))?
}
