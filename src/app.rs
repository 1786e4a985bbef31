// Application state shared across handlers
use std::sync::Arc;

use crate::{app_config::AppConfig, db::DieselPool};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub max_connections: u32,
}
