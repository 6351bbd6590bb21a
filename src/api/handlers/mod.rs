use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::config::settings::AppConfig;
use crate::services::{HistoryService, ProfileService, StatsService};

pub mod admin;
pub mod assets;
pub mod players;
pub mod stats;

pub struct AppState {
    pub pool: Pool<SqliteConnectionManager>,
    pub config: AppConfig,
    pub profiles: ProfileService,
    pub history: HistoryService,
    pub stats: StatsService,
}

impl AppState {
    pub fn new(pool: Pool<SqliteConnectionManager>, config: AppConfig) -> Self {
        let profiles = ProfileService::new(config.rating.clone());
        let history = HistoryService::new(config.server.history_page_size);
        let stats = StatsService::new(config.rating.clone());
        Self {
            pool,
            config,
            profiles,
            history,
            stats,
        }
    }
}
