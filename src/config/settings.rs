use crate::rating::{glicko_deviation_to_glicko2, glicko_to_glicko2};

#[derive(Debug, Clone)]
pub struct RatingSettings {
    /// Deviation (Glicko scale) below which a rating counts as established
    pub max_deviation: f64,
    /// Matchup rows with fewer games are shown without colouring
    pub matchup_min_games: i64,
    /// Rating offset (Glicko points) needed to colour a matchup good or bad
    pub matchup_even_band: i64,
    /// Both players above this rating (Glicko scale) make a high rated game
    pub high_rating: f64,
    /// Width of a rating distribution bucket, in Glicko points
    pub distribution_bucket_width: i64,
    /// Upper bound of the last rating distribution bucket
    pub distribution_max_rating: i64,
    /// Rating buckets with fewer players are left out
    pub distribution_min_players: i64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            max_deviation: 100.0,
            matchup_min_games: 10,
            matchup_even_band: 25,
            high_rating: 1800.0,
            distribution_bucket_width: 50,
            distribution_max_rating: 3000,
            distribution_min_players: 10,
        }
    }
}

impl RatingSettings {
    /// `max_deviation` on the internal Glicko2 scale used by storage
    pub fn max_deviation_internal(&self) -> f64 {
        glicko_deviation_to_glicko2(self.max_deviation)
    }

    pub fn high_rating_internal(&self) -> f64 {
        glicko_to_glicko2(self.high_rating)
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_path: String,
    pub history_page_size: usize,
    /// Bearer token for the admin endpoints, disabled when unset
    pub admin_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "ratings.sqlite".to_string()),
            history_page_size: 100,
            admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            server: ServerSettings::default(),
        }
    }
}
