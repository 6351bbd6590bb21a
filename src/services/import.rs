use anyhow::{bail, Context, Result};
use chrono::DateTime;
use log::info;
use rusqlite::Connection;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::config::{self, settings::AppConfig};
use crate::database::{self, GameSide, RatedGame};
use crate::domain::Platform;
use crate::rating::{glicko_deviation_to_glicko2, glicko_to_glicko2, Glicko2Rating, PlayerId};
use crate::services::processing::{ProcessingService, ProcessingSummary};

/// Snapshot file layout. Ratings are on the Glicko scale (1500 centred).
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub players: Vec<SnapshotPlayer>,
    #[serde(default)]
    pub ratings: Vec<SnapshotRating>,
    #[serde(default)]
    pub games: Vec<SnapshotGame>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotPlayer {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub vip: Option<String>,
    #[serde(default)]
    pub cheater: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRating {
    pub id: PlayerId,
    pub character: String,
    pub rating: f64,
    pub deviation: f64,
    #[serde(default)]
    pub volatility: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotSide {
    pub id: PlayerId,
    pub name: String,
    pub character: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub deviation: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotGame {
    pub timestamp: String,
    pub floor: i64,
    pub winner: i64,
    pub a: SnapshotSide,
    pub b: SnapshotSide,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub players: usize,
    pub ratings: usize,
    pub new_games: usize,
    pub duplicate_games: usize,
    pub processing: ProcessingSummary,
}

pub struct ImportService {
    config: AppConfig,
}

impl ImportService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, path: &Path) -> Result<ImportSummary> {
        let pool = database::create_pool(&self.config.server.database_path)?;
        let mut conn = database::get_connection(&pool)?;
        database::setup::init_database(&conn)?;

        let snapshot = load_snapshot(path)?;
        self.import(&mut conn, &snapshot)
    }

    /// Store the snapshot in one transaction, then rebuild derived data
    pub fn import(&self, conn: &mut Connection, snapshot: &Snapshot) -> Result<ImportSummary> {
        info!("=== Starting Import ===");

        let tx = conn.transaction()?;
        for player in &snapshot.players {
            import_player(&tx, player)?;
        }
        for (idx, rating) in snapshot.ratings.iter().enumerate() {
            import_rating(&tx, rating)
                .with_context(|| format!("Invalid rating #{} (player {})", idx + 1, rating.id))?;
        }

        let mut new_games = 0;
        for (idx, game) in snapshot.games.iter().enumerate() {
            let rated = convert_game(game)
                .with_context(|| format!("Invalid game #{} ({})", idx + 1, game.timestamp))?;
            if database::games::insert_game(&tx, &rated)? {
                new_games += 1;
            }
        }
        tx.commit()?;

        let duplicate_games = snapshot.games.len() - new_games;
        info!(
            "  → Imported {} players, {} ratings, {} new games ({} duplicates)",
            snapshot.players.len(),
            snapshot.ratings.len(),
            new_games,
            duplicate_games
        );

        let processing = ProcessingService::new(self.config.clone()).process(conn)?;

        Ok(ImportSummary {
            players: snapshot.players.len(),
            ratings: snapshot.ratings.len(),
            new_games,
            duplicate_games,
            processing,
        })
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse snapshot file {}", path.display()))
}

fn platform_code(platform: Option<&str>) -> i64 {
    platform.map(Platform::from_name).unwrap_or(Platform::Unknown).code()
}

fn character_id(shortname: &str) -> Result<i64> {
    match config::find_by_shortname(shortname) {
        Some(character) => Ok(character.id),
        None => bail!("Unknown character '{}'", shortname),
    }
}

fn import_player(conn: &Connection, player: &SnapshotPlayer) -> Result<()> {
    database::players::upsert_player(
        conn,
        player.id,
        &player.name,
        platform_code(player.platform.as_deref()),
    )?;

    if let Some(notes) = &player.vip {
        database::players::set_vip_status(conn, player.id, notes)?;
    }
    if let Some(notes) = &player.cheater {
        database::players::set_cheater_status(conn, player.id, notes)?;
    }
    Ok(())
}

fn import_rating(conn: &Connection, rating: &SnapshotRating) -> Result<()> {
    let char_id = character_id(&rating.character)?;
    let value = Glicko2Rating {
        value: glicko_to_glicko2(rating.rating),
        deviation: glicko_deviation_to_glicko2(rating.deviation),
        volatility: rating.volatility.unwrap_or(Glicko2Rating::unrated().volatility),
    };
    database::ratings::upsert_rating(conn, rating.id, char_id, &value)
}

fn convert_side(side: &SnapshotSide) -> Result<GameSide> {
    let unrated = Glicko2Rating::unrated();
    Ok(GameSide {
        id: side.id,
        name: side.name.clone(),
        char_id: character_id(&side.character)?,
        platform: platform_code(side.platform.as_deref()),
        value: side.rating.map(glicko_to_glicko2).unwrap_or(unrated.value),
        deviation: side
            .deviation
            .map(glicko_deviation_to_glicko2)
            .unwrap_or(unrated.deviation),
    })
}

fn convert_game(game: &SnapshotGame) -> Result<RatedGame> {
    if game.winner != 1 && game.winner != 2 {
        bail!("Winner must be 1 or 2, got {}", game.winner);
    }
    let timestamp = DateTime::parse_from_rfc3339(&game.timestamp)
        .context("Timestamp is not RFC 3339")?
        .timestamp();

    Ok(RatedGame {
        timestamp,
        floor: game.floor,
        a: convert_side(&game.a)?,
        b: convert_side(&game.b)?,
        winner: game.winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup::init_database};

    const SNAPSHOT: &str = r#"{
        "players": [
            { "id": 1, "name": "Alice", "platform": "pc", "vip": "Supporter" },
            { "id": 2, "name": "Bob", "platform": "PS", "cheater": "Banned" }
        ],
        "ratings": [
            { "id": 1, "character": "SO", "rating": 1600, "deviation": 60 }
        ],
        "games": [
            {
                "timestamp": "2022-01-01T10:00:00Z", "floor": 10, "winner": 1,
                "a": { "id": 1, "name": "Alice", "character": "SO", "platform": "PC", "rating": 1580, "deviation": 70 },
                "b": { "id": 2, "name": "Bob", "character": "KY", "platform": "PS", "rating": 1500, "deviation": 80 }
            },
            {
                "timestamp": "2022-01-01T10:00:00Z", "floor": 10, "winner": 1,
                "a": { "id": 1, "name": "Alice", "character": "SO" },
                "b": { "id": 2, "name": "Bob", "character": "KY" }
            }
        ]
    }"#;

    #[test]
    fn test_import_snapshot() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        let snapshot: Snapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let summary = ImportService::new(AppConfig::new())
            .import(&mut conn, &snapshot)
            .unwrap();

        assert_eq!(summary.new_games, 1);
        assert_eq!(summary.duplicate_games, 1);
        assert_eq!(summary.processing.games, 1);

        let alice = database::ratings::find(&conn, 1, 0).unwrap().unwrap();
        assert!((alice.rating.value - glicko_to_glicko2(1600.0)).abs() < 1e-12);
        assert_eq!(alice.wins, 1);
        let top = alice.top_rating.unwrap();
        assert!((top.value - glicko_to_glicko2(1580.0)).abs() < 1e-12);

        // Bob has no rating entry in the snapshot and starts unrated
        let bob = database::ratings::find(&conn, 2, 1).unwrap().unwrap();
        assert_eq!(bob.rating, Glicko2Rating::unrated());
        assert_eq!(bob.losses, 1);

        assert_eq!(
            database::players::find_vip_status(&conn, 1).unwrap().as_deref(),
            Some("Supporter")
        );
        assert!(database::players::find_cheater_status(&conn, 2).unwrap().is_some());
        assert_eq!(database::players::find_by_id(&conn, 1).unwrap().unwrap().platform, 3);
    }

    #[test]
    fn test_games_without_platform_keep_player_platform() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        let snapshot: Snapshot = serde_json::from_str(
            r#"{
                "players": [{ "id": 1, "name": "Alice", "platform": "PC" }],
                "games": [{
                    "timestamp": "2022-01-01T10:00:00Z", "floor": 10, "winner": 1,
                    "a": { "id": 1, "name": "Alice", "character": "SO" },
                    "b": { "id": 2, "name": "Bob", "character": "KY" }
                }]
            }"#,
        )
        .unwrap();
        ImportService::new(AppConfig::new())
            .import(&mut conn, &snapshot)
            .unwrap();

        assert_eq!(database::players::find_by_id(&conn, 1).unwrap().unwrap().platform, 3);
        assert_eq!(database::players::find_by_id(&conn, 2).unwrap().unwrap().platform, 0);
    }

    #[test]
    fn test_unknown_character_is_rejected() {
        let pool = create_memory_pool().unwrap();
        let mut conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        let snapshot: Snapshot = serde_json::from_str(
            r#"{ "ratings": [{ "id": 1, "character": "QQ", "rating": 1500, "deviation": 350 }] }"#,
        )
        .unwrap();
        let err = ImportService::new(AppConfig::new())
            .import(&mut conn, &snapshot)
            .unwrap_err();

        assert!(format!("{:#}", err).contains("Unknown character 'QQ'"));
        assert!(database::ratings::find(&conn, 1, 0).unwrap().is_none());
    }

    #[test]
    fn test_invalid_winner_is_rejected() {
        let game: SnapshotGame = serde_json::from_str(
            r#"{
                "timestamp": "2022-01-01T10:00:00Z", "floor": 1, "winner": 3,
                "a": { "id": 1, "name": "A", "character": "SO" },
                "b": { "id": 2, "name": "B", "character": "KY" }
            }"#,
        )
        .unwrap();
        assert!(convert_game(&game).is_err());
    }
}
