use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{DbRating, TopDefeated, TopRating};
use crate::rating::{CharacterId, Glicko2Rating, PlayerId};

const RATING_COLUMNS: &str = "id, char_id, wins, losses, value, deviation, volatility, \
    top_rating_value, top_rating_deviation, top_rating_timestamp, \
    top_defeated_id, top_defeated_char_id, top_defeated_name, \
    top_defeated_value, top_defeated_deviation, top_defeated_timestamp";

/// Set the current rating, leaving derived columns untouched
pub fn upsert_rating(
    conn: &Connection,
    id: PlayerId,
    char_id: CharacterId,
    rating: &Glicko2Rating,
) -> Result<()> {
    let sql = "INSERT INTO player_ratings (id, char_id, value, deviation, volatility)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT (id, char_id) DO UPDATE SET
            value = excluded.value,
            deviation = excluded.deviation,
            volatility = excluded.volatility";

    conn.execute(
        sql,
        params![id, char_id, rating.value, rating.deviation, rating.volatility],
    )
    .context("Failed to upsert rating")
    .map(|_| ())
}

/// Create an unrated row when the player has never been rated on this character
pub fn insert_unrated(conn: &Connection, id: PlayerId, char_id: CharacterId) -> Result<()> {
    let unrated = Glicko2Rating::unrated();
    conn.execute(
        "INSERT OR IGNORE INTO player_ratings (id, char_id, value, deviation, volatility)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, char_id, unrated.value, unrated.deviation, unrated.volatility],
    )
    .context("Failed to insert unrated rating")
    .map(|_| ())
}

/// Zero every derived column so aggregates can be rebuilt from games
pub fn clear_aggregates(conn: &Connection) -> Result<()> {
    let sql = "UPDATE player_ratings SET
            wins = 0, losses = 0,
            top_rating_value = NULL, top_rating_deviation = NULL, top_rating_timestamp = NULL,
            top_defeated_id = NULL, top_defeated_char_id = NULL, top_defeated_name = NULL,
            top_defeated_value = NULL, top_defeated_deviation = NULL, top_defeated_timestamp = NULL";

    conn.execute(sql, [])
        .context("Failed to clear rating aggregates")
        .map(|_| ())
}

pub fn update_aggregates(
    conn: &Connection,
    id: PlayerId,
    char_id: CharacterId,
    wins: i64,
    losses: i64,
    top_rating: Option<&TopRating>,
    top_defeated: Option<&TopDefeated>,
) -> Result<()> {
    let sql = "UPDATE player_ratings SET
            wins = ?3,
            losses = ?4,
            top_rating_value = ?5,
            top_rating_deviation = ?6,
            top_rating_timestamp = ?7,
            top_defeated_id = ?8,
            top_defeated_char_id = ?9,
            top_defeated_name = ?10,
            top_defeated_value = ?11,
            top_defeated_deviation = ?12,
            top_defeated_timestamp = ?13
        WHERE id = ?1 AND char_id = ?2";

    conn.execute(
        sql,
        params![
            id,
            char_id,
            wins,
            losses,
            top_rating.map(|t| t.value),
            top_rating.map(|t| t.deviation),
            top_rating.map(|t| t.timestamp),
            top_defeated.map(|t| t.id),
            top_defeated.map(|t| t.char_id),
            top_defeated.map(|t| t.name.as_str()),
            top_defeated.map(|t| t.value),
            top_defeated.map(|t| t.deviation),
            top_defeated.map(|t| t.timestamp),
        ],
    )
    .context("Failed to update rating aggregates")
    .map(|_| ())
}

fn parse_db_rating_row(row: &rusqlite::Row) -> rusqlite::Result<DbRating> {
    let top_rating = match row.get::<_, Option<f64>>(7)? {
        Some(value) => Some(TopRating {
            value,
            deviation: row.get(8)?,
            timestamp: row.get(9)?,
        }),
        None => None,
    };

    let top_defeated = match row.get::<_, Option<i64>>(10)? {
        Some(id) => Some(TopDefeated {
            id,
            char_id: row.get(11)?,
            name: row.get(12)?,
            value: row.get(13)?,
            deviation: row.get(14)?,
            timestamp: row.get(15)?,
        }),
        None => None,
    };

    Ok(DbRating {
        id: row.get(0)?,
        char_id: row.get(1)?,
        wins: row.get(2)?,
        losses: row.get(3)?,
        rating: Glicko2Rating {
            value: row.get(4)?,
            deviation: row.get(5)?,
            volatility: row.get(6)?,
        },
        top_rating,
        top_defeated,
    })
}

pub fn find(conn: &Connection, id: PlayerId, char_id: CharacterId) -> Result<Option<DbRating>> {
    let sql = format!("SELECT {RATING_COLUMNS} FROM player_ratings WHERE id = ?1 AND char_id = ?2");

    conn.query_row(&sql, params![id, char_id], parse_db_rating_row)
        .optional()
        .context("Failed to query rating")
}

/// All characters the player is rated on, most played first
pub fn list_by_player(conn: &Connection, id: PlayerId) -> Result<Vec<DbRating>> {
    let sql = format!(
        "SELECT {RATING_COLUMNS} FROM player_ratings WHERE id = ?1 \
        ORDER BY wins + losses DESC, char_id ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![id], parse_db_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// 1 + number of established, non-cheater ratings on `char_id` above `value`
pub fn character_rank(
    conn: &Connection,
    char_id: CharacterId,
    value: f64,
    max_deviation: f64,
) -> Result<i64> {
    let sql = "SELECT COUNT(*) FROM player_ratings
        WHERE char_id = ?1 AND value > ?2 AND deviation < ?3
        AND id NOT IN (SELECT id FROM cheater_status)";

    conn.query_row(sql, params![char_id, value, max_deviation], |r| r.get::<_, i64>(0))
        .map(|above| above + 1)
        .context("Failed to compute character rank")
}

/// Same as [`character_rank`] across every character
pub fn global_rank(conn: &Connection, value: f64, max_deviation: f64) -> Result<i64> {
    let sql = "SELECT COUNT(*) FROM player_ratings
        WHERE value > ?1 AND deviation < ?2
        AND id NOT IN (SELECT id FROM cheater_status)";

    conn.query_row(sql, params![value, max_deviation], |r| r.get::<_, i64>(0))
        .map(|above| above + 1)
        .context("Failed to compute global rank")
}
