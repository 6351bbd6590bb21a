use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{DbFloorBucket, DbRatingBucket};
use crate::rating::glicko_to_glicko2;

pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM floor_distribution", [])
        .context("Failed to clear floor distribution")?;
    conn.execute("DELETE FROM rating_distribution", [])
        .context("Failed to clear rating distribution")?;
    Ok(())
}

pub fn insert_floor(conn: &Connection, bucket: &DbFloorBucket) -> Result<()> {
    conn.execute(
        "INSERT INTO floor_distribution (floor, player_count, game_count) VALUES (?1, ?2, ?3)",
        params![bucket.floor, bucket.player_count, bucket.game_count],
    )
    .context("Failed to insert floor bucket")
    .map(|_| ())
}

pub fn list_floors(conn: &Connection) -> Result<Vec<DbFloorBucket>> {
    let sql = "SELECT floor, player_count, game_count FROM floor_distribution ORDER BY floor ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DbFloorBucket {
                floor: row.get(0)?,
                player_count: row.get(1)?,
                game_count: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Count established ratings per `bucket_width` wide bucket in
/// `[0, max_rating)` and store the buckets holding at least `min_players`.
/// `max_deviation` is on the Glicko2 scale, the bucket bounds on the Glicko
/// scale.
pub fn rebuild_rating_distribution(
    conn: &Connection,
    bucket_width: i64,
    max_rating: i64,
    min_players: i64,
    max_deviation: f64,
) -> Result<usize> {
    conn.execute("DELETE FROM rating_distribution", [])
        .context("Failed to clear rating distribution")?;

    let mut stored = 0;
    let mut min = 0;
    while bucket_width > 0 && min < max_rating {
        let max = min + bucket_width;
        let bounds = (glicko_to_glicko2(min as f64), glicko_to_glicko2(max as f64));

        let player_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM player_ratings
            WHERE value >= ?1 AND value < ?2 AND deviation < ?3",
            params![bounds.0, bounds.1, max_deviation],
            |r| r.get(0),
        )?;

        if player_count >= min_players {
            let player_count_cum: i64 = conn.query_row(
                "SELECT COUNT(*) FROM player_ratings WHERE value < ?1 AND deviation < ?2",
                params![bounds.1, max_deviation],
                |r| r.get(0),
            )?;

            conn.execute(
                "INSERT INTO rating_distribution (min_rating, max_rating, player_count, player_count_cum)
                VALUES (?1, ?2, ?3, ?4)",
                params![min, max, player_count, player_count_cum],
            )
            .context("Failed to insert rating bucket")?;
            stored += 1;
        }

        min = max;
    }

    Ok(stored)
}

pub fn list_ratings(conn: &Connection) -> Result<Vec<DbRatingBucket>> {
    let sql = "SELECT min_rating, max_rating, player_count, player_count_cum
        FROM rating_distribution ORDER BY min_rating ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DbRatingBucket {
                min_rating: row.get(0)?,
                max_rating: row.get(1)?,
                player_count: row.get(2)?,
                player_count_cum: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
