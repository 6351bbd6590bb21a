use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{GameSide, HistoryRow, RatedGame};
use crate::rating::{CharacterId, PlayerId};

/// Store a game and its pre-game ratings. Returns `false` when the game was
/// already present.
pub fn insert_game(conn: &Connection, game: &RatedGame) -> Result<bool> {
    let sql = "INSERT OR IGNORE INTO games
        (timestamp, id_a, name_a, char_a, platform_a, id_b, name_b, char_b, platform_b, winner, game_floor)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

    let inserted = conn
        .execute(
            sql,
            params![
                game.timestamp,
                game.a.id,
                game.a.name,
                game.a.char_id,
                game.a.platform,
                game.b.id,
                game.b.name,
                game.b.char_id,
                game.b.platform,
                game.winner,
                game.floor,
            ],
        )
        .context("Failed to insert game")?;

    if inserted == 0 {
        return Ok(false);
    }

    conn.execute(
        "INSERT OR REPLACE INTO game_ratings VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            game.timestamp,
            game.a.id,
            game.a.value,
            game.a.deviation,
            game.b.id,
            game.b.value,
            game.b.deviation,
        ],
    )
    .context("Failed to insert game ratings")?;

    Ok(true)
}

fn parse_rated_game_row(row: &rusqlite::Row) -> rusqlite::Result<RatedGame> {
    Ok(RatedGame {
        timestamp: row.get(0)?,
        floor: row.get(1)?,
        winner: row.get(2)?,
        a: GameSide {
            id: row.get(3)?,
            name: row.get(4)?,
            char_id: row.get(5)?,
            platform: row.get(6)?,
            value: row.get(7)?,
            deviation: row.get(8)?,
        },
        b: GameSide {
            id: row.get(9)?,
            name: row.get(10)?,
            char_id: row.get(11)?,
            platform: row.get(12)?,
            value: row.get(13)?,
            deviation: row.get(14)?,
        },
    })
}

/// Every game with its pre-game ratings, oldest first
pub fn list_rated(conn: &Connection) -> Result<Vec<RatedGame>> {
    let sql = "SELECT
            g.timestamp, g.game_floor, g.winner,
            g.id_a, g.name_a, g.char_a, g.platform_a, r.value_a, r.deviation_a,
            g.id_b, g.name_b, g.char_b, g.platform_b, r.value_b, r.deviation_b
        FROM games g
        JOIN game_ratings r
            ON g.timestamp = r.timestamp AND g.id_a = r.id_a AND g.id_b = r.id_b
        ORDER BY g.timestamp ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], parse_rated_game_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to list rated games")?;

    Ok(rows)
}

pub fn count_all(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))
        .context("Failed to count games")
}

/// Games of `id` on `char_id`, newest first
pub fn history_page(
    conn: &Connection,
    id: PlayerId,
    char_id: CharacterId,
    limit: usize,
    offset: usize,
) -> Result<Vec<HistoryRow>> {
    let sql = "
        SELECT g.timestamp, g.game_floor, r.value_a, r.deviation_a,
               g.id_b, g.name_b, g.char_b, r.value_b, r.deviation_b, g.winner = 1
        FROM games g
        JOIN game_ratings r
            ON g.timestamp = r.timestamp AND g.id_a = r.id_a AND g.id_b = r.id_b
        WHERE g.id_a = ?1 AND g.char_a = ?2
        UNION ALL
        SELECT g.timestamp, g.game_floor, r.value_b, r.deviation_b,
               g.id_a, g.name_a, g.char_a, r.value_a, r.deviation_a, g.winner = 2
        FROM games g
        JOIN game_ratings r
            ON g.timestamp = r.timestamp AND g.id_a = r.id_a AND g.id_b = r.id_b
        WHERE g.id_b = ?1 AND g.char_b = ?2
        ORDER BY 1 DESC
        LIMIT ?3 OFFSET ?4
    ";

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![id, char_id, limit, offset], |row| {
            Ok(HistoryRow {
                timestamp: row.get(0)?,
                floor: row.get(1)?,
                own_value: row.get(2)?,
                own_deviation: row.get(3)?,
                opponent_id: row.get(4)?,
                opponent_name: row.get(5)?,
                opponent_char_id: row.get(6)?,
                opponent_value: row.get(7)?,
                opponent_deviation: row.get(8)?,
                won: row.get(9)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to query match history")?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup::init_database};

    fn side(id: PlayerId, char_id: CharacterId, value: f64) -> GameSide {
        GameSide {
            id,
            name: format!("P{id}"),
            char_id,
            platform: 1,
            value,
            deviation: 0.3,
        }
    }

    fn game(timestamp: i64, a: GameSide, b: GameSide, winner: i64) -> RatedGame {
        RatedGame {
            timestamp,
            floor: 10,
            a,
            b,
            winner,
        }
    }

    #[test]
    fn test_duplicate_game_is_ignored() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        let g = game(100, side(1, 0, 0.1), side(2, 1, 0.2), 1);
        assert!(insert_game(&conn, &g).unwrap());
        assert!(!insert_game(&conn, &g).unwrap());
        assert_eq!(count_all(&conn).unwrap(), 1);

        let stored = list_rated(&conn).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].b.value, 0.2);
        assert_eq!(stored[0].winner_and_loser().0.id, 1);
    }

    #[test]
    fn test_history_sees_both_sides_newest_first() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        insert_game(&conn, &game(100, side(1, 0, 0.1), side(2, 1, 0.2), 1)).unwrap();
        insert_game(&conn, &game(200, side(3, 2, 0.3), side(1, 0, 0.4), 1)).unwrap();
        insert_game(&conn, &game(300, side(1, 5, 0.5), side(2, 1, 0.6), 2)).unwrap();

        let rows = history_page(&conn, 1, 0, 10, 0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, 200);
        assert_eq!(rows[0].opponent_id, 3);
        assert_eq!(rows[0].own_value, 0.4);
        assert!(!rows[0].won);
        assert_eq!(rows[1].opponent_char_id, 1);
        assert!(rows[1].won);

        let second_page = history_page(&conn, 1, 0, 1, 1).unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].timestamp, 100);
    }
}
