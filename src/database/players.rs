use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Player;
use crate::rating::PlayerId;

/// Record the player's current name and platform and remember the name as
/// an alias. An unknown platform (0) never replaces a known one.
pub fn upsert_player(conn: &Connection, id: PlayerId, name: &str, platform: i64) -> Result<()> {
    let sql = "INSERT INTO players (id, name, platform) VALUES (?1, ?2, ?3)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            platform = CASE WHEN excluded.platform = 0 THEN players.platform ELSE excluded.platform END";

    conn.execute(sql, params![id, name, platform])
    .context("Failed to upsert player")?;

    add_name(conn, id, name)
}

pub fn add_name(conn: &Connection, id: PlayerId, name: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO player_names (id, name) VALUES (?1, ?2)",
        params![id, name],
    )
    .context("Failed to insert player name")
    .map(|_| ())
}

fn parse_player_row(row: &rusqlite::Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        platform: row.get(2)?,
    })
}

pub fn find_by_id(conn: &Connection, id: PlayerId) -> Result<Option<Player>> {
    let sql = "SELECT id, name, platform FROM players WHERE id = ?1";

    conn.query_row(sql, params![id], parse_player_row)
        .optional()
        .context("Failed to query player by id")
}

/// Every name the player has been seen with except `current`, alphabetical
pub fn other_names(conn: &Connection, id: PlayerId, current: &str) -> Result<Vec<String>> {
    let sql = "SELECT name FROM player_names WHERE id = ?1 AND name != ?2 ORDER BY name ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![id, current], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(rows)
}

pub fn set_vip_status(conn: &Connection, id: PlayerId, notes: &str) -> Result<()> {
    conn.execute(
        "REPLACE INTO vip_status (id, notes) VALUES (?1, ?2)",
        params![id, notes],
    )
    .context("Failed to set vip status")
    .map(|_| ())
}

pub fn set_cheater_status(conn: &Connection, id: PlayerId, notes: &str) -> Result<()> {
    conn.execute(
        "REPLACE INTO cheater_status (id, notes) VALUES (?1, ?2)",
        params![id, notes],
    )
    .context("Failed to set cheater status")
    .map(|_| ())
}

pub fn find_vip_status(conn: &Connection, id: PlayerId) -> Result<Option<String>> {
    conn.query_row("SELECT notes FROM vip_status WHERE id = ?1", params![id], |r| r.get(0))
        .optional()
        .context("Failed to query vip status")
}

pub fn find_cheater_status(conn: &Connection, id: PlayerId) -> Result<Option<String>> {
    conn.query_row("SELECT notes FROM cheater_status WHERE id = ?1", params![id], |r| r.get(0))
        .optional()
        .context("Failed to query cheater status")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup::init_database};

    #[test]
    fn test_upsert_keeps_latest_name_and_all_aliases() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        upsert_player(&conn, 7, "Zeta", 1).unwrap();
        upsert_player(&conn, 7, "Alpha", 3).unwrap();
        upsert_player(&conn, 7, "Omega", 3).unwrap();

        let player = find_by_id(&conn, 7).unwrap().unwrap();
        assert_eq!(player.name, "Omega");
        assert_eq!(player.platform, 3);
        assert_eq!(other_names(&conn, 7, "Omega").unwrap(), vec!["Alpha", "Zeta"]);
        assert!(find_by_id(&conn, 8).unwrap().is_none());
    }

    #[test]
    fn test_unknown_platform_keeps_stored_platform() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        upsert_player(&conn, 7, "Zeta", 0).unwrap();
        assert_eq!(find_by_id(&conn, 7).unwrap().unwrap().platform, 0);

        upsert_player(&conn, 7, "Zeta", 2).unwrap();
        upsert_player(&conn, 7, "Renamed", 0).unwrap();

        let player = find_by_id(&conn, 7).unwrap().unwrap();
        assert_eq!(player.name, "Renamed");
        assert_eq!(player.platform, 2);
    }

    #[test]
    fn test_status_flags() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        init_database(&conn).unwrap();

        assert_eq!(find_vip_status(&conn, 1).unwrap(), None);
        set_vip_status(&conn, 1, "Supporter").unwrap();
        set_cheater_status(&conn, 2, "Manipulated results").unwrap();

        assert_eq!(find_vip_status(&conn, 1).unwrap().as_deref(), Some("Supporter"));
        assert_eq!(find_cheater_status(&conn, 1).unwrap(), None);
        assert_eq!(
            find_cheater_status(&conn, 2).unwrap().as_deref(),
            Some("Manipulated results")
        );
    }
}
