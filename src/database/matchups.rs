use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{DbCharacterMatchup, DbMatchup, DbVersusMatchup, MatchupTotals};
use crate::rating::{CharacterId, PlayerId};

pub fn clear_all(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM player_matchups", [])
        .context("Failed to clear matchups")
        .map(|_| ())
}

pub fn insert_matchup(
    conn: &Connection,
    id: PlayerId,
    char_id: CharacterId,
    opp_char_id: CharacterId,
    totals: &MatchupTotals,
) -> Result<()> {
    let sql = "INSERT INTO player_matchups
        (id, char_id, opp_char_id, wins_real, wins_adjusted, losses_real, losses_adjusted)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

    conn.execute(
        sql,
        params![
            id,
            char_id,
            opp_char_id,
            totals.wins_real,
            totals.wins_adjusted,
            totals.losses_real,
            totals.losses_adjusted
        ],
    )
    .context("Failed to insert matchup")
    .map(|_| ())
}

pub fn list_for(conn: &Connection, id: PlayerId, char_id: CharacterId) -> Result<Vec<DbMatchup>> {
    let sql = "SELECT opp_char_id, wins_real, wins_adjusted, losses_real, losses_adjusted
        FROM player_matchups WHERE id = ?1 AND char_id = ?2 ORDER BY opp_char_id ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![id, char_id], |row| {
            Ok(DbMatchup {
                opp_char_id: row.get(0)?,
                totals: MatchupTotals {
                    wins_real: row.get(1)?,
                    wins_adjusted: row.get(2)?,
                    losses_real: row.get(3)?,
                    losses_adjusted: row.get(4)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Character level matchup tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupBracket {
    /// Games between two established ratings
    Global,
    /// Games between two established ratings above the high rating mark
    HighRated,
}

impl MatchupBracket {
    fn table(&self) -> &'static str {
        match self {
            MatchupBracket::Global => "global_matchups",
            MatchupBracket::HighRated => "high_rated_matchups",
        }
    }
}

pub fn clear_bracket(conn: &Connection, bracket: MatchupBracket) -> Result<()> {
    conn.execute(&format!("DELETE FROM {}", bracket.table()), [])
        .with_context(|| format!("Failed to clear {}", bracket.table()))
        .map(|_| ())
}

pub fn insert_character_matchup(
    conn: &Connection,
    bracket: MatchupBracket,
    char_id: CharacterId,
    opp_char_id: CharacterId,
    totals: &MatchupTotals,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {}
        (char_id, opp_char_id, wins_real, wins_adjusted, losses_real, losses_adjusted)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        bracket.table()
    );

    conn.execute(
        &sql,
        params![
            char_id,
            opp_char_id,
            totals.wins_real,
            totals.wins_adjusted,
            totals.losses_real,
            totals.losses_adjusted
        ],
    )
    .context("Failed to insert character matchup")
    .map(|_| ())
}

pub fn list_bracket(conn: &Connection, bracket: MatchupBracket) -> Result<Vec<DbCharacterMatchup>> {
    let sql = format!(
        "SELECT char_id, opp_char_id, wins_real, wins_adjusted, losses_real, losses_adjusted
        FROM {} ORDER BY char_id ASC, opp_char_id ASC",
        bracket.table()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DbCharacterMatchup {
                char_id: row.get(0)?,
                opp_char_id: row.get(1)?,
                totals: MatchupTotals {
                    wins_real: row.get(2)?,
                    wins_adjusted: row.get(3)?,
                    losses_real: row.get(4)?,
                    losses_adjusted: row.get(5)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn clear_versus(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM versus_matchups", [])
        .context("Failed to clear versus matchups")
        .map(|_| ())
}

pub fn insert_versus(conn: &Connection, versus: &DbVersusMatchup) -> Result<()> {
    let sql = "INSERT INTO versus_matchups (char_a, char_b, game_count, pair_count, win_rate)
        VALUES (?1, ?2, ?3, ?4, ?5)";

    conn.execute(
        sql,
        params![
            versus.char_id,
            versus.opp_char_id,
            versus.game_count,
            versus.pair_count,
            versus.win_rate
        ],
    )
    .context("Failed to insert versus matchup")
    .map(|_| ())
}

pub fn list_versus(conn: &Connection) -> Result<Vec<DbVersusMatchup>> {
    let sql = "SELECT char_a, char_b, game_count, pair_count, win_rate
        FROM versus_matchups ORDER BY char_a ASC, char_b ASC";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DbVersusMatchup {
                char_id: row.get(0)?,
                opp_char_id: row.get(1)?,
                game_count: row.get(2)?,
                pair_count: row.get(3)?,
                win_rate: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
