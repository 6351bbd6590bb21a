use anyhow::Result;
use rusqlite::Connection;

use crate::config;
use crate::database::{self, HistoryRow};
use crate::domain::{format_floor, format_player_id, format_timestamp, HistoryEntry, HistoryPage};
use crate::pagination::PageRequest;
use crate::rating::{display_deviation, display_value, PlayerId};

/// Pages through the games a player played on one character
pub struct HistoryService {
    page_size: usize,
}

impl HistoryService {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// `None` when the character or the player's rating on it is unknown.
    /// Ratings are left out for players flagged as cheaters.
    pub fn load_history(
        &self,
        conn: &Connection,
        player_id: PlayerId,
        char_short: &str,
        page: usize,
    ) -> Result<Option<HistoryPage>> {
        let Some(character) = config::find_by_shortname(char_short) else {
            return Ok(None);
        };
        if database::ratings::find(conn, player_id, character.id)?.is_none() {
            return Ok(None);
        }

        let hide_ratings = database::players::find_cheater_status(conn, player_id)?.is_some();
        let request = PageRequest::new(page, self.page_size);

        let rows = database::games::history_page(
            conn,
            player_id,
            character.id,
            request.fetch_limit(),
            request.offset(),
        )?;
        let (rows, has_more) = request.split(rows);

        Ok(Some(HistoryPage {
            page: request.page,
            page_size: request.page_size,
            has_more,
            games: rows
                .iter()
                .map(|row| build_entry(row, hide_ratings))
                .collect(),
        }))
    }
}

fn build_entry(row: &HistoryRow, hide_ratings: bool) -> HistoryEntry {
    let shown = |value: i64| (!hide_ratings).then_some(value);
    let opponent = config::find_by_id(row.opponent_char_id);

    HistoryEntry {
        timestamp: format_timestamp(row.timestamp),
        floor: format_floor(row.floor),
        own_rating_value: shown(display_value(row.own_value)),
        own_rating_deviation: shown(display_deviation(row.own_deviation)),
        opponent_id: format_player_id(row.opponent_id),
        opponent_name: row.opponent_name.clone(),
        opponent_character_short: opponent.map(|c| c.shortname).unwrap_or("??").to_string(),
        opponent_character: opponent.map(|c| c.name).unwrap_or("Unknown").to_string(),
        opponent_rating_value: shown(display_value(row.opponent_value)),
        opponent_rating_deviation: shown(display_deviation(row.opponent_deviation)),
        won: row.won,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, get_connection, setup::init_database, GameSide, RatedGame};
    use crate::rating::Glicko2Rating;

    fn side(id: PlayerId, char_id: i64) -> GameSide {
        GameSide {
            id,
            name: format!("P{id}"),
            char_id,
            platform: 1,
            value: 0.0,
            deviation: 0.25,
        }
    }

    fn seed(conn: &Connection, games: i64) {
        init_database(conn).unwrap();
        database::ratings::upsert_rating(conn, 1, 0, &Glicko2Rating::unrated()).unwrap();
        for i in 0..games {
            let game = RatedGame {
                timestamp: 1_000 + i * 60,
                floor: 99,
                a: side(1, 0),
                b: side(2 + i, 1),
                winner: 1 + i % 2,
            };
            database::games::insert_game(conn, &game).unwrap();
        }
    }

    #[test]
    fn test_pages_newest_first() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        seed(&conn, 5);
        let service = HistoryService::new(2);

        let first = service.load_history(&conn, 1, "SO", 0).unwrap().unwrap();
        assert_eq!(first.games.len(), 2);
        assert!(first.has_more);
        assert_eq!(first.games[0].opponent_id, "6");
        assert_eq!(first.games[0].opponent_character_short, "KY");
        assert_eq!(first.games[0].floor, "Celestial");
        assert!(first.games[0].won);
        assert!(!first.games[1].won);
        assert_eq!(first.games[0].own_rating_value, Some(1500));
        assert_eq!(first.games[0].opponent_rating_deviation, Some(87));

        let last = service.load_history(&conn, 1, "SO", 2).unwrap().unwrap();
        assert_eq!(last.games.len(), 1);
        assert!(!last.has_more);
        assert_eq!(last.games[0].opponent_id, "2");

        let past_end = service.load_history(&conn, 1, "SO", 9).unwrap().unwrap();
        assert!(past_end.games.is_empty());
        assert!(!past_end.has_more);
    }

    #[test]
    fn test_unknown_character_or_rating() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        seed(&conn, 1);
        let service = HistoryService::new(10);

        assert!(service.load_history(&conn, 1, "ZZ", 0).unwrap().is_none());
        assert!(service.load_history(&conn, 1, "KY", 0).unwrap().is_none());
        assert!(service.load_history(&conn, 99, "SO", 0).unwrap().is_none());
    }

    #[test]
    fn test_cheater_ratings_are_hidden() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();
        seed(&conn, 1);
        database::players::set_cheater_status(&conn, 1, "banned").unwrap();
        let service = HistoryService::new(10);

        let page = service.load_history(&conn, 1, "SO", 0).unwrap().unwrap();
        let entry = &page.games[0];
        assert_eq!(entry.own_rating_value, None);
        assert_eq!(entry.opponent_rating_value, None);
        assert_eq!(entry.opponent_name, "P2");
    }
}
