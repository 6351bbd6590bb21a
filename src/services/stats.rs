use anyhow::Result;
use rusqlite::Connection;

use crate::config::{self, RatingSettings};
use crate::database::{self, matchups::MatchupBracket, DbCharacterMatchup, DbVersusMatchup};
use crate::domain::{
    format_floor, CharacterMatchup, Distribution, FloorShare, MatchupTables, RatingBucket,
    VersusMatchup,
};
use crate::rating::{classify, percentage, rating_offset};

/// Character level statistics produced by processing
pub struct StatsService {
    settings: RatingSettings,
}

impl StatsService {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    pub fn load_matchups(&self, conn: &Connection) -> Result<MatchupTables> {
        let global = database::matchups::list_bracket(conn, MatchupBracket::Global)?;
        let high_rated = database::matchups::list_bracket(conn, MatchupBracket::HighRated)?;
        let versus = database::matchups::list_versus(conn)?;

        Ok(MatchupTables {
            global: global.iter().filter_map(|m| self.build_matchup(m)).collect(),
            high_rated: high_rated.iter().filter_map(|m| self.build_matchup(m)).collect(),
            versus: versus.iter().filter_map(build_versus).collect(),
        })
    }

    pub fn load_distribution(&self, conn: &Connection) -> Result<Distribution> {
        let floors = database::distribution::list_floors(conn)?;
        let total_players: i64 = floors.iter().map(|f| f.player_count).sum();
        let total_games: i64 = floors.iter().map(|f| f.game_count).sum();

        let ratings = database::distribution::list_ratings(conn)?
            .into_iter()
            .map(|bucket| RatingBucket {
                min_rating: bucket.min_rating,
                max_rating: bucket.max_rating,
                player_count: bucket.player_count,
                player_count_cum: bucket.player_count_cum,
            })
            .collect();

        Ok(Distribution {
            floors: floors
                .iter()
                .map(|f| FloorShare {
                    floor: format_floor(f.floor),
                    player_count: f.player_count,
                    player_share: percentage(f.player_count as f64, total_players as f64),
                    game_count: f.game_count,
                    game_share: percentage(f.game_count as f64, total_games as f64),
                })
                .collect(),
            ratings,
        })
    }

    fn build_matchup(&self, matchup: &DbCharacterMatchup) -> Option<CharacterMatchup> {
        let character = config::find_by_id(matchup.char_id)?;
        let opponent = config::find_by_id(matchup.opp_char_id)?;
        let totals = &matchup.totals;
        let game_count = totals.wins_real + totals.losses_real;
        let offset = rating_offset(totals.wins_adjusted, totals.losses_adjusted);

        Some(CharacterMatchup {
            character_short: character.shortname.to_string(),
            character_name: character.name.to_string(),
            opponent_short: opponent.shortname.to_string(),
            opponent_name: opponent.name.to_string(),
            game_count,
            win_rate: percentage(totals.wins_real as f64, game_count as f64),
            rating_offset: offset,
            class: classify(game_count, offset, &self.settings),
        })
    }
}

fn build_versus(versus: &DbVersusMatchup) -> Option<VersusMatchup> {
    let character = config::find_by_id(versus.char_id)?;
    let opponent = config::find_by_id(versus.opp_char_id)?;
    Some(VersusMatchup {
        character_short: character.shortname.to_string(),
        opponent_short: opponent.shortname.to_string(),
        game_count: versus.game_count,
        pair_count: versus.pair_count,
        win_rate: percentage(versus.win_rate, 1.0),
    })
}
