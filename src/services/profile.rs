use anyhow::Result;
use rusqlite::Connection;

use crate::config::{self, CharacterConfig, RatingSettings};
use crate::database::{self, DbMatchup, DbRating, TopDefeated, TopRating};
use crate::domain::{
    format_player_id, format_timestamp, CharacterRatingData, CharacterSummary, Matchup, Platform,
    Player, TopDefeatedSnapshot, TopRatingSnapshot,
};
use crate::rating::{classify, display_deviation, display_value, percentage, rating_offset, PlayerId};

/// Resolves a player and character into the profile page data
pub struct ProfileService {
    settings: RatingSettings,
}

impl ProfileService {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    /// `None` when the character, the player or the player's rating on that
    /// character does not exist
    pub fn load_profile(
        &self,
        conn: &Connection,
        player_id: PlayerId,
        char_short: &str,
    ) -> Result<Option<Player>> {
        let Some(character) = config::find_by_shortname(char_short) else {
            return Ok(None);
        };
        let Some(player) = database::players::find_by_id(conn, player_id)? else {
            return Ok(None);
        };

        let ratings = database::ratings::list_by_player(conn, player_id)?;
        let Some(current) = ratings.iter().find(|r| r.char_id == character.id) else {
            return Ok(None);
        };

        let vip_status = database::players::find_vip_status(conn, player_id)?;
        let cheater_status = database::players::find_cheater_status(conn, player_id)?;
        let other_names = database::players::other_names(conn, player_id, &player.name)?;

        let is_cheater = cheater_status.is_some();
        let data = self.build_rating_data(conn, character, current, is_cheater)?;
        let other_characters = ratings
            .iter()
            .filter(|r| r.char_id != character.id)
            .filter_map(|r| build_summary(r, is_cheater))
            .collect();

        Ok(Some(Player {
            id: format_player_id(player.id),
            name: player.name,
            platform: Platform::from_code(player.platform),
            vip_status,
            cheater_status,
            other_names,
            data,
            other_characters,
        }))
    }

    fn build_rating_data(
        &self,
        conn: &Connection,
        character: &CharacterConfig,
        rating: &DbRating,
        is_cheater: bool,
    ) -> Result<CharacterRatingData> {
        let (character_rank, global_rank) = self.ranks(conn, rating, is_cheater)?;
        let matchups = database::matchups::list_for(conn, rating.id, rating.char_id)?
            .iter()
            .filter_map(|m| self.build_matchup(m, is_cheater))
            .collect();
        let shown = |value: i64| (!is_cheater).then_some(value);

        Ok(CharacterRatingData {
            character_short: character.shortname.to_string(),
            character_name: character.name.to_string(),
            rating_value: shown(display_value(rating.rating.value)),
            rating_deviation: shown(display_deviation(rating.rating.deviation)),
            game_count: rating.game_count(),
            win_rate: percentage(rating.wins as f64, rating.game_count() as f64),
            character_rank,
            global_rank,
            top_rating: rating
                .top_rating
                .as_ref()
                .filter(|_| !is_cheater)
                .map(build_top_rating),
            top_defeated: rating
                .top_defeated
                .as_ref()
                .filter(|_| !is_cheater)
                .and_then(build_top_defeated),
            matchups,
        })
    }

    fn ranks(
        &self,
        conn: &Connection,
        rating: &DbRating,
        is_cheater: bool,
    ) -> Result<(Option<i64>, Option<i64>)> {
        let max_deviation = self.settings.max_deviation_internal();
        if is_cheater || !rating.rating.is_established(max_deviation) {
            return Ok((None, None));
        }

        let value = rating.rating.value;
        let character_rank =
            database::ratings::character_rank(conn, rating.char_id, value, max_deviation)?;
        let global_rank = database::ratings::global_rank(conn, value, max_deviation)?;
        Ok((Some(character_rank), Some(global_rank)))
    }

    /// Offsets are rating-derived and left out for flagged players
    fn build_matchup(&self, matchup: &DbMatchup, is_cheater: bool) -> Option<Matchup> {
        let opponent = config::find_by_id(matchup.opp_char_id)?;
        let totals = &matchup.totals;
        let game_count = totals.wins_real + totals.losses_real;
        let offset = rating_offset(totals.wins_adjusted, totals.losses_adjusted)
            .filter(|_| !is_cheater);

        Some(Matchup {
            character_short: opponent.shortname.to_string(),
            character_name: opponent.name.to_string(),
            game_count,
            win_rate: percentage(totals.wins_real as f64, game_count as f64),
            rating_offset: offset,
            class: classify(game_count, offset, &self.settings),
        })
    }
}

fn build_summary(rating: &DbRating, is_cheater: bool) -> Option<CharacterSummary> {
    let character = config::find_by_id(rating.char_id)?;
    let shown = |value: i64| (!is_cheater).then_some(value);
    Some(CharacterSummary {
        shortname: character.shortname.to_string(),
        name: character.name.to_string(),
        rating_value: shown(display_value(rating.rating.value)),
        rating_deviation: shown(display_deviation(rating.rating.deviation)),
        game_count: rating.game_count(),
    })
}

fn build_top_rating(top: &TopRating) -> TopRatingSnapshot {
    TopRatingSnapshot {
        value: display_value(top.value),
        deviation: display_deviation(top.deviation),
        timestamp: format_timestamp(top.timestamp),
    }
}

fn build_top_defeated(top: &TopDefeated) -> Option<TopDefeatedSnapshot> {
    let character = config::find_by_id(top.char_id)?;
    Some(TopDefeatedSnapshot {
        id: format_player_id(top.id),
        character_short: character.shortname.to_string(),
        character_name: character.name.to_string(),
        name: top.name.clone(),
        value: display_value(top.value),
        deviation: display_deviation(top.deviation),
        timestamp: format_timestamp(top.timestamp),
    })
}
