use anyhow::Result;
use log::{info, warn};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashMap};

use crate::config::settings::{AppConfig, RatingSettings};
use crate::database::{
    self, matchups::MatchupBracket, DbFloorBucket, DbVersusMatchup, GameSide, MatchupTotals,
    RatedGame, TopDefeated, TopRating,
};
use crate::rating::{win_probability, CharacterId, PlayerId};

/// Floors shown in the floor distribution, 99 being Celestial
pub const FLOORS: [i64; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 99];

/// Rating limits on the Glicko2 scale
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub max_deviation: f64,
    pub high_rating: f64,
}

impl Thresholds {
    pub fn from_settings(settings: &RatingSettings) -> Self {
        Self {
            max_deviation: settings.max_deviation_internal(),
            high_rating: settings.high_rating_internal(),
        }
    }

    fn established(&self, side: &GameSide) -> bool {
        side.deviation < self.max_deviation
    }

    fn high_rated(&self, side: &GameSide) -> bool {
        self.established(side) && side.value > self.high_rating
    }
}

/// Win/loss counts and best snapshots of one player on one character
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingAggregate {
    pub wins: i64,
    pub losses: i64,
    pub top_rating: Option<TopRating>,
    pub top_defeated: Option<TopDefeated>,
}

#[derive(Debug, Clone)]
pub struct PlayerIdentity {
    pub name: String,
    pub platform: i64,
    /// Floor of the latest game
    pub floor: i64,
    pub aliases: Vec<String>,
}

/// Adjusted results of one player pair, seen from the lower character id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairTotals {
    pub wins_adjusted: f64,
    pub losses_adjusted: f64,
    pub games: i64,
}

pub type VersusPair = ((PlayerId, CharacterId), (PlayerId, CharacterId));

/// Everything derived from the stored games
#[derive(Debug, Default)]
pub struct Aggregates {
    pub players: HashMap<PlayerId, PlayerIdentity>,
    pub ratings: HashMap<(PlayerId, CharacterId), RatingAggregate>,
    pub matchups: HashMap<(PlayerId, CharacterId, CharacterId), MatchupTotals>,
    pub global_matchups: HashMap<(CharacterId, CharacterId), MatchupTotals>,
    pub high_rated_matchups: HashMap<(CharacterId, CharacterId), MatchupTotals>,
    pub versus_pairs: HashMap<VersusPair, PairTotals>,
    pub floor_games: HashMap<i64, i64>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub games: usize,
    pub players: usize,
    pub ratings: usize,
    pub matchups: usize,
    pub versus_matchups: usize,
    pub rating_buckets: usize,
    pub skipped: usize,
}

/// Walk the games oldest first and accumulate per-player and per-character
/// aggregates.
pub fn aggregate_games(games: &[RatedGame], thresholds: &Thresholds) -> Aggregates {
    let mut aggregates = Aggregates::default();

    for game in games {
        if game.winner != 1 && game.winner != 2 {
            aggregates.skipped += 1;
            continue;
        }

        record_identity(&mut aggregates, &game.a, game.floor);
        record_identity(&mut aggregates, &game.b, game.floor);
        *aggregates.floor_games.entry(game.floor).or_default() += 1;

        let (winner, loser) = game.winner_and_loser();
        record_result(&mut aggregates, game.timestamp, winner, loser, thresholds.max_deviation);
        record_matchup(&mut aggregates, winner, loser, thresholds.max_deviation);
        record_character_matchups(&mut aggregates, winner, loser, thresholds);
    }

    aggregates
}

fn record_identity(aggregates: &mut Aggregates, side: &GameSide, floor: i64) {
    let identity = aggregates
        .players
        .entry(side.id)
        .or_insert_with(|| PlayerIdentity {
            name: side.name.clone(),
            platform: side.platform,
            floor,
            aliases: Vec::new(),
        });

    identity.name = side.name.clone();
    identity.floor = floor;
    if side.platform != 0 {
        identity.platform = side.platform;
    }
    if !identity.aliases.contains(&side.name) {
        identity.aliases.push(side.name.clone());
    }
}

fn record_result(
    aggregates: &mut Aggregates,
    timestamp: i64,
    winner: &GameSide,
    loser: &GameSide,
    max_deviation: f64,
) {
    let winner_entry = aggregates
        .ratings
        .entry((winner.id, winner.char_id))
        .or_default();
    winner_entry.wins += 1;
    update_top_rating(&mut winner_entry.top_rating, timestamp, winner, max_deviation);

    if loser.deviation < max_deviation
        && winner_entry
            .top_defeated
            .as_ref()
            .is_none_or(|top| loser.value > top.value)
    {
        winner_entry.top_defeated = Some(TopDefeated {
            id: loser.id,
            char_id: loser.char_id,
            name: loser.name.clone(),
            value: loser.value,
            deviation: loser.deviation,
            timestamp,
        });
    }

    let loser_entry = aggregates
        .ratings
        .entry((loser.id, loser.char_id))
        .or_default();
    loser_entry.losses += 1;
    update_top_rating(&mut loser_entry.top_rating, timestamp, loser, max_deviation);
}

fn update_top_rating(
    top: &mut Option<TopRating>,
    timestamp: i64,
    side: &GameSide,
    max_deviation: f64,
) {
    if side.deviation >= max_deviation {
        return;
    }
    if top.as_ref().is_none_or(|t| side.value > t.value) {
        *top = Some(TopRating {
            value: side.value,
            deviation: side.deviation,
            timestamp,
        });
    }
}

fn record_matchup(
    aggregates: &mut Aggregates,
    winner: &GameSide,
    loser: &GameSide,
    max_deviation: f64,
) {
    // Weight of the win: how likely the loser was to win instead
    let adjusted = (winner.deviation < max_deviation && loser.deviation < max_deviation)
        .then(|| win_probability(loser.value, winner.value));

    let winner_totals = aggregates
        .matchups
        .entry((winner.id, winner.char_id, loser.char_id))
        .or_default();
    winner_totals.wins_real += 1;
    if let Some(p) = adjusted {
        winner_totals.wins_adjusted += p;
    }

    let loser_totals = aggregates
        .matchups
        .entry((loser.id, loser.char_id, winner.char_id))
        .or_default();
    loser_totals.losses_real += 1;
    if let Some(p) = adjusted {
        loser_totals.losses_adjusted += p;
    }
}

fn add_character_result(
    table: &mut HashMap<(CharacterId, CharacterId), MatchupTotals>,
    winner: CharacterId,
    loser: CharacterId,
    adjusted: f64,
) {
    let winner_totals = table.entry((winner, loser)).or_default();
    winner_totals.wins_real += 1;
    winner_totals.wins_adjusted += adjusted;

    let loser_totals = table.entry((loser, winner)).or_default();
    loser_totals.losses_real += 1;
    loser_totals.losses_adjusted += adjusted;
}

/// Character level tables only count games between established ratings
fn record_character_matchups(
    aggregates: &mut Aggregates,
    winner: &GameSide,
    loser: &GameSide,
    thresholds: &Thresholds,
) {
    if !thresholds.established(winner) || !thresholds.established(loser) {
        return;
    }
    let adjusted = win_probability(loser.value, winner.value);
    add_character_result(
        &mut aggregates.global_matchups,
        winner.char_id,
        loser.char_id,
        adjusted,
    );

    if thresholds.high_rated(winner) && thresholds.high_rated(loser) {
        add_character_result(
            &mut aggregates.high_rated_matchups,
            winner.char_id,
            loser.char_id,
            adjusted,
        );
        record_versus_pair(aggregates, winner, loser);
    }
}

fn record_versus_pair(aggregates: &mut Aggregates, winner: &GameSide, loser: &GameSide) {
    if winner.char_id == loser.char_id {
        return;
    }
    let (low, high, low_won) = if winner.char_id < loser.char_id {
        (winner, loser, true)
    } else {
        (loser, winner, false)
    };

    let pair = aggregates
        .versus_pairs
        .entry(((low.id, low.char_id), (high.id, high.char_id)))
        .or_default();
    pair.games += 1;
    if low_won {
        pair.wins_adjusted += win_probability(high.value, low.value);
    } else {
        pair.losses_adjusted += win_probability(low.value, high.value);
    }
}

/// Average the adjusted win rate of every player pair per character pair.
/// Each character pair yields a row for both directions.
pub fn versus_matchups(aggregates: &Aggregates) -> Vec<DbVersusMatchup> {
    let mut by_characters: BTreeMap<(CharacterId, CharacterId), (f64, i64, i64)> = BTreeMap::new();
    for (((_, low_char), (_, high_char)), totals) in &aggregates.versus_pairs {
        let total = totals.wins_adjusted + totals.losses_adjusted;
        if total <= 0.0 {
            continue;
        }
        let entry = by_characters.entry((*low_char, *high_char)).or_default();
        entry.0 += totals.wins_adjusted / total;
        entry.1 += 1;
        entry.2 += totals.games;
    }

    by_characters
        .into_iter()
        .flat_map(|((low, high), (rate_sum, pair_count, game_count))| {
            let win_rate = rate_sum / pair_count as f64;
            [
                DbVersusMatchup {
                    char_id: low,
                    opp_char_id: high,
                    game_count,
                    pair_count,
                    win_rate,
                },
                DbVersusMatchup {
                    char_id: high,
                    opp_char_id: low,
                    game_count,
                    pair_count,
                    win_rate: 1.0 - win_rate,
                },
            ]
        })
        .collect()
}

/// Players by the floor of their latest game, and games per floor
pub fn floor_distribution(aggregates: &Aggregates) -> Vec<DbFloorBucket> {
    FLOORS
        .iter()
        .map(|&floor| DbFloorBucket {
            floor,
            player_count: aggregates
                .players
                .values()
                .filter(|p| p.floor == floor)
                .count() as i64,
            game_count: aggregates.floor_games.get(&floor).copied().unwrap_or(0),
        })
        .collect()
}

pub struct ProcessingService {
    config: AppConfig,
}

impl ProcessingService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<ProcessingSummary> {
        let pool = database::create_pool(&self.config.server.database_path)?;
        let mut conn = database::get_connection(&pool)?;
        self.process(&mut conn)
    }

    /// Rebuild names, aliases, win/loss counts, matchups, top snapshots and
    /// distributions from the stored games in a single transaction
    pub fn process(&self, conn: &mut Connection) -> Result<ProcessingSummary> {
        info!("=== Starting Data Processing ===");

        let games = database::games::list_rated(conn)?;
        info!("  → Loaded {} games", games.len());

        let thresholds = Thresholds::from_settings(&self.config.rating);
        let aggregates = aggregate_games(&games, &thresholds);
        if aggregates.skipped > 0 {
            warn!("{} games have an invalid winner and were skipped", aggregates.skipped);
        }
        let versus = versus_matchups(&aggregates);

        let tx = conn.transaction()?;
        self.save_players(&tx, &aggregates)?;
        self.save_ratings(&tx, &aggregates)?;
        self.save_matchups(&tx, &aggregates)?;
        self.save_character_matchups(&tx, &aggregates, &versus)?;
        let rating_buckets = self.save_distribution(&tx, &aggregates)?;
        tx.commit()?;

        let summary = ProcessingSummary {
            games: games.len(),
            players: aggregates.players.len(),
            ratings: aggregates.ratings.len(),
            matchups: aggregates.matchups.len(),
            versus_matchups: versus.len(),
            rating_buckets,
            skipped: aggregates.skipped,
        };
        info!(
            "  → Saved {} players, {} ratings, {} matchups",
            summary.players, summary.ratings, summary.matchups
        );
        info!(
            "  → Saved {} versus matchups, {} rating buckets",
            summary.versus_matchups, summary.rating_buckets
        );
        info!("=== Processing Complete ===");
        Ok(summary)
    }

    fn save_players(&self, conn: &Connection, aggregates: &Aggregates) -> Result<()> {
        for (id, identity) in &aggregates.players {
            for alias in &identity.aliases {
                database::players::add_name(conn, *id, alias)?;
            }
            database::players::upsert_player(conn, *id, &identity.name, identity.platform)?;
        }
        Ok(())
    }

    fn save_ratings(&self, conn: &Connection, aggregates: &Aggregates) -> Result<()> {
        database::ratings::clear_aggregates(conn)?;

        for ((id, char_id), aggregate) in &aggregates.ratings {
            database::ratings::insert_unrated(conn, *id, *char_id)?;
            database::ratings::update_aggregates(
                conn,
                *id,
                *char_id,
                aggregate.wins,
                aggregate.losses,
                aggregate.top_rating.as_ref(),
                aggregate.top_defeated.as_ref(),
            )?;
        }
        Ok(())
    }

    fn save_matchups(&self, conn: &Connection, aggregates: &Aggregates) -> Result<()> {
        database::matchups::clear_all(conn)?;

        for ((id, char_id, opp_char_id), totals) in &aggregates.matchups {
            database::matchups::insert_matchup(conn, *id, *char_id, *opp_char_id, totals)?;
        }
        Ok(())
    }

    fn save_character_matchups(
        &self,
        conn: &Connection,
        aggregates: &Aggregates,
        versus: &[DbVersusMatchup],
    ) -> Result<()> {
        for (bracket, table) in [
            (MatchupBracket::Global, &aggregates.global_matchups),
            (MatchupBracket::HighRated, &aggregates.high_rated_matchups),
        ] {
            database::matchups::clear_bracket(conn, bracket)?;
            for ((char_id, opp_char_id), totals) in table {
                database::matchups::insert_character_matchup(
                    conn,
                    bracket,
                    *char_id,
                    *opp_char_id,
                    totals,
                )?;
            }
        }

        database::matchups::clear_versus(conn)?;
        for row in versus {
            database::matchups::insert_versus(conn, row)?;
        }
        Ok(())
    }

    /// Floors come from the games; rating buckets from the stored ratings
    fn save_distribution(&self, conn: &Connection, aggregates: &Aggregates) -> Result<usize> {
        database::distribution::clear_all(conn)?;
        for bucket in floor_distribution(aggregates) {
            database::distribution::insert_floor(conn, &bucket)?;
        }

        let settings = &self.config.rating;
        database::distribution::rebuild_rating_distribution(
            conn,
            settings.distribution_bucket_width,
            settings.distribution_max_rating,
            settings.distribution_min_players,
            settings.max_deviation_internal(),
        )
    }
}
