use crate::rating::{CharacterId, Glicko2Rating, PlayerId};

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub platform: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopRating {
    pub value: f64,
    pub deviation: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopDefeated {
    pub id: PlayerId,
    pub char_id: CharacterId,
    pub name: String,
    pub value: f64,
    pub deviation: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct DbRating {
    pub id: PlayerId,
    pub char_id: CharacterId,
    pub wins: i64,
    pub losses: i64,
    pub rating: Glicko2Rating,
    pub top_rating: Option<TopRating>,
    pub top_defeated: Option<TopDefeated>,
}

impl DbRating {
    pub fn game_count(&self) -> i64 {
        self.wins + self.losses
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupTotals {
    pub wins_real: i64,
    pub wins_adjusted: f64,
    pub losses_real: i64,
    pub losses_adjusted: f64,
}

#[derive(Debug, Clone)]
pub struct DbMatchup {
    pub opp_char_id: CharacterId,
    pub totals: MatchupTotals,
}

/// Character against character totals over every player
#[derive(Debug, Clone)]
pub struct DbCharacterMatchup {
    pub char_id: CharacterId,
    pub opp_char_id: CharacterId,
    pub totals: MatchupTotals,
}

/// Average adjusted win rate of `char_id` over every high rated pair of
/// players that met on these characters
#[derive(Debug, Clone, PartialEq)]
pub struct DbVersusMatchup {
    pub char_id: CharacterId,
    pub opp_char_id: CharacterId,
    pub game_count: i64,
    pub pair_count: i64,
    /// Between 0 and 1
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFloorBucket {
    pub floor: i64,
    pub player_count: i64,
    pub game_count: i64,
}

/// Established ratings in `[min_rating, max_rating)` on the Glicko scale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbRatingBucket {
    pub min_rating: i64,
    pub max_rating: i64,
    pub player_count: i64,
    pub player_count_cum: i64,
}

/// One side of a stored game with the rating it had going into the game
#[derive(Debug, Clone)]
pub struct GameSide {
    pub id: PlayerId,
    pub name: String,
    pub char_id: CharacterId,
    pub platform: i64,
    pub value: f64,
    pub deviation: f64,
}

/// A game joined with its pre-game ratings
#[derive(Debug, Clone)]
pub struct RatedGame {
    pub timestamp: i64,
    pub floor: i64,
    pub a: GameSide,
    pub b: GameSide,
    /// 1 when `a` won, 2 when `b` won
    pub winner: i64,
}

impl RatedGame {
    pub fn winner_and_loser(&self) -> (&GameSide, &GameSide) {
        if self.winner == 1 {
            (&self.a, &self.b)
        } else {
            (&self.b, &self.a)
        }
    }
}

/// A game seen from one player's side
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub timestamp: i64,
    pub floor: i64,
    pub own_value: f64,
    pub own_deviation: f64,
    pub opponent_id: PlayerId,
    pub opponent_name: String,
    pub opponent_char_id: CharacterId,
    pub opponent_value: f64,
    pub opponent_deviation: f64,
    pub won: bool,
}
