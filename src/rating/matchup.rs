use serde::Serialize;

use super::types::GLICKO2_SCALE;
use crate::config::RatingSettings;

const MAX_OFFSET: i64 = 999;

/// Colour hint attached to a matchup row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchupClass {
    Good,
    Even,
    Bad,
    Unknown,
}

impl MatchupClass {
    pub fn as_str(&self) -> &str {
        match self {
            MatchupClass::Good => "matchup-good",
            MatchupClass::Even => "matchup-even",
            MatchupClass::Bad => "matchup-bad",
            MatchupClass::Unknown => "matchup-unknown",
        }
    }
}

impl std::fmt::Display for MatchupClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating difference (Glicko points) that would produce the adjusted win
/// rate `wins / (wins + losses)`. `None` without any adjusted games.
pub fn rating_offset(wins_adjusted: f64, losses_adjusted: f64) -> Option<i64> {
    let total = wins_adjusted + losses_adjusted;
    if total <= 0.0 {
        return None;
    }

    let p = wins_adjusted / total;
    let offset = if p <= 0.0 {
        -MAX_OFFSET
    } else if p >= 1.0 {
        MAX_OFFSET
    } else {
        ((p / (1.0 - p)).ln() * GLICKO2_SCALE).round() as i64
    };

    Some(offset.clamp(-MAX_OFFSET, MAX_OFFSET))
}

pub fn classify(game_count: i64, offset: Option<i64>, settings: &RatingSettings) -> MatchupClass {
    match offset {
        _ if game_count < settings.matchup_min_games => MatchupClass::Unknown,
        None => MatchupClass::Unknown,
        Some(o) if o >= settings.matchup_even_band => MatchupClass::Good,
        Some(o) if o <= -settings.matchup_even_band => MatchupClass::Bad,
        Some(_) => MatchupClass::Even,
    }
}
