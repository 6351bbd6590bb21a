use serde::{Deserialize, Serialize};

/// Scale factor between the Glicko and Glicko2 rating scales
pub const GLICKO2_SCALE: f64 = 173.7178;
const GLICKO_CENTER: f64 = 1500.0;

pub type PlayerId = i64;
pub type CharacterId = i64;

/// A rating on the internal Glicko2 scale, as stored in the database
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    pub value: f64,
    pub deviation: f64,
    pub volatility: f64,
}

impl Glicko2Rating {
    /// The rating a player+character starts with before any game
    pub fn unrated() -> Self {
        Self {
            value: 0.0,
            deviation: glicko_deviation_to_glicko2(350.0),
            volatility: 0.06,
        }
    }

    pub fn is_established(&self, max_deviation: f64) -> bool {
        self.deviation < max_deviation
    }
}

pub fn glicko_to_glicko2(rating: f64) -> f64 {
    (rating - GLICKO_CENTER) / GLICKO2_SCALE
}

pub fn glicko_deviation_to_glicko2(deviation: f64) -> f64 {
    deviation / GLICKO2_SCALE
}

/// Display value of a rating: the Glicko scale, rounded
pub fn display_value(value: f64) -> i64 {
    (value * GLICKO2_SCALE + GLICKO_CENTER).round() as i64
}

/// Display deviation: two standard deviations on the Glicko scale, rounded
pub fn display_deviation(deviation: f64) -> i64 {
    (2.0 * deviation * GLICKO2_SCALE).round() as i64
}

/// Expected probability that `a` beats `b`, both on the Glicko2 scale
pub fn win_probability(a: f64, b: f64) -> f64 {
    1.0 / (1.0 + (b - a).exp())
}

/// Percentage with one decimal, `0.0` when there is nothing to divide by
pub fn percentage(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (1000.0 * part / total).round() / 10.0
}
