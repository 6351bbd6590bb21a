pub mod matchup;
pub mod types;

pub use matchup::{classify, rating_offset, MatchupClass};
pub use types::{
    display_deviation, display_value, glicko_deviation_to_glicko2, glicko_to_glicko2, percentage,
    win_probability, CharacterId, Glicko2Rating, PlayerId, GLICKO2_SCALE,
};
