use chrono::DateTime;
use serde::Serialize;

use crate::rating::{MatchupClass, PlayerId};

/// Player ids are shown and routed as uppercase hex
pub fn format_player_id(id: PlayerId) -> String {
    format!("{:X}", id)
}

pub fn parse_player_id(hex: &str) -> Option<PlayerId> {
    u64::from_str_radix(hex, 16).ok().map(|id| id as PlayerId)
}

/// `%Y-%m-%d %H:%M` in UTC
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn format_floor(floor: i64) -> String {
    match floor {
        99 => "Celestial".to_string(),
        f => format!("F{}", f),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    #[serde(rename = "PS")]
    PlayStation,
    #[serde(rename = "XB")]
    Xbox,
    #[serde(rename = "PC")]
    Pc,
    #[serde(rename = "??")]
    Unknown,
}

impl Platform {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Platform::PlayStation,
            2 => Platform::Xbox,
            3 => Platform::Pc,
            _ => Platform::Unknown,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PS" => Platform::PlayStation,
            "XB" => Platform::Xbox,
            "PC" => Platform::Pc,
            _ => Platform::Unknown,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Platform::PlayStation => 1,
            Platform::Xbox => 2,
            Platform::Pc => 3,
            Platform::Unknown => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Platform::PlayStation => "PS",
            Platform::Xbox => "XB",
            Platform::Pc => "PC",
            Platform::Unknown => "??",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the profile page shows for one player and one character
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub vip_status: Option<String>,
    pub cheater_status: Option<String>,
    pub other_names: Vec<String>,
    pub data: CharacterRatingData,
    pub other_characters: Vec<CharacterSummary>,
}

impl Player {
    pub fn is_cheater(&self) -> bool {
        self.cheater_status.is_some()
    }
}

/// Rating fields are `None` when the player is flagged as a cheater
#[derive(Debug, Clone, Serialize)]
pub struct CharacterRatingData {
    pub character_short: String,
    pub character_name: String,
    pub rating_value: Option<i64>,
    pub rating_deviation: Option<i64>,
    pub game_count: i64,
    pub win_rate: f64,
    pub character_rank: Option<i64>,
    pub global_rank: Option<i64>,
    pub top_rating: Option<TopRatingSnapshot>,
    pub top_defeated: Option<TopDefeatedSnapshot>,
    pub matchups: Vec<Matchup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopRatingSnapshot {
    pub value: i64,
    pub deviation: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopDefeatedSnapshot {
    pub id: String,
    pub character_short: String,
    pub character_name: String,
    pub name: String,
    pub value: i64,
    pub deviation: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Matchup {
    pub character_short: String,
    pub character_name: String,
    pub game_count: i64,
    pub win_rate: f64,
    pub rating_offset: Option<i64>,
    pub class: MatchupClass,
}

/// Entry of the sibling-character navigation
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSummary {
    pub shortname: String,
    pub name: String,
    pub rating_value: Option<i64>,
    pub rating_deviation: Option<i64>,
    pub game_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub page: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub games: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub floor: String,
    pub own_rating_value: Option<i64>,
    pub own_rating_deviation: Option<i64>,
    pub opponent_id: String,
    pub opponent_name: String,
    pub opponent_character_short: String,
    pub opponent_character: String,
    pub opponent_rating_value: Option<i64>,
    pub opponent_rating_deviation: Option<i64>,
    pub won: bool,
}

/// Character against character results over every established player
#[derive(Debug, Clone, Serialize)]
pub struct CharacterMatchup {
    pub character_short: String,
    pub character_name: String,
    pub opponent_short: String,
    pub opponent_name: String,
    pub game_count: i64,
    pub win_rate: f64,
    pub rating_offset: Option<i64>,
    pub class: MatchupClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersusMatchup {
    pub character_short: String,
    pub opponent_short: String,
    pub game_count: i64,
    pub pair_count: i64,
    /// Percentage with one decimal
    pub win_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchupTables {
    pub global: Vec<CharacterMatchup>,
    pub high_rated: Vec<CharacterMatchup>,
    pub versus: Vec<VersusMatchup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorShare {
    pub floor: String,
    pub player_count: i64,
    pub player_share: f64,
    pub game_count: i64,
    pub game_share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatingBucket {
    pub min_rating: i64,
    pub max_rating: i64,
    pub player_count: i64,
    pub player_count_cum: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub floors: Vec<FloorShare>,
    pub ratings: Vec<RatingBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_round_trip_covers_negative_ids() {
        assert_eq!(format_player_id(255), "FF");
        assert_eq!(parse_player_id("ff"), Some(255));
        assert_eq!(parse_player_id(&format_player_id(-5)), Some(-5));
        assert_eq!(parse_player_id("not-hex"), None);
        assert_eq!(parse_player_id(""), None);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(1_640_995_200 + 3_660), "2022-01-01 01:01");
        assert_eq!(format_floor(7), "F7");
        assert_eq!(format_floor(99), "Celestial");
    }

    #[test]
    fn test_platform() {
        assert_eq!(Platform::from_code(3), Platform::Pc);
        assert_eq!(Platform::from_code(42).as_str(), "??");
        assert_eq!(Platform::from_name("ps").code(), 1);
        assert_eq!(serde_json::to_string(&Platform::Xbox).unwrap(), "\"XB\"");
    }
}
