use askama::Template;

use crate::domain::Player;

#[derive(Template)]
#[template(path = "player.html")]
pub struct PlayerPage<'a> {
    pub player: &'a Player,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage<'a> {
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CharacterRatingData, CharacterSummary, Matchup, Platform, TopDefeatedSnapshot,
        TopRatingSnapshot,
    };
    use crate::rating::MatchupClass;

    fn bare_player() -> Player {
        Player {
            id: "1A2B".to_string(),
            name: "Player <One>".to_string(),
            platform: Platform::PlayStation,
            vip_status: None,
            cheater_status: None,
            other_names: Vec::new(),
            data: CharacterRatingData {
                character_short: "SO".to_string(),
                character_name: "Sol".to_string(),
                rating_value: Some(1623),
                rating_deviation: Some(118),
                game_count: 42,
                win_rate: 57.1,
                character_rank: None,
                global_rank: None,
                top_rating: None,
                top_defeated: None,
                matchups: Vec::new(),
            },
            other_characters: Vec::new(),
        }
    }

    fn full_player() -> Player {
        let mut player = bare_player();
        player.vip_status = Some("Supporter".to_string());
        player.other_names = vec!["Alias & Co".to_string()];
        player.data.character_rank = Some(12);
        player.data.global_rank = Some(345);
        player.data.top_rating = Some(TopRatingSnapshot {
            value: 1700,
            deviation: 90,
            timestamp: "2022-01-01 10:00".to_string(),
        });
        player.data.top_defeated = Some(TopDefeatedSnapshot {
            id: "FF".to_string(),
            character_short: "KY".to_string(),
            character_name: "Ky".to_string(),
            name: "Rival".to_string(),
            value: 1810,
            deviation: 70,
            timestamp: "2022-01-02 11:00".to_string(),
        });
        player.data.matchups = vec![Matchup {
            character_short: "MA".to_string(),
            character_name: "May".to_string(),
            game_count: 20,
            win_rate: 60.0,
            rating_offset: Some(70),
            class: MatchupClass::Good,
        }];
        player.other_characters = vec![CharacterSummary {
            shortname: "AX".to_string(),
            name: "Axl".to_string(),
            rating_value: Some(1400),
            rating_deviation: Some(200),
            game_count: 3,
        }];
        player
    }

    #[test]
    fn test_bare_profile_omits_optional_sections() {
        let player = bare_player();
        let html = PlayerPage { player: &player }.render().unwrap();

        assert!(html.contains("Player &lt;One&gt;"));
        assert!(html.contains("1623"));
        assert!(html.contains("57.1% won"));
        assert!(html.contains("load_history('SO')"));
        assert!(html.contains("decrement_page()"));
        assert!(html.contains("increment_page()"));

        assert!(!html.contains("Also known as"));
        assert!(!html.contains("class=\"vip\""));
        assert!(!html.contains("character-rank"));
        assert!(!html.contains("Top rating"));
        assert!(!html.contains("Top defeated"));
        assert!(!html.contains("Matchups"));
        assert!(!html.contains("Other characters"));
        assert!(!html.contains("cheater-banner"));
    }

    #[test]
    fn test_full_profile_renders_every_section() {
        let player = full_player();
        let html = PlayerPage { player: &player }.render().unwrap();

        assert!(html.contains("Alias &amp; Co"));
        assert!(html.contains("title=\"Supporter\""));
        assert!(html.contains("#12 Sol"));
        assert!(html.contains("#345 overall"));
        assert!(html.contains("Top rating"));
        assert!(html.contains("href=\"/player/FF/KY\""));
        assert!(html.contains("class=\"matchup-good\""));
        assert!(html.contains("+70"));
        assert!(html.contains("href=\"/player/1A2B/AX\""));
        assert!(html.contains("1400 &plusmn;200"));
    }

    #[test]
    fn test_cheater_profile_hides_ratings() {
        let mut player = full_player();
        player.cheater_status = Some("Manipulated results".to_string());
        player.data.character_rank = None;
        player.data.global_rank = None;
        let html = PlayerPage { player: &player }.render().unwrap();

        assert!(html.contains("cheater-banner"));
        assert!(!html.contains("rating-value"));
        assert!(!html.contains("1623"));
        assert!(!html.contains("Top rating"));
        assert!(!html.contains("1400"));
        assert!(!html.contains("+70"));
        assert!(html.contains("42 games"));
        assert!(html.contains("60.0%"));
    }

    #[test]
    fn test_redacted_ratings_are_omitted() {
        let mut player = bare_player();
        player.data.rating_value = None;
        player.data.rating_deviation = None;
        let html = PlayerPage { player: &player }.render().unwrap();

        assert!(!html.contains("rating-value"));
        assert!(!html.contains("1623"));
    }

    #[test]
    fn test_not_found_page() {
        let html = NotFoundPage {
            message: "No such player",
        }
        .render()
        .unwrap();
        assert!(html.contains("No such player"));
    }
}
