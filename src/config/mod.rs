pub mod characters;
pub mod settings;

pub use characters::{find_by_id, find_by_shortname, CharacterConfig, CHARACTERS};
pub use settings::{AppConfig, RatingSettings, ServerSettings};
