/// A playable character. The id is the position in [`CHARACTERS`] and is
/// what storage keeps in every `char_id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterConfig {
    pub id: i64,
    pub shortname: &'static str,
    pub name: &'static str,
}

impl CharacterConfig {
    const fn new(id: i64, shortname: &'static str, name: &'static str) -> Self {
        Self { id, shortname, name }
    }
}

pub const CHARACTERS: [CharacterConfig; 20] = [
    CharacterConfig::new(0, "SO", "Sol"),
    CharacterConfig::new(1, "KY", "Ky"),
    CharacterConfig::new(2, "MA", "May"),
    CharacterConfig::new(3, "AX", "Axl"),
    CharacterConfig::new(4, "CH", "Chipp"),
    CharacterConfig::new(5, "PO", "Potemkin"),
    CharacterConfig::new(6, "FA", "Faust"),
    CharacterConfig::new(7, "MI", "Millia"),
    CharacterConfig::new(8, "ZA", "Zato-1"),
    CharacterConfig::new(9, "RA", "Ramlethal"),
    CharacterConfig::new(10, "LE", "Leo"),
    CharacterConfig::new(11, "NA", "Nagoriyuki"),
    CharacterConfig::new(12, "GI", "Giovanna"),
    CharacterConfig::new(13, "AN", "Anji"),
    CharacterConfig::new(14, "IN", "I-No"),
    CharacterConfig::new(15, "GO", "Goldlewis"),
    CharacterConfig::new(16, "JC", "Jack-O'"),
    CharacterConfig::new(17, "HA", "Happy Chaos"),
    CharacterConfig::new(18, "BA", "Baiken"),
    CharacterConfig::new(19, "TE", "Testament"),
];

pub fn find_by_id(id: i64) -> Option<&'static CharacterConfig> {
    usize::try_from(id).ok().and_then(|idx| CHARACTERS.get(idx))
}

/// Case-insensitive lookup, so `/player/1A/so` works as well as `/SO`
pub fn find_by_shortname(shortname: &str) -> Option<&'static CharacterConfig> {
    CHARACTERS
        .iter()
        .find(|c| c.shortname.eq_ignore_ascii_case(shortname))
}
