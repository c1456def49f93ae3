//! The card roster: 13 characters in 4 art styles, 52 cards total.
//!
//! Cards are immutable wire values. They are generated once per deal and
//! never mutated afterwards; matching compares only the `character` field,
//! the style is cosmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the 13 card characters.
///
/// Serialized with the display names the original client expects, so
/// `NinjaHattori` goes on the wire as `"Ninja Hattori"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Character {
    Doraemon,
    Jiyaan,
    Nobita,
    Sizuka,
    Sunio,
    #[serde(rename = "Ninja Hattori")]
    NinjaHattori,
    Oggy,
    Jack,
    Tom,
    Jerry,
    Himawari,
    Cinderella,
    Shinchan,
}

impl Character {
    /// All 13 characters in deterministic roster order.
    pub const ALL: [Character; 13] = [
        Character::Doraemon,
        Character::Jiyaan,
        Character::Nobita,
        Character::Sizuka,
        Character::Sunio,
        Character::NinjaHattori,
        Character::Oggy,
        Character::Jack,
        Character::Tom,
        Character::Jerry,
        Character::Himawari,
        Character::Cinderella,
        Character::Shinchan,
    ];
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Character::Doraemon => "Doraemon",
            Character::Jiyaan => "Jiyaan",
            Character::Nobita => "Nobita",
            Character::Sizuka => "Sizuka",
            Character::Sunio => "Sunio",
            Character::NinjaHattori => "Ninja Hattori",
            Character::Oggy => "Oggy",
            Character::Jack => "Jack",
            Character::Tom => "Tom",
            Character::Jerry => "Jerry",
            Character::Himawari => "Himawari",
            Character::Cinderella => "Cinderella",
            Character::Shinchan => "Shinchan",
        };
        write!(f, "{name}")
    }
}

/// One of the 4 art styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    Ghibli,
    Sketch,
    Pixar,
    Standard,
}

impl Style {
    /// All 4 styles in deterministic roster order.
    pub const ALL: [Style; 4] =
        [Style::Ghibli, Style::Sketch, Style::Pixar, Style::Standard];
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Ghibli => "Ghibli",
            Style::Sketch => "Sketch",
            Style::Pixar => "Pixar",
            Style::Standard => "Standard",
        };
        write!(f, "{name}")
    }
}

/// A single playing card.
///
/// All 52 cards are distinct by `(character, style)`. The `id` is a stable
/// string key (`"{style}_{character}"`) clients use for asset lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub character: Character,
    pub style: Style,
    pub id: String,
}

impl Card {
    /// Creates a card, deriving its asset id from the pair.
    pub fn new(character: Character, style: Style) -> Self {
        Self {
            character,
            style,
            id: format!("{style}_{character}"),
        }
    }

    /// Returns `true` if the two cards share a character.
    ///
    /// This is the snap rule: style never matters for matching.
    pub fn matches(&self, other: &Card) -> bool {
        self.character == other.character
    }
}
