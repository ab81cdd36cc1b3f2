//! Daily mood selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Angry,
    Sad,
    Normal,
    Happy,
    Energized,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Angry,
        Mood::Sad,
        Mood::Normal,
        Mood::Happy,
        Mood::Energized,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Angry => "😡",
            Self::Sad => "😢",
            Self::Normal => "😐",
            Self::Happy => "😄",
            Self::Energized => "⚡️",
        }
    }

    /// Accent color name the shell themes itself with.
    pub fn accent_color(self) -> &'static str {
        match self {
            Self::Happy => "green",
            Self::Sad => "gray",
            Self::Normal => "yellow",
            Self::Angry => "red",
            Self::Energized => "purple",
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Sad => "sad",
            Self::Normal => "normal",
            Self::Happy => "happy",
            Self::Energized => "energized",
        }
    }

    pub fn from_tag(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mood| mood.as_tag() == value)
    }
}
