//! Player identity types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player (the account's user id).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PlayerId(pub String);

impl From<String> for PlayerId {
    fn from(v: String) -> Self {
        PlayerId(v)
    }
}

impl From<&str> for PlayerId {
    fn from(v: &str) -> Self {
        PlayerId(v.to_string())
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public view of a player as mirrored into room membership lists.
///
/// `score` is carried for the eventual trick-resolution rules; nothing in the
/// current game flow updates it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub score: u32,
}

impl PlayerPublic {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        PlayerPublic {
            id: id.into(),
            name: name.into(),
            score: 0,
        }
    }
}
