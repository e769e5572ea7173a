//! WebSocket protocol between clients and the tricktable server.

use serde::{Deserialize, Serialize};

use crate::events::RoomEvent;
use crate::player::PlayerPublic;

/// Messages clients send over the websocket. The first message on a fresh
/// connection must be `Create` or `Join` to attach the connection to a room.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMsg {
    /// Create a new room and attach to it.
    Create { token: String },
    /// Attach to an existing room.
    Join { token: String, room_id: String },
    /// Broadcast an event to the attached room.
    Publish(RoomEvent),
    /// Ask for the current membership snapshot (join order preserved).
    RequestMembers,
    Ping,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMsg {
    /// Sent once after a successful attach. `members` is the join-ordered
    /// snapshot; `members[0]` is the dealer by convention. `game_started`
    /// lets late joiners learn the room is already past the lobby.
    Welcome {
        room_id: String,
        you: PlayerPublic,
        members: Vec<PlayerPublic>,
        game_started: bool,
    },
    Members(Vec<PlayerPublic>),
    Event(RoomEvent),
    Error(String),
    Pong,
}
