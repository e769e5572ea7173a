//! Wire types shared by the tricktable server, clients and tests.

pub mod auth;
pub mod cards;
pub mod events;
pub mod messages;
pub mod player;

pub use auth::{
    ApiMessage, JoinGameRequest, LoginRequest, LoginResponse, SignupRequest, SignupResponse,
};
pub use cards::{sort_hand, Card, DeckId, Suit, Value, HAND_SIZE};
pub use events::{DealChunk, RoomEvent, CHUNK_SIZE};
pub use messages::{ClientMsg, ServerMsg};
pub use player::{PlayerId, PlayerPublic};
