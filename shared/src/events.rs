//! Room event vocabulary — the payloads broadcast over a game channel.
//!
//! Event names on the wire match the legacy channel protocol
//! (`member.added`, `game-started`, `cards-drawn-chunk`, ...). Every
//! deal-related event carries the `deal_epoch` and the dealer's `deal_order`
//! so receivers never depend on their local membership snapshot staying in
//! sync with the dealer's.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, DeckId};
use crate::player::{PlayerId, PlayerPublic};

/// Cards per `cards-drawn-chunk` event, bounding payload size.
pub const CHUNK_SIZE: usize = 5;

/// One bounded slice of the dealer's flat draw. Chunks cover the entire
/// `10 * players + 1` card draw in order; the final chunk additionally
/// carries the trump card (which is also the last card of the flat draw).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DealChunk {
    pub deal_epoch: u64,
    pub deal_order: Vec<PlayerId>,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub cards: Vec<Card>,
    pub deck_id: DeckId,
    pub remaining: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trump_card: Option<Card>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum RoomEvent {
    /// Server-emitted when a member attaches to the room.
    #[serde(rename = "member.added")]
    MemberAdded { member: PlayerPublic },
    /// Server-emitted when a member detaches from the room.
    #[serde(rename = "member.removed")]
    MemberRemoved { member: PlayerPublic },
    /// Dealer announcement: a deal is beginning against `deck_id`.
    #[serde(rename = "game-started")]
    GameStarted {
        message: String,
        deck_id: DeckId,
        deal_epoch: u64,
        deal_order: Vec<PlayerId>,
    },
    #[serde(rename = "cards-drawn-chunk")]
    CardsDrawnChunk(DealChunk),
    /// Legacy single-shot trump announcement from the pre-chunking protocol.
    /// Accepted as an early hint; the final chunk stays authoritative.
    #[serde(rename = "trump-revealed")]
    TrumpRevealed { trump_card: Card },
    /// Receiver-emitted after a quiet period with chunks still missing; the
    /// dealer answers by re-publishing the named chunks.
    #[serde(rename = "deal-resend-request")]
    DealResendRequest {
        deal_epoch: u64,
        chunk_indexes: Vec<usize>,
    },
}

impl RoomEvent {
    /// Events only the server may emit; clients publishing these are rejected.
    pub fn is_membership_event(&self) -> bool {
        matches!(
            self,
            RoomEvent::MemberAdded { .. } | RoomEvent::MemberRemoved { .. }
        )
    }
}
