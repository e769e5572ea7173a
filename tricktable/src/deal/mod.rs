//! The card-dealing and turn-synchronization protocol.
//!
//! One designated client (the first member of the room) draws the whole deal
//! from the external deck API in a single flat draw of `10 * players + 1`
//! cards, then broadcasts that flat list across bounded 5-card chunks. Every
//! client (the dealer included) reconstructs its own hand from the chunk
//! stream by stride arithmetic over the reassembled list, so no per-player
//! payloads ever cross the channel.
//!
//! [`dealer`] builds the chunk sequence, [`assembly`] reassembles it (out of
//! order, duplicate-tolerant, epoch-checked) and [`phase`] drives the
//! lobby → dealing → in-progress state machine from raw room events.

pub mod assembly;
pub mod dealer;
pub mod phase;

pub use assembly::{CompletedDeal, DealAssembly};
pub use dealer::{draw_count, plan_deal};
pub use phase::{PhaseChange, PhaseMachine, RoomPhase};

use tricktable_shared::PlayerId;

/// Player counts the deal supports (the draw must fit one 52-card deck).
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 5;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DealError {
    #[error("unsupported player count {0}, expected {MIN_PLAYERS}..={MAX_PLAYERS}")]
    PlayerCount(usize),
    #[error("wrong draw size: expected {expected} cards, got {got}")]
    WrongDrawSize { expected: usize, got: usize },
    #[error("chunk is for epoch {got}, current deal is epoch {expected}")]
    EpochMismatch { expected: u64, got: u64 },
    #[error("chunk index {index} out of range for {total} chunks")]
    ChunkIndexOutOfRange { index: usize, total: usize },
    #[error("chunk claims {got} total chunks, deal order implies {expected}")]
    TotalChunksMismatch { expected: usize, got: usize },
    #[error("player {0} is not part of the deal order")]
    NotInDealOrder(PlayerId),
    #[error("deal order in chunk does not match the announced deal order")]
    DealOrderMismatch,
    #[error("final chunk carries no trump card")]
    MissingTrump,
    #[error("trump card does not match the last card of the flat draw")]
    TrumpMismatch,
}
