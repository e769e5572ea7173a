//! Per-room deal state machine: `Lobby → Dealing → InProgress`.
//!
//! Drives the assembly from raw room events, independent of any transport,
//! so the whole handshake is testable without a server. A `game-started`
//! with a newer epoch always wins; chunks from a newer epoch bootstrap a
//! fresh assembly (the client evidently missed the announcement), while
//! stale-epoch traffic is dropped.

use tricktable_shared::{PlayerId, RoomEvent};

use super::assembly::{CompletedDeal, DealAssembly};
use super::DealError;

pub enum RoomPhase {
    Lobby,
    Dealing(DealAssembly),
    InProgress(CompletedDeal),
}

/// What a processed event did to the phase.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseChange {
    None,
    /// A deal started (or restarted under a newer epoch).
    DealStarted { deal_epoch: u64 },
    /// The local hand is ready; the room is now in progress.
    HandReady,
}

pub struct PhaseMachine {
    me: PlayerId,
    phase: RoomPhase,
}

impl PhaseMachine {
    pub fn new(me: PlayerId) -> Self {
        PhaseMachine {
            me,
            phase: RoomPhase::Lobby,
        }
    }

    pub fn phase(&self) -> &RoomPhase {
        &self.phase
    }

    pub fn completed(&self) -> Option<&CompletedDeal> {
        match &self.phase {
            RoomPhase::InProgress(done) => Some(done),
            _ => None,
        }
    }

    /// Chunks still outstanding for the active deal, if one is running.
    pub fn missing_chunks(&self) -> Option<(u64, Vec<usize>)> {
        match &self.phase {
            RoomPhase::Dealing(asm) => Some((asm.deal_epoch(), asm.missing_chunks())),
            _ => None,
        }
    }

    /// Feed one room event through the machine.
    pub fn on_event(&mut self, event: RoomEvent) -> Result<PhaseChange, DealError> {
        match event {
            RoomEvent::GameStarted {
                deck_id,
                deal_epoch,
                deal_order,
                ..
            } => {
                if self.current_epoch().is_some_and(|cur| deal_epoch <= cur) {
                    return Ok(PhaseChange::None);
                }
                let asm = DealAssembly::new(self.me.clone(), deal_epoch, deal_order, deck_id)?;
                self.phase = RoomPhase::Dealing(asm);
                Ok(PhaseChange::DealStarted { deal_epoch })
            }
            RoomEvent::CardsDrawnChunk(chunk) => self.on_chunk(chunk),
            RoomEvent::TrumpRevealed { trump_card } => {
                if let RoomPhase::Dealing(asm) = &mut self.phase {
                    asm.set_trump_hint(trump_card);
                }
                Ok(PhaseChange::None)
            }
            // Membership churn and resend traffic never move the phase.
            RoomEvent::MemberAdded { .. }
            | RoomEvent::MemberRemoved { .. }
            | RoomEvent::DealResendRequest { .. } => Ok(PhaseChange::None),
        }
    }

    fn on_chunk(&mut self, chunk: tricktable_shared::DealChunk) -> Result<PhaseChange, DealError> {
        let epoch = chunk.deal_epoch;
        let active = matches!(&self.phase, RoomPhase::Dealing(asm) if asm.deal_epoch() == epoch);
        if active {
            let RoomPhase::Dealing(asm) = &mut self.phase else {
                unreachable!()
            };
            if let Some(done) = asm.accept(chunk)? {
                self.phase = RoomPhase::InProgress(done);
                return Ok(PhaseChange::HandReady);
            }
            return Ok(PhaseChange::None);
        }

        // Missed (or outlived) the announcement. A newer epoch bootstraps a
        // fresh assembly from the chunk itself; anything stale is dropped.
        if self.current_epoch().is_some_and(|cur| epoch <= cur) {
            return Ok(PhaseChange::None);
        }
        let (asm, done) = DealAssembly::from_chunk(self.me.clone(), chunk)?;
        match done {
            Some(done) => {
                self.phase = RoomPhase::InProgress(done);
                Ok(PhaseChange::HandReady)
            }
            None => {
                self.phase = RoomPhase::Dealing(asm);
                Ok(PhaseChange::DealStarted { deal_epoch: epoch })
            }
        }
    }

    fn current_epoch(&self) -> Option<u64> {
        match &self.phase {
            RoomPhase::Lobby => None,
            RoomPhase::Dealing(asm) => Some(asm.deal_epoch()),
            RoomPhase::InProgress(done) => Some(done.deal_epoch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::dealer::{draw_count, plan_deal, test_draw};
    use tricktable_shared::DeckId;

    fn order(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| PlayerId(format!("user-{}", i))).collect()
    }

    fn started(epoch: u64, n: usize) -> RoomEvent {
        RoomEvent::GameStarted {
            message: "Game has started!".into(),
            deck_id: DeckId("testdeck".into()),
            deal_epoch: epoch,
            deal_order: order(n),
        }
    }

    fn chunks(epoch: u64, n: usize) -> Vec<tricktable_shared::DealChunk> {
        let cards = test_draw(draw_count(n));
        plan_deal(&DeckId("testdeck".into()), 0, cards, &order(n), epoch).unwrap()
    }

    #[test]
    fn lobby_to_dealing_to_in_progress() {
        let mut m = PhaseMachine::new(PlayerId("user-0".into()));
        assert!(matches!(m.phase(), RoomPhase::Lobby));

        assert_eq!(
            m.on_event(started(1, 3)).unwrap(),
            PhaseChange::DealStarted { deal_epoch: 1 }
        );
        assert!(matches!(m.phase(), RoomPhase::Dealing(_)));

        let mut last = PhaseChange::None;
        for c in chunks(1, 3) {
            last = m.on_event(RoomEvent::CardsDrawnChunk(c)).unwrap();
        }
        assert_eq!(last, PhaseChange::HandReady);
        assert_eq!(m.completed().unwrap().hand.len(), 10);
    }

    #[test]
    fn chunk_before_announcement_bootstraps_the_deal() {
        let mut m = PhaseMachine::new(PlayerId("user-1".into()));
        let all = chunks(1, 2);
        assert_eq!(
            m.on_event(RoomEvent::CardsDrawnChunk(all[0].clone())).unwrap(),
            PhaseChange::DealStarted { deal_epoch: 1 }
        );
        // The announcement arriving afterwards must not reset progress.
        assert_eq!(m.on_event(started(1, 2)).unwrap(), PhaseChange::None);
        assert_eq!(m.missing_chunks().unwrap().1, vec![1, 2, 3, 4]);
    }

    #[test]
    fn newer_epoch_restarts_stale_traffic_is_dropped() {
        let mut m = PhaseMachine::new(PlayerId("user-0".into()));
        m.on_event(started(1, 3)).unwrap();
        let old = chunks(1, 3);
        m.on_event(RoomEvent::CardsDrawnChunk(old[0].clone())).unwrap();

        // Dealer restarted the deal under epoch 2.
        assert_eq!(
            m.on_event(started(2, 3)).unwrap(),
            PhaseChange::DealStarted { deal_epoch: 2 }
        );
        // Epoch-1 stragglers are ignored, not errors.
        assert_eq!(
            m.on_event(RoomEvent::CardsDrawnChunk(old[1].clone())).unwrap(),
            PhaseChange::None
        );

        let mut last = PhaseChange::None;
        for c in chunks(2, 3) {
            last = m.on_event(RoomEvent::CardsDrawnChunk(c)).unwrap();
        }
        assert_eq!(last, PhaseChange::HandReady);
    }

    #[test]
    fn bogus_trump_reveal_does_not_stall_the_deal() {
        let mut m = PhaseMachine::new(PlayerId("user-0".into()));
        m.on_event(started(1, 3)).unwrap();
        let bogus = tricktable_shared::Card::new(
            tricktable_shared::Value::Ace,
            tricktable_shared::Suit::Diamonds,
        );
        m.on_event(RoomEvent::TrumpRevealed { trump_card: bogus })
            .unwrap();

        let mut last = PhaseChange::None;
        for c in chunks(1, 3) {
            last = m.on_event(RoomEvent::CardsDrawnChunk(c)).unwrap();
        }
        assert_eq!(last, PhaseChange::HandReady);
        assert!(m.missing_chunks().is_none());
        assert_eq!(m.completed().unwrap().hand.len(), 10);
    }

    #[test]
    fn membership_events_do_not_move_the_phase() {
        let mut m = PhaseMachine::new(PlayerId("user-0".into()));
        m.on_event(started(1, 2)).unwrap();
        let ev = RoomEvent::MemberAdded {
            member: tricktable_shared::PlayerPublic::new("user-9", "Newcomer"),
        };
        assert_eq!(m.on_event(ev).unwrap(), PhaseChange::None);
        assert!(matches!(m.phase(), RoomPhase::Dealing(_)));
    }
}
