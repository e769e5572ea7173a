//! Receiver-side reassembly of a chunked deal.
//!
//! Chunks may arrive in any order and more than once; each one is slotted by
//! `chunk_index`. The expected chunk count is known from the deal order alone
//! (see [`dealer::chunk_count`]), so gaps can be reported for resend before
//! the final chunk has been seen. Once every slot is filled the flat draw is
//! rebuilt in index order and the local hand extracted by stride: player `i`
//! of `n` owns cards `i, i + n, i + 2n, ...` of the first `10n` cards, sorted
//! by the fixed suit/value order. The draw's last card is the trump.

use tricktable_shared::{sort_hand, Card, DealChunk, DeckId, PlayerId, HAND_SIZE};

use super::{dealer, DealError};

/// Outcome of a finished deal for one client.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedDeal {
    pub deal_epoch: u64,
    pub deck_id: DeckId,
    pub hand: Vec<Card>,
    pub trump: Card,
    pub remaining: u32,
}

#[derive(Clone, Debug)]
pub struct DealAssembly {
    me: PlayerId,
    deal_epoch: u64,
    deal_order: Vec<PlayerId>,
    deck_id: DeckId,
    slots: Vec<Option<Vec<Card>>>,
    trump_hint: Option<Card>,
    remaining: u32,
}

impl DealAssembly {
    /// Start assembling a deal announced with `deal_order` for epoch
    /// `deal_epoch`. Fails if `me` does not appear in the order.
    pub fn new(
        me: PlayerId,
        deal_epoch: u64,
        deal_order: Vec<PlayerId>,
        deck_id: DeckId,
    ) -> Result<Self, DealError> {
        if !deal_order.contains(&me) {
            return Err(DealError::NotInDealOrder(me));
        }
        let slots = vec![None; dealer::chunk_count(deal_order.len())];
        Ok(DealAssembly {
            me,
            deal_epoch,
            deal_order,
            deck_id,
            slots,
            trump_hint: None,
            remaining: 0,
        })
    }

    /// Bootstrap an assembly straight from a chunk, for clients that never
    /// saw the `game-started` announcement (late joiners, reordered
    /// delivery). The chunk itself carries everything needed.
    pub fn from_chunk(me: PlayerId, chunk: DealChunk) -> Result<(Self, Option<CompletedDeal>), DealError> {
        let mut assembly = DealAssembly::new(
            me,
            chunk.deal_epoch,
            chunk.deal_order.clone(),
            chunk.deck_id.clone(),
        )?;
        let done = assembly.accept(chunk)?;
        Ok((assembly, done))
    }

    pub fn deal_epoch(&self) -> u64 {
        self.deal_epoch
    }

    pub fn deal_order(&self) -> &[PlayerId] {
        &self.deal_order
    }

    /// Chunk indexes not yet received, in ascending order.
    pub fn missing_chunks(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_none().then_some(i))
            .collect()
    }

    /// Record the legacy `trump-revealed` announcement. Purely advisory; a
    /// chunk-carried trump always overwrites it, so a bogus hint can never
    /// block completion.
    pub fn set_trump_hint(&mut self, trump: Card) {
        self.trump_hint.get_or_insert(trump);
    }

    /// Accept one chunk. Returns `Ok(Some(_))` when this chunk completed the
    /// deal, `Ok(None)` when more chunks are still outstanding (duplicates
    /// land here too).
    pub fn accept(&mut self, chunk: DealChunk) -> Result<Option<CompletedDeal>, DealError> {
        if chunk.deal_epoch != self.deal_epoch {
            return Err(DealError::EpochMismatch {
                expected: self.deal_epoch,
                got: chunk.deal_epoch,
            });
        }
        if chunk.deal_order != self.deal_order {
            return Err(DealError::DealOrderMismatch);
        }
        let total = self.slots.len();
        if chunk.total_chunks != total {
            return Err(DealError::TotalChunksMismatch {
                expected: total,
                got: chunk.total_chunks,
            });
        }
        if chunk.chunk_index >= total {
            return Err(DealError::ChunkIndexOutOfRange {
                index: chunk.chunk_index,
                total,
            });
        }

        // The chunk's trump is authoritative and replaces any earlier hint.
        if let Some(trump) = &chunk.trump_card {
            self.trump_hint = Some(trump.clone());
        }
        self.remaining = chunk.remaining;

        let slot = &mut self.slots[chunk.chunk_index];
        if slot.is_none() {
            *slot = Some(chunk.cards);
        }

        if self.slots.iter().any(|s| s.is_none()) {
            return Ok(None);
        }
        self.complete().map(Some)
    }

    fn complete(&self) -> Result<CompletedDeal, DealError> {
        let flat: Vec<Card> = self
            .slots
            .iter()
            .flat_map(|s| s.as_ref().expect("all slots filled").iter().cloned())
            .collect();

        let n = self.deal_order.len();
        let expected = dealer::draw_count(n);
        if flat.len() != expected {
            return Err(DealError::WrongDrawSize {
                expected,
                got: flat.len(),
            });
        }

        let trump = self.trump_hint.clone().ok_or(DealError::MissingTrump)?;
        if flat[expected - 1] != trump {
            return Err(DealError::TrumpMismatch);
        }

        let my_index = self
            .deal_order
            .iter()
            .position(|p| *p == self.me)
            .expect("checked at construction");
        let mut hand: Vec<Card> = (0..HAND_SIZE)
            .map(|k| flat[my_index + k * n].clone())
            .collect();
        sort_hand(&mut hand);

        Ok(CompletedDeal {
            deal_epoch: self.deal_epoch,
            deck_id: self.deck_id.clone(),
            hand,
            trump,
            remaining: self.remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::dealer::{plan_deal, test_draw};
    use std::collections::HashSet;

    fn order(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| PlayerId(format!("user-{}", i))).collect()
    }

    fn deal_for(n: usize) -> (Vec<tricktable_shared::DealChunk>, Vec<Card>) {
        let cards = test_draw(dealer::draw_count(n));
        let deck_id = DeckId("testdeck".into());
        let chunks = plan_deal(&deck_id, 52 - cards.len() as u32, cards.clone(), &order(n), 1)
            .expect("plan");
        (chunks, cards)
    }

    fn assemble(me: &PlayerId, n: usize, chunks: Vec<tricktable_shared::DealChunk>) -> CompletedDeal {
        let mut asm = DealAssembly::new(
            me.clone(),
            1,
            order(n),
            DeckId("testdeck".into()),
        )
        .unwrap();
        let mut done = None;
        for c in chunks {
            if let Some(d) = asm.accept(c).expect("chunk accepted") {
                done = Some(d);
            }
        }
        done.expect("deal completed")
    }

    #[test]
    fn stride_partition_is_exact_for_all_player_counts() {
        for n in 2..=5 {
            let (chunks, cards) = deal_for(n);
            let trump = cards.last().unwrap();
            let mut seen: HashSet<String> = HashSet::new();
            for p in order(n) {
                let done = assemble(&p, n, chunks.clone());
                assert_eq!(done.hand.len(), 10);
                assert_eq!(&done.trump, trump);
                for card in &done.hand {
                    assert!(seen.insert(card.code.clone()), "card dealt twice: {}", card.code);
                    assert_ne!(card, trump);
                }
            }
            assert_eq!(seen.len(), 10 * n, "partition must cover all non-trump cards");
        }
    }

    #[test]
    fn out_of_order_and_duplicate_chunks_yield_the_same_hand() {
        let n = 3;
        let (chunks, _) = deal_for(n);
        let me = PlayerId("user-1".into());

        let in_order = assemble(&me, n, chunks.clone());

        let mut shuffled = chunks.clone();
        shuffled.reverse();
        shuffled.push(chunks[2].clone()); // duplicate after completion is never reached
        shuffled.insert(1, chunks[6].clone()); // duplicate mid-stream

        let mut asm = DealAssembly::new(me, 1, order(n), DeckId("testdeck".into())).unwrap();
        let mut done = None;
        for c in shuffled {
            match asm.accept(c) {
                Ok(Some(d)) => {
                    done = Some(d);
                    break;
                }
                Ok(None) => {}
                Err(e) => panic!("accept failed: {e}"),
            }
        }
        assert_eq!(done.expect("completed"), in_order);
    }

    #[test]
    fn reports_missing_chunks_until_complete() {
        let n = 2;
        let (chunks, _) = deal_for(n);
        let me = PlayerId("user-0".into());
        let mut asm = DealAssembly::new(me, 1, order(n), DeckId("testdeck".into())).unwrap();
        // 21 cards -> 5 chunks.
        assert_eq!(asm.missing_chunks(), vec![0, 1, 2, 3, 4]);
        asm.accept(chunks[3].clone()).unwrap();
        asm.accept(chunks[0].clone()).unwrap();
        assert_eq!(asm.missing_chunks(), vec![1, 2, 4]);
    }

    #[test]
    fn stale_trump_hint_cannot_block_completion() {
        use tricktable_shared::{Suit, Value};
        let n = 3;
        let (chunks, cards) = deal_for(n);
        let trump = cards.last().unwrap();
        let me = PlayerId("user-0".into());
        let mut asm = DealAssembly::new(me, 1, order(n), DeckId("testdeck".into())).unwrap();

        // A wrong early trump-revealed must not outrank the final chunk.
        let bogus = Card::new(Value::Ace, Suit::Diamonds);
        assert_ne!(&bogus, trump);
        asm.set_trump_hint(bogus);

        let mut done = None;
        for c in chunks {
            if let Some(d) = asm.accept(c).expect("chunk accepted") {
                done = Some(d);
            }
        }
        assert_eq!(&done.expect("deal completed").trump, trump);
    }

    #[test]
    fn rejects_foreign_epochs_and_orders() {
        let n = 3;
        let (chunks, _) = deal_for(n);
        let me = PlayerId("user-0".into());
        let mut asm =
            DealAssembly::new(me.clone(), 2, order(n), DeckId("testdeck".into())).unwrap();
        assert_eq!(
            asm.accept(chunks[0].clone()),
            Err(DealError::EpochMismatch {
                expected: 2,
                got: 1
            })
        );

        let mut asm = DealAssembly::new(me, 1, order(n), DeckId("testdeck".into())).unwrap();
        let mut wrong = chunks[0].clone();
        wrong.deal_order.rotate_left(1);
        assert_eq!(asm.accept(wrong), Err(DealError::DealOrderMismatch));
    }

    #[test]
    fn player_outside_deal_order_cannot_assemble() {
        let err = DealAssembly::new(
            PlayerId("stranger".into()),
            1,
            order(3),
            DeckId("testdeck".into()),
        )
        .unwrap_err();
        assert_eq!(err, DealError::NotInDealOrder(PlayerId("stranger".into())));
    }

    #[test]
    fn bootstrap_from_chunk_matches_announced_assembly() {
        let n = 3;
        let (chunks, _) = deal_for(n);
        let me = PlayerId("user-2".into());
        let (mut asm, done) =
            DealAssembly::from_chunk(me.clone(), chunks[4].clone()).expect("bootstrap");
        assert!(done.is_none());
        let mut done = None;
        for c in chunks.iter().filter(|c| c.chunk_index != 4).cloned() {
            if let Some(d) = asm.accept(c).unwrap() {
                done = Some(d);
            }
        }
        assert_eq!(done.unwrap(), assemble(&me, n, chunks));
    }
}
