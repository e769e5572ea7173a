//! Dealer-side planning: turn one flat draw into a broadcastable chunk
//! sequence.

use tricktable_shared::{Card, DealChunk, DeckId, PlayerId, CHUNK_SIZE, HAND_SIZE};

use super::{DealError, MAX_PLAYERS, MIN_PLAYERS};

/// Cards the dealer draws for `player_count` players: ten per hand plus the
/// trump card.
pub fn draw_count(player_count: usize) -> usize {
    player_count * HAND_SIZE + 1
}

/// Number of chunks a deal for `player_count` players occupies. Derivable by
/// every receiver from the deal order alone, which is what lets the assembly
/// size its slots before the first chunk arrives.
pub fn chunk_count(player_count: usize) -> usize {
    draw_count(player_count).div_ceil(CHUNK_SIZE)
}

/// Split a flat draw into broadcast chunks.
///
/// `cards` must be exactly `draw_count(deal_order.len())` long; its last card
/// is the trump, repeated in the final chunk's `trump_card` field. Every
/// chunk carries the epoch and deal order so receivers can verify and, if
/// necessary, bootstrap a deal they never saw announced.
pub fn plan_deal(
    deck_id: &DeckId,
    remaining: u32,
    cards: Vec<Card>,
    deal_order: &[PlayerId],
    deal_epoch: u64,
) -> Result<Vec<DealChunk>, DealError> {
    let n = deal_order.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
        return Err(DealError::PlayerCount(n));
    }
    let expected = draw_count(n);
    if cards.len() != expected {
        return Err(DealError::WrongDrawSize {
            expected,
            got: cards.len(),
        });
    }

    let trump = cards.last().cloned().expect("draw is never empty");
    let total = chunk_count(n);
    let chunks = cards
        .chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(i, slice)| DealChunk {
            deal_epoch,
            deal_order: deal_order.to_vec(),
            chunk_index: i,
            total_chunks: total,
            cards: slice.to_vec(),
            deck_id: deck_id.clone(),
            remaining,
            trump_card: (i == total - 1).then(|| trump.clone()),
        })
        .collect();
    Ok(chunks)
}

/// Deterministic pseudo-shuffled draw for tests.
#[cfg(test)]
pub(crate) fn test_draw(count: usize) -> Vec<Card> {
    use tricktable_shared::{Suit, Value};
    let deck: Vec<Card> = Suit::ALL
        .iter()
        .flat_map(|&s| Value::ALL.iter().map(move |&v| Card::new(v, s)))
        .collect();
    // Walk the sorted deck with stride 17 (coprime with 52) so the picks are
    // distinct up to 52 cards and consecutive draw cards change suit; past 52
    // the walk wraps, which only error-path tests rely on.
    (0..count).map(|i| deck[(i * 17) % 52].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(n: usize) -> Vec<PlayerId> {
        (0..n).map(|i| PlayerId(format!("user-{}", i))).collect()
    }

    #[test]
    fn draw_count_is_ten_per_player_plus_trump() {
        for n in 2..=5 {
            assert_eq!(draw_count(n), 10 * n + 1);
        }
    }

    #[test]
    fn three_players_yield_seven_chunks_last_of_one() {
        let deck_id = DeckId("testdeck".into());
        let cards = test_draw(31);
        let trump = cards.last().cloned().unwrap();
        let chunks = plan_deal(&deck_id, 21, cards, &order(3), 1).unwrap();
        assert_eq!(chunks.len(), 7);
        assert!(chunks[..6].iter().all(|c| c.cards.len() == 5));
        assert_eq!(chunks[6].cards.len(), 1);
        assert!(chunks[..6].iter().all(|c| c.trump_card.is_none()));
        assert_eq!(chunks[6].trump_card.as_ref(), Some(&trump));
        assert!(chunks.iter().all(|c| c.total_chunks == 7));
        assert!(chunks
            .iter()
            .enumerate()
            .all(|(i, c)| c.chunk_index == i && c.deal_epoch == 1));
    }

    #[test]
    fn rejects_wrong_draw_sizes_and_player_counts() {
        let deck_id = DeckId("testdeck".into());
        assert_eq!(
            plan_deal(&deck_id, 0, test_draw(30), &order(3), 1),
            Err(DealError::WrongDrawSize {
                expected: 31,
                got: 30
            })
        );
        assert_eq!(
            plan_deal(&deck_id, 0, test_draw(11), &order(1), 1),
            Err(DealError::PlayerCount(1))
        );
        assert_eq!(
            plan_deal(&deck_id, 0, test_draw(61), &order(6), 1),
            Err(DealError::PlayerCount(6))
        );
    }
}
