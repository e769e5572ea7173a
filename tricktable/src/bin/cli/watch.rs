use std::io::IsTerminal;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{ensure, Context, Result};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use tricktable::deal::{draw_count, plan_deal, PhaseChange, PhaseMachine};
use tricktable::deck::DeckApi;
use tricktable::pretty;
use tricktable_shared::{DealChunk, PlayerId, RoomEvent, ServerMsg};

use super::transport::{self, Attached};

/// Draw a fresh deck, announce the deal and publish every chunk, then stay
/// at the table answering resend requests. Only `members[0]` may deal.
pub async fn deal_and_watch(
    attached: Attached,
    deck_api: &dyn DeckApi,
    resend_after: Duration,
) -> Result<()> {
    let dealer = attached
        .members
        .first()
        .context("cannot deal in an empty room")?;
    ensure!(
        dealer.id == attached.you.id,
        "only the room creator may deal; the dealer here is '{}'",
        dealer.name
    );

    let deal_order: Vec<PlayerId> = attached.members.iter().map(|m| m.id.clone()).collect();
    let new_deck = deck_api
        .new_shuffled()
        .await
        .context("shuffling a new deck")?;
    let wanted = draw_count(deal_order.len());
    let draw = deck_api
        .draw(&new_deck.deck_id, wanted)
        .await
        .with_context(|| format!("drawing {} cards", wanted))?;

    let deal_epoch = next_epoch();
    let chunks = plan_deal(&draw.deck_id, draw.remaining, draw.cards, &deal_order, deal_epoch)?;

    let mut attached = attached;
    transport::publish(
        &mut attached.writer,
        RoomEvent::GameStarted {
            message: "Game has started!".into(),
            deck_id: draw.deck_id,
            deal_epoch,
            deal_order,
        },
    )
    .await?;
    for chunk in &chunks {
        transport::publish(&mut attached.writer, RoomEvent::CardsDrawnChunk(chunk.clone()))
            .await?;
    }

    run_table(attached, Some(chunks), resend_after).await
}

/// Sit at the table: print membership and events, drive the deal state
/// machine, and after a quiet period ask the dealer to resend anything
/// still missing. Runs until the connection closes (or Ctrl-C).
pub async fn run_table(
    mut attached: Attached,
    dealer_chunks: Option<Vec<DealChunk>>,
    resend_after: Duration,
) -> Result<()> {
    let color = std::io::stdout().is_terminal();
    let me = attached.you.id.clone();

    println!("Room: {}", attached.room_id);
    println!("{}", pretty::format_members(&attached.members, &me, color));

    let mut machine = PhaseMachine::new(me.clone());
    loop {
        match tokio::time::timeout(resend_after, attached.reader.next()).await {
            Ok(Some(Ok(Message::Text(txt)))) => {
                let Ok(sm) = serde_json::from_str::<ServerMsg>(&txt) else {
                    continue;
                };
                match sm {
                    ServerMsg::Event(ev) => {
                        println!("{}", pretty::format_event_human(&ev, color));
                        if let Some(chunks) = &dealer_chunks {
                            answer_resend(&mut attached.writer, chunks, &ev).await?;
                        }
                        match machine.on_event(ev) {
                            Ok(PhaseChange::HandReady) => {
                                if let Some(done) = machine.completed() {
                                    println!(
                                        "{}",
                                        pretty::format_hand(&done.hand, &done.trump, color)
                                    );
                                }
                            }
                            Ok(_) => {}
                            Err(e) => tracing::warn!(error = %e, "ignoring malformed deal event"),
                        }
                    }
                    ServerMsg::Members(members) => {
                        println!("{}", pretty::format_members(&members, &me, color));
                    }
                    ServerMsg::Error(e) => eprintln!("Server error: {}", e),
                    ServerMsg::Welcome { .. } | ServerMsg::Pong => {}
                }
            }
            Ok(Some(Ok(Message::Close(_)))) => break,
            Ok(Some(Ok(_other))) => { /* ignore */ }
            Ok(Some(Err(e))) => {
                eprintln!("WebSocket error: {}", e);
                break;
            }
            Ok(None) => break, // socket closed
            Err(_) => {
                // Quiet period elapsed mid-deal; chase the gaps.
                if let Some((deal_epoch, chunk_indexes)) = machine.missing_chunks() {
                    if !chunk_indexes.is_empty() {
                        tracing::info!(deal_epoch, ?chunk_indexes, "requesting chunk resend");
                        transport::publish(
                            &mut attached.writer,
                            RoomEvent::DealResendRequest {
                                deal_epoch,
                                chunk_indexes,
                            },
                        )
                        .await?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Dealer side of the resend protocol: re-publish any cached chunk a
/// receiver reports missing.
async fn answer_resend(
    writer: &mut transport::WsWriter,
    chunks: &[DealChunk],
    event: &RoomEvent,
) -> Result<()> {
    let RoomEvent::DealResendRequest {
        deal_epoch,
        chunk_indexes,
    } = event
    else {
        return Ok(());
    };
    for chunk in chunks_to_resend(chunks, *deal_epoch, chunk_indexes) {
        transport::publish(writer, RoomEvent::CardsDrawnChunk(chunk.clone())).await?;
    }
    Ok(())
}

/// Look the requested chunks up in the dealer's cached deal. Requests for a
/// different epoch or for indexes the cache does not hold are skipped.
fn chunks_to_resend<'a>(
    cached: &'a [DealChunk],
    deal_epoch: u64,
    chunk_indexes: &[usize],
) -> Vec<&'a DealChunk> {
    chunk_indexes
        .iter()
        .filter_map(|index| {
            cached
                .iter()
                .find(|c| c.deal_epoch == deal_epoch && c.chunk_index == *index)
        })
        .collect()
}

/// Millisecond wall-clock epoch; strictly newer deals get strictly larger
/// values as long as the dealer's clock moves forward.
fn next_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tricktable_shared::{Card, DeckId, Suit, Value};

    fn cached_chunks(deal_epoch: u64, n: usize) -> Vec<DealChunk> {
        let order: Vec<PlayerId> = (0..n).map(|i| PlayerId(format!("user-{}", i))).collect();
        let cards: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|&s| Value::ALL.iter().map(move |&v| Card::new(v, s)))
            .take(draw_count(n))
            .collect();
        plan_deal(&DeckId("cached".into()), 21, cards, &order, deal_epoch).unwrap()
    }

    #[test]
    fn resend_lookup_returns_requested_chunks_in_request_order() {
        let cached = cached_chunks(1, 3);
        let out = chunks_to_resend(&cached, 1, &[4, 1]);
        let indexes: Vec<usize> = out.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indexes, vec![4, 1]);
        assert!(out.iter().all(|c| c.deal_epoch == 1));
    }

    #[test]
    fn resend_lookup_skips_foreign_epochs_and_unknown_indexes() {
        let cached = cached_chunks(1, 3);
        assert!(chunks_to_resend(&cached, 2, &[0, 1]).is_empty());

        let out = chunks_to_resend(&cached, 1, &[6, 99]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].chunk_index, 6);
    }
}
