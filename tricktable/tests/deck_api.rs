use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::{Path, Query},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use tricktable::deck::{DeckApi, DeckApiError, HttpDeckApi};
use tricktable_shared::{Card, DeckId, Suit, Value};

fn ordered_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&s| Value::ALL.iter().map(move |&v| Card::new(v, s)))
        .collect()
}

#[derive(Deserialize)]
struct DrawQuery {
    count: usize,
}

async fn stub_shuffle() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "deck_id": "stubdeck",
        "shuffled": true,
        "remaining": 52
    }))
}

async fn stub_draw(
    Path(deck_id): Path<String>,
    Query(q): Query<DrawQuery>,
) -> Json<serde_json::Value> {
    if deck_id == "missing" {
        return Json(serde_json::json!({
            "success": false,
            "deck_id": deck_id,
            "cards": [],
            "remaining": 0
        }));
    }
    // Hand out at most a full deck, like the real API does.
    let deck = ordered_deck();
    let n = q.count.min(deck.len());
    let cards = serde_json::to_value(&deck[..n]).unwrap();
    Json(serde_json::json!({
        "success": true,
        "deck_id": deck_id,
        "cards": cards,
        "remaining": 52usize.saturating_sub(n)
    }))
}

async fn spawn_stub() -> Result<SocketAddr> {
    let app = Router::new()
        .route("/deck/new/shuffle/", get(stub_shuffle))
        .route("/deck/:deck_id/draw/", get(stub_draw));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(addr)
}

#[tokio::test]
async fn shuffle_then_draw_roundtrip() -> Result<()> {
    let addr = spawn_stub().await?;
    let api = HttpDeckApi::new(format!("http://{}", addr));

    let deck = api.new_shuffled().await?;
    assert_eq!(deck.deck_id, DeckId("stubdeck".into()));
    assert_eq!(deck.remaining, 52);

    let draw = api.draw(&deck.deck_id, 31).await?;
    assert_eq!(draw.cards.len(), 31);
    assert_eq!(draw.remaining, 21);
    assert_eq!(draw.cards[0].code, "2S");
    assert_eq!(draw.cards[0].value, Value::Two);
    assert_eq!(draw.cards[0].suit, Suit::Spades);
    Ok(())
}

#[tokio::test]
async fn short_draws_are_rejected() -> Result<()> {
    let addr = spawn_stub().await?;
    let api = HttpDeckApi::new(format!("http://{}", addr));

    let err = api
        .draw(&DeckId("stubdeck".into()), 60)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeckApiError::ShortDraw {
            wanted: 60,
            got: 52
        }
    ));
    Ok(())
}

#[tokio::test]
async fn unsuccessful_responses_surface_as_api_errors() -> Result<()> {
    let addr = spawn_stub().await?;
    let api = HttpDeckApi::new(format!("http://{}", addr));

    let err = api.draw(&DeckId("missing".into()), 5).await.unwrap_err();
    assert!(matches!(err, DeckApiError::Api(_)));
    Ok(())
}
