//! Client for the external deck-of-cards HTTP API.
//!
//! The dealer talks to the API through the [`DeckApi`] trait so the deal flow
//! can be driven against a stub in tests instead of a live service. The real
//! implementation speaks the deckofcardsapi.com wire format against any
//! compatible base URL.

use async_trait::async_trait;
use serde::Deserialize;

use tricktable_shared::{Card, DeckId};

#[derive(Debug, thiserror::Error)]
pub enum DeckApiError {
    #[error("deck api request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("deck api reported failure: {0}")]
    Api(String),
    #[error("short draw: wanted {wanted} cards, got {got}")]
    ShortDraw { wanted: usize, got: usize },
}

/// A freshly shuffled deck held by the external API.
#[derive(Clone, Debug)]
pub struct NewDeck {
    pub deck_id: DeckId,
    pub remaining: u32,
}

/// Result of drawing `cards.len()` cards; `remaining` is the API's count of
/// cards left in the deck.
#[derive(Clone, Debug)]
pub struct Draw {
    pub deck_id: DeckId,
    pub cards: Vec<Card>,
    pub remaining: u32,
}

#[async_trait]
pub trait DeckApi: Send + Sync {
    async fn new_shuffled(&self) -> Result<NewDeck, DeckApiError>;
    async fn draw(&self, deck: &DeckId, count: usize) -> Result<Draw, DeckApiError>;
}

/// HTTP implementation against a deckofcardsapi-compatible service.
pub struct HttpDeckApi {
    base: String,
    client: reqwest::Client,
}

impl HttpDeckApi {
    /// `base` is the API root, e.g. `https://deckofcardsapi.com/api`.
    pub fn new(base: impl Into<String>) -> Self {
        HttpDeckApi {
            base: base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ShuffleResponse {
    success: bool,
    deck_id: String,
    remaining: u32,
}

#[derive(Deserialize)]
struct DrawResponse {
    success: bool,
    deck_id: String,
    cards: Vec<Card>,
    remaining: u32,
}

#[async_trait]
impl DeckApi for HttpDeckApi {
    async fn new_shuffled(&self) -> Result<NewDeck, DeckApiError> {
        let url = format!("{}/deck/new/shuffle/?deck_count=1", self.base);
        let resp: ShuffleResponse = self.client.get(&url).send().await?.json().await?;
        if !resp.success {
            return Err(DeckApiError::Api("shuffle request unsuccessful".into()));
        }
        tracing::debug!(deck_id = %resp.deck_id, remaining = resp.remaining, "shuffled new deck");
        Ok(NewDeck {
            deck_id: DeckId(resp.deck_id),
            remaining: resp.remaining,
        })
    }

    async fn draw(&self, deck: &DeckId, count: usize) -> Result<Draw, DeckApiError> {
        let url = format!("{}/deck/{}/draw/?count={}", self.base, deck.0, count);
        let resp: DrawResponse = self.client.get(&url).send().await?.json().await?;
        if !resp.success {
            return Err(DeckApiError::Api(format!(
                "draw of {} from deck {} unsuccessful",
                count, deck
            )));
        }
        if resp.cards.len() != count {
            return Err(DeckApiError::ShortDraw {
                wanted: count,
                got: resp.cards.len(),
            });
        }
        tracing::debug!(deck_id = %resp.deck_id, count, remaining = resp.remaining, "drew cards");
        Ok(Draw {
            deck_id: DeckId(resp.deck_id),
            cards: resp.cards,
            remaining: resp.remaining,
        })
    }
}
