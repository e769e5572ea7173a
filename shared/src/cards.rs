//! Card types in the deck-of-cards API wire format.
//!
//! Suits and values are serialized as the API's upper-case strings
//! ("SPADES", "ACE", "10", ...) and every card carries its two-character
//! `code` ("AS", "0D" — `0` stands for 10) plus an opaque image URL.
//! Declaration order of the enums is the fixed total order used to sort
//! hands: suits SPADES, HEARTS, CLUBS, DIAMONDS, values 2..10, J, Q, K, A.

use serde::{Deserialize, Serialize};

/// Number of cards in a dealt hand.
pub const HAND_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    /// One-character suit code used in card codes ("AS", "0D", ...).
    pub fn code_char(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
        }
    }

    pub fn from_code_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(Suit::Spades),
            'H' => Some(Suit::Hearts),
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            _ => None,
        }
    }

    pub fn icon(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "JACK")]
    Jack,
    #[serde(rename = "QUEEN")]
    Queen,
    #[serde(rename = "KING")]
    King,
    #[serde(rename = "ACE")]
    Ace,
}

impl Value {
    pub const ALL: [Value; 13] = [
        Value::Two,
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
        Value::Ten,
        Value::Jack,
        Value::Queen,
        Value::King,
        Value::Ace,
    ];

    /// One-character value code used in card codes; the API uses '0' for 10.
    pub fn code_char(self) -> char {
        match self {
            Value::Two => '2',
            Value::Three => '3',
            Value::Four => '4',
            Value::Five => '5',
            Value::Six => '6',
            Value::Seven => '7',
            Value::Eight => '8',
            Value::Nine => '9',
            Value::Ten => '0',
            Value::Jack => 'J',
            Value::Queen => 'Q',
            Value::King => 'K',
            Value::Ace => 'A',
        }
    }

    pub fn from_code_char(c: char) -> Option<Self> {
        match c {
            '2' => Some(Value::Two),
            '3' => Some(Value::Three),
            '4' => Some(Value::Four),
            '5' => Some(Value::Five),
            '6' => Some(Value::Six),
            '7' => Some(Value::Seven),
            '8' => Some(Value::Eight),
            '9' => Some(Value::Nine),
            '0' => Some(Value::Ten),
            'J' => Some(Value::Jack),
            'Q' => Some(Value::Queen),
            'K' => Some(Value::King),
            'A' => Some(Value::Ace),
            _ => None,
        }
    }
}

/// A single playing card as returned by the external deck API. Immutable once
/// drawn; `image` is an opaque reference rendered by UIs, never interpreted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub code: String,
    pub value: Value,
    pub suit: Suit,
    pub image: String,
}

impl Card {
    /// Build a card from value and suit, deriving `code` and the canonical
    /// API image URL.
    pub fn new(value: Value, suit: Suit) -> Self {
        let code = format!("{}{}", value.code_char(), suit.code_char());
        let image = format!("https://deckofcardsapi.com/static/img/{}.png", code);
        Card {
            code,
            value,
            suit,
            image,
        }
    }

    /// Parse a two-character API code like "AS" or "0D".
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let value = Value::from_code_char(chars.next()?)?;
        let suit = Suit::from_code_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Card::new(value, suit))
    }

    /// The fixed total order key: (suit order, value order).
    pub fn sort_key(&self) -> (Suit, Value) {
        (self.suit, self.value)
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value.code_char(), self.suit.icon())
    }
}

/// Sort cards in place by the fixed (suit, value) order. Stable, so sorting
/// an already-sorted hand is a no-op.
pub fn sort_hand(cards: &mut [Card]) {
    cards.sort_by_key(|c| c.sort_key());
}

/// Opaque identifier of a deck held by the external card API. The remaining
/// card count is tracked by the API, not locally.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DeckId(pub String);

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
