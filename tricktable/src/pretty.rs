//! Human-readable rendering of cards, memberships and room events for the
//! CLI and server logs.

use owo_colors::OwoColorize;

use tricktable_shared::{Card, PlayerId, PlayerPublic, RoomEvent, Suit};

pub fn format_card(card: &Card, color: bool) -> String {
    let text = format!("{}{}", card.value.code_char(), card.suit.icon());
    if color && matches!(card.suit, Suit::Hearts | Suit::Diamonds) {
        text.red().to_string()
    } else {
        text
    }
}

pub fn format_cards(cards: &[Card], color: bool) -> String {
    cards
        .iter()
        .map(|c| format_card(c, color))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a completed deal: the local hand plus the shared trump card.
pub fn format_hand(hand: &[Card], trump: &Card, color: bool) -> String {
    let title = if color {
        "=== Your Hand ===".bold().blue().to_string()
    } else {
        "=== Your Hand ===".to_string()
    };
    let trump_label = if color {
        "Trump:".bold().yellow().to_string()
    } else {
        "Trump:".to_string()
    };
    format!(
        "{}\n[{}]\n{} {}",
        title,
        format_cards(hand, color),
        trump_label,
        format_card(trump, color)
    )
}

/// Render the membership ring. `members[0]` is the dealer by convention.
pub fn format_members(members: &[PlayerPublic], you: &PlayerId, color: bool) -> String {
    let mut out = String::from("Players:\n");
    for (i, m) in members.iter().enumerate() {
        let name = if &m.id == you {
            if color {
                format!("{}{}", m.name.bold(), " (You)".bold())
            } else {
                format!("{} (You)", m.name)
            }
        } else {
            m.name.clone()
        };
        let dealer = if i == 0 {
            if color {
                " ●".green().to_string()
            } else {
                " (dealer)".to_string()
            }
        } else {
            String::new()
        };
        out.push_str(&format!("  #{} {}  score={}{}\n", i, name, m.score, dealer));
    }
    out
}

pub fn format_event_human(event: &RoomEvent, color: bool) -> String {
    match event {
        RoomEvent::MemberAdded { member } => {
            let tag = if color {
                "+".green().to_string()
            } else {
                "JOIN".into()
            };
            format!("{} {} joined the room", tag, member.name)
        }
        RoomEvent::MemberRemoved { member } => {
            let tag = if color {
                "-".red().to_string()
            } else {
                "LEAVE".into()
            };
            format!("{} {} left the room", tag, member.name)
        }
        RoomEvent::GameStarted {
            message,
            deal_order,
            deal_epoch,
            ..
        } => {
            let head = if color {
                format!("== {} ==", message).bold().purple().to_string()
            } else {
                format!("== {} ==", message)
            };
            format!("{} ({} players, deal #{})", head, deal_order.len(), deal_epoch)
        }
        RoomEvent::CardsDrawnChunk(chunk) => format!(
            "chunk {}/{} ({} cards{})",
            chunk.chunk_index + 1,
            chunk.total_chunks,
            chunk.cards.len(),
            if chunk.trump_card.is_some() {
                ", trump"
            } else {
                ""
            }
        ),
        RoomEvent::TrumpRevealed { trump_card } => {
            format!("trump revealed: {}", format_card(trump_card, color))
        }
        RoomEvent::DealResendRequest { chunk_indexes, .. } => {
            format!("resend requested for chunks {:?}", chunk_indexes)
        }
    }
}
