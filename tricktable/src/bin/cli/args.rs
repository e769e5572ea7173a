use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Headless client for the tricktable card table.
///
/// The typical flow is `signup` (or `login`), then `create` on one terminal
/// and `join <room-id>` on the others, then `start` from the room creator.
#[derive(Parser, Debug, Clone)]
#[command(name = "tricktable-cli", version, about = "Headless tricktable client")]
pub struct Cli {
    /// Server base URL; the websocket endpoint is derived from it
    #[arg(long, default_value = "http://localhost:3001")]
    pub server: String,

    /// Deck API base URL (any deckofcardsapi-compatible service)
    #[arg(long, default_value = "https://deckofcardsapi.com/api")]
    pub deck_api: String,

    /// Path to the session file (the cookie-jar analog)
    #[arg(long, default_value = tricktable::session::SESSION_FILE_NAME)]
    pub session: PathBuf,

    /// Quiet period before requesting missing chunks during a deal (ms)
    #[arg(long, default_value_t = 2000)]
    pub resend_after_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create an account and store the session
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        username: String,
        password: String,
    },
    /// Log in to an existing account and store the session
    Login { username: String, password: String },
    /// Create a game room and wait at the table
    Create,
    /// Join an existing room by id and wait at the table
    Join { room_id: String },
    /// Draw and deal the cards (room creator only)
    Start,
    /// Reattach to the room stored in the session and watch
    Watch,
}
