pub mod config;
pub mod deal;
pub mod deck;
pub mod pretty;
pub mod server;
pub mod session;
