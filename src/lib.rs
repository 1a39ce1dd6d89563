//! Solana Memecoin Telegram Bot
//!
//! A Telegram command interface wired to the external services the bot
//! depends on: a Solana RPC node for balance queries, a Firebase Realtime
//! Database for profit bookkeeping, CoinMarketCap for market data, and a
//! Twitter posting client.
//!
//! ## Architecture
//!
//! ```text
//! Telegram (getUpdates) → CommandHandler → { Solana RPC, Firebase RTDB }
//!                              ↓
//!                          Notifier (sendMessage)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod telegram;
pub mod wallet;

#[cfg(test)]
mod integration_tests;
