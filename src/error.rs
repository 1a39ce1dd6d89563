//! Error types for the bot
//!
//! Every external call returns `Result<T, BotError>`; handlers log the error
//! and reply with a fixed failure message. Missing configuration is the only
//! fatal class.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BotError>;

/// Bot-wide error type
#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or malformed configuration at startup
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid wallet key material
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Solana JSON-RPC returned an error object
    #[error("RPC error: {0}")]
    Rpc(String),

    /// External API returned an unexpected payload or status
    #[error("API error: {0}")]
    Api(String),

    /// Authentication / token minting failure
    #[error("Auth error: {0}")]
    Auth(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O failure (credential files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
