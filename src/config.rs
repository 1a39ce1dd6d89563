//! Environment-based configuration
//!
//! The bot is configured entirely through environment variables (loaded from
//! a `.env` file when present). Missing required credentials fail startup.

use crate::error::{BotError, Result};

pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Top-level configuration assembled from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub solana: SolanaConfig,
    pub firebase: FirebaseConfig,
    /// CoinMarketCap API key; price fetching is disabled without it
    pub cmc_api_key: Option<String>,
    /// Twitter posting credentials; all four or none
    pub twitter: Option<TwitterConfig>,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Authorized chat: commands are accepted from it and replies go to it
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct SolanaConfig {
    pub rpc_url: String,
    /// Base-58 encoded 64-byte keypair
    pub private_key: String,
}

/// Where the service-account JSON comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirebaseCredentials {
    /// Raw JSON in the environment
    Inline(String),
    /// Path to a JSON file
    File(String),
}

#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    pub credentials: FirebaseCredentials,
    pub database_url: String,
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub api_key: String,
    pub api_secret_key: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Config {
    /// Assemble configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Assemble configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require = |name: &str| {
            optional(name).ok_or_else(|| {
                BotError::Config(format!("missing required environment variable {}", name))
            })
        };

        let telegram = TelegramConfig {
            bot_token: require("TELEGRAM_BOT_TOKEN")?,
            chat_id: require("TELEGRAM_CHAT_ID")?,
        };

        let solana = SolanaConfig {
            rpc_url: optional("SOLANA_RPC_URL")
                .unwrap_or_else(|| DEFAULT_SOLANA_RPC_URL.to_string()),
            private_key: require("SOL_PRIVATE_KEY")?,
        };

        let credentials = match (
            optional("FIREBASE_CREDENTIALS"),
            optional("FIREBASE_CREDENTIALS_FILE"),
        ) {
            (Some(json), _) => FirebaseCredentials::Inline(json),
            (None, Some(path)) => FirebaseCredentials::File(path),
            (None, None) => {
                return Err(BotError::Config(
                    "missing Firebase credentials: set FIREBASE_CREDENTIALS or \
                     FIREBASE_CREDENTIALS_FILE"
                        .to_string(),
                ))
            }
        };

        let firebase = FirebaseConfig {
            credentials,
            database_url: require("FIREBASE_DATABASE_URL")?,
        };

        // All four Twitter variables or none; a partial set is a config error
        let twitter_vars = [
            "TWITTER_API_KEY",
            "TWITTER_API_SECRET_KEY",
            "TWITTER_ACCESS_TOKEN",
            "TWITTER_ACCESS_TOKEN_SECRET",
        ];
        let twitter_values: Vec<Option<String>> =
            twitter_vars.iter().map(|v| optional(v)).collect();

        let twitter = if twitter_values.iter().all(|v| v.is_none()) {
            None
        } else if let Some(missing) = twitter_values.iter().position(|v| v.is_none()) {
            return Err(BotError::Config(format!(
                "incomplete Twitter credentials: missing {}",
                twitter_vars[missing]
            )));
        } else {
            let mut it = twitter_values.into_iter().flatten();
            Some(TwitterConfig {
                api_key: it.next().unwrap_or_default(),
                api_secret_key: it.next().unwrap_or_default(),
                access_token: it.next().unwrap_or_default(),
                access_token_secret: it.next().unwrap_or_default(),
            })
        };

        Ok(Self {
            telegram,
            solana,
            firebase,
            cmc_api_key: optional("CMC_API_KEY"),
            twitter,
        })
    }
}
