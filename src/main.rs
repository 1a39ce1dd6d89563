//! Solana memecoin Telegram bot
//!
//! Composition root: load configuration from the environment, wire the
//! external clients together, and drain commands from the Telegram listener.

use memecoin_bot::{
    client::{FirebaseClient, SolanaClient, TwitterClient},
    config::Config,
    notify::Notifier,
    telegram::{BotCommand, CommandHandler, TelegramBot},
    wallet::Wallet,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Missing required credentials halt the process here
    let config = Config::from_env()?;

    let wallet = Wallet::from_base58(&config.solana.private_key)?;
    tracing::info!("Wallet loaded: {}", wallet.pubkey());

    let solana = SolanaClient::new(&config.solana.rpc_url)?;
    let firebase = FirebaseClient::new(&config.firebase)?;
    tracing::info!("✅ Firebase Initialized Successfully!");

    // Held for posting; no command uses it yet
    let _twitter = match &config.twitter {
        Some(tw) => Some(TwitterClient::new(tw.clone())?),
        None => {
            tracing::warn!("Twitter credentials not configured, posting disabled");
            None
        }
    };

    if config.cmc_api_key.is_none() {
        tracing::warn!("CMC_API_KEY not set, price fetching disabled");
    }

    let notifier = Notifier::new(&config.telegram.bot_token, &config.telegram.chat_id);

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<BotCommand>(100);

    let bot = Arc::new(TelegramBot::new(
        &config.telegram.bot_token,
        &config.telegram.chat_id,
        notifier.clone(),
        cmd_tx,
    ));
    tokio::spawn(bot.start_polling());
    tracing::info!("Telegram command listener started");

    if let Err(e) = notifier.startup().await {
        tracing::warn!("Failed to send startup notification: {}", e);
    }

    let handler = CommandHandler::new(
        notifier,
        solana,
        firebase,
        wallet.pubkey().to_string(),
    );

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => handler.handle(cmd).await,
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}
