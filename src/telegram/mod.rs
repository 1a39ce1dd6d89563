//! Telegram bot for receiving commands
//!
//! Supports /start_trading, /stop_trading, /balance and /profit

use crate::client::{FirebaseClient, SolanaClient};
use crate::error::Result;
use crate::monitor::TokenMonitor;
use crate::notify::Notifier;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Commands routed to the command handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Acknowledge and start the monitoring loop
    StartTrading,
    /// Acknowledge only; the loop has no cancellation path
    StopTrading,
    /// Reply with the wallet balance in SOL
    Balance,
    /// Reply with the summed profit of all recorded trades
    Profit,
}

/// Result of parsing one incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Command(BotCommand),
    Help,
    Unknown(String),
    NotACommand,
}

/// Parse `/command@botname args` text into a command
pub fn parse_message(text: &str) -> ParsedMessage {
    let text = text.trim();
    let Some(rest) = text.strip_prefix('/') else {
        return ParsedMessage::NotACommand;
    };

    let cmd = rest
        .split_whitespace()
        .next()
        .unwrap_or("")
        .split('@')
        .next()
        .unwrap_or("");

    match cmd.to_lowercase().as_str() {
        "start_trading" => ParsedMessage::Command(BotCommand::StartTrading),
        "stop_trading" => ParsedMessage::Command(BotCommand::StopTrading),
        "balance" => ParsedMessage::Command(BotCommand::Balance),
        "profit" => ParsedMessage::Command(BotCommand::Profit),
        "start" | "help" => ParsedMessage::Help,
        other => ParsedMessage::Unknown(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GetUpdatesResponse {
    result: Vec<TelegramUpdate>,
}

/// Long-polls the Bot API and forwards commands from the authorized chat
pub struct TelegramBot {
    http: reqwest::Client,
    api_url: String,
    chat_id: String,
    notifier: Notifier,
    last_update_id: RwLock<i64>,
    command_tx: mpsc::Sender<BotCommand>,
}

impl TelegramBot {
    pub fn new(
        bot_token: &str,
        chat_id: &str,
        notifier: Notifier,
        command_tx: mpsc::Sender<BotCommand>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: format!("https://api.telegram.org/bot{}", bot_token),
            chat_id: chat_id.to_string(),
            notifier,
            last_update_id: RwLock::new(0),
            command_tx,
        }
    }

    /// Start polling for updates
    pub async fn start_polling(self: Arc<Self>) {
        tracing::info!("Starting Telegram command listener...");

        loop {
            match self.poll_updates().await {
                Ok(updates) => {
                    for update in updates {
                        if let Some(msg) = update.message {
                            // Only process messages from the authorized chat
                            if msg.chat.id.to_string() == self.chat_id {
                                if let Some(text) = msg.text {
                                    self.handle_message(&text).await;
                                }
                            }
                        }

                        let mut last_id = self.last_update_id.write().await;
                        *last_id = update.update_id + 1;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to poll Telegram updates: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        }
    }

    async fn poll_updates(&self) -> Result<Vec<TelegramUpdate>> {
        let last_id = *self.last_update_id.read().await;
        let url = format!("{}/getUpdates?offset={}&timeout=30", self.api_url, last_id);

        let response: GetUpdatesResponse = self.http.get(&url).send().await?.json().await?;
        Ok(response.result)
    }

    async fn handle_message(&self, text: &str) {
        match parse_message(text) {
            ParsedMessage::Command(cmd) => {
                tracing::info!("Received command: {:?}", cmd);
                let _ = self.command_tx.send(cmd).await;
            }
            ParsedMessage::Help => {
                let _ = self.notifier.send(HELP_TEXT).await;
            }
            ParsedMessage::Unknown(cmd) => {
                let _ = self
                    .notifier
                    .send(&format!(
                        "❓ Unknown command: /{}\nUse /help for available commands",
                        cmd
                    ))
                    .await;
            }
            ParsedMessage::NotACommand => {}
        }
    }
}

const HELP_TEXT: &str = "🤖 Memecoin Bot Commands\n\n\
/balance - Wallet balance in SOL\n\
/profit - Total profit of recorded trades\n\
/start_trading - Start the monitoring loop\n\
/stop_trading - Stop trading\n\
/help - Show this message";

/// Executes commands against the external services
pub struct CommandHandler {
    notifier: Notifier,
    solana: SolanaClient,
    firebase: FirebaseClient,
    wallet_pubkey: String,
    monitor_started: AtomicBool,
}

impl CommandHandler {
    pub fn new(
        notifier: Notifier,
        solana: SolanaClient,
        firebase: FirebaseClient,
        wallet_pubkey: String,
    ) -> Self {
        Self {
            notifier,
            solana,
            firebase,
            wallet_pubkey,
            monitor_started: AtomicBool::new(false),
        }
    }

    pub async fn handle(&self, cmd: BotCommand) {
        match cmd {
            BotCommand::StartTrading => self.start_trading().await,
            BotCommand::StopTrading => self.stop_trading().await,
            BotCommand::Balance => self.send_balance().await,
            BotCommand::Profit => self.send_profit().await,
        }
    }

    async fn start_trading(&self) {
        let _ = self.notifier.send("🚀 Trading started!").await;

        // One monitoring loop per process; repeated /start_trading only acks
        if !self.monitor_started.swap(true, Ordering::SeqCst) {
            let monitor = TokenMonitor::new(self.notifier.clone());
            tokio::spawn(monitor.run());
        }
    }

    async fn stop_trading(&self) {
        // The monitoring loop keeps running; stop is an acknowledgement only
        let _ = self.notifier.send("⛔ Trading stopped!").await;
    }

    async fn send_balance(&self) {
        match self.solana.get_balance(&self.wallet_pubkey).await {
            Ok(balance) => {
                let _ = self
                    .notifier
                    .send(&format!("💰 Current Balance: {:.2} SOL", balance))
                    .await;
            }
            Err(e) => {
                tracing::error!("Failed to fetch balance: {}", e);
                let _ = self.notifier.send("⚠️ Error fetching balance.").await;
            }
        }
    }

    async fn send_profit(&self) {
        match self.firebase.total_profit().await {
            Ok(total) => {
                let _ = self
                    .notifier
                    .send(&format!("📈 Total Profit: {:.2} SOL", total))
                    .await;
            }
            Err(e) => {
                tracing::error!("Failed to fetch profit: {}", e);
                let _ = self.notifier.send("⚠️ Error fetching profit.").await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(
            parse_message("/start_trading"),
            ParsedMessage::Command(BotCommand::StartTrading)
        );
        assert_eq!(
            parse_message("/stop_trading"),
            ParsedMessage::Command(BotCommand::StopTrading)
        );
        assert_eq!(
            parse_message("/balance"),
            ParsedMessage::Command(BotCommand::Balance)
        );
        assert_eq!(
            parse_message("/profit"),
            ParsedMessage::Command(BotCommand::Profit)
        );
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(
            parse_message("/balance@MemecoinBot"),
            ParsedMessage::Command(BotCommand::Balance)
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            parse_message("/BALANCE"),
            ParsedMessage::Command(BotCommand::Balance)
        );
    }

    #[test]
    fn test_parse_ignores_trailing_args() {
        assert_eq!(
            parse_message("/profit since yesterday"),
            ParsedMessage::Command(BotCommand::Profit)
        );
    }

    #[test]
    fn test_parse_help_variants() {
        assert_eq!(parse_message("/help"), ParsedMessage::Help);
        assert_eq!(parse_message("/start"), ParsedMessage::Help);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_message("/moon"),
            ParsedMessage::Unknown("moon".to_string())
        );
    }

    #[test]
    fn test_plain_text_is_ignored() {
        assert_eq!(parse_message("gm everyone"), ParsedMessage::NotACommand);
        assert_eq!(parse_message("   "), ParsedMessage::NotACommand);
    }

    #[test]
    fn test_leading_whitespace_trimmed() {
        assert_eq!(
            parse_message("  /balance"),
            ParsedMessage::Command(BotCommand::Balance)
        );
    }
}
