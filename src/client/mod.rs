//! External service clients

pub mod cmc;
pub mod firebase;
pub mod solana;
pub mod twitter;

pub use cmc::CmcClient;
pub use firebase::{FirebaseClient, TradeRecord};
pub use solana::SolanaClient;
pub use twitter::TwitterClient;
