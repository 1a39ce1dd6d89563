//! Solana JSON-RPC client
//!
//! Read-only ledger queries. The only call the bot needs is `getBalance`.

use crate::error::{BotError, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lamports per SOL
const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Client for a Solana RPC node
#[derive(Clone)]
pub struct SolanaClient {
    http: Client,
    rpc_url: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BalanceResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct BalanceResult {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl SolanaClient {
    /// Create a new client for the given RPC endpoint
    pub fn new(rpc_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the wallet balance in SOL
    pub async fn get_balance(&self, pubkey: &str) -> Result<Decimal> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "getBalance",
            params: [pubkey],
        };

        let resp: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = resp.error {
            return Err(BotError::Rpc(format!("{} (code {})", err.message, err.code)));
        }

        let lamports = resp
            .result
            .ok_or_else(|| BotError::Rpc("getBalance returned no result".to_string()))?
            .value;

        Ok(Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PUBKEY: &str = "4Nd1mYvM6kE8pJZdCLPqaBz4wMyzr6V6sCy1BKirDM5E";

    #[tokio::test]
    async fn test_get_balance_converts_lamports() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "method": "getBalance",
                "params": [PUBKEY],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":100},"value":2500000000}}"#,
            )
            .create_async()
            .await;

        let client = SolanaClient::new(&server.url()).unwrap();
        let balance = client.get_balance(PUBKEY).await.unwrap();
        assert_eq!(balance, dec!(2.5));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_balance_zero() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":1},"value":0}}"#)
            .create_async()
            .await;

        let client = SolanaClient::new(&server.url()).unwrap();
        let balance = client.get_balance(PUBKEY).await.unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_get_balance_rpc_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"Invalid param"}}"#,
            )
            .create_async()
            .await;

        let client = SolanaClient::new(&server.url()).unwrap();
        let err = client.get_balance(PUBKEY).await.unwrap_err();
        assert!(matches!(err, BotError::Rpc(_)));
        assert!(err.to_string().contains("Invalid param"));
    }

    #[tokio::test]
    async fn test_get_balance_transport_error_is_not_a_panic() {
        // Point at a closed port; the call must surface an error, not crash
        let client = SolanaClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.get_balance(PUBKEY).await.is_err());
    }
}
