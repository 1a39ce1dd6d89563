//! Firebase Realtime Database client
//!
//! Authenticates with a Google service account: an RS256-signed JWT is
//! exchanged at the token endpoint for a short-lived bearer token, which is
//! cached until shortly before expiry. Trade records are read wholesale from
//! `/trades` and summed client-side; there is no filtering or pagination.

use crate::config::{FirebaseConfig, FirebaseCredentials};
use crate::error::{BotError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

const TOKEN_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email \
                            https://www.googleapis.com/auth/firebase.database";

/// Refresh the cached token this long before it actually expires
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// One trade record as stored in the database. Only `profit` matters to the
/// bot; anything else the writer stored is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeRecord {
    #[serde(default, deserialize_with = "profit_or_zero")]
    pub profit: Decimal,
}

/// Absent and explicit-null profits both count as zero
fn profit_or_zero<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<Decimal> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(Decimal::ZERO))
}

#[derive(Debug, Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Client for the Firebase Realtime Database REST API
#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    database_url: String,
    account: Arc<ServiceAccount>,
    signing_key: Arc<EncodingKey>,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl std::fmt::Debug for FirebaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseClient")
            .field("database_url", &self.database_url)
            .finish_non_exhaustive()
    }
}

impl FirebaseClient {
    /// Build a client from configuration, loading and validating the
    /// service-account JSON (inline or from a file)
    pub fn new(config: &FirebaseConfig) -> Result<Self> {
        let raw = match &config.credentials {
            FirebaseCredentials::Inline(json) => json.clone(),
            FirebaseCredentials::File(path) => std::fs::read_to_string(path)?,
        };

        let account: ServiceAccount = serde_json::from_str(&raw)
            .map_err(|e| BotError::Config(format!("invalid Firebase credentials: {}", e)))?;

        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| BotError::Config(format!("invalid service-account key: {}", e)))?;

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            account: Arc::new(account),
            signing_key: Arc::new(signing_key),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Read all trade records from `/trades`
    pub async fn get_trades(&self) -> Result<Vec<TradeRecord>> {
        let token = self.access_token().await?;
        let url = format!("{}/trades.json", self.database_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("access_token", token.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::Api(format!(
                "trades read failed with status {}",
                resp.status()
            )));
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_trades(body))
    }

    /// Total profit across all trades
    pub async fn total_profit(&self) -> Result<Decimal> {
        let trades = self.get_trades().await?;
        Ok(sum_profit(&trades))
    }

    /// Get a bearer token, minting a fresh one when the cache is stale
    async fn access_token(&self) -> Result<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let token = self.mint_token().await?;
        let access_token = token.access_token.clone();
        *self.token.write().await = Some(token);
        Ok(access_token)
    }

    async fn mint_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: &self.account.client_email,
            scope: TOKEN_SCOPES,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, self.signing_key.as_ref())
            .map_err(|e| BotError::Auth(format!("JWT signing failed: {}", e)))?;

        let resp = self
            .http
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::Auth(format!(
                "token exchange failed with status {}",
                resp.status()
            )));
        }

        let token: TokenResponse = resp.json().await?;
        let ttl = Duration::seconds((token.expires_in - TOKEN_EXPIRY_MARGIN_SECS).max(0));

        tracing::debug!("Minted Firebase access token, valid for {}s", token.expires_in);

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + ttl,
        })
    }
}

/// Parse the raw RTDB payload into trade records.
///
/// The database returns `null` when the path is empty, an object keyed by
/// push-id for normal writes, or an array when keys happen to be small
/// integers. Records that do not look like trades are skipped.
pub fn parse_trades(body: serde_json::Value) -> Vec<TradeRecord> {
    let values: Vec<serde_json::Value> = match body {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        serde_json::Value::Array(items) => {
            items.into_iter().filter(|v| !v.is_null()).collect()
        }
        other => {
            tracing::warn!("Unexpected /trades payload shape: {}", other);
            Vec::new()
        }
    };

    values
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<TradeRecord>(v) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed trade record: {}", e);
                None
            }
        })
        .collect()
}

/// Sum the `profit` field across records; absent fields were defaulted to
/// zero at parse time, and an empty set sums to zero.
pub fn sum_profit(trades: &[TradeRecord]) -> Decimal {
    trades.iter().map(|t| t.profit).sum()
}
