//! Twitter (X) posting client
//!
//! Signs requests with OAuth 1.0a (HMAC-SHA1) using the four user-context
//! credentials. Only posting is supported.

use crate::config::TwitterConfig;
use crate::error::{BotError, Result};
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha1::Sha1;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

/// RFC 3986 unreserved characters stay as-is; everything else is encoded
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Twitter API client for posting tweets
#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    base_url: String,
    config: TwitterConfig,
}

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateTweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterClient {
    /// Create a client for the production API
    pub fn new(config: TwitterConfig) -> Result<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a client against an arbitrary endpoint (tests)
    pub fn with_base_url(config: TwitterConfig, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Post a tweet, returning its id
    pub async fn post(&self, text: &str) -> Result<String> {
        let url = format!("{}/2/tweets", self.base_url);
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = generate_nonce();

        let authorization = build_authorization_header(
            &self.config,
            "POST",
            &url,
            timestamp,
            &nonce,
        );

        let resp = self
            .http
            .post(&url)
            .header("Authorization", authorization)
            .json(&CreateTweetRequest { text })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(BotError::Api(format!(
                "tweet failed with status {}",
                resp.status()
            )));
        }

        let created: CreateTweetResponse = resp.json().await?;
        Ok(created.data.id)
    }
}

fn generate_nonce() -> String {
    let mut rng = rand::rng();
    (0..32)
        .map(|_| {
            let idx = rng.random_range(0..36u32);
            char::from_digit(idx, 36).unwrap_or('0')
        })
        .collect()
}

/// Strict RFC 3986 percent-encoding as OAuth 1.0a requires
fn oauth_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Signature base string: METHOD&encoded-url&encoded-sorted-params.
///
/// JSON request bodies do not participate in the signature, so the parameter
/// set is the oauth_* parameters alone.
fn signature_base_string(method: &str, url: &str, params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (oauth_encode(k), oauth_encode(v)))
        .collect();
    sorted.sort();

    let param_string = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        oauth_encode(url),
        oauth_encode(&param_string)
    )
}

fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> String {
    let signing_key = format!(
        "{}&{}",
        oauth_encode(consumer_secret),
        oauth_encode(token_secret)
    );

    let mut mac = Hmac::<Sha1>::new_from_slice(signing_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(base_string.as_bytes());

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// Build the `Authorization: OAuth ...` header value for a request
fn build_authorization_header(
    config: &TwitterConfig,
    method: &str,
    url: &str,
    timestamp: i64,
    nonce: &str,
) -> String {
    let timestamp_str = timestamp.to_string();
    let oauth_params: [(&str, &str); 6] = [
        ("oauth_consumer_key", &config.api_key),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", &timestamp_str),
        ("oauth_token", &config.access_token),
        ("oauth_version", "1.0"),
    ];

    let base = signature_base_string(method, url, &oauth_params);
    let signature = sign(&base, &config.api_secret_key, &config.access_token_secret);

    let mut header_params: Vec<(&str, &str)> = oauth_params.to_vec();
    header_params.push(("oauth_signature", &signature));
    header_params.sort();

    let rendered = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, oauth_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("OAuth {}", rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TwitterConfig {
        TwitterConfig {
            api_key: "consumer-key".to_string(),
            api_secret_key: "consumer-secret".to_string(),
            access_token: "access-token".to_string(),
            access_token_secret: "token-secret".to_string(),
        }
    }

    #[test]
    fn test_oauth_encode_unreserved_passthrough() {
        assert_eq!(oauth_encode("abcXYZ019-._~"), "abcXYZ019-._~");
    }

    #[test]
    fn test_oauth_encode_reserved() {
        assert_eq!(oauth_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(oauth_encode("https://api.twitter.com/2/tweets"),
            "https%3A%2F%2Fapi.twitter.com%2F2%2Ftweets");
    }

    #[test]
    fn test_signature_base_string_sorted_params() {
        let base = signature_base_string(
            "post",
            "https://api.twitter.com/2/tweets",
            &[("b", "2"), ("a", "1")],
        );
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F2%2Ftweets&a%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = sign("base", "cs", "ts");
        let b = sign("base", "cs", "ts");
        assert_eq!(a, b);
        assert_ne!(a, sign("other", "cs", "ts"));
    }

    #[test]
    fn test_authorization_header_shape() {
        let header =
            build_authorization_header(&test_config(), "POST", "https://api.twitter.com/2/tweets",
                1700000000, "abcdef0123456789");

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"consumer-key\""));
        assert!(header.contains("oauth_token=\"access-token\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_timestamp=\"1700000000\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        // Secrets never appear in the header
        assert!(!header.contains("consumer-secret"));
        assert!(!header.contains("token-secret"));
    }

    #[test]
    fn test_nonce_is_alphanumeric() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_post_sends_signed_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2/tweets")
            .match_header(
                "authorization",
                mockito::Matcher::Regex("^OAuth .*oauth_signature=.*".to_string()),
            )
            .match_body(mockito::Matcher::Json(serde_json::json!({"text": "gm"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"id": "17", "text": "gm"}}"#)
            .create_async()
            .await;

        let client = TwitterClient::with_base_url(test_config(), &server.url()).unwrap();
        let id = client.post("gm").await.unwrap();
        assert_eq!(id, "17");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_failure_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/2/tweets")
            .with_status(403)
            .with_body(r#"{"title": "Forbidden"}"#)
            .create_async()
            .await;

        let client = TwitterClient::with_base_url(test_config(), &server.url()).unwrap();
        let err = client.post("gm").await.unwrap_err();
        assert!(matches!(err, BotError::Api(_)));
    }
}
