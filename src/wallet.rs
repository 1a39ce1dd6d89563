//! Wallet key handling
//!
//! The private key arrives as a base-58 encoded 64-byte ed25519 keypair
//! (secret key followed by public key). Only the public key is ever sent
//! over the wire; balance queries are read-only.

use crate::error::{BotError, Result};

const KEYPAIR_LEN: usize = 64;
const PUBKEY_LEN: usize = 32;

/// Solana wallet derived from a base-58 keypair
#[derive(Clone)]
pub struct Wallet {
    keypair: [u8; KEYPAIR_LEN],
    pubkey: String,
}

impl Wallet {
    /// Decode a base-58 encoded 64-byte keypair
    pub fn from_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| BotError::Wallet(format!("private key is not valid base-58: {}", e)))?;

        let keypair: [u8; KEYPAIR_LEN] = bytes.as_slice().try_into().map_err(|_| {
            BotError::Wallet(format!(
                "expected a {}-byte keypair, got {} bytes",
                KEYPAIR_LEN,
                bytes.len()
            ))
        })?;

        let pubkey = bs58::encode(&keypair[PUBKEY_LEN..]).into_string();

        Ok(Self { keypair, pubkey })
    }

    /// Base-58 public key, as used in RPC queries
    pub fn pubkey(&self) -> &str {
        &self.pubkey
    }

    /// Raw public key bytes
    pub fn pubkey_bytes(&self) -> &[u8] {
        &self.keypair[PUBKEY_LEN..]
    }
}

// Keep the secret half out of logs
impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet").field("pubkey", &self.pubkey).finish()
    }
}
