//! Message content codec.
//!
//! Content is sealed with ChaCha20-Poly1305 under a process-wide key. A token
//! is the lowercase hex encoding of:
//!
//! ```text
//! [ version (1 byte) | nonce (12 bytes) | ciphertext + tag ]
//! ```
//!
//! The version byte is authenticated as associated data, so changing any
//! character of a token makes `decode` fail rather than return other content.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::Zeroize;

use crate::error::CodecError;

/// Current token format version.
pub const TOKEN_VERSION: u8 = 1;

/// Context string for deriving the content key from a configured secret.
const KEY_CONTEXT: &str = "burnlink v1 message content key";

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// The 256-bit content key. Zeroed on drop.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Derive a key from a configured secret string.
    ///
    /// An empty or whitespace-only secret is refused: the codec fails closed
    /// instead of sealing content under a guessable key.
    pub fn from_secret(secret: &str) -> Result<Self, CodecError> {
        if secret.trim().is_empty() {
            return Err(CodecError::MissingKey);
        }
        Ok(Self(blake3::derive_key(KEY_CONTEXT, secret.as_bytes())))
    }

    /// Use a raw key given as 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let mut bytes = hex::decode(s.trim()).map_err(|e| CodecError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(CodecError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                len
            )));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(key))
    }

    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Seals and opens message content.
#[derive(Clone)]
pub struct MessageCodec {
    cipher: ChaCha20Poly1305,
}

impl MessageCodec {
    pub fn new(key: &SecretKey) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key.0)),
        }
    }

    /// Seal `plaintext` into an opaque token.
    pub fn encode(&self, plaintext: &str) -> Result<String, CodecError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: &[TOKEN_VERSION],
                },
            )
            .map_err(|_| CodecError::Encryption)?;

        let mut out = Vec::with_capacity(HEADER_LEN + sealed.len());
        out.push(TOKEN_VERSION);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(hex::encode(out))
    }

    /// Open a token produced by [`encode`](Self::encode).
    pub fn decode(&self, token: &str) -> Result<String, CodecError> {
        // hex::decode accepts uppercase too; only the canonical form is valid.
        if !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(CodecError::MalformedToken("not lowercase hex".into()));
        }
        let bytes = hex::decode(token).map_err(|e| CodecError::MalformedToken(e.to_string()))?;
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(CodecError::MalformedToken("token too short".into()));
        }

        let version = bytes[0];
        if version != TOKEN_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let (nonce, sealed) = bytes[1..].split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &[version],
                },
            )
            .map_err(|_| CodecError::Integrity)?;

        String::from_utf8(plaintext).map_err(|e| {
            e.into_bytes().zeroize();
            CodecError::InvalidUtf8
        })
    }
}

impl fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCodec").finish_non_exhaustive()
    }
}
