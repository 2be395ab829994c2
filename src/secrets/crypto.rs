//! Symmetric codec for settings encrypted at rest.
//!
//! Uses AES-256-GCM. Every token carries its own random IV and the GCM
//! authentication tag, encoded as `hex(iv):hex(tag):hex(ciphertext)`.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce, Tag,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

/// AES-256 key length in bytes
pub const KEY_LEN: usize = 32;
/// GCM nonce length in bytes
pub const IV_LEN: usize = 12;
/// GCM authentication tag length in bytes
pub const TAG_LEN: usize = 16;

const SEPARATOR: char = ':';

/// Cryptographic errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CryptoError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Malformed token: {0}")]
    MalformedToken(&'static str),

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - tampered token or wrong key")]
    DecryptionFailed,

    #[error("Decrypted value is not valid UTF-8")]
    InvalidUtf8,
}

/// Result type for crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Process-wide secret key for settings encryption.
///
/// Key bytes are zeroized on drop.
pub struct EncryptionKey(Zeroizing<[u8; KEY_LEN]>);

impl EncryptionKey {
    /// Build a key from raw bytes. The slice must be exactly [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Parse a key from its hex form (64 characters).
    pub fn from_hex(encoded: &str) -> CryptoResult<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CryptoError::InvalidKey("key is not configured".to_string()));
        }
        let bytes = Zeroizing::new(
            hex::decode(encoded)
                .map_err(|_| CryptoError::InvalidKey("key is not valid hex".to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(key.as_mut());
        Self(key)
    }

    /// Hex form of the key, for handing to operators.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_ref()))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Encrypts and decrypts individual string values.
pub struct SecretCodec {
    cipher: Aes256Gcm,
}

impl SecretCodec {
    pub fn new(key: &EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { cipher }
    }

    /// Build a codec straight from the configured hex key.
    pub fn from_hex(encoded: &str) -> CryptoResult<Self> {
        Ok(Self::new(&EncryptionKey::from_hex(encoded)?))
    }

    /// Encrypt one plaintext string into a token.
    ///
    /// A fresh IV is drawn for every call, so equal plaintexts never share a token.
    pub fn encrypt(&self, plaintext: &str) -> CryptoResult<String> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", buffer.as_mut_slice())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(format!(
            "{}{sep}{}{sep}{}",
            hex::encode(iv),
            hex::encode(tag),
            hex::encode(&buffer),
            sep = SEPARATOR
        ))
    }

    /// Decrypt a token produced by [`SecretCodec::encrypt`].
    pub fn decrypt(&self, token: &str) -> CryptoResult<String> {
        let parts = TokenParts::parse(token)?;
        let mut buffer = parts.ciphertext;

        self.cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(&parts.iv),
                b"",
                buffer.as_mut_slice(),
                Tag::from_slice(&parts.tag),
            )
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(buffer).map_err(|_| CryptoError::InvalidUtf8)
    }
}

impl std::fmt::Debug for SecretCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCodec").finish_non_exhaustive()
    }
}

/// Decoded segments of a token.
struct TokenParts {
    iv: Vec<u8>,
    tag: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl TokenParts {
    fn parse(token: &str) -> CryptoResult<Self> {
        let mut segments = token.split(SEPARATOR);
        let (Some(iv), Some(tag), Some(ciphertext), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(CryptoError::MalformedToken("expected three segments"));
        };

        let iv = hex::decode(iv)?;
        if iv.len() != IV_LEN {
            return Err(CryptoError::MalformedToken("invalid IV length"));
        }
        let tag = hex::decode(tag)?;
        if tag.len() != TAG_LEN {
            return Err(CryptoError::MalformedToken("invalid tag length"));
        }
        let ciphertext = hex::decode(ciphertext)?;

        Ok(Self {
            iv,
            tag,
            ciphertext,
        })
    }
}

/// Structural check: three hex segments with IV and tag of the right size.
///
/// Says nothing about whether the token decrypts under a given key.
pub fn looks_like_token(value: &str) -> bool {
    TokenParts::parse(value).is_ok()
}
