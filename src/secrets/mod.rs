//! Encryption at rest for security-kind settings.
//!
//! ## Security Model
//!
//! - One AES-256-GCM key per process, supplied at startup from
//!   `encryption.key` (hex, 32 bytes)
//! - Every string leaf is encrypted individually with its own random IV
//! - Tokens are `hex(iv):hex(tag):hex(ciphertext)`; a bad tag, wrong key or
//!   malformed token is an error, never garbled plaintext
//! - Key bytes are zeroized on drop and never printed
//!
//! ## Usage
//!
//! ```ignore
//! let codec = SecretCodec::from_hex(&config.encryption.key)?;
//! let token = codec.encrypt("hunter2")?;
//! assert_eq!(codec.decrypt(&token)?, "hunter2");
//! ```

pub mod crypto;
pub mod tree;

pub use crypto::{looks_like_token, CryptoError, CryptoResult, EncryptionKey, SecretCodec};
pub use tree::{decrypt_leaves, encrypt_leaves};
