//! Keybox - keyfile-based symmetric file encryption using AES-CBC
//!
//! The core is two layers: a key codec that generates random key material and
//! converts it to and from textual representations (hex, base32, base64, PEM),
//! and a cipher engine that encrypts byte payloads into self-contained
//! `IV || ciphertext` blobs using AES in cipher-block-chaining mode.
//!
//! Keybox provides confidentiality only: blobs carry no authentication tag
//! and tampering is not detected.

#![forbid(unsafe_code)]

pub mod armor;
pub mod cipher;
pub mod error;
pub mod file_ops;
pub mod key;

pub use cipher::{BLOCK_SIZE, Cipher, Padding};
pub use error::{ErrorCategory, ErrorKind, KeyboxError, Result};
pub use key::{Key, KeyFormat};
