//! AES-CBC encryption and decryption of self-contained ciphertext blobs
//!
//! The binary format is:
//! - IV: 16 bytes (one AES block), freshly random per encryption
//! - ciphertext: N whole AES blocks
//!
//! There is no header, length field, or authentication tag; the boundary
//! between IV and ciphertext is always exactly one block. Tampering is not
//! detected (confidentiality only).
//!
//! Two padding schemes are supported. `Padding::Pkcs7` is the default for
//! new data and round-trips arbitrary byte sequences. `Padding::ZeroTruncate`
//! reproduces the legacy scheme bit-for-bit: pad with zero bytes up to the
//! block boundary, and on decryption truncate at the first zero byte. Legacy
//! mode silently truncates plaintexts that contain an embedded zero byte.

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::{NoPadding, Pkcs7};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, KeyboxError, Result};
use crate::key::Key;

/// AES block size in bytes. Also the IV length and the blob alignment unit.
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Padding scheme applied to the plaintext before block chaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// PKCS#7: pad bytes encode the pad length, so removal is unambiguous.
    /// A block-aligned plaintext gains one full padding block.
    #[default]
    Pkcs7,

    /// Legacy zero-byte padding: pad with zeros only when the plaintext is
    /// not block-aligned, and truncate at the first zero byte on decryption.
    /// Interoperable with blobs produced by the older tools.
    ZeroTruncate,
}

/// AES key-size variant, derived from the key byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Aes128,
    Aes192,
    Aes256,
}

/// A reusable AES-CBC cipher bound to one key.
///
/// Construction validates the key length; after that the cipher holds no
/// per-call mutable state and is safe for concurrent use from multiple
/// threads. Each call allocates its own buffers and draws its own IV.
#[derive(Debug)]
pub struct Cipher {
    key: Zeroizing<Vec<u8>>,
    variant: Variant,
    padding: Padding,
}

impl Cipher {
    /// Creates a cipher using the default padding scheme (PKCS#7).
    ///
    /// Fails with `KeySizeInvalid` unless the key is 16, 24 or 32 bytes.
    pub fn new(key: &Key) -> Result<Self> {
        Self::with_padding(key, Padding::default())
    }

    /// Creates a cipher with an explicit padding scheme.
    pub fn with_padding(key: &Key, padding: Padding) -> Result<Self> {
        let variant = match key.len() {
            16 => Variant::Aes128,
            24 => Variant::Aes192,
            32 => Variant::Aes256,
            n => {
                return Err(KeyboxError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::KeySizeInvalid,
                    format!("invalid key size {n}: AES requires a 16, 24 or 32 byte key"),
                ));
            }
        };
        Ok(Self {
            key: Zeroizing::new(key.as_bytes().to_vec()),
            variant,
            padding,
        })
    }

    /// The padding scheme this cipher applies.
    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Encrypts `plaintext` into a self-contained blob: `IV || ciphertext`.
    ///
    /// A fresh random IV is drawn from the OS CSPRNG on every call, so
    /// encrypting the same plaintext twice yields different blobs.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut iv = [0u8; BLOCK_SIZE];
        OsRng.try_fill_bytes(&mut iv).map_err(|e| {
            KeyboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::RandomnessUnavailable,
                "could not generate initialization vector",
                e,
            )
        })?;
        self.encrypt_with_iv(plaintext, &iv)
    }

    /// Encrypts `plaintext` using a caller-provided IV.
    ///
    /// This function is ONLY for testing purposes to generate deterministic
    /// output (known-answer vectors). NEVER use this in production - always
    /// use `encrypt()`, which generates a fresh random IV. Reusing an IV
    /// under the same key leaks plaintext relationships.
    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: &[u8; BLOCK_SIZE]) -> Result<Vec<u8>> {
        let msg_len = plaintext.len();
        let body_len = match self.padding {
            // Always at least one pad byte, so aligned input grows a block.
            Padding::Pkcs7 => (msg_len / BLOCK_SIZE + 1) * BLOCK_SIZE,
            // Aligned input (including empty) passes through unpadded.
            Padding::ZeroTruncate => msg_len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE,
        };

        let mut blob = vec![0u8; BLOCK_SIZE + body_len];
        blob[..BLOCK_SIZE].copy_from_slice(iv);
        blob[BLOCK_SIZE..BLOCK_SIZE + msg_len].copy_from_slice(plaintext);

        // An empty aligned plaintext in legacy mode has no body to chain.
        let (iv, body) = blob.split_at_mut(BLOCK_SIZE);
        if !body.is_empty() {
            match self.variant {
                Variant::Aes128 => seal::<Aes128CbcEnc>(&self.key, iv, body, msg_len, self.padding),
                Variant::Aes192 => seal::<Aes192CbcEnc>(&self.key, iv, body, msg_len, self.padding),
                Variant::Aes256 => seal::<Aes256CbcEnc>(&self.key, iv, body, msg_len, self.padding),
            }?;
        }

        Ok(blob)
    }

    /// Decrypts a blob produced by `encrypt`, returning the plaintext.
    ///
    /// Fails with `CiphertextTooShort` when the blob cannot even contain an
    /// IV, and with `CiphertextMisaligned` when the remainder after the IV is
    /// not a whole number of blocks.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < BLOCK_SIZE {
            return Err(KeyboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::CiphertextTooShort,
                "ciphertext too short: needs to be at least one block to contain an IV",
            ));
        }

        // The initialization vector is always the first block. It is not
        // secret; it exists so identical plaintexts encrypt differently.
        let (iv, body) = blob.split_at(BLOCK_SIZE);

        if body.len() % BLOCK_SIZE != 0 {
            return Err(KeyboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::CiphertextMisaligned,
                "ciphertext not a multiple of the AES block size",
            ));
        }

        // A bare IV is a legal legacy blob (empty plaintext); PKCS#7 blobs
        // always carry at least the padding block.
        if body.is_empty() {
            return match self.padding {
                Padding::ZeroTruncate => Ok(Vec::new()),
                Padding::Pkcs7 => Err(KeyboxError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::PaddingInvalid,
                    "ciphertext carries no padding block",
                )),
            };
        }

        let mut buf = body.to_vec();
        let plain_len = match self.variant {
            Variant::Aes128 => open::<Aes128CbcDec>(&self.key, iv, &mut buf, self.padding),
            Variant::Aes192 => open::<Aes192CbcDec>(&self.key, iv, &mut buf, self.padding),
            Variant::Aes256 => open::<Aes256CbcDec>(&self.key, iv, &mut buf, self.padding),
        }?;
        buf.truncate(plain_len);

        Ok(buf)
    }
}

/// CBC-encrypt `body` in place. `body` was sized for the padding scheme by
/// the caller; only the first `msg_len` bytes are plaintext.
fn seal<E>(key: &[u8], iv: &[u8], body: &mut [u8], msg_len: usize, padding: Padding) -> Result<()>
where
    E: KeyIvInit + BlockEncryptMut,
{
    let enc = E::new_from_slices(key, iv).map_err(invariant)?;
    match padding {
        Padding::Pkcs7 => enc.encrypt_padded_mut::<Pkcs7>(body, msg_len).map_err(invariant)?,
        // Zero padding was written by the caller; the whole body is the message.
        Padding::ZeroTruncate => {
            let body_len = body.len();
            enc.encrypt_padded_mut::<NoPadding>(body, body_len)
                .map_err(invariant)?
        }
    };
    Ok(())
}

/// CBC-decrypt `buf` in place and return the plaintext length after padding
/// removal.
fn open<D>(key: &[u8], iv: &[u8], buf: &mut [u8], padding: Padding) -> Result<usize>
where
    D: KeyIvInit + BlockDecryptMut,
{
    let dec = D::new_from_slices(key, iv).map_err(invariant)?;
    let plain = match padding {
        Padding::Pkcs7 => dec.decrypt_padded_mut::<Pkcs7>(buf).map_err(|_| {
            KeyboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::PaddingInvalid,
                "PKCS#7 padding is invalid: wrong key, corrupt data, or a legacy blob",
            )
        })?,
        Padding::ZeroTruncate => {
            let full = dec.decrypt_padded_mut::<NoPadding>(buf).map_err(invariant)?;
            // Best-effort de-padding: the first zero byte marks the end.
            match full.iter().position(|&b| b == 0) {
                Some(n) => &full[..n],
                None => full,
            }
        }
    };
    Ok(plain.len())
}

fn invariant(err: impl std::fmt::Display) -> KeyboxError {
    KeyboxError::with_kind(
        ErrorCategory::Internal,
        ErrorKind::InternalInvariant,
        format!("block cipher invariant violated: {err}"),
    )
}
