//! File encryption/decryption operations
//!
//! High-level helpers that read a whole file, run it through the cipher, and
//! write the result. Ciphertext is stored in its base32-armored form so
//! encrypted files are plain text.

use crate::armor;
use crate::cipher::Cipher;
use crate::error::{ErrorCategory, ErrorKind, KeyboxError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Encrypt a file
///
/// Reads plaintext from `input_path`, encrypts it with `cipher`, and writes
/// the armored ciphertext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on
/// Unix systems.
pub fn encrypt_file(cipher: &Cipher, input_path: &Path, output_path: &Path) -> Result<()> {
    tracing::debug!(path = %input_path.display(), "reading plaintext file");
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let blob = cipher
        .encrypt(&plaintext)
        .map_err(|e| e.with_context("encryption failed"))?;
    let armored = armor::wrap(&blob);
    tracing::debug!(armored_len = armored.len(), "writing armored ciphertext");
    write_file_secure(output_path, armored.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(())
}

/// Decrypt a file
///
/// Reads armored ciphertext from `input_path`, decrypts it with `cipher`, and
/// writes the plaintext to `output_path`.
///
/// The output file is created with mode 0o600 (read/write for owner only) on
/// Unix systems.
pub fn decrypt_file(cipher: &Cipher, input_path: &Path, output_path: &Path) -> Result<()> {
    tracing::debug!(path = %input_path.display(), "reading armored ciphertext file");
    let armored_bytes = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let armored = String::from_utf8(armored_bytes).map_err(|e| {
        KeyboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            "input file is not valid UTF-8",
            e,
        )
    })?;
    let blob = armor::unwrap(&armored).map_err(|e| e.with_context("failed to unarmor"))?;
    let plaintext = cipher
        .decrypt(&blob)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    write_file_secure(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    Ok(())
}

/// Write file with secure permissions (0o600 on Unix)
pub(crate) fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                KeyboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })?;

        file.write_all(contents).map_err(|e| {
            KeyboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents).map_err(|e| {
            KeyboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::Io,
                format!("failed to write {}", path.display()),
                e,
            )
        })?;
        Ok(())
    }
}

fn read_error(path: &Path, err: io::Error) -> KeyboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    KeyboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
