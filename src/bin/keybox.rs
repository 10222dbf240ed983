//! Keybox CLI - keyfile-based file encryption
//!
//! Command-line interface for generating encryption keys and encrypting or
//! decrypting files using AES-CBC with base32-armored ciphertext.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use keybox::file_ops;
use keybox::{Cipher, Key, KeyFormat, Padding};

#[derive(Parser)]
#[command(name = "keybox")]
#[command(version)]
#[command(about = "Keyfile-based symmetric file encryption.", long_about = None)]
struct Cli {
    /// Use the legacy zero-byte padding scheme, for interoperability with
    /// blobs produced by older tools. Truncates plaintexts at embedded
    /// zero bytes on decryption.
    #[arg(long, global = true)]
    legacy_padding: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new encryption key
    #[command(alias = "g")]
    Keygen {
        /// Length of the encryption key in bytes
        #[arg(long, default_value_t = 16)]
        length: usize,

        /// Encoding to use for the key: hex, base32, base64 or pem
        #[arg(long, default_value = "hex")]
        format: KeyFormat,

        /// File to write the key to; written to stdout when omitted
        output: Option<PathBuf>,
    },

    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file storing the encryption key
        #[arg(short, long, value_name = "FILE")]
        key: PathBuf,

        /// Encoding used to store the key
        #[arg(long, default_value = "hex")]
        format: KeyFormat,

        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the armored ciphertext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file storing the decryption key
        #[arg(short, long, value_name = "FILE")]
        key: PathBuf,

        /// Encoding used to store the key
        #[arg(long, default_value = "hex")]
        format: KeyFormat,

        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let padding = if cli.legacy_padding {
        Padding::ZeroTruncate
    } else {
        Padding::Pkcs7
    };

    let result = match cli.command {
        Commands::Keygen {
            length,
            format,
            output,
        } => keygen(length, format, output.as_deref()),
        Commands::Encrypt {
            key,
            format,
            input,
            output,
        } => load_cipher(&key, format, padding)
            .and_then(|cipher| file_ops::encrypt_file(&cipher, &input, &output)),
        Commands::Decrypt {
            key,
            format,
            input,
            output,
        } => load_cipher(&key, format, padding)
            .and_then(|cipher| file_ops::decrypt_file(&cipher, &input, &output)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", render_error(&e));
        process::exit(1);
    }
}

fn keygen(length: usize, format: KeyFormat, output: Option<&Path>) -> keybox::Result<()> {
    let key = Key::generate(length)?;
    match output {
        Some(path) => key.save_to_file(path, format)?,
        None => println!("{}", key.encode(format)),
    }
    Ok(())
}

fn load_cipher(key_path: &Path, format: KeyFormat, padding: Padding) -> keybox::Result<Cipher> {
    let key = Key::load_from_file(key_path, format)?;
    Cipher::with_padding(&key, padding)
}

/// One-line rendering of the error and its source chain.
fn render_error(err: &keybox::KeyboxError) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(err) = source {
        msg.push_str(": ");
        msg.push_str(&err.to_string());
        source = err.source();
    }
    msg
}
