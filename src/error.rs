//! Error types for the index builder.
//!
//! A single [`BuildError`] enum covers every failure kind the builder can
//! hit: configuration mistakes, I/O failures on either side of the build,
//! structural format violations, and key-length overflow. Internal code
//! threads `BuildError` directly (no `anyhow`); the CLI boundary in
//! `main.rs` wraps it in `anyhow::Error` for display.

use std::fmt;
use std::io;

/// Errors that can terminate an index build.
#[derive(Debug)]
pub enum BuildError {
    /// Contradictory policy flags, invalid marker syntax, invalid `-n`/`-f`
    /// ranges, more than [`crate::config::MAX_FIELDS`] fields,
    /// compression combined with FASTQ mode, or an unreadable/malformed
    /// stopword file.
    Config(String),
    /// Input file could not be opened or read.
    IoRead(io::Error),
    /// A write, seek, rename, or trailer-append failure on the output side.
    IoWrite(io::Error),
    /// Large-FASTA non-uniform line lengths, FASTQ seq/qv length mismatch,
    /// too few FASTQ lines, or header-buffer overflow past the sanity cap.
    Format(String),
    /// A single key exceeded [`crate::config::MAX_KEYLEN`] bytes.
    KeyOverflow,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Config(msg) => write!(f, "configuration error: {msg}"),
            BuildError::IoRead(e) => write!(f, "error reading input: {e}"),
            BuildError::IoWrite(e) => write!(f, "error writing output: {e}"),
            BuildError::Format(msg) => write!(f, "invalid input format: {msg}"),
            BuildError::KeyOverflow => write!(f, "key exceeds maximum length"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::IoRead(e) | BuildError::IoWrite(e) => Some(e),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the builder.
pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BuildError::Config(msg.into())
    }

    pub fn format<S: Into<String>>(msg: S) -> Self {
        BuildError::Format(msg.into())
    }
}
