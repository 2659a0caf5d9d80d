//! Library surface for the CDB-backed FASTA/FASTQ index builder.
//!
//! `main.rs` is a thin wrapper: argument parsing (`cli`), resolution into a
//! [`build::BuildConfig`], and one call into [`build::run`].

pub mod build;
pub mod cdb;
pub mod cli;
pub mod codec;
pub mod compress;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod keys;
pub mod record;
pub mod scanner;
pub mod trailer;
