//! The LZ4 block-format codec used to back the compressing sink.
//!
//! Only the one-shot entry points (`compress_default`/`compress_bound`,
//! `decompress_safe`) are consumed elsewhere in this crate; the remaining
//! streaming and dictionary variants are retained as part of the codec's
//! natural public surface.

pub mod compress;
pub mod decompress_api;
pub mod decompress_core;
pub mod types;

pub use compress::{compress_bound, compress_default, Lz4Error};
pub use decompress_api::{decompress_safe, BlockDecompressError};
