//! The compressing sink: wraps a plain record writer so each record is
//! stored as an independent, self-describing LZ4 block instead of raw bytes.

pub mod block;
pub mod sink;

pub use sink::CompressingSink;
