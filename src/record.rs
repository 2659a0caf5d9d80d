//! Types shared between the scanner, extractor, and CDB writer: records,
//! the narrow/wide payload shapes, and the trailer flag bits.

use crate::codec::{read_u32_le, read_u64_le, write_u32_le, write_u64_le};

/// The on-disk `(offset, length)` payload stored alongside every key for a
/// record, in its narrow (8-byte) or wide (12-byte) form depending on
/// whether `offset` exceeds `u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Narrow { offset: u32, length: u32 },
    Wide { offset: u64, length: u32 },
}

impl Payload {
    /// Selects narrow or wide encoding by offset magnitude: offsets that
    /// fit in a `u32` use the 8-byte form.
    pub fn new(offset: u64, length: u32) -> Self {
        if offset <= u32::MAX as u64 {
            Payload::Narrow {
                offset: offset as u32,
                length,
            }
        } else {
            Payload::Wide { offset, length }
        }
    }

    /// Serializes to the wire form consumed by the CDB writer as the
    /// opaque "value" bytes of an `add()` call.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12);
        match self {
            Payload::Narrow { offset, length } => {
                write_u32_le(&mut buf, offset);
                write_u32_le(&mut buf, length);
            }
            Payload::Wide { offset, length } => {
                write_u64_le(&mut buf, offset);
                write_u32_le(&mut buf, length);
            }
        }
        buf
    }

    /// Decodes a payload from its wire form; the shape is implied by the
    /// slice length (8 bytes = narrow, 12 bytes = wide), matching the
    /// boundary-testable property that a reader decodes by payload length.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        match buf.len() {
            8 => Some(Payload::Narrow {
                offset: read_u32_le(&buf[0..4]),
                length: read_u32_le(&buf[4..8]),
            }),
            12 => Some(Payload::Wide {
                offset: read_u64_le(&buf[0..8]),
                length: read_u32_le(&buf[8..12]),
            }),
            _ => None,
        }
    }
}

/// Index-wide flag bits recorded in the trailer (`idxflags`).
pub mod idx_flags {
    pub const MULTI: u32 = 0x01;
    pub const COMPRESS: u32 = 0x02;
    pub const COMPACT: u32 = 0x04;
    pub const COMPACT_PLUS: u32 = 0x08;
    pub const LARGE_FASTA: u32 = 0x10;
}
