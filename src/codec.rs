//! Byte-order codecs for the fixed-width integers persisted in the CDB
//! structure and the trailer.
//!
//! Everything on disk is canonical little-endian regardless of host
//! endianness; these are thin, explicit wrappers around the standard
//! library's `to_le_bytes`/`from_le_bytes` so every persisted-field write
//! and read in the rest of the crate goes through one obvious spot.

#[inline]
pub fn write_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
pub fn write_u64_le(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
pub fn read_u32_le(buf: &[u8]) -> u32 {
    u32::from_le_bytes(buf[..4].try_into().expect("4-byte slice"))
}

#[inline]
pub fn read_u64_le(buf: &[u8]) -> u64 {
    u64::from_le_bytes(buf[..8].try_into().expect("8-byte slice"))
}
