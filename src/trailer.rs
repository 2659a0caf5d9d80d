//! The fixed-layout trailer (`cdbInfo`) appended after the CDB structure,
//! and the basename bytes written immediately before it.

use std::path::Path;

use crate::codec::{read_u32_le, read_u64_le, write_u32_le, write_u64_le};
use crate::error::BuildError;

/// Tag bytes identifying a trailer written by this builder.
pub const TAG: [u8; 4] = *b"CDBX";

/// Fixed byte size of the trailer, excluding the variable-length basename
/// that precedes it. The six named fields sum to 28 bytes; the trailing 4
/// are reserved padding, matching the C `cdbInfo` struct's size once the
/// `u64 dbsize` field forces 8-byte alignment and rounds 28 up to 32.
pub const TRAILER_LEN: usize = 4 + 4 + 4 + 4 + 8 + 4 + 4;

/// The index-wide summary recorded once, at the end of every build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trailer {
    pub idxflags: u32,
    pub num_records: u32,
    pub num_keys: u32,
    pub dbsize: u64,
    pub dbname: Vec<u8>,
}

impl Trailer {
    /// Derives the basename to record from the path given on the command
    /// line: the trailer stores the database's filename, not the full path
    /// it was built from, so an index remains valid if the database is
    /// later moved alongside it under a different directory.
    pub fn basename_of(db_path: &Path) -> Vec<u8> {
        db_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned().into_bytes())
            .unwrap_or_default()
    }

    /// Serializes the basename followed by the fixed trailer, in the order
    /// they must appear at the end of the index file.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.dbname.len() + TRAILER_LEN);
        buf.extend_from_slice(&self.dbname);
        buf.extend_from_slice(&TAG);
        write_u32_le(&mut buf, self.idxflags);
        write_u32_le(&mut buf, self.num_records);
        write_u32_le(&mut buf, self.num_keys);
        write_u64_le(&mut buf, self.dbsize);
        write_u32_le(&mut buf, self.dbname.len() as u32);
        buf.extend_from_slice(&[0u8; 4]);
        buf
    }

    /// Parses a trailer plus its preceding basename out of the final bytes
    /// of an index file. `tail` must be at least `TRAILER_LEN` bytes and
    /// end exactly at the file's EOF.
    pub fn parse(tail: &[u8]) -> Result<Self, BuildError> {
        if tail.len() < TRAILER_LEN {
            return Err(BuildError::format("index file too short for trailer"));
        }
        let fixed = &tail[tail.len() - TRAILER_LEN..];
        if fixed[0..4] != TAG {
            return Err(BuildError::format("index file missing trailer tag"));
        }
        let idxflags = read_u32_le(&fixed[4..8]);
        let num_records = read_u32_le(&fixed[8..12]);
        let num_keys = read_u32_le(&fixed[12..16]);
        let dbsize = read_u64_le(&fixed[16..24]);
        let dbnamelen = read_u32_le(&fixed[24..28]) as usize;

        let before_fixed = tail.len() - TRAILER_LEN;
        if dbnamelen > before_fixed {
            return Err(BuildError::format("trailer basename length exceeds buffer"));
        }
        let dbname = tail[before_fixed - dbnamelen..before_fixed].to_vec();

        Ok(Trailer {
            idxflags,
            num_records,
            num_keys,
            dbsize,
            dbname,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::idx_flags;

    #[test]
    fn basename_strips_directory() {
        let name = Trailer::basename_of(Path::new("/tmp/db/proteins.fa"));
        assert_eq!(name, b"proteins.fa");
    }

    #[test]
    fn round_trips_through_bytes() {
        let trailer = Trailer {
            idxflags: idx_flags::MULTI | idx_flags::COMPRESS,
            num_records: 42,
            num_keys: 99,
            dbsize: 123_456_789,
            dbname: b"proteins.fa".to_vec(),
        };
        let bytes = trailer.to_bytes();
        assert_eq!(bytes.len(), trailer.dbname.len() + TRAILER_LEN);
        let parsed = Trailer::parse(&bytes).unwrap();
        assert_eq!(parsed, trailer);
    }

    #[test]
    fn round_trips_with_preceding_cdb_bytes() {
        let trailer = Trailer {
            idxflags: idx_flags::LARGE_FASTA,
            num_records: 1,
            num_keys: 1,
            dbsize: 17,
            dbname: b"x".to_vec(),
        };
        let mut file = vec![0xAB; 2048];
        file.extend_from_slice(&trailer.to_bytes());
        let tail = &file[file.len() - (trailer.dbname.len() + TRAILER_LEN)..];
        assert_eq!(Trailer::parse(tail).unwrap(), trailer);
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(Trailer::parse(&[0u8; 4]).is_err());
    }

    #[test]
    fn rejects_wrong_tag() {
        let mut bytes = Trailer {
            idxflags: 0,
            num_records: 0,
            num_keys: 0,
            dbsize: 0,
            dbname: Vec::new(),
        }
        .to_bytes();
        bytes[0] = b'X';
        assert!(Trailer::parse(&bytes).is_err());
    }
}
