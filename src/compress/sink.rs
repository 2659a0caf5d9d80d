//! Per-record LZ4 block framing for the compressed companion database.
//!
//! Each record is compressed independently of its neighbors so that any
//! single record can be recovered without decoding the ones around it. The
//! on-disk frame is:
//!
//! ```text
//! uncompressed_len : u32 LE
//! compressed_len   : u32 LE   (top bit set => payload is stored, not compressed)
//! payload          : compressed_len & 0x7fff_ffff bytes
//! ```
//!
//! A record is stored rather than compressed whenever compression would not
//! shrink it — incompressible or very short sequences are common enough in
//! FASTA/FASTQ data that this is the normal path, not a rare fallback.

use std::io::Write;

use crate::codec::write_u32_le;
use crate::compress::block::{compress_bound, compress_default, Lz4Error};
use crate::error::BuildError;

const STORED_FLAG: u32 = 0x8000_0000;

/// Wraps a `Write` destination, compressing each record written to it via
/// [`CompressingSink::write_record`] into its own self-contained block.
pub struct CompressingSink<W: Write> {
    inner: W,
    cursor: u64,
    scratch: Vec<u8>,
}

impl<W: Write> CompressingSink<W> {
    pub fn new(inner: W) -> Self {
        CompressingSink {
            inner,
            cursor: 0,
            scratch: Vec::new(),
        }
    }

    /// Compresses and appends `record`, returning the `(offset, length)` of
    /// the frame as written — this is what gets recorded as the record's
    /// payload in the CDB index, not the original `(offset, length)` in the
    /// uncompressed source.
    pub fn write_record(&mut self, record: &[u8]) -> Result<(u64, u32), BuildError> {
        let frame_offset = self.cursor;

        let bound = compress_bound(record.len() as i32).max(0) as usize;
        self.scratch.clear();
        self.scratch.resize(bound, 0);

        let (stored, compressed_len) = match compress_default(record, &mut self.scratch) {
            Ok(n) if n < record.len() => (false, n),
            Ok(_) => (true, 0),
            Err(Lz4Error::OutputTooSmall) => (true, 0),
            Err(e) => return Err(BuildError::format(format!("lz4 block compression failed: {e:?}"))),
        };

        let mut header = Vec::with_capacity(8);
        write_u32_le(&mut header, record.len() as u32);

        let payload: &[u8] = if stored {
            write_u32_le(&mut header, STORED_FLAG | record.len() as u32);
            record
        } else {
            write_u32_le(&mut header, compressed_len as u32);
            &self.scratch[..compressed_len]
        };

        self.inner.write_all(&header).map_err(BuildError::IoWrite)?;
        self.inner.write_all(payload).map_err(BuildError::IoWrite)?;

        let frame_len = (header.len() + payload.len()) as u32;
        self.cursor += frame_len as u64;

        Ok((frame_offset, frame_len))
    }

    /// Total bytes written so far — the effective size of the compressed
    /// companion database once the build completes.
    pub fn len(&self) -> u64 {
        self.cursor
    }

    pub fn finish(mut self) -> Result<W, BuildError> {
        self.inner.flush().map_err(BuildError::IoWrite)?;
        Ok(self.inner)
    }
}
