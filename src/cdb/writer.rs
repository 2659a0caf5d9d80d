//! The CDB writer: accumulates `(key, payload)` pairs in an append-only
//! data region, then finalizes a 256-bucket, open-addressed hash-table
//! structure over them.
//!
//! Grounded in the classic `cdb` on-disk layout: a 2048-byte directory of
//! `(table_offset: u32 LE, num_slots: u32 LE)` pairs followed by the data
//! region (`klen | plen | key | value`, all lengths `u32` LE) and, after all
//! data has been written, one open-addressed hash table per non-empty
//! bucket.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::cdb::hash::{CdbHash, NUM_BUCKETS};
use crate::codec::write_u32_le;
use crate::error::BuildError;

const DIRECTORY_SIZE_BYTES: u64 = (NUM_BUCKETS * 8) as u64;

#[derive(Clone, Copy)]
struct SlotEntry {
    hash: u32,
    data_offset: u32,
}

/// Append-only CDB builder over any `Write + Seek` destination.
///
/// `add()` calls must be made before `finish()`; `finish()` leaves the
/// underlying file positioned at EOF so the caller can append a trailer in
/// the same write pass (see `build::driver`).
pub struct CdbWriter<F: Write + Seek> {
    file: F,
    data_cursor: u64,
    buckets: [Vec<SlotEntry>; NUM_BUCKETS],
    num_keys: u32,
    finished: bool,
}

impl CdbWriter<File> {
    /// Opens `path` for exclusive write, truncating any existing file, and
    /// reserves the 2048-byte directory region.
    pub fn create(path: &Path) -> Result<Self, BuildError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(BuildError::IoWrite)?;
        Self::new(file)
    }
}

impl<F: Write + Seek> CdbWriter<F> {
    pub fn new(mut file: F) -> Result<Self, BuildError> {
        file.write_all(&[0u8; DIRECTORY_SIZE_BYTES as usize])
            .map_err(BuildError::IoWrite)?;
        Ok(CdbWriter {
            file,
            data_cursor: DIRECTORY_SIZE_BYTES,
            buckets: std::array::from_fn(|_| Vec::new()),
            num_keys: 0,
            finished: false,
        })
    }

    /// Appends one `(key, payload)` pair to the data region.
    pub fn add(&mut self, key: &[u8], payload: &[u8]) -> Result<(), BuildError> {
        debug_assert!(!self.finished, "add() called after finish()");

        let hash = CdbHash::new(key);
        let data_offset = self.data_cursor;

        let mut record = Vec::with_capacity(8 + key.len() + payload.len());
        write_u32_le(&mut record, key.len() as u32);
        write_u32_le(&mut record, payload.len() as u32);
        record.extend_from_slice(key);
        record.extend_from_slice(payload);

        self.file.write_all(&record).map_err(BuildError::IoWrite)?;
        self.data_cursor += record.len() as u64;

        self.buckets[hash.bucket()].push(SlotEntry {
            hash: hash.0,
            data_offset: data_offset as u32,
        });
        self.num_keys += 1;
        Ok(())
    }

    /// Total number of successful `add()` calls so far.
    pub fn num_keys(&self) -> u32 {
        self.num_keys
    }

    /// Writes the per-bucket hash tables, then rewrites the directory at
    /// the front of the file. Leaves the file positioned at EOF.
    pub fn finish(mut self) -> Result<F, BuildError> {
        self.finalize()?;
        Ok(self.file)
    }

    fn finalize(&mut self) -> Result<(), BuildError> {
        if self.finished {
            return Ok(());
        }

        let mut directory = [(0u32, 0u32); NUM_BUCKETS];

        self.file
            .seek(SeekFrom::End(0))
            .map_err(BuildError::IoWrite)?;

        for (i, entries) in self.buckets.iter().enumerate() {
            if entries.is_empty() {
                continue;
            }

            let num_slots = entries.len() * 2;
            let mut slots = vec![(0u32, 0u32); num_slots];

            for entry in entries {
                let mut slot = (entry.hash as usize >> 8) % num_slots;
                loop {
                    if slots[slot] == (0, 0) {
                        slots[slot] = (entry.hash, entry.data_offset);
                        break;
                    }
                    slot = (slot + 1) % num_slots;
                }
            }

            let table_offset = self
                .file
                .stream_position()
                .map_err(BuildError::IoWrite)?;

            let mut buf = Vec::with_capacity(num_slots * 8);
            for (hash, offset) in &slots {
                write_u32_le(&mut buf, *hash);
                write_u32_le(&mut buf, *offset);
            }
            self.file.write_all(&buf).map_err(BuildError::IoWrite)?;

            directory[i] = (table_offset as u32, num_slots as u32);
        }

        self.file
            .seek(SeekFrom::Start(0))
            .map_err(BuildError::IoWrite)?;
        let mut dir_buf = Vec::with_capacity(DIRECTORY_SIZE_BYTES as usize);
        for (offset, slots) in &directory {
            write_u32_le(&mut dir_buf, *offset);
            write_u32_le(&mut dir_buf, *slots);
        }
        self.file.write_all(&dir_buf).map_err(BuildError::IoWrite)?;

        self.file
            .seek(SeekFrom::End(0))
            .map_err(BuildError::IoWrite)?;

        self.finished = true;
        Ok(())
    }

    /// Sum of every bucket's slot count — a testable invariant: this must
    /// equal `num_keys()` once every key hashes to a unique table size of
    /// `2 * entries_in_bucket`, halved back down by the `/2` the caller
    /// applies if checking `num_keys` directly (kept here only to support
    /// the unit test below; the build driver uses `num_keys()`).
    #[cfg(test)]
    fn bucket_entry_total(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }
}
