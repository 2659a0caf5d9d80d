//! The CDB hash function: the classic djb variant used by `cdb` and every
//! derivative format (`h = 5381`, then `h = ((h << 5) + h) ^ b` per byte).

/// Starting value for the hash accumulator, matching the reference `cdb`
/// implementation.
pub const STARTING_HASH: u32 = 5381;

/// Number of buckets in the primary directory.
pub const NUM_BUCKETS: usize = 256;

/// Hash of a key, wrapping on overflow (the algorithm is explicitly modular
/// arithmetic over `u32`, not an error condition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdbHash(pub u32);

impl CdbHash {
    pub fn new(bytes: &[u8]) -> Self {
        let mut h = STARTING_HASH;
        for &b in bytes {
            h = h.wrapping_shl(5).wrapping_add(h) ^ (b as u32);
        }
        CdbHash(h)
    }

    /// Which of the 256 primary buckets this key belongs to.
    #[inline]
    pub fn bucket(&self) -> usize {
        (self.0 & 0xFF) as usize
    }

    /// Starting slot within a bucket's hash table of `num_slots` entries.
    #[inline]
    pub fn start_slot(&self, num_slots: usize) -> usize {
        if num_slots == 0 {
            0
        } else {
            ((self.0 >> 8) as usize) % num_slots
        }
    }
}
