//! A capturing reader used only when the compressing sink is active: every
//! byte pulled from the underlying source is appended, in read order, to a
//! shared buffer the driver can slice by the scanner's own `(offset,
//! length)` once a record closes — the scanner's lookahead always reads
//! ahead of the logical position it reports, so by the time a record's
//! `ScannedRecord` reaches the driver's callback, the buffer already holds
//! every byte of it.
//!
//! The buffer is shared via `Rc<RefCell<_>>` rather than borrowed, since the
//! scanner owns the `TeeReader` for the duration of the scan while the
//! per-record callback needs concurrent read/drain access to the same
//! bytes.

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

struct TeeInner {
    buf: Vec<u8>,
    drained: u64,
}

/// A handle onto a `TeeReader`'s captured bytes, usable from the scanner's
/// per-record callback while the reader itself is held elsewhere.
#[derive(Clone)]
pub struct TeeHandle(Rc<RefCell<TeeInner>>);

impl TeeHandle {
    /// Slices `[offset, offset + len)` of the original byte stream out of
    /// the captured buffer. Panics if the range was already drained or has
    /// not been read yet — both are driver bugs, not recoverable states.
    pub fn slice_to_vec(&self, offset: u64, len: u32) -> Vec<u8> {
        let inner = self.0.borrow();
        let start = (offset - inner.drained) as usize;
        let end = start + len as usize;
        inner.buf[start..end].to_vec()
    }

    /// Drops every captured byte up to and including `offset + len`; call
    /// once a record has been fully consumed so the buffer doesn't retain
    /// the whole file.
    pub fn drain_through(&self, offset: u64, len: u32) {
        let mut inner = self.0.borrow_mut();
        let end = (offset + len as u64 - inner.drained) as usize;
        inner.buf.drain(..end);
        inner.drained += end as u64;
    }
}

pub struct TeeReader<R: Read> {
    inner: R,
    shared: Rc<RefCell<TeeInner>>,
}

impl<R: Read> TeeReader<R> {
    pub fn new(inner: R) -> Self {
        TeeReader {
            inner,
            shared: Rc::new(RefCell::new(TeeInner {
                buf: Vec::new(),
                drained: 0,
            })),
        }
    }

    pub fn handle(&self) -> TeeHandle {
        TeeHandle(Rc::clone(&self.shared))
    }
}

impl<R: Read> Read for TeeReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(out)?;
        self.shared.borrow_mut().buf.extend_from_slice(&out[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn captures_bytes_in_read_order() {
        let mut tee = TeeReader::new(Cursor::new(b"hello world".to_vec()));
        let handle = tee.handle();
        let mut out = [0u8; 5];
        tee.read(&mut out).unwrap();
        assert_eq!(handle.slice_to_vec(0, 5), b"hello");
    }

    #[test]
    fn drain_shifts_subsequent_offsets() {
        let mut tee = TeeReader::new(Cursor::new(b"hello world".to_vec()));
        let handle = tee.handle();
        let mut out = [0u8; 11];
        tee.read(&mut out).unwrap();
        handle.drain_through(0, 6);
        assert_eq!(handle.slice_to_vec(6, 5), b"world");
    }
}
