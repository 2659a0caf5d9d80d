//! The record scanner: a byte-level state machine that walks the input,
//! delimits records on a configurable marker appearing at the start of a
//! line, tracks body-line lengths for the large-FASTA and FASTQ structural
//! checks, and yields `(header, offset, length)` triples to the caller.
//!
//! EOL handling is intentionally permissive: a maximal run of `\n`/`\r`
//! bytes of any length or mix is treated as a single line terminator. This
//! generalizes the classic two-byte-pair/blank-line distinction (a real
//! terminator of 1-2 bytes, or a blank line that changes nothing) to any
//! run length without needing to special-case exactly two repeated bytes.

use std::collections::VecDeque;
use std::io::Read;

use crate::config::{HEADER_BUF_INITIAL, HEADER_BUF_MAX};
use crate::error::BuildError;

/// One delimited record as produced by the scanner.
#[derive(Debug, Clone)]
pub struct ScannedRecord {
    pub offset: u64,
    pub length: u32,
    pub header: Vec<u8>,
}

/// Marker and structural-validation configuration for one scan pass.
pub struct ScanConfig<'a> {
    pub marker: &'a [u8],
    pub fastq: bool,
    pub large_fasta: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Header,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FqPhase {
    Seq,
    Qv,
}

struct Peeker<R: Read> {
    inner: R,
    buf: VecDeque<u8>,
}

impl<R: Read> Peeker<R> {
    fn new(inner: R) -> Self {
        Peeker {
            inner,
            buf: VecDeque::new(),
        }
    }

    fn fill_to(&mut self, n: usize) -> std::io::Result<()> {
        let mut byte = [0u8; 1];
        while self.buf.len() < n {
            let read = self.inner.read(&mut byte)?;
            if read == 0 {
                break;
            }
            self.buf.push_back(byte[0]);
        }
        Ok(())
    }

    fn peek(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        self.fill_to(n)?;
        Ok(self.buf.iter().take(n).copied().collect())
    }

    fn peek1(&mut self) -> std::io::Result<Option<u8>> {
        self.fill_to(1)?;
        Ok(self.buf.front().copied())
    }

    fn consume(&mut self, n: usize) -> std::io::Result<()> {
        self.fill_to(n)?;
        for _ in 0..n {
            self.buf.pop_front();
        }
        Ok(())
    }
}

#[inline]
fn is_eol(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

struct Scan<'a, R: Read> {
    peeker: Peeker<R>,
    config: &'a ScanConfig<'a>,

    pos: u64,
    phase: Phase,
    has_open_record: bool,
    record_start: u64,
    header_buf: Vec<u8>,

    in_eol_run: bool,
    eol_run_len: u32,
    last_eol_len: u32,
    awaiting_line_start: bool,

    line_index: usize,
    cur_line_len: u32,
    cur_line_is_plus: bool,
    first_body_line_len: Option<u32>,
    must_be_last_line: bool,

    fq_phase: FqPhase,
    seq_len: u32,
    qv_len: u32,
}

impl<'a, R: Read> Scan<'a, R> {
    fn new(reader: R, config: &'a ScanConfig<'a>) -> Self {
        Scan {
            peeker: Peeker::new(reader),
            config,
            pos: 0,
            phase: Phase::Body,
            has_open_record: false,
            record_start: 0,
            header_buf: Vec::with_capacity(HEADER_BUF_INITIAL),
            in_eol_run: false,
            eol_run_len: 0,
            last_eol_len: 0,
            awaiting_line_start: true,
            line_index: 0,
            cur_line_len: 0,
            cur_line_is_plus: false,
            first_body_line_len: None,
            must_be_last_line: false,
            fq_phase: FqPhase::Seq,
            seq_len: 0,
            qv_len: 0,
        }
    }

    fn run(&mut self, mut on_record: impl FnMut(ScannedRecord) -> Result<(), BuildError>) -> Result<u64, BuildError> {
        loop {
            if self.phase == Phase::Body && self.awaiting_line_start {
                let marker = self.config.marker;
                let window = self.peeker.peek(marker.len()).map_err(BuildError::IoRead)?;
                let fastq_guard = !self.config.fastq || self.seq_len <= self.qv_len;
                if window.len() == marker.len() && window == marker && fastq_guard {
                    self.open_record(marker.len(), &mut on_record)?;
                    continue;
                }
                self.awaiting_line_start = false;
            }

            let byte = match self.peeker.peek1().map_err(BuildError::IoRead)? {
                Some(b) => b,
                None => break,
            };

            if is_eol(byte) {
                self.peeker.consume(1).map_err(BuildError::IoRead)?;
                self.pos += 1;
                if !self.in_eol_run {
                    self.apply_eol_transition()?;
                    self.in_eol_run = true;
                    self.eol_run_len = 1;
                } else {
                    self.eol_run_len += 1;
                }
                self.last_eol_len = self.eol_run_len;
            } else if self.in_eol_run {
                self.in_eol_run = false;
                if self.phase == Phase::Body {
                    self.awaiting_line_start = true;
                }
            } else {
                self.peeker.consume(1).map_err(BuildError::IoRead)?;
                self.pos += 1;
                self.consume_content_byte(byte)?;
            }
        }

        self.close_at_eof(&mut on_record)?;
        Ok(self.pos)
    }

    fn open_record(
        &mut self,
        marker_len: usize,
        on_record: &mut impl FnMut(ScannedRecord) -> Result<(), BuildError>,
    ) -> Result<(), BuildError> {
        let marker_pos = self.pos;
        if self.has_open_record {
            let recsize = marker_pos
                .saturating_sub(self.record_start)
                .saturating_sub(self.last_eol_len as u64);
            self.validate_close()?;
            on_record(ScannedRecord {
                offset: self.record_start,
                length: recsize as u32,
                header: std::mem::take(&mut self.header_buf),
            })?;
        }
        self.peeker.consume(marker_len).map_err(BuildError::IoRead)?;
        self.pos += marker_len as u64;
        self.record_start = marker_pos;
        self.header_buf.clear();
        self.phase = Phase::Header;
        self.has_open_record = true;
        self.in_eol_run = false;
        Ok(())
    }

    fn consume_content_byte(&mut self, byte: u8) -> Result<(), BuildError> {
        match self.phase {
            Phase::Header => {
                self.header_buf.push(byte);
                if self.header_buf.len() > HEADER_BUF_MAX {
                    return Err(BuildError::format("header exceeds maximum size"));
                }
                Ok(())
            }
            Phase::Body => {
                if self.cur_line_len == 0 {
                    self.cur_line_is_plus = byte == b'+';
                }
                self.cur_line_len += 1;
                Ok(())
            }
        }
    }

    fn apply_eol_transition(&mut self) -> Result<(), BuildError> {
        match self.phase {
            Phase::Header => {
                self.phase = Phase::Body;
                self.line_index = 0;
                self.first_body_line_len = None;
                self.must_be_last_line = false;
                self.cur_line_len = 0;
                self.cur_line_is_plus = false;
                self.fq_phase = FqPhase::Seq;
                self.seq_len = 0;
                self.qv_len = 0;
                Ok(())
            }
            Phase::Body => self.finish_body_line(),
        }
    }

    fn finish_body_line(&mut self) -> Result<(), BuildError> {
        if self.config.large_fasta {
            if self.line_index == 0 {
                self.first_body_line_len = Some(self.cur_line_len);
            } else {
                if self.must_be_last_line {
                    return Err(BuildError::format(
                        "non-uniform line length in large-FASTA record (extra line after short line)",
                    ));
                }
                let first_len = self.first_body_line_len.unwrap_or(self.cur_line_len);
                if self.cur_line_len > first_len {
                    return Err(BuildError::format(
                        "non-uniform line length in large-FASTA record (line longer than first)",
                    ));
                } else if self.cur_line_len < first_len {
                    self.must_be_last_line = true;
                }
            }
        }

        if self.config.fastq {
            match self.fq_phase {
                FqPhase::Seq => {
                    if self.cur_line_is_plus {
                        self.fq_phase = FqPhase::Qv;
                    } else {
                        self.seq_len += self.cur_line_len;
                    }
                }
                FqPhase::Qv => {
                    self.qv_len += self.cur_line_len;
                }
            }
        }

        self.line_index += 1;
        self.cur_line_len = 0;
        self.cur_line_is_plus = false;
        Ok(())
    }

    fn validate_close(&self) -> Result<(), BuildError> {
        if self.config.fastq {
            if self.fq_phase != FqPhase::Qv {
                return Err(BuildError::format("FASTQ record has too few lines"));
            }
            if self.seq_len != self.qv_len {
                return Err(BuildError::format(format!(
                    "FASTQ sequence/quality length mismatch (seqlen={}, qvlen={})",
                    self.seq_len, self.qv_len
                )));
            }
        }
        Ok(())
    }

    fn close_at_eof(&mut self, on_record: &mut impl FnMut(ScannedRecord) -> Result<(), BuildError>) -> Result<(), BuildError> {
        if !self.has_open_record {
            return Ok(());
        }
        let trailing_eol = if self.in_eol_run { self.last_eol_len } else { 0 };
        if self.phase == Phase::Body && self.cur_line_len > 0 {
            self.finish_body_line()?;
        }
        self.validate_close()?;
        let recsize = self
            .pos
            .saturating_sub(self.record_start)
            .saturating_sub(trailing_eol as u64);
        on_record(ScannedRecord {
            offset: self.record_start,
            length: recsize as u32,
            header: std::mem::take(&mut self.header_buf),
        })
    }
}

/// Scans `reader` under `config`, invoking `on_record` once per delimited
/// record in scan order. Returns the total number of bytes read (the
/// effective database size).
pub fn scan<R: Read>(
    reader: R,
    config: &ScanConfig<'_>,
    on_record: impl FnMut(ScannedRecord) -> Result<(), BuildError>,
) -> Result<u64, BuildError> {
    let mut scan = Scan::new(reader, config);
    scan.run(on_record)
}
