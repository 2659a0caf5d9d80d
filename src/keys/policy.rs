//! Header key-extraction policies: turn one scanned record's header bytes
//! into zero or more CDB keys.

use std::collections::HashSet;

use crate::error::BuildError;
use crate::keys::dbacc::parse_dbacc;
use crate::keys::fields::FieldSelector;
use crate::keys::junk::JunkSet;
use crate::keys::nrdb;

/// Which key-extraction policy to apply to every record's header.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Key = the first whitespace/control-delimited token of the header.
    Default,
    /// Whitespace-tokenized, junk-trimmed, field-selected, stopword-filtered.
    Multi(FieldSelector),
    /// NCBI-style `db|accession` shortcut or full accession-mode parsing.
    Compact {
        /// Repeat over every NRDB-concatenated defline and every
        /// `db|accession` pair, instead of just the first shortcut pair.
        plus: bool,
        /// Also emit bare accessions (capped at `max_accs`).
        acc_mode: bool,
        /// Suppress the `db|accession` and whole-token keys, keeping only
        /// bare accessions.
        acc_only: bool,
        max_accs: usize,
    },
    /// Split the first token of each concatenated defline on a single byte.
    KeyDelim(u8),
}

type Sink<'a> = dyn FnMut(&[u8], u64, u32) -> Result<(), BuildError> + 'a;

/// Stateful driver that applies a [`Policy`] to successive records,
/// suppressing immediate duplicate `(offset, key)` pairs and tracking the
/// record/key counts used in the trailer.
pub struct KeyExtractor {
    policy: Policy,
    junk: JunkSet,
    stopwords: Option<HashSet<Vec<u8>>>,
    case_insensitive: bool,
    last_offset: Option<u64>,
    last_key: Option<Vec<u8>>,
    num_records: u64,
    num_keys: u64,
}

impl KeyExtractor {
    pub fn new(
        policy: Policy,
        junk: JunkSet,
        stopwords: Option<HashSet<Vec<u8>>>,
        case_insensitive: bool,
    ) -> Self {
        KeyExtractor {
            policy,
            junk,
            stopwords,
            case_insensitive,
            last_offset: None,
            last_key: None,
            num_records: 0,
            num_keys: 0,
        }
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    pub fn num_keys(&self) -> u64 {
        self.num_keys
    }

    /// Extracts and emits every key for one record's header. `add` is
    /// invoked once per surviving key with `(key_bytes, offset, length)`.
    pub fn extract(
        &mut self,
        header: &[u8],
        offset: u64,
        length: u32,
        mut add: impl FnMut(&[u8], u64, u32) -> Result<(), BuildError>,
    ) -> Result<(), BuildError> {
        self.num_records += 1;
        let add: &mut Sink<'_> = &mut add;
        match self.policy.clone() {
            Policy::Default => self.extract_default(header, offset, length, add),
            Policy::Multi(selector) => self.extract_multi(&selector, header, offset, length, add),
            Policy::Compact {
                plus,
                acc_mode,
                acc_only,
                max_accs,
            } => self.extract_compact(plus, acc_mode, acc_only, max_accs, header, offset, length, add),
            Policy::KeyDelim(delim) => self.extract_key_delim(delim, header, offset, length, add),
        }
    }

    fn emit(&mut self, key: &[u8], offset: u64, length: u32, add: &mut Sink<'_>) -> Result<(), BuildError> {
        if key.is_empty() {
            return Ok(());
        }
        if key.len() >= crate::config::MAX_KEYLEN {
            return Err(BuildError::KeyOverflow);
        }
        if self.last_offset == Some(offset) && self.last_key.as_deref() == Some(key) {
            return Ok(());
        }
        add(key, offset, length)?;
        self.last_offset = Some(offset);
        self.last_key = Some(key.to_vec());
        self.num_keys += 1;
        Ok(())
    }

    /// Emits `key`, and, in case-insensitive mode, its lowercased form when
    /// that differs — the variant used by the Default and Multi policies
    /// only; the compact and key-delim families never lowercase.
    fn emit_with_case(&mut self, key: &[u8], offset: u64, length: u32, add: &mut Sink<'_>) -> Result<(), BuildError> {
        self.emit(key, offset, length, add)?;
        if self.case_insensitive {
            let lower = key.to_ascii_lowercase();
            if lower != key {
                self.emit(&lower, offset, length, add)?;
            }
        }
        Ok(())
    }

    fn extract_default(&mut self, header: &[u8], offset: u64, length: u32, add: &mut Sink<'_>) -> Result<(), BuildError> {
        let end = header
            .iter()
            .position(|&b| b.is_ascii_whitespace() || b < 32)
            .unwrap_or(header.len());
        self.emit_with_case(&header[..end], offset, length, add)
    }

    fn extract_multi(
        &mut self,
        selector: &FieldSelector,
        header: &[u8],
        offset: u64,
        length: u32,
        add: &mut Sink<'_>,
    ) -> Result<(), BuildError> {
        let mut fieldno = 0u32;
        for raw in header.split(|&b| b.is_ascii_whitespace()) {
            if raw.is_empty() {
                continue;
            }
            fieldno += 1;
            if !selector.selects(fieldno) {
                if let Some(bound) = selector.last_bound() {
                    if fieldno > bound {
                        break;
                    }
                }
                continue;
            }
            let token = self.junk.trim(raw);
            if token.is_empty() {
                continue;
            }
            if let Some(stop) = &self.stopwords {
                if stop.contains(token) {
                    continue;
                }
            }
            self.emit_with_case(token, offset, length, add)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_compact(
        &mut self,
        plus: bool,
        acc_mode: bool,
        acc_only: bool,
        max_accs: usize,
        header: &[u8],
        offset: u64,
        length: u32,
        add: &mut Sink<'_>,
    ) -> Result<(), BuildError> {
        let mut segment = header;
        loop {
            let (current, rest) = match nrdb::split_next(segment) {
                Some((head, rest)) => (head, Some(rest)),
                None => (segment, None),
            };
            let token_end = first_token_end(current);
            let token = &current[..token_end];

            if !plus {
                match parse_dbacc(token, 0) {
                    Some(r) => self.emit(&token[..r.end_acc.unwrap_or(r.end)], offset, length, add)?,
                    None => self.emit(token, offset, length, add)?,
                }
                return Ok(());
            }

            if !token.is_empty() {
                self.emit(token, offset, length, add)?;
            }
            self.extract_compact_pairs(current, token_end, acc_mode, acc_only, max_accs, offset, length, add)?;

            match rest {
                Some(rest) => segment = rest,
                None => break,
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_compact_pairs(
        &mut self,
        segment: &[u8],
        token_end: usize,
        acc_mode: bool,
        acc_only: bool,
        max_accs: usize,
        offset: u64,
        length: u32,
        add: &mut Sink<'_>,
    ) -> Result<(), BuildError> {
        let mut dbacc_start = 0usize;
        let mut acc_keyed = 0usize;

        loop {
            let parsed = match parse_dbacc(segment, dbacc_start) {
                Some(p) => p,
                None => break,
            };

            if let Some(facc_end) = parsed.end_acc {
                if facc_end < parsed.end {
                    if !acc_only {
                        self.emit(&segment[dbacc_start..facc_end], offset, length, add)?;
                    }
                    if acc_mode && acc_keyed < max_accs {
                        if let Some(acc_start) = parsed.acc_start {
                            self.emit(&segment[acc_start..facc_end], offset, length, add)?;
                            acc_keyed += 1;
                        }
                    }
                }
            }

            if dbacc_start == 0 && parsed.end == token_end {
                if acc_mode {
                    if let Some(acc_start) = parsed.acc_start {
                        if acc_start != dbacc_start {
                            self.emit(&segment[acc_start..parsed.end], offset, length, add)?;
                        }
                    }
                }
                break;
            }

            if !acc_only {
                self.emit(&segment[dbacc_start..parsed.end], offset, length, add)?;
            }
            if acc_mode && acc_keyed < max_accs {
                if let Some(acc_start) = parsed.acc_start {
                    self.emit(&segment[acc_start..parsed.end], offset, length, add)?;
                    acc_keyed += 1;
                }
            }

            if parsed.end == token_end {
                break;
            }
            dbacc_start = parsed.end + 1;
        }
        Ok(())
    }

    fn extract_key_delim(
        &mut self,
        delim: u8,
        header: &[u8],
        offset: u64,
        length: u32,
        add: &mut Sink<'_>,
    ) -> Result<(), BuildError> {
        let mut segment = header;
        loop {
            let (current, rest) = match nrdb::split_next(segment) {
                Some((head, rest)) => (head, Some(rest)),
                None => (segment, None),
            };
            if current.is_empty() {
                break;
            }
            let token_end = first_token_end(current);
            let token = &current[..token_end];
            for piece in token.split(|&b| b == delim) {
                self.emit(piece, offset, length, add)?;
            }
            match rest {
                Some(rest) => segment = rest,
                None => break,
            }
        }
        Ok(())
    }
}

fn first_token_end(s: &[u8]) -> usize {
    s.iter().position(|&b| b.is_ascii_whitespace()).unwrap_or(s.len())
}
