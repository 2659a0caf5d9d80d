//! Splitting of NRDB-concatenated deflines (multiple `>`-less records
//! sharing one header line, as produced by `cd-hit`/`nrdb` style
//! deduplication tools).

/// The two separators historically used to glue several deflines together
/// into one FASTA header: four consecutive control bytes, or the literal
/// string `^|^`.
const NRDB_CHARSEP: [u8; 4] = [0x01, 0x02, 0x03, 0x04];
const NRDB_STRSEP: &[u8] = b"^|^";

fn find_charsep(s: &[u8]) -> Option<usize> {
    s.iter().position(|b| NRDB_CHARSEP.contains(b))
}

fn find_strsep(s: &[u8]) -> Option<usize> {
    if NRDB_STRSEP.len() > s.len() {
        return None;
    }
    s.windows(NRDB_STRSEP.len()).position(|w| w == NRDB_STRSEP)
}

/// Splits one concatenated defline into its first record and the remainder.
///
/// Returns `(head, rest)` where `head` is the defline text before the
/// separator and `rest` is everything after it (ready to be parsed as the
/// next concatenated defline), or `None` if there is no further
/// concatenation in `defline`.
pub fn split_next(defline: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(i) = find_charsep(defline) {
        return Some((&defline[..i], &defline[i + 1..]));
    }
    if let Some(i) = find_strsep(defline) {
        return Some((&defline[..i], &defline[i + NRDB_STRSEP.len()..]));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_control_byte_run() {
        let s = b"first\x01\x02\x03\x04second";
        let (head, rest) = split_next(s).unwrap();
        assert_eq!(head, b"first");
        assert_eq!(rest, b"\x02\x03\x04second");
    }

    #[test]
    fn splits_on_string_separator() {
        let s = b"first^|^second";
        let (head, rest) = split_next(s).unwrap();
        assert_eq!(head, b"first");
        assert_eq!(rest, b"second");
    }

    #[test]
    fn no_separator_returns_none() {
        assert_eq!(split_next(b"just one defline"), None);
    }
}
