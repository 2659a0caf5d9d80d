//! Parsing of NCBI-style `db|accession` defline prefixes, used by the
//! compact and accession key policies.

/// Result of scanning one `|`-delimited run starting at some offset into a
/// defline: where the whole construct ends, and — if a field looked enough
/// like an accession — where that candidate accession begins and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbAcc {
    /// Index just past the construct (a `|` byte or end of slice).
    pub end: usize,
    /// End index of the first field judged to be an accession, if any.
    pub end_acc: Option<usize>,
    /// Start index of that accession candidate.
    pub acc_start: Option<usize>,
}

/// Scans `s[start..]` for a `db|accession`-shaped construct.
///
/// A `|`-delimited field is accepted as an accession candidate once it
/// contains a digit and is longer than 3 bytes, or once it is longer than 7
/// bytes regardless of content, or once it is the last field in the run.
/// The *length* compared against those thresholds is measured from `start`
/// (after skipping any leading `|` bytes) and never resets per field — so a
/// short first field that doesn't qualify is treated as a `db:` prefix and
/// scanning continues into the next field using the same origin.
///
/// Returns `None` if `start` is at or past the end of `s`, or if nothing
/// beyond a bare empty run was found there.
pub fn parse_dbacc(s: &[u8], start: usize) -> Option<DbAcc> {
    if start >= s.len() {
        return None;
    }
    let mut origin = start;
    while origin < s.len() && s[origin] == b'|' {
        origin += 1;
    }

    let mut has_digits = false;
    let mut end_acc: Option<usize> = None;
    let mut acc_start: Option<usize> = None;
    let mut pend = origin;
    let mut p = origin;

    loop {
        let byte = s.get(p).copied();
        if !has_digits && matches!(byte, Some(b) if b.is_ascii_digit()) {
            has_digits = true;
        }
        if byte == Some(b'|') || byte.is_none() {
            let curlen = p - origin;
            if byte.is_none() || (has_digits && curlen > 3) || curlen > 7 || acc_start.is_some() {
                pend = p;
                if end_acc.is_none() {
                    end_acc = Some(p);
                }
                if acc_start.is_none() {
                    acc_start = Some(origin);
                }
                break;
            } else {
                acc_start = Some(p + 1);
            }
            has_digits = false;
        }
        if byte.is_none() {
            break;
        }
        p += 1;
    }

    if pend != origin {
        Some(DbAcc {
            end: pend,
            end_acc,
            acc_start,
        })
    } else {
        None
    }
}
