//! Junk-character trimming applied to whitespace-delimited tokens before
//! they are stored as keys (the `-s`/default junk set).

use crate::config::DEFAULT_JUNK_CHARS;

/// A set of bytes to strip from both ends of a token. Defaults to
/// [`DEFAULT_JUNK_CHARS`]; `-s` overrides it with a caller-supplied set
/// (an empty override disables trimming entirely).
#[derive(Debug, Clone)]
pub struct JunkSet {
    bytes: Vec<u8>,
}

impl Default for JunkSet {
    fn default() -> Self {
        JunkSet {
            bytes: DEFAULT_JUNK_CHARS.to_vec(),
        }
    }
}

impl JunkSet {
    pub fn new(bytes: &[u8]) -> Self {
        JunkSet {
            bytes: bytes.to_vec(),
        }
    }

    #[inline]
    fn is_junk(&self, b: u8) -> bool {
        self.bytes.contains(&b)
    }

    /// Strips junk bytes from both ends of `token`. Leading junk is
    /// consumed without bound; if that leaves nothing, the token is
    /// entirely junk and trimming yields an empty slice.
    pub fn trim<'a>(&self, token: &'a [u8]) -> &'a [u8] {
        let mut start = 0;
        while start < token.len() && self.is_junk(token[start]) {
            start += 1;
        }
        if start >= token.len() {
            return &token[token.len()..];
        }
        let mut end = token.len();
        while end > start + 1 && self.is_junk(token[end - 1]) {
            end -= 1;
        }
        &token[start..end]
    }
}
