//! Loader for the optional stopword list (`-w`): tokens filtered out of
//! multi-key policies' output.

use std::collections::HashSet;
use std::io::Read;

use crate::error::BuildError;

/// Maximum token length accepted from a stopword file; a longer run of
/// non-separator bytes is a configuration error rather than a truncated
/// token.
const MAX_TOKEN_LEN: usize = 255;

fn is_separator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b',' || b == b';'
}

/// Reads whitespace/`,`/`;`-delimited tokens from `reader` into a set.
pub fn load_stopwords<R: Read>(mut reader: R) -> Result<HashSet<Vec<u8>>, BuildError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(BuildError::IoRead)?;

    let mut words = HashSet::new();
    let mut token = Vec::new();
    for &b in &buf {
        if is_separator(b) {
            if !token.is_empty() {
                words.insert(std::mem::take(&mut token));
            }
            continue;
        }
        token.push(b);
        if token.len() > MAX_TOKEN_LEN {
            return Err(BuildError::config(format!(
                "stopword file token too long ('{}')",
                String::from_utf8_lossy(&token)
            )));
        }
    }
    if !token.is_empty() {
        words.insert(token);
    }
    Ok(words)
}
