//! The field selector used by the `-f`/`-n` policies: which whitespace
//! tokens of a defline become keys.

use crate::config::MAX_FIELDS;
use crate::error::BuildError;

/// A sorted sequence of 1-based field positions, optionally open-ended
/// ("this field and every one after it").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    explicit: Vec<u32>,
    open_ended: bool,
}

impl FieldSelector {
    /// Selects the first `n` whitespace tokens (`-n N`).
    pub fn first_n(n: u32) -> Result<Self, BuildError> {
        if n == 0 {
            return Err(BuildError::config("field count must be at least 1"));
        }
        Ok(FieldSelector {
            explicit: (1..=n).collect(),
            open_ended: false,
        })
    }

    /// Parses a `-f` list like `1,3,5-` (a trailing `-` makes the selector
    /// open-ended from that value onward) or `2-4` style ranges.
    pub fn parse(spec: &str) -> Result<Self, BuildError> {
        let mut explicit = Vec::new();
        let mut open_ended = false;

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some(lo) = part.strip_suffix('-') {
                let lo: u32 = lo
                    .trim()
                    .parse()
                    .map_err(|_| BuildError::config(format!("invalid field range '{part}'")))?;
                explicit.push(lo);
                open_ended = true;
                continue;
            }
            if let Some((lo, hi)) = part.split_once('-') {
                let lo: u32 = lo
                    .trim()
                    .parse()
                    .map_err(|_| BuildError::config(format!("invalid field range '{part}'")))?;
                let hi: u32 = hi
                    .trim()
                    .parse()
                    .map_err(|_| BuildError::config(format!("invalid field range '{part}'")))?;
                if hi < lo {
                    return Err(BuildError::config(format!("invalid field range '{part}'")));
                }
                explicit.extend(lo..=hi);
                continue;
            }
            let n: u32 = part
                .parse()
                .map_err(|_| BuildError::config(format!("invalid field number '{part}'")))?;
            explicit.push(n);
        }

        if explicit.is_empty() {
            return Err(BuildError::config("field selector must name at least one field"));
        }
        if explicit.len() > MAX_FIELDS {
            return Err(BuildError::config(format!(
                "field selector names more than {MAX_FIELDS} fields"
            )));
        }

        explicit.sort_unstable();
        explicit.dedup();
        Ok(FieldSelector { explicit, open_ended })
    }

    /// Whether 1-based field `n` is selected.
    pub fn selects(&self, n: u32) -> bool {
        if self.open_ended {
            if let Some(&last) = self.explicit.last() {
                if n >= last {
                    return true;
                }
            }
        }
        self.explicit.binary_search(&n).is_ok()
    }

    /// The highest field position after which no further field could be
    /// selected, unless the selector is open-ended.
    pub fn last_bound(&self) -> Option<u32> {
        if self.open_ended {
            None
        } else {
            self.explicit.last().copied()
        }
    }
}
