use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HighlightsError, Result};

/// Inclusive span of utterance indices
///
/// Upstream stages write ranges either as `"161-167"` or as `"[161, 167]"`;
/// both parse to the same value. `Display` produces the dash form and
/// [`UtteranceRange::bracketed`] the list form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtteranceRange {
    /// First utterance index
    pub start: usize,
    /// Last utterance index (inclusive)
    pub end: usize,
}

impl UtteranceRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(HighlightsError::RangeFormat(format!("{}-{}", start, end)));
        }
        Ok(Self { start, end })
    }

    /// Parse either the dash form or the bracketed list form
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || HighlightsError::RangeFormat(s.to_string());

        let (start, end) = match trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) => inner.split_once(',').ok_or_else(invalid)?,
            None => trimmed.split_once('-').ok_or_else(invalid)?,
        };

        let start: usize = start.trim().parse().map_err(|_| invalid())?;
        let end: usize = end.trim().parse().map_err(|_| invalid())?;

        if start > end {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }

    /// True if `inner` lies completely within this range
    pub fn contains(&self, inner: &UtteranceRange) -> bool {
        inner.start >= self.start && inner.end <= self.end
    }

    /// Number of utterances covered
    pub fn utterance_count(&self) -> usize {
        self.end - self.start + 1
    }

    /// Iterate over the covered indices
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// The list form, `"[start, end]"`, as written in candidate tables
    pub fn bracketed(&self) -> String {
        format!("[{}, {}]", self.start, self.end)
    }
}

impl fmt::Display for UtteranceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for UtteranceRange {
    type Err = HighlightsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
