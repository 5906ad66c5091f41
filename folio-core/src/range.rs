//! Batch range patterns such as `2-071~2-171`.
//!
//! A pattern names a start and end token that share a prefix and differ only
//! in a trailing number. Expansion yields every token in between, zero-padded
//! to the width of the start number.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Separates the start and end tokens.
pub const RANGE_SEPARATOR: char = '~';

/// Batches longer than this need explicit confirmation.
pub const LARGE_BATCH_THRESHOLD: u64 = 500;

/// Lazy prefix, then the maximal trailing run of ASCII digits.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?s)(.*?)([0-9]+)$").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Reasons a range pattern is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The pattern does not split into exactly two tokens.
    #[error("Invalid range format, expected start~end (e.g. 2-071~2-171)")]
    InvalidFormat,

    /// A token does not end in a number.
    #[error("Cannot find a trailing number in '{0}'")]
    UnrecognizedNumber(String),

    /// The tokens have different prefixes.
    #[error("Prefix mismatch: '{start}' vs '{end}'")]
    PrefixMismatch {
        /// Prefix of the start token.
        start: String,
        /// Prefix of the end token.
        end: String,
    },

    /// The start number is greater than the end number.
    #[error("Start {start} is greater than end {end}")]
    RangeOrderError {
        /// Start number.
        start: u64,
        /// End number.
        end: u64,
    },
}

/// A parsed range pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpansion {
    /// Shared prefix of every generated token.
    pub prefix: String,
    /// First number, inclusive.
    pub start: u64,
    /// Last number, inclusive.
    pub end: u64,
    /// Zero-padding width, taken from the start token.
    pub width: usize,
}

impl RangeExpansion {
    /// Parse a `start~end` pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`RangeError`] describing why the pattern was rejected.
    pub fn parse(pattern: &str) -> Result<Self, RangeError> {
        let parts: Vec<&str> = pattern.split(RANGE_SEPARATOR).collect();
        let [start_token, end_token] = parts.as_slice() else {
            return Err(RangeError::InvalidFormat);
        };

        let (start_prefix, start_digits) = split_token(start_token.trim())?;
        let (end_prefix, end_digits) = split_token(end_token.trim())?;

        if start_prefix != end_prefix {
            return Err(RangeError::PrefixMismatch {
                start: start_prefix.to_string(),
                end: end_prefix.to_string(),
            });
        }

        let start = parse_number(start_token.trim(), start_digits)?;
        let end = parse_number(end_token.trim(), end_digits)?;
        if start > end {
            return Err(RangeError::RangeOrderError { start, end });
        }

        Ok(Self {
            prefix: start_prefix.to_string(),
            start,
            end,
            width: start_digits.len(),
        })
    }

    /// Number of tokens the range produces, saturating at `u64::MAX`.
    #[must_use]
    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Always `false`; a parsed range holds at least one token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the batch is large enough to ask before running.
    #[must_use]
    pub fn needs_confirmation(&self) -> bool {
        self.len() > LARGE_BATCH_THRESHOLD
    }

    /// Token for a single number.
    #[must_use]
    pub fn token(&self, n: u64) -> String {
        format!("{}{n:0width$}", self.prefix, width = self.width)
    }

    /// Tokens in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..=self.end).map(|n| self.token(n))
    }
}

/// Parse and expand a pattern in one step.
///
/// # Errors
///
/// Returns a [`RangeError`] if the pattern is rejected.
pub fn expand_range(pattern: &str) -> Result<Vec<String>, RangeError> {
    Ok(RangeExpansion::parse(pattern)?.iter().collect())
}

fn split_token(token: &str) -> Result<(&str, &str), RangeError> {
    let captures = TOKEN
        .captures(token)
        .ok_or_else(|| RangeError::UnrecognizedNumber(token.to_string()))?;
    match (captures.get(1), captures.get(2)) {
        (Some(prefix), Some(digits)) => Ok((prefix.as_str(), digits.as_str())),
        _ => Err(RangeError::UnrecognizedNumber(token.to_string())),
    }
}

fn parse_number(token: &str, digits: &str) -> Result<u64, RangeError> {
    digits
        .parse()
        .map_err(|_| RangeError::UnrecognizedNumber(token.to_string()))
}
