//! Vendor sequence numbers.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`SequenceNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceNumberError {
    /// The input string is empty.
    #[error("sequence number cannot be empty")]
    Empty,
    /// The input is not a non-negative integer.
    #[error("sequence number must be a whole number, got {0:?}")]
    NotANumber(String),
}

/// The identity of a vendor record.
///
/// Sequence numbers are stored by the data API as strings (`"42"`) but are
/// always whole numbers. New records take `max(existing) + 1`.
///
/// ## Examples
///
/// ```
/// use elate_chem_core::SequenceNumber;
///
/// let next = SequenceNumber::next_after(["1", "3", "7"]);
/// assert_eq!(next, SequenceNumber::new(8));
///
/// assert_eq!(SequenceNumber::next_after(Vec::<&str>::new()), SequenceNumber::FIRST);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// The sequence number given to the first record of an empty directory.
    pub const FIRST: Self = Self(1);

    /// Create a sequence number from its integer value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying integer value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The sequence number that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Parse a sequence number from its string encoding.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not a whole number.
    pub fn parse(s: &str) -> Result<Self, SequenceNumberError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SequenceNumberError::Empty);
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| SequenceNumberError::NotANumber(trimmed.to_owned()))
    }

    /// Compute the next free sequence number from every existing value.
    ///
    /// Values that do not parse as whole numbers are skipped. An empty (or
    /// entirely unparseable) input yields [`SequenceNumber::FIRST`].
    pub fn next_after<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        existing
            .into_iter()
            .filter_map(|raw| Self::parse(raw.as_ref()).ok())
            .max()
            .map_or(Self::FIRST, Self::next)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SequenceNumber {
    type Err = SequenceNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for SequenceNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Serialize for SequenceNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SequenceNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The column is text, but accept bare integers from hand-written payloads.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(Self(n)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_next_after_gaps() {
        assert_eq!(
            SequenceNumber::next_after(["1", "3", "7"]),
            SequenceNumber::new(8)
        );
    }

    #[test]
    fn test_next_after_empty() {
        assert_eq!(
            SequenceNumber::next_after(Vec::<String>::new()),
            SequenceNumber::FIRST
        );
    }

    #[test]
    fn test_next_after_skips_garbage() {
        assert_eq!(
            SequenceNumber::next_after(["abc", "", "12", " 4 "]),
            SequenceNumber::new(13)
        );
        assert_eq!(
            SequenceNumber::next_after(["n/a", "-"]),
            SequenceNumber::FIRST
        );
    }

    #[test]
    fn test_next_after_compares_numerically() {
        // "9" sorts after "10" as text
        assert_eq!(
            SequenceNumber::next_after(["9", "10", "2"]),
            SequenceNumber::new(11)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(SequenceNumber::parse("  "), Err(SequenceNumberError::Empty));
        assert!(matches!(
            SequenceNumber::parse("12a"),
            Err(SequenceNumberError::NotANumber(_))
        ));
        assert!(SequenceNumber::parse("-3").is_err());
    }

    #[test]
    fn test_serde_string_encoding() {
        let json = serde_json::to_string(&SequenceNumber::new(42)).unwrap();
        assert_eq!(json, "\"42\"");

        let from_text: SequenceNumber = serde_json::from_str("\"42\"").unwrap();
        let from_number: SequenceNumber = serde_json::from_str("42").unwrap();
        assert_eq!(from_text, from_number);

        assert!(serde_json::from_str::<SequenceNumber>("\"forty\"").is_err());
    }
}
