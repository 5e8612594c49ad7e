//! # Schema Versions
//!
//! `SchemaVersion` identifies one partition of the artifact store. Versions
//! follow semantic versioning and are ordered semantically: numeric
//! components compare as numbers, so `0.138.0` is newer than `0.99.0` even
//! though it sorts lower as a string.
//!
//! A release sorts after all of its pre-releases (`1.0.0-rc.1 < 1.0.0`).
//! Pre-release identifiers compare field by field: numeric identifiers
//! numerically, alphanumeric ones lexically, numeric before alphanumeric,
//! and a shorter identifier list first when all shared fields are equal.
//! Build metadata (`+...`) is rejected since it would make two distinct
//! partition names compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A semantic version, e.g. `0.138.0` or `1.2.0-rc.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaVersion {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<String>,
}

impl SchemaVersion {
    /// Construct a release version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// Parse a version, accepting an optional leading `v` (`v0.138.0`).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidVersion` unless the input is exactly
    /// three dot-separated numbers without leading zeros, optionally
    /// followed by `-` and dot-separated pre-release identifiers.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let invalid = |reason: &str| CoreError::InvalidVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.contains('+') {
            return Err(invalid("build metadata is not supported"));
        }

        let (core, pre) = match trimmed.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected MAJOR.MINOR.PATCH"));
        }
        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = parse_numeric(part).ok_or_else(|| invalid("version components must be numbers"))?;
        }

        let pre = match pre {
            None => Vec::new(),
            Some(pre) => {
                let identifiers: Vec<String> = pre.split('.').map(str::to_string).collect();
                for id in &identifiers {
                    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                        return Err(invalid("malformed pre-release identifier"));
                    }
                    if id.chars().all(|c| c.is_ascii_digit()) && parse_numeric(id).is_none() {
                        return Err(invalid("numeric pre-release identifiers must not have leading zeros"));
                    }
                }
                identifiers
            }
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component.
    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Whether this is a pre-release.
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

/// Parse a numeric component, rejecting empty input and leading zeros.
fn parse_numeric(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Ord for SchemaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    for (a, b) in self.pre.iter().zip(&other.pre) {
                        let ord = compare_identifier(a, b);
                        if ord != Ordering::Equal {
                            return ord;
                        }
                    }
                    self.pre.len().cmp(&other.pre.len())
                }
            })
    }
}

impl PartialOrd for SchemaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for SchemaVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SchemaVersion> for String {
    fn from(value: SchemaVersion) -> Self {
        value.to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Release ordering agrees with numeric tuple ordering.
        #[test]
        fn release_order_matches_tuple_order(
            a in (0u64..1000, 0u64..1000, 0u64..1000),
            b in (0u64..1000, 0u64..1000, 0u64..1000),
        ) {
            let va = SchemaVersion::new(a.0, a.1, a.2);
            let vb = SchemaVersion::new(b.0, b.1, b.2);
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }

        /// Display output always parses back to the same version.
        #[test]
        fn display_parse_roundtrip(major in 0u64..10_000, minor in 0u64..10_000, patch in 0u64..10_000) {
            let version = SchemaVersion::new(major, minor, patch);
            let reparsed = SchemaVersion::parse(&version.to_string()).unwrap();
            prop_assert_eq!(reparsed, version);
        }
    }
}
