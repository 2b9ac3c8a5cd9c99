//! Component version handling
//!
//! Toolchain component releases use two or three dotted numeric fields
//! (`2.17`, `2.23.2`), which strict semver rejects. They are parsed here and
//! stored as a [`semver::Version`] with the patch level defaulting to zero,
//! so ordering is lexicographic on (major, minor, patch).
//!
//! Minimum-version gating is deliberately looser than ordering: see
//! [`meets_minimum`].

use std::cmp::Ordering;
use std::fmt;

use crate::error::VersionError;

/// A parsed component version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

impl Version {
    /// Create a version from its three fields
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a dotted version string
    ///
    /// At least two fields are required and every field must be numeric.
    /// A missing patch field becomes `0`; fields past the third are
    /// validated but otherwise ignored.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let fields = split_numeric(version)?;
        if fields.len() < 2 {
            return Err(invalid(version, "expected at least MAJOR.MINOR"));
        }
        let patch = fields.get(2).copied().unwrap_or(0);
        Ok(Self::new(fields[0], fields[1], patch))
    }

    /// Major field
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor field
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch field
    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

/// Compare two versions field by field
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

/// Check a requested version against a minimum
///
/// For each of the first three fields of `minimum`, the corresponding field
/// of `current` must not be smaller. Fields missing from `current` are not
/// zero-filled: they satisfy the check. A `current` with fewer than two or
/// more than three fields is rejected.
pub fn meets_minimum(minimum: &str, current: &str) -> Result<bool, VersionError> {
    let current_fields = split_numeric(current)?;
    if current_fields.len() < 2 {
        return Err(invalid(current, "expected at least MAJOR.MINOR"));
    }
    if current_fields.len() > 3 {
        return Err(invalid(current, "more than three fields"));
    }
    let minimum_fields = split_numeric(minimum)?;

    for (min, cur) in minimum_fields.iter().zip(current_fields.iter()).take(3) {
        if cur < min {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Check whether `version` lies within `low..=high`
pub fn in_range(version: &Version, low: &Version, high: &Version) -> bool {
    compare(version, low) != Ordering::Less && compare(version, high) != Ordering::Greater
}

fn split_numeric(version: &str) -> Result<Vec<u64>, VersionError> {
    version
        .split('.')
        .map(|field| {
            field
                .parse::<u64>()
                .map_err(|_| invalid(version, &format!("'{field}' is not a number")))
        })
        .collect()
}

fn invalid(version: &str, reason: &str) -> VersionError {
    VersionError::InvalidVersionFormat {
        version: version.to_string(),
        reason: reason.to_string(),
    }
}
