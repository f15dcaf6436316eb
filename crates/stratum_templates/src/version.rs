//! Semantic version parsing and precedence.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

/// Why a version string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid package version '{input}': {reason}")]
pub struct VersionParseError {
    /// The rejected input.
    pub input: String,
    /// What was wrong with it.
    pub reason: String,
}

/// A `major.minor.patch[-prerelease][+build]` version.
///
/// Ordering follows semantic-version precedence: a prerelease sorts below its
/// release, and build metadata is ignored, so `1.0.0+a == 1.0.0+b`.
///
/// ```
/// use stratum_templates::PackageVersion;
///
/// let preview: PackageVersion = "9.4.0-preview.1234".parse().unwrap();
/// let release: PackageVersion = "9.3.0".parse().unwrap();
/// assert!(preview > release);
/// ```
#[derive(Debug, Clone)]
pub struct PackageVersion(semver::Version);

impl PackageVersion {
    /// Creates a release version.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Major component.
    #[must_use]
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor component.
    #[must_use]
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch component.
    #[must_use]
    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// Returns `true` if the version carries a prerelease tag.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// Build metadata, if present.
    #[must_use]
    pub fn build(&self) -> Option<&str> {
        (!self.0.build.is_empty()).then(|| self.0.build.as_str())
    }

    /// The underlying semantic version.
    #[must_use]
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl FromStr for PackageVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        semver::Version::parse(input)
            .map(Self)
            .map_err(|err| VersionParseError {
                input: input.to_string(),
                reason: err.to_string(),
            })
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_precedence(&other.0)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}
