//! Template package records and their display ordering.

use crate::version::PackageVersion;
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// An installable template package as reported by a package source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePackage {
    /// Package id.
    pub id: String,
    /// Version string as published.
    pub version: String,
    /// Feed the package was found in.
    pub source: String,
}

impl TemplatePackage {
    /// Creates a package record.
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            source: source.into(),
        }
    }

    /// Parses [`version`](Self::version), returning `None` when it is not a
    /// semantic version.
    #[must_use]
    pub fn parsed_version(&self) -> Option<PackageVersion> {
        self.version.parse().ok()
    }
}

/// Sorts packages newest first.
///
/// Parseable versions come first in descending precedence. Unparseable
/// versions follow, ordered by ordinal comparison of the raw string. The sort
/// is stable, so packages with equal precedence keep their input order.
///
/// ```
/// use stratum_templates::{TemplatePackage, sort_by_version_desc};
///
/// let mut packages = vec![
///     TemplatePackage::new("templates", "9.2.0", "nuget"),
///     TemplatePackage::new("templates", "9.4.0-preview.1234", "nuget"),
///     TemplatePackage::new("templates", "9.3.0", "nuget"),
/// ];
/// sort_by_version_desc(&mut packages);
///
/// let versions: Vec<_> = packages.iter().map(|p| p.version.as_str()).collect();
/// assert_eq!(versions, ["9.4.0-preview.1234", "9.3.0", "9.2.0"]);
/// ```
pub fn sort_by_version_desc(packages: &mut [TemplatePackage]) {
    let mut keyed: Vec<(Option<PackageVersion>, TemplatePackage)> = packages
        .iter()
        .map(|package| {
            let parsed = package.parsed_version();
            if parsed.is_none() {
                tracing::debug!(id = %package.id, version = %package.version, "unparseable package version");
            }
            (parsed, package.clone())
        })
        .collect();

    keyed.sort_by(|(a_version, a), (b_version, b)| match (a_version, b_version) {
        (Some(a_version), Some(b_version)) => b_version.cmp(a_version),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.version.cmp(&b.version),
    });

    for (slot, (_, package)) in packages.iter_mut().zip(keyed) {
        *slot = package;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(packages: &[TemplatePackage]) -> Vec<&str> {
        packages.iter().map(|p| p.version.as_str()).collect()
    }

    #[test]
    fn prerelease_of_newer_version_sorts_first() {
        let mut packages = vec![
            TemplatePackage::new("t", "9.3.0", "feed"),
            TemplatePackage::new("t", "9.4.0", "feed"),
            TemplatePackage::new("t", "9.4.0-preview.1", "feed"),
        ];
        sort_by_version_desc(&mut packages);
        assert_eq!(versions(&packages), ["9.4.0", "9.4.0-preview.1", "9.3.0"]);
    }

    #[test]
    fn unparseable_versions_sort_last_ordinally() {
        let mut packages = vec![
            TemplatePackage::new("t", "zeta", "feed"),
            TemplatePackage::new("t", "1.0.0", "feed"),
            TemplatePackage::new("t", "Alpha", "feed"),
            TemplatePackage::new("t", "latest", "feed"),
        ];
        sort_by_version_desc(&mut packages);
        assert_eq!(versions(&packages), ["1.0.0", "Alpha", "latest", "zeta"]);
    }

    #[test]
    fn equal_precedence_keeps_input_order() {
        let mut packages = vec![
            TemplatePackage::new("t", "1.0.0+a", "first"),
            TemplatePackage::new("t", "1.0.0+b", "second"),
        ];
        sort_by_version_desc(&mut packages);
        assert_eq!(packages[0].source, "first");
        assert_eq!(packages[1].source, "second");
    }

    #[test]
    fn serde_uses_plain_field_names() {
        let package = TemplatePackage::new("stratum.templates", "1.0.0", "https://feed.example");
        let json = serde_json::to_value(&package).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "stratum.templates",
                "version": "1.0.0",
                "source": "https://feed.example",
            })
        );
        let back: TemplatePackage = serde_json::from_value(json).unwrap();
        assert_eq!(back, package);
    }
}
