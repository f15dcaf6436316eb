//! Template package records and the version ordering used to list them.

mod package;
mod version;

pub use package::{TemplatePackage, sort_by_version_desc};
pub use version::{PackageVersion, VersionParseError};
