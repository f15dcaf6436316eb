//! Error types for declaring resources.

use stratum_identifier::InvalidIdentifierError;

/// Errors raised while building the resource graph.
///
/// These surface at declaration time, before any resolution is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A strictly declared name is not a legal identifier.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifierError),

    /// A resource name was empty.
    #[error("resource name must not be empty")]
    EmptyName,

    /// A resource with the same id already exists.
    #[error("resource '{0}' is already declared")]
    DuplicateResource(String),

    /// Two resources would share one generated identifier.
    #[error("resource '{name}' normalizes to identifier '{identifier}', already used by '{existing}'")]
    IdentifierCollision {
        /// The name being declared.
        name: String,
        /// The shared identifier.
        identifier: String,
        /// The resource already using it.
        existing: String,
    },

    /// The referenced resource is not part of the graph.
    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    /// An output name was empty.
    #[error("output name on resource '{0}' must not be empty")]
    EmptyOutputName(String),
}
