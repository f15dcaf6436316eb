//! # Stratum Internal Library
//!
//! Re-exports the core Stratum crates for convenience.

/// Layer 1: Identifier normalization.
pub use stratum_identifier;

/// Layer 1: Deferred reference expressions.
pub use stratum_expr;

/// Layer 1: Logging configuration.
pub use stratum_core;

/// Layer 2: Resource graph, outputs and secrets.
pub use stratum_resources;

/// Layer 2: Template package ordering.
pub use stratum_templates;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use stratum_core::{TracingConfig, TracingFormat};
    pub use stratum_expr::{
        CancellationToken, DeploymentState, ExpressionError, ManifestExpressionProvider,
        ReferenceExpression, Referenceable, ResolutionError, ResolveContext, ResourceLookup,
        SecretStore, ValueProvider,
    };
    pub use stratum_identifier::{InvalidIdentifierError, ensure_valid, normalize};
    pub use stratum_resources::{
        GraphError, KeyVault, OutputReference, ResourceGraph, ResourceId, SecretReference,
    };
}
