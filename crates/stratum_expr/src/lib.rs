//! Deferred reference expressions for Stratum.
//!
//! Infrastructure resources expose outputs that do not exist until the
//! resource is deployed. This crate models references to such values so they
//! can be composed long before deployment and projected two ways:
//!
//! - **Manifest form**: a symbolic string such as
//!   `Endpoint={api.outputs.endpoint}`, understood by deployment tooling.
//!   Rendering never performs I/O.
//! - **Resolved form**: the concrete string obtained after deployment, which
//!   may take a chain of asynchronous external calls.
//!
//! # Core Concepts
//!
//! - [`ValueProvider`] / [`ManifestExpressionProvider`] - the two capabilities
//! - [`Referenceable`] - capability query used when composing expressions
//! - [`ReferenceExpression`] - literal text interleaved with references
//! - [`ResolveContext`] - the graph and collaborators a resolution consults
//! - [`ResolutionError`] / [`ExpressionError`] - failure taxonomy
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Stratum architecture:
//!
//! - **Layer 1** (`stratum_identifier`, `stratum_expr`, `stratum_core`): primitives
//! - **Layer 2** (`stratum_resources`, `stratum_templates`): resource model
//!
//! Concrete references (resource outputs, key vault secrets) live in
//! `stratum_resources`.

mod context;
mod error;
mod expression;
pub mod memory;
mod provider;

pub use context::{DeploymentState, ResolveContext, ResourceLookup, SecretStore, cancellable};
pub use error::{ExpressionError, ResolutionError};
pub use expression::{ReferenceExpression, ReferenceExpressionBuilder, Segment};
pub use provider::{ManifestExpressionProvider, Referenceable, ValueProvider};

/// Re-export of the cancellation signal accepted by every resolution.
pub use tokio_util::sync::CancellationToken;
