//! Capability traits for things that can appear inside an expression.
//!
//! There is no common base type. A reference advertises what it can do through
//! [`Referenceable`], and implements [`ValueProvider`],
//! [`ManifestExpressionProvider`], both, or neither:
//!
//! | Capability | Meaning | I/O |
//! |------------|---------|-----|
//! | [`ValueProvider`] | resolves to a concrete runtime string | async, may suspend |
//! | [`ManifestExpressionProvider`] | renders a symbolic deployment-time string | none |

use crate::context::ResolveContext;
use crate::error::{ExpressionError, ResolutionError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Produces a runtime value, possibly through external calls.
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Resolves the value.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The resource graph and external collaborators to resolve against
    /// * `cancel` - Cancellation signal; must reach every external call
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] describing why the value is unavailable,
    /// or [`ResolutionError::Cancelled`] if `cancel` fired.
    async fn resolve_value(
        &self,
        ctx: &ResolveContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ResolutionError>;
}

/// Renders a symbolic, deployment-time expression without performing I/O.
pub trait ManifestExpressionProvider: Send + Sync {
    /// Returns the symbolic form, e.g. `{storage.outputs.blobEndpoint}`.
    ///
    /// Must be deterministic for an unchanged graph.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::NotManifestRepresentable`] when a nested part
    /// has no symbolic form.
    fn manifest_expression(&self) -> Result<String, ExpressionError>;
}

/// Capability query for values placed into a
/// [`ReferenceExpression`](crate::ReferenceExpression).
///
/// Both accessors default to `None`; implementors override the ones they
/// support by returning `Some(self)`.
///
/// # Example
///
/// ```
/// use stratum_expr::{ExpressionError, ManifestExpressionProvider, Referenceable};
///
/// /// A deployment parameter, only known symbolically.
/// struct Parameter(&'static str);
///
/// impl ManifestExpressionProvider for Parameter {
///     fn manifest_expression(&self) -> Result<String, ExpressionError> {
///         Ok(format!("{{{}.value}}", self.0))
///     }
/// }
///
/// impl Referenceable for Parameter {
///     fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
///         Some(self)
///     }
/// }
/// ```
pub trait Referenceable: Send + Sync + 'static {
    /// Returns the value capability, if supported.
    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        None
    }

    /// Returns the symbolic rendering capability, if supported.
    fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
        None
    }

    /// Short human-readable description used in error messages.
    fn describe(&self) -> String {
        core::any::type_name::<Self>().to_string()
    }
}
