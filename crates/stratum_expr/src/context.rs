//! Resolution context and the external collaborators it carries.
//!
//! Nothing here is global: every resolution receives a [`ResolveContext`]
//! borrowing the resource graph and the two collaborators that perform the
//! actual deployment lookups and secret fetches.

use crate::error::ResolutionError;
use async_trait::async_trait;
use core::fmt;
use core::future::Future;
use tokio_util::sync::CancellationToken;

/// Read access to the set of resources that currently exist.
///
/// Implemented by the resource graph. References hold resource ids, not
/// pointers, and check membership here before resolving.
pub trait ResourceLookup: Send + Sync {
    /// Returns `true` if a resource with this id exists.
    fn contains_resource(&self, resource_id: &str) -> bool;
}

/// Deployment or orchestration backend that knows realized outputs.
#[async_trait]
pub trait DeploymentState: Send + Sync {
    /// Returns the realized value of `output_name` on `resource_id`.
    ///
    /// `Ok(None)` means the resource is not deployed yet or the deployed
    /// resource has no such output. `Ok(Some(String::new()))` is a legitimate
    /// empty value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend itself fails.
    async fn realized_output(
        &self,
        resource_id: &str,
        output_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError>;
}

/// Secret store client.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches `secret_name` from the vault at `vault_endpoint`.
    ///
    /// `Ok(None)` means the store has no such secret.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Auth`] for credential failures, or any other
    /// error the store reports.
    async fn get_secret(
        &self,
        vault_endpoint: &str,
        secret_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError>;
}

/// Everything a [`ValueProvider`](crate::ValueProvider) may consult.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    resources: &'a dyn ResourceLookup,
    deployment: &'a dyn DeploymentState,
    secrets: &'a dyn SecretStore,
}

impl<'a> ResolveContext<'a> {
    /// Creates a context over a resource graph and its collaborators.
    #[must_use]
    pub fn new(
        resources: &'a dyn ResourceLookup,
        deployment: &'a dyn DeploymentState,
        secrets: &'a dyn SecretStore,
    ) -> Self {
        Self {
            resources,
            deployment,
            secrets,
        }
    }

    /// The resources that currently exist.
    #[must_use]
    pub fn resources(&self) -> &'a dyn ResourceLookup {
        self.resources
    }

    /// The deployment backend.
    #[must_use]
    pub fn deployment(&self) -> &'a dyn DeploymentState {
        self.deployment
    }

    /// The secret store.
    #[must_use]
    pub fn secrets(&self) -> &'a dyn SecretStore {
        self.secrets
    }
}

impl fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext").finish_non_exhaustive()
    }
}

/// Runs an external call so that cancellation always wins.
///
/// - fails with [`ResolutionError::Cancelled`] without polling `call` when
///   `cancel` has already fired
/// - drops `call` as soon as `cancel` fires while it is pending
/// - discards a result that completed after `cancel` fired
///
/// # Errors
///
/// Returns the error produced by `call`, or [`ResolutionError::Cancelled`].
pub async fn cancellable<T, F>(cancel: &CancellationToken, call: F) -> Result<T, ResolutionError>
where
    F: Future<Output = Result<T, ResolutionError>>,
{
    if cancel.is_cancelled() {
        return Err(ResolutionError::Cancelled);
    }

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(ResolutionError::Cancelled),
        result = call => result,
    };

    if cancel.is_cancelled() {
        return Err(ResolutionError::Cancelled);
    }
    result
}
