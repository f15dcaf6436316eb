//! In-memory collaborators for local runs and tests.
//!
//! Both types count the calls they receive so callers can verify which
//! external lookups a resolution actually performed.

use crate::context::{DeploymentState, SecretStore};
use crate::error::ResolutionError;
use async_trait::async_trait;
use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

/// Deployment state backed by a map of realized outputs.
///
/// An output that was never recorded reads as "not available".
///
/// # Example
///
/// ```
/// use stratum_expr::memory::InMemoryDeployment;
///
/// let deployment = InMemoryDeployment::new();
/// deployment.set_output("kv", "vaultUri", "https://kv.vault.example/");
/// assert_eq!(deployment.call_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDeployment {
    outputs: RwLock<HashMap<(String, String), String>>,
    calls: AtomicUsize,
}

impl InMemoryDeployment {
    /// Creates a deployment with no realized outputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the realized value of an output.
    pub fn set_output(
        &self,
        resource_id: impl Into<String>,
        output_name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.outputs
            .write()
            .insert((resource_id.into(), output_name.into()), value.into());
    }

    /// Forgets a realized output.
    pub fn remove_output(&self, resource_id: &str, output_name: &str) -> Option<String> {
        self.outputs
            .write()
            .remove(&(resource_id.to_string(), output_name.to_string()))
    }

    /// Number of `realized_output` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentState for InMemoryDeployment {
    async fn realized_output(
        &self,
        resource_id: &str,
        output_name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .outputs
            .read()
            .get(&(resource_id.to_string(), output_name.to_string()))
            .cloned())
    }
}

/// Secret store backed by a map of `(vault endpoint, secret name)` pairs.
///
/// Endpoints marked with [`deny`](Self::deny) fail with
/// [`ResolutionError::Auth`], standing in for a credential failure.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<(String, String), String>>,
    denied: RwLock<HashSet<String>>,
    calls: AtomicUsize,
}

impl InMemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret value, replacing any previous version.
    pub fn set_secret(
        &self,
        vault_endpoint: impl Into<String>,
        secret_name: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.secrets
            .write()
            .insert((vault_endpoint.into(), secret_name.into()), value.into());
    }

    /// Rejects every request to `vault_endpoint` as unauthorized.
    pub fn deny(&self, vault_endpoint: impl Into<String>) {
        self.denied.write().insert(vault_endpoint.into());
    }

    /// Number of `get_secret` calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(
        &self,
        vault_endpoint: &str,
        secret_name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.denied.read().contains(vault_endpoint) {
            return Err(ResolutionError::Auth(format!(
                "access to '{vault_endpoint}' was denied"
            )));
        }

        Ok(self
            .secrets
            .read()
            .get(&(vault_endpoint.to_string(), secret_name.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deployment_returns_recorded_output() {
        let deployment = InMemoryDeployment::new();
        deployment.set_output("db", "host", "db.internal");
        let cancel = CancellationToken::new();

        let value = deployment.realized_output("db", "host", &cancel).await.unwrap();
        let missing = deployment.realized_output("db", "port", &cancel).await.unwrap();

        assert_eq!(value.as_deref(), Some("db.internal"));
        assert_eq!(missing, None);
        assert_eq!(deployment.call_count(), 2);
    }

    #[tokio::test]
    async fn deployment_forgets_removed_output() {
        let deployment = InMemoryDeployment::new();
        deployment.set_output("db", "host", "db.internal");
        assert_eq!(
            deployment.remove_output("db", "host").as_deref(),
            Some("db.internal")
        );

        let cancel = CancellationToken::new();
        let value = deployment.realized_output("db", "host", &cancel).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn secret_store_denies_marked_endpoint() {
        let store = InMemorySecretStore::new();
        store.set_secret("https://kv/", "pw", "hunter2");
        store.deny("https://kv/");

        let cancel = CancellationToken::new();
        let result = store.get_secret("https://kv/", "pw", &cancel).await;

        assert!(matches!(result, Err(ResolutionError::Auth(_))));
        assert_eq!(store.call_count(), 1);
    }
}
