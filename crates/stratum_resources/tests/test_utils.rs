//! Shared test utilities for `stratum_resources` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use async_trait::async_trait;
use core::time::Duration;
use stratum_expr::memory::{InMemoryDeployment, InMemorySecretStore};
use stratum_expr::{
    CancellationToken, DeploymentState, ResolutionError, ResolveContext, SecretStore,
};
use stratum_resources::{KeyVault, ResourceGraph};

pub const VAULT_ENDPOINT: &str = "https://secrets.vault.example.net/";

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURE
// ═══════════════════════════════════════════════════════════════════════════════

/// A graph with one key vault plus the in-memory collaborators behind it.
pub struct Fixture {
    pub graph: ResourceGraph,
    pub vault: KeyVault,
    pub deployment: InMemoryDeployment,
    pub secrets: InMemorySecretStore,
}

impl Fixture {
    /// Declares a vault named `secrets` whose endpoint is already realized.
    pub fn with_deployed_vault() -> Self {
        let fixture = Self::with_undeployed_vault();
        fixture
            .deployment
            .set_output("secrets", "vaultUri", VAULT_ENDPOINT);
        fixture
    }

    /// Declares a vault named `secrets` with no realized outputs.
    pub fn with_undeployed_vault() -> Self {
        let mut graph = ResourceGraph::new();
        let vault = graph.add_key_vault("secrets").unwrap();
        Self {
            graph,
            vault,
            deployment: InMemoryDeployment::new(),
            secrets: InMemorySecretStore::new(),
        }
    }

    pub fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(&self.graph, &self.deployment, &self.secrets)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOW DEPLOYMENT
// ═══════════════════════════════════════════════════════════════════════════════

/// Deployment backend that takes a long time and ignores cancellation itself.
pub struct SlowDeployment {
    pub delay: Duration,
    pub value: &'static str,
}

#[async_trait]
impl DeploymentState for SlowDeployment {
    async fn realized_output(
        &self,
        _resource_id: &str,
        _output_name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.value.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOW SECRET STORE
// ═══════════════════════════════════════════════════════════════════════════════

/// Secret store that takes a long time and ignores cancellation itself.
pub struct SlowSecretStore {
    pub delay: Duration,
    pub value: &'static str,
}

#[async_trait]
impl SecretStore for SlowSecretStore {
    async fn get_secret(
        &self,
        _vault_endpoint: &str,
        _secret_name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>, ResolutionError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.value.to_string()))
    }
}
