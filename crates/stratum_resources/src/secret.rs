//! References to secrets held in a key vault.

use crate::output::OutputReference;
use async_trait::async_trait;
use core::fmt;
use stratum_expr::{
    CancellationToken, ExpressionError, ManifestExpressionProvider, Referenceable,
    ResolutionError, ResolveContext, ValueProvider, cancellable,
};

/// A named secret stored in a key vault.
///
/// Resolution first resolves the vault's endpoint output, then asks the
/// [`SecretStore`](stratum_expr::SecretStore) for the secret at that endpoint.
/// Nothing is cached between resolutions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretReference {
    secret_name: String,
    vault_uri: OutputReference,
}

impl SecretReference {
    pub(crate) fn new(secret_name: impl Into<String>, vault_uri: OutputReference) -> Self {
        Self {
            secret_name: secret_name.into(),
            vault_uri,
        }
    }

    /// The secret name.
    #[must_use]
    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    /// Id of the key vault holding the secret.
    #[must_use]
    pub fn vault_id(&self) -> &str {
        self.vault_uri.resource().as_str()
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}.secrets.{}}}", self.vault_id(), self.secret_name)
    }
}

#[async_trait]
impl ValueProvider for SecretReference {
    async fn resolve_value(
        &self,
        ctx: &ResolveContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ResolutionError> {
        let vault = self.vault_id();

        let endpoint = self
            .vault_uri
            .resolve_value(ctx, cancel)
            .await
            .map_err(|err| err.in_vault(vault))?;

        if endpoint.is_empty() {
            tracing::debug!(vault, secret = %self.secret_name, "key vault endpoint is empty");
            return Err(ResolutionError::EmptyVaultEndpoint {
                vault: vault.to_string(),
            });
        }

        tracing::debug!(vault, secret = %self.secret_name, "fetching secret");
        let secret = cancellable(
            cancel,
            ctx.secrets().get_secret(&endpoint, &self.secret_name, cancel),
        )
        .await?;

        secret.ok_or_else(|| ResolutionError::SecretNotFound {
            vault: vault.to_string(),
            secret: self.secret_name.clone(),
        })
    }
}

impl ManifestExpressionProvider for SecretReference {
    fn manifest_expression(&self) -> Result<String, ExpressionError> {
        Ok(self.to_string())
    }
}

impl Referenceable for SecretReference {
    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }

    fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("secret '{}' in '{}'", self.secret_name, self.vault_id())
    }
}
