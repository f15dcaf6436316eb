//! Key vault resources.

use crate::graph::ResourceId;
use crate::output::OutputReference;
use crate::secret::SecretReference;
use stratum_expr::ReferenceExpression;

/// Output holding the vault's endpoint URI.
pub const VAULT_URI_OUTPUT: &str = "vaultUri";

/// Output holding the vault's deployed name.
pub const NAME_OUTPUT: &str = "name";

/// Handle to a key vault declared with
/// [`ResourceGraph::add_key_vault`](crate::ResourceGraph::add_key_vault).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVault {
    id: ResourceId,
    vault_uri: OutputReference,
    name: OutputReference,
}

impl KeyVault {
    pub(crate) fn new(id: ResourceId, vault_uri: OutputReference, name: OutputReference) -> Self {
        Self {
            id,
            vault_uri,
            name,
        }
    }

    /// The vault's resource id.
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// The endpoint output.
    #[must_use]
    pub fn vault_uri(&self) -> &OutputReference {
        &self.vault_uri
    }

    /// The deployed-name output.
    #[must_use]
    pub fn name_output(&self) -> &OutputReference {
        &self.name
    }

    /// Expression a consumer uses to connect to the vault.
    #[must_use]
    pub fn connection_string_expression(&self) -> ReferenceExpression {
        ReferenceExpression::of(self.vault_uri.clone())
    }

    /// References the secret `name` stored in this vault.
    #[must_use]
    pub fn secret(&self, name: impl Into<String>) -> SecretReference {
        SecretReference::new(name, self.vault_uri.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::ResourceGraph;

    #[test]
    fn registers_well_known_outputs() {
        let mut graph = ResourceGraph::new();
        let vault = graph.add_key_vault("secrets").unwrap();

        let node = graph.resource("secrets").unwrap();
        let names: Vec<_> = node.output_names().collect();
        assert_eq!(names, vec!["vaultUri", "name"]);
        assert_eq!(vault.vault_uri().to_string(), "{secrets.outputs.vaultUri}");
        assert_eq!(vault.name_output().to_string(), "{secrets.outputs.name}");
    }

    #[test]
    fn connection_string_renders_endpoint() {
        let mut graph = ResourceGraph::new();
        let vault = graph.add_key_vault("secrets").unwrap();

        assert_eq!(
            vault
                .connection_string_expression()
                .to_manifest_expression()
                .unwrap(),
            "{secrets.outputs.vaultUri}"
        );
    }

    #[test]
    fn secret_renders_symbolically() {
        let mut graph = ResourceGraph::new();
        let vault = graph.add_key_vault("secrets").unwrap();
        let secret = vault.secret("dbPassword");

        assert_eq!(secret.to_string(), "{secrets.secrets.dbPassword}");
        assert_eq!(secret.vault_id(), "secrets");
        assert_eq!(secret.secret_name(), "dbPassword");
    }
}
