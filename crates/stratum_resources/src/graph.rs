//! The resource graph and its nodes.
//!
//! The graph exclusively owns every [`ResourceNode`]. References into the graph
//! ([`OutputReference`], [`SecretReference`](crate::SecretReference)) carry a
//! [`ResourceId`] only, so removing a node never leaves a dangling owner: a
//! later resolution simply fails with
//! [`ResolutionError::OwnerMissing`](stratum_expr::ResolutionError::OwnerMissing).
//!
//! Mutation (declaring resources, first use of an output) belongs to the
//! application-description phase. Resolution borrows the graph immutably, so
//! any number of resolutions may share it concurrently.

use crate::error::GraphError;
use crate::key_vault::{KeyVault, NAME_OUTPUT, VAULT_URI_OUTPUT};
use crate::output::OutputReference;
use core::borrow::Borrow;
use core::fmt;
use indexmap::IndexMap;
use stratum_expr::ResourceLookup;

// ─────────────────────────────────────────────────────────────────────────────
// ResourceId
// ─────────────────────────────────────────────────────────────────────────────

/// Stable key of a resource within its graph.
///
/// The id is the name the resource was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::ops::Deref for ResourceId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ResourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceNode
// ─────────────────────────────────────────────────────────────────────────────

/// What kind of infrastructure a node declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceKind {
    /// Any resource without special handling.
    #[default]
    Generic,
    /// A key vault holding secrets.
    KeyVault,
}

/// A declared unit of infrastructure.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    id: ResourceId,
    identifier: String,
    kind: ResourceKind,
    outputs: IndexMap<String, OutputReference>,
}

impl ResourceNode {
    /// The stable id.
    #[must_use]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// The legal identifier used for this resource in generated definitions.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The resource kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the handle for `name` if it has been referenced before.
    #[must_use]
    pub fn get_output(&self, name: &str) -> Option<&OutputReference> {
        self.outputs.get(name)
    }

    /// Output names in first-reference order.
    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    fn output_mut(&mut self, name: &str) -> OutputReference {
        if let Some(existing) = self.outputs.get(name) {
            return existing.clone();
        }

        tracing::trace!(resource = %self.id, output = name, "registering output");
        let output = OutputReference::new(self.id.clone(), name);
        self.outputs.insert(name.to_string(), output.clone());
        output
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ResourceGraph
// ─────────────────────────────────────────────────────────────────────────────

/// The set of declared resources.
///
/// Iteration follows declaration order, which keeps anything rendered from the
/// graph deterministic.
///
/// # Example
///
/// ```
/// use stratum_resources::ResourceGraph;
///
/// let mut graph = ResourceGraph::new();
/// let storage = graph.add_resource("storage").unwrap();
/// let endpoint = graph.output(&storage, "blobEndpoint").unwrap();
///
/// assert_eq!(endpoint.to_string(), "{storage.outputs.blobEndpoint}");
/// assert!(graph.add_resource("my-storage").is_err());
/// ```
#[derive(Debug, Default)]
pub struct ResourceGraph {
    resources: IndexMap<ResourceId, ResourceNode>,
}

impl ResourceGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a resource whose name must already be a legal identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidIdentifier`] for illegal names and
    /// [`GraphError::DuplicateResource`] for names already declared.
    pub fn add_resource(&mut self, name: impl Into<String>) -> Result<ResourceId, GraphError> {
        self.declare(name.into(), ResourceKind::Generic, Naming::Strict)
    }

    /// Declares a resource with an arbitrary name.
    ///
    /// The id keeps `name` verbatim; the generated identifier is its
    /// normalized form.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::EmptyName`], [`GraphError::DuplicateResource`],
    /// or [`GraphError::IdentifierCollision`] when another resource already
    /// normalizes to the same identifier.
    pub fn add_resource_normalized(
        &mut self,
        name: impl Into<String>,
    ) -> Result<ResourceId, GraphError> {
        self.declare(name.into(), ResourceKind::Generic, Naming::Normalize)
    }

    /// Declares a key vault.
    ///
    /// The name must be a legal identifier. The vault's well-known outputs are
    /// registered immediately.
    ///
    /// # Errors
    ///
    /// Same as [`add_resource`](Self::add_resource).
    pub fn add_key_vault(&mut self, name: impl Into<String>) -> Result<KeyVault, GraphError> {
        let id = self.declare(name.into(), ResourceKind::KeyVault, Naming::Strict)?;
        let vault_uri = self.output(&id, VAULT_URI_OUTPUT)?;
        let name_output = self.output(&id, NAME_OUTPUT)?;
        Ok(KeyVault::new(id, vault_uri, name_output))
    }

    /// Returns the handle for output `name` of `resource`, registering it on
    /// first use.
    ///
    /// Repeated calls return equal handles.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownResource`] or [`GraphError::EmptyOutputName`].
    pub fn output(&mut self, resource: &str, name: &str) -> Result<OutputReference, GraphError> {
        let node = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| GraphError::UnknownResource(resource.to_string()))?;

        if name.is_empty() {
            return Err(GraphError::EmptyOutputName(resource.to_string()));
        }

        Ok(node.output_mut(name))
    }

    /// Returns the key vault declared under `id`, if any.
    #[must_use]
    pub fn key_vault(&self, id: &str) -> Option<KeyVault> {
        let node = self.resources.get(id)?;
        if node.kind != ResourceKind::KeyVault {
            return None;
        }

        Some(KeyVault::new(
            node.id.clone(),
            node.get_output(VAULT_URI_OUTPUT)?.clone(),
            node.get_output(NAME_OUTPUT)?.clone(),
        ))
    }

    /// Looks up a resource.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&ResourceNode> {
        self.resources.get(id)
    }

    /// Removes a resource. References to it stay valid values but fail to
    /// resolve afterwards.
    pub fn remove_resource(&mut self, id: &str) -> Option<ResourceNode> {
        let removed = self.resources.shift_remove(id);
        if removed.is_some() {
            tracing::debug!(resource = id, "resource removed from graph");
        }
        removed
    }

    /// Iterates resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.resources.values()
    }

    /// Number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if no resources are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn declare(
        &mut self,
        name: String,
        kind: ResourceKind,
        naming: Naming,
    ) -> Result<ResourceId, GraphError> {
        if name.is_empty() {
            return Err(GraphError::EmptyName);
        }

        let identifier = match naming {
            Naming::Strict => {
                stratum_identifier::ensure_valid(&name)?;
                name.clone()
            }
            Naming::Normalize => stratum_identifier::normalize(&name),
        };

        if self.resources.contains_key(name.as_str()) {
            return Err(GraphError::DuplicateResource(name));
        }

        if let Some(existing) = self
            .resources
            .values()
            .find(|node| node.identifier == identifier)
        {
            return Err(GraphError::IdentifierCollision {
                name,
                identifier,
                existing: existing.id.to_string(),
            });
        }

        let id = ResourceId(name);
        tracing::debug!(resource = %id, identifier = %identifier, ?kind, "resource declared");

        self.resources.insert(
            id.clone(),
            ResourceNode {
                id: id.clone(),
                identifier,
                kind,
                outputs: IndexMap::new(),
            },
        );
        Ok(id)
    }
}

impl ResourceLookup for ResourceGraph {
    fn contains_resource(&self, resource_id: &str) -> bool {
        self.resources.contains_key(resource_id)
    }
}

/// How a declared name becomes an identifier.
#[derive(Debug, Clone, Copy)]
enum Naming {
    /// Reject names that are not already identifiers.
    Strict,
    /// Rewrite the name into an identifier.
    Normalize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_declaration_rejects_illegal_name() {
        let mut graph = ResourceGraph::new();
        let err = graph.add_resource("my-variable").unwrap_err();

        assert!(matches!(err, GraphError::InvalidIdentifier(ref e) if e.input == "my-variable"));
        assert!(graph.is_empty());
    }

    #[test]
    fn strict_declaration_keeps_name_as_identifier() {
        let mut graph = ResourceGraph::new();
        let id = graph.add_resource("my_variable9").unwrap();
        let node = graph.resource(id.as_str()).unwrap();

        assert_eq!(node.id().as_str(), "my_variable9");
        assert_eq!(node.identifier(), "my_variable9");
        assert_eq!(node.kind(), ResourceKind::Generic);
    }

    #[test]
    fn normalized_declaration_rewrites_identifier_only() {
        let mut graph = ResourceGraph::new();
        let id = graph.add_resource_normalized("1my-cache").unwrap();
        let node = graph.resource("1my-cache").unwrap();

        assert_eq!(id.as_str(), "1my-cache");
        assert_eq!(node.identifier(), "_1my_cache");
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut graph = ResourceGraph::new();
        assert_eq!(graph.add_resource_normalized(""), Err(GraphError::EmptyName));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut graph = ResourceGraph::new();
        graph.add_resource("db").unwrap();
        assert_eq!(
            graph.add_resource("db"),
            Err(GraphError::DuplicateResource("db".into()))
        );
    }

    #[test]
    fn identifier_collision_is_rejected() {
        let mut graph = ResourceGraph::new();
        graph.add_resource_normalized("my-db").unwrap();
        let err = graph.add_resource_normalized("my db").unwrap_err();

        assert_eq!(
            err,
            GraphError::IdentifierCollision {
                name: "my db".into(),
                identifier: "my_db".into(),
                existing: "my-db".into(),
            }
        );
    }

    #[test]
    fn outputs_register_lazily_in_first_use_order() {
        let mut graph = ResourceGraph::new();
        let id = graph.add_resource("api").unwrap();
        assert_eq!(graph.resource("api").unwrap().output_names().count(), 0);

        let first = graph.output(&id, "url").unwrap();
        graph.output(&id, "host").unwrap();
        let again = graph.output(&id, "url").unwrap();

        assert_eq!(first, again);
        let names: Vec<_> = graph.resource("api").unwrap().output_names().collect();
        assert_eq!(names, vec!["url", "host"]);
    }

    #[test]
    fn output_on_unknown_resource_fails() {
        let mut graph = ResourceGraph::new();
        assert_eq!(
            graph.output("ghost", "url"),
            Err(GraphError::UnknownResource("ghost".into()))
        );
    }

    #[test]
    fn empty_output_name_fails() {
        let mut graph = ResourceGraph::new();
        graph.add_resource("api").unwrap();
        assert_eq!(
            graph.output("api", ""),
            Err(GraphError::EmptyOutputName("api".into()))
        );
    }

    #[test]
    fn iteration_follows_declaration_order_after_removal() {
        let mut graph = ResourceGraph::new();
        for name in ["a", "b", "c"] {
            graph.add_resource(name).unwrap();
        }
        assert!(graph.remove_resource("b").is_some());
        assert!(graph.remove_resource("b").is_none());

        let ids: Vec<_> = graph.iter().map(|node| node.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!graph.contains_resource("b"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn key_vault_lookup_checks_kind() {
        let mut graph = ResourceGraph::new();
        graph.add_key_vault("secrets").unwrap();
        graph.add_resource("plain").unwrap();

        assert!(graph.key_vault("secrets").is_some());
        assert!(graph.key_vault("plain").is_none());
        assert!(graph.key_vault("missing").is_none());
    }
}
