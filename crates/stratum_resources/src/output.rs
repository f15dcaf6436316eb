//! References to named outputs of deployed resources.

use crate::graph::ResourceId;
use async_trait::async_trait;
use core::fmt;
use stratum_expr::{
    CancellationToken, ExpressionError, ManifestExpressionProvider, Referenceable,
    ResolutionError, ResolveContext, ValueProvider, cancellable,
};

/// A named output of a resource, such as a connection endpoint.
///
/// Obtained from [`ResourceGraph::output`](crate::ResourceGraph::output). The
/// handle holds only the owner's id; whether the owner still exists is checked
/// on every resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputReference {
    resource: ResourceId,
    name: String,
}

impl OutputReference {
    pub(crate) fn new(resource: ResourceId, name: &str) -> Self {
        Self {
            resource,
            name: name.to_string(),
        }
    }

    /// Id of the owning resource.
    #[must_use]
    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// The output name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for OutputReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}.outputs.{}}}", self.resource, self.name)
    }
}

#[async_trait]
impl ValueProvider for OutputReference {
    async fn resolve_value(
        &self,
        ctx: &ResolveContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<String, ResolutionError> {
        if cancel.is_cancelled() {
            return Err(ResolutionError::Cancelled);
        }

        let resource = self.resource.as_str();
        if !ctx.resources().contains_resource(resource) {
            return Err(ResolutionError::OwnerMissing {
                resource: resource.to_string(),
                output: self.name.clone(),
                vault: None,
            });
        }

        tracing::trace!(resource, output = %self.name, "querying deployment state");
        let value = cancellable(
            cancel,
            ctx.deployment()
                .realized_output(resource, &self.name, cancel),
        )
        .await?;

        value.ok_or_else(|| ResolutionError::OutputNotAvailable {
            resource: resource.to_string(),
            output: self.name.clone(),
            vault: None,
        })
    }
}

impl ManifestExpressionProvider for OutputReference {
    fn manifest_expression(&self) -> Result<String, ExpressionError> {
        Ok(self.to_string())
    }
}

impl Referenceable for OutputReference {
    fn as_value_provider(&self) -> Option<&dyn ValueProvider> {
        Some(self)
    }

    fn as_manifest_provider(&self) -> Option<&dyn ManifestExpressionProvider> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("output '{}' of '{}'", self.name, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use crate::ResourceGraph;
    use stratum_expr::memory::{InMemoryDeployment, InMemorySecretStore};
    use stratum_expr::{CancellationToken, ResolutionError, ResolveContext, ValueProvider};

    #[tokio::test]
    async fn resolves_realized_value() {
        let mut graph = ResourceGraph::new();
        let db = graph.add_resource("db").unwrap();
        let endpoint = graph.output(&db, "endpoint").unwrap();

        let deployment = InMemoryDeployment::new();
        deployment.set_output("db", "endpoint", "tcp://db:5432");
        let secrets = InMemorySecretStore::new();
        let ctx = ResolveContext::new(&graph, &deployment, &secrets);

        let value = endpoint
            .resolve_value(&ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "tcp://db:5432");
    }

    #[tokio::test]
    async fn empty_realized_value_is_a_value() {
        let mut graph = ResourceGraph::new();
        let db = graph.add_resource("db").unwrap();
        let tag = graph.output(&db, "tag").unwrap();

        let deployment = InMemoryDeployment::new();
        deployment.set_output("db", "tag", "");
        let secrets = InMemorySecretStore::new();
        let ctx = ResolveContext::new(&graph, &deployment, &secrets);

        let value = tag
            .resolve_value(&ctx, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn missing_owner_fails_without_querying_deployment() {
        let mut graph = ResourceGraph::new();
        let db = graph.add_resource("db").unwrap();
        let endpoint = graph.output(&db, "endpoint").unwrap();
        graph.remove_resource("db");

        let deployment = InMemoryDeployment::new();
        let secrets = InMemorySecretStore::new();
        let ctx = ResolveContext::new(&graph, &deployment, &secrets);

        let err = endpoint
            .resolve_value(&ctx, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::OwnerMissing { ref resource, ref output, vault: None }
                if resource == "db" && output == "endpoint"
        ));
        assert_eq!(deployment.call_count(), 0);
    }

    #[test]
    fn manifest_form_names_resource_and_output() {
        let mut graph = ResourceGraph::new();
        let cache = graph.add_resource("cache").unwrap();
        let host = graph.output(&cache, "host").unwrap();

        assert_eq!(host.to_string(), "{cache.outputs.host}");
        assert_eq!(host.resource().as_str(), "cache");
        assert_eq!(host.name(), "host");
    }
}
