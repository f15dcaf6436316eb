//! Example application model built with Stratum.
//!
//! Declares a small application: a key vault, a database and an API service
//! whose environment is made of deferred references to the other two.
//!
//! ```text
//! ┌──────────────┐   vaultUri    ┌──────────────┐
//! │   secrets    │──────────────▶│              │
//! │  (key vault) │  dbPassword   │     api      │
//! └──────────────┘──────────────▶│  (service)   │
//! ┌──────────────┐  host, port   │              │
//! │   <app>-db   │──────────────▶│              │
//! └──────────────┘               └──────────────┘
//! ```
//!
//! The same model is rendered once as a manifest (symbolic placeholders) and
//! once resolved against a simulated deployment.

use indexmap::IndexMap;
use stratum_expr::memory::{InMemoryDeployment, InMemorySecretStore};
use stratum_expr::{
    CancellationToken, ExpressionError, ReferenceExpression, ResolutionError, ResolveContext,
    ValueProvider,
};
use stratum_resources::{GraphError, KeyVault, ResourceGraph, ResourceId};

/// Name of the database password secret.
pub const DB_PASSWORD_SECRET: &str = "dbPassword";

/// Errors surfaced by the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// The application model could not be declared.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// An expression could not be composed or rendered.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    /// A value could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// The manifest could not be serialized.
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// The declared application and the environment of its API service.
#[derive(Debug)]
pub struct AppModel {
    graph: ResourceGraph,
    vault: KeyVault,
    database: ResourceId,
    environment: IndexMap<String, ReferenceExpression>,
}

impl AppModel {
    /// Declares the application named `app_name`.
    ///
    /// The name may contain characters that are not legal in identifiers;
    /// the database is declared with a normalized identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be declared or an expression
    /// cannot be composed.
    pub fn build(app_name: &str) -> Result<Self, DemoError> {
        let mut graph = ResourceGraph::new();
        let vault = graph.add_key_vault("secrets")?;
        let database = graph.add_resource_normalized(format!("{app_name}-db"))?;
        graph.add_resource("api")?;

        let host = graph.output(&database, "host")?;
        let port = graph.output(&database, "port")?;

        let connection = ReferenceExpression::builder()
            .literal("Host=")
            .reference(host)
            .literal(";Port=")
            .reference(port)
            .literal(";Password=")
            .reference(vault.secret(DB_PASSWORD_SECRET))
            .build()?;

        let db_identifier = graph
            .resource(&database)
            .map(|node| node.identifier().to_string())
            .unwrap_or_else(|| stratum_identifier::normalize(&database));

        let mut environment = IndexMap::new();
        environment.insert(format!("ConnectionStrings__{db_identifier}"), connection);
        environment.insert(
            "VAULT_URI".to_string(),
            vault.connection_string_expression(),
        );
        environment.insert(
            "APP_NAME".to_string(),
            ReferenceExpression::literal(app_name),
        );

        tracing::info!(
            resources = graph.len(),
            variables = environment.len(),
            "application model declared"
        );

        Ok(Self {
            graph,
            vault,
            database,
            environment,
        })
    }

    /// The resource graph.
    #[must_use]
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// The API service environment in declaration order.
    #[must_use]
    pub fn environment(&self) -> &IndexMap<String, ReferenceExpression> {
        &self.environment
    }

    /// Renders the service environment as a JSON manifest.
    ///
    /// # Errors
    ///
    /// Fails if any variable has no manifest representation.
    pub fn render_manifest(&self) -> Result<String, DemoError> {
        let resources: Vec<_> = self
            .graph
            .iter()
            .map(|node| {
                serde_json::json!({
                    "id": node.id().as_str(),
                    "identifier": node.identifier(),
                    "outputs": node.output_names().collect::<Vec<_>>(),
                })
            })
            .collect();

        let manifest = serde_json::json!({
            "resources": resources,
            "api": { "env": serde_json::to_value(&self.environment)? },
        });
        Ok(serde_json::to_string_pretty(&manifest)?)
    }

    /// Records the outputs and secret a real deployment would produce.
    pub fn simulate_deployment(
        &self,
        deployment: &InMemoryDeployment,
        secrets: &InMemorySecretStore,
    ) {
        let endpoint = format!("https://{}.vault.example.net/", self.vault.id());
        deployment.set_output(self.vault.id().as_str(), "vaultUri", endpoint.as_str());
        deployment.set_output(self.vault.id().as_str(), "name", self.vault.id().as_str());
        deployment.set_output(self.database.as_str(), "host", "db.internal");
        deployment.set_output(self.database.as_str(), "port", "5432");
        secrets.set_secret(endpoint, DB_PASSWORD_SECRET, "correct-horse-battery-staple");
    }

    /// Resolves every environment variable, in order.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure.
    pub async fn resolve_environment(
        &self,
        deployment: &InMemoryDeployment,
        secrets: &InMemorySecretStore,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, String)>, DemoError> {
        let ctx = ResolveContext::new(&self.graph, deployment, secrets);
        let mut resolved = Vec::with_capacity(self.environment.len());

        for (name, expression) in &self.environment {
            let value = expression.resolve_value(&ctx, cancel).await?;
            tracing::debug!(variable = %name, "resolved");
            resolved.push((name.clone(), value));
        }
        Ok(resolved)
    }
}
