//! Resource graph and the references that point into it.
//!
//! A [`ResourceGraph`] owns declared resources. Outputs and secrets are
//! referenced through lightweight handles ([`OutputReference`],
//! [`SecretReference`]) that implement both
//! [`ValueProvider`](stratum_expr::ValueProvider) and
//! [`ManifestExpressionProvider`](stratum_expr::ManifestExpressionProvider),
//! so they can be composed into any
//! [`ReferenceExpression`](stratum_expr::ReferenceExpression).
//!
//! # Example
//!
//! ```
//! use stratum_expr::ReferenceExpression;
//! use stratum_resources::ResourceGraph;
//!
//! let mut graph = ResourceGraph::new();
//! let vault = graph.add_key_vault("secrets").unwrap();
//! let db = graph.add_resource("db").unwrap();
//! let host = graph.output(&db, "host").unwrap();
//!
//! let conn = ReferenceExpression::builder()
//!     .literal("Host=")
//!     .reference(host)
//!     .literal(";Password=")
//!     .reference(vault.secret("dbPassword"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     conn.to_manifest_expression().unwrap(),
//!     "Host={db.outputs.host};Password={secrets.secrets.dbPassword}",
//! );
//! ```

mod error;
mod graph;
mod key_vault;
mod output;
mod secret;

pub use error::GraphError;
pub use graph::{ResourceGraph, ResourceId, ResourceKind, ResourceNode};
pub use key_vault::{KeyVault, NAME_OUTPUT, VAULT_URI_OUTPUT};
pub use output::OutputReference;
pub use secret::SecretReference;
