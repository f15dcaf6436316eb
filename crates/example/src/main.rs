//! Example provisioning CLI.
//!
//! Declares an application, prints its manifest, then resolves the service
//! environment against a simulated deployment.
//!
//! # Usage
//!
//! ```bash
//! provision-demo [app_name]
//! ```
//!
//! Logging is configured with `STRATUM_LOG` and `STRATUM_LOG_FORMAT`, which
//! may also come from a `.env` file.

use example::AppModel;
use stratum_core::TracingConfig;
use stratum_expr::CancellationToken;
use stratum_expr::memory::{InMemoryDeployment, InMemorySecretStore};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    TracingConfig::from_env().init();

    let app_name = std::env::args().nth(1).unwrap_or_else(|| "orders".to_string());

    let model = match AppModel::build(&app_name) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!(error = %e, "failed to declare application");
            std::process::exit(1);
        }
    };

    match model.render_manifest() {
        Ok(manifest) => tracing::info!("manifest:\n{manifest}"),
        Err(e) => {
            tracing::error!(error = %e, "failed to render manifest");
            std::process::exit(1);
        }
    }

    let deployment = InMemoryDeployment::new();
    let secrets = InMemorySecretStore::new();
    model.simulate_deployment(&deployment, &secrets);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling resolution");
            on_interrupt.cancel();
        }
    });

    match model
        .resolve_environment(&deployment, &secrets, &cancel)
        .await
    {
        Ok(resolved) => {
            for (name, value) in resolved {
                tracing::info!(variable = %name, %value, "resolved");
            }
            tracing::info!(
                outputs_queried = deployment.call_count(),
                secrets_fetched = secrets.call_count(),
                "resolution complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "resolution failed");
            std::process::exit(1);
        }
    }
}
