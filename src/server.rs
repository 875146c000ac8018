//! HTTP server lifecycle: startup, bootstrap user, graceful shutdown.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::settings::Settings;
use crate::services::UserDirectory;
use crate::state::AppState;
use crate::store;

pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until a shutdown signal arrives.
    ///
    /// Startup order:
    /// 1. Open the configured user store
    /// 2. Create the bootstrap user if the store is empty
    /// 3. Fill the credential cache
    /// 4. Bind and serve with graceful shutdown
    ///
    /// # Errors
    /// - Store initialization or migration errors
    /// - Bootstrap user creation errors
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = %settings.server.port,
            request_timeout = %settings.server.request_timeout,
            storage_backend = %settings.storage.backend.as_str(),
            "Server configuration loaded"
        );

        tracing::info!(
            level = %settings.logger.level,
            console_enabled = %settings.logger.console.enabled,
            file_enabled = %settings.logger.file.enabled,
            "Logger configuration loaded"
        );

        let user_store = store::connect(settings).await?;
        let state = AppState::new(user_store)?;
        tracing::info!("Application state created");

        let users = &state.services.users;
        users.ensure_bootstrap_user(&settings.bootstrap).await?;
        users.reload().await?;
        tracing::info!(
            cached = users.credentials().len(),
            "Credential cache loaded"
        );

        let router = create_router(state, settings.server.request_timeout());

        let address = settings.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .inspect_err(|e| tracing::error!(error = %e, address = %address, "Failed to bind to address"))
            .with_context(|| format!("Failed to bind to {address}"))?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and then never fires, so
/// the other signal still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
