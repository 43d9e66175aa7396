pub mod app_state;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod local_api;
pub mod playhead;
pub mod render;

use anyhow::Context;
use app_state::AppState;
use config::Config;

/// Loads both catalogs, binds the listener and serves until Ctrl+C or SIGTERM.
/// Catalog problems fail here, before the port is bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
  tracing::info!(
    dir_a = %config.dir_a.display(),
    dir_b = %config.dir_b.display(),
    "starting twinslide"
  );

  let state = AppState::from_config(&config)?;

  let listener = tokio::net::TcpListener::bind(config.listen)
    .await
    .with_context(|| format!("failed to bind {}", config.listen))?;

  local_api::serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
  let ctrl_c = async {
    match tokio::signal::ctrl_c().await {
      Ok(()) => tracing::info!("received Ctrl+C"),
      Err(e) => tracing::error!(error = %e, "failed to install Ctrl+C handler"),
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
        tracing::info!("received SIGTERM");
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}
