use crate::catalog::Channel;
use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Conditions that stop the server before it binds its port.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
  #[error("failed to read media directory {}", .path.display())]
  DirectoryUnreadable {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("no media files found for channel {channel} in {}", .path.display())]
  EmptyCatalog { channel: Channel, path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("unknown channel `{0}`")]
  UnknownChannel(String),
  #[error("no media available for channel {0}")]
  NoMedia(Channel),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::UnknownChannel(_) => StatusCode::NOT_FOUND,
      ApiError::NoMedia(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    tracing::debug!(error = %self, "request rejected");
    (self.status(), self.to_string()).into_response()
  }
}

pub fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<()> {
  let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info,hyper=warn"));

  let Some(log_dir) = log_dir else {
    tracing_subscriber::fmt()
      .with_env_filter(env_filter)
      .try_init()
      .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    return Ok(());
  };

  std::fs::create_dir_all(log_dir)
    .map_err(|e| anyhow::anyhow!("failed to create log dir {}: {e}", log_dir.display()))?;

  // Rotate daily; JSON lines so the files stay greppable.
  let file_appender = tracing_appender::rolling::daily(log_dir, "twinslide.jsonl");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
  let _ = LOG_GUARD.set(guard);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(non_blocking)
    .json()
    .with_current_span(true)
    .with_span_list(true)
    .try_init()
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_channel_maps_to_not_found() {
    let err = ApiError::UnknownChannel("c".into());
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.to_string(), "unknown channel `c`");
  }

  #[test]
  fn empty_catalog_message_names_channel_and_path() {
    let err = StartupError::EmptyCatalog {
      channel: Channel::B,
      path: PathBuf::from("/srv/b"),
    };
    assert_eq!(err.to_string(), "no media files found for channel b in /srv/b");
  }
}
