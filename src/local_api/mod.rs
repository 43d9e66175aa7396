mod stream;

pub use stream::event_stream;

use crate::{
  app_state::AppState,
  catalog::Channel,
  error::ApiError,
  render::{self, ContentFragment, ADVANCE_PATH, EVENTS_STREAM_PATH},
};
use anyhow::Context;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::Html,
  routing::{get, post},
  Router,
};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Older page markup connects here; served the same as the events stream.
const LEGACY_STREAM_PATH: &str = "/sse";

pub fn router(state: AppState) -> Router {
  let mut app = Router::new()
    .route("/:channel", get(get_page))
    .route("/content/:channel", get(get_content))
    .route(ADVANCE_PATH, post(post_advance))
    .route(EVENTS_STREAM_PATH, get(stream::get_events))
    .route(LEGACY_STREAM_PATH, get(stream::get_events));

  for channel in Channel::ALL {
    let dir = state.catalogs.dir(channel).to_path_buf();
    app = app.nest_service(&channel.static_prefix(), ServeDir::new(dir));
  }

  app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Serves until `signal` resolves, then ends every open event stream and drains.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> anyhow::Result<()>
where
  F: Future<Output = ()> + Send + 'static,
{
  let shutdown = state.shutdown.clone();
  let app = router(state);

  if let Ok(addr) = listener.local_addr() {
    tracing::info!(%addr, "http server listening");
  }

  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      signal.await;
      tracing::info!("shutting down, closing event streams");
      shutdown.cancel();
    })
    .await
    .context("http server stopped")
}

async fn get_page(Path(channel): Path<String>) -> Result<Html<String>, ApiError> {
  let channel: Channel = channel.parse()?;
  Ok(Html(render::full_page(channel)))
}

async fn get_content(
  State(st): State<AppState>,
  Path(channel): Path<String>,
) -> Result<Html<String>, ApiError> {
  let channel: Channel = channel.parse()?;
  let position = st.playhead.current();
  let fragment = ContentFragment::select(channel, st.catalogs.get(channel), position)
    .ok_or(ApiError::NoMedia(channel))?;
  tracing::debug!(
    %channel,
    position,
    index = fragment.index,
    file = %fragment.file_name,
    video = fragment.is_video(),
    "render content"
  );
  Ok(Html(fragment.to_html()))
}

async fn post_advance(State(st): State<AppState>) -> StatusCode {
  let position = st.playhead.advance();
  let report = st.events.emit_media_changed();
  tracing::info!(
    position,
    delivered = report.delivered,
    dropped = report.dropped,
    "advanced"
  );
  StatusCode::OK
}
