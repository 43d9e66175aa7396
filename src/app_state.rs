use crate::{catalog::Catalogs, config::Config, events::EventHub, playhead::Playhead};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything the handlers share. Built once at startup and cloned into the router.
#[derive(Clone)]
pub struct AppState {
  pub catalogs: Arc<Catalogs>,
  pub playhead: Playhead,
  pub events: EventHub,
  pub keep_alive: Duration,
  /// Cancelled on server shutdown so open event streams end.
  pub shutdown: CancellationToken,
}

impl AppState {
  pub fn new(catalogs: Catalogs, events: EventHub, keep_alive: Duration) -> Self {
    Self {
      catalogs: Arc::new(catalogs),
      playhead: Playhead::new(),
      events,
      keep_alive,
      shutdown: CancellationToken::new(),
    }
  }

  pub fn from_config(config: &Config) -> anyhow::Result<Self> {
    let catalogs = Catalogs::load(&config.dir_a, &config.dir_b)
      .context("failed to load media catalogs")?;
    let events = EventHub::new(config.queue_capacity);
    Ok(Self::new(catalogs, events, config.keep_alive()))
  }
}
