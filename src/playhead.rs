use parking_lot::Mutex;
use std::sync::Arc;

/// Shared slide cursor. Counts advances; each channel applies its own modulo.
#[derive(Clone, Default)]
pub struct Playhead {
  position: Arc<Mutex<u64>>,
}

impl Playhead {
  pub fn new() -> Self {
    Self::default()
  }

  /// Increments by one and returns the new position.
  pub fn advance(&self) -> u64 {
    let mut pos = self.position.lock();
    *pos += 1;
    *pos
  }

  pub fn current(&self) -> u64 {
    *self.position.lock()
  }
}
