use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

pub const EVENT_MEDIA_CHANGED: &str = "mediaChanged";

/// Pending labels a single subscriber may hold before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent {
  MediaChanged,
}

impl ServerEvent {
  /// SSE event name; also sent as the data line.
  pub fn label(&self) -> &'static str {
    match self {
      ServerEvent::MediaChanged => EVENT_MEDIA_CHANGED,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl fmt::Display for SubscriberId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
  pub delivered: usize,
  pub dropped: usize,
}

struct Registry {
  capacity: usize,
  subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<ServerEvent>>>,
}

impl Registry {
  fn remove(&self, id: SubscriberId) -> bool {
    self.subscribers.lock().remove(&id).is_some()
  }
}

/// Fan-out hub for stream connections.
///
/// Every subscriber owns a bounded queue. `broadcast` pushes with `try_send`
/// while holding the registry lock, so a full or stalled subscriber only
/// loses its own notification and never holds up the publisher.
#[derive(Clone)]
pub struct EventHub {
  inner: Arc<Registry>,
}

impl Default for EventHub {
  fn default() -> Self {
    Self::new(DEFAULT_QUEUE_CAPACITY)
  }
}

impl EventHub {
  pub fn new(queue_capacity: usize) -> Self {
    Self {
      inner: Arc::new(Registry {
        // mpsc::channel panics on zero.
        capacity: queue_capacity.max(1),
        subscribers: Mutex::new(HashMap::new()),
      }),
    }
  }

  pub fn subscribe(&self) -> Subscriber {
    let (tx, rx) = mpsc::channel(self.inner.capacity);
    let id = SubscriberId(Uuid::new_v4());
    let count = {
      let mut subs = self.inner.subscribers.lock();
      subs.insert(id, tx);
      subs.len()
    };
    tracing::debug!(subscriber = %id, subscribers = count, "subscriber registered");
    Subscriber {
      id,
      rx,
      hub: Arc::downgrade(&self.inner),
    }
  }

  /// Returns whether `id` was still registered. Safe to call repeatedly.
  pub fn unsubscribe(&self, id: SubscriberId) -> bool {
    let removed = self.inner.remove(id);
    if removed {
      tracing::debug!(subscriber = %id, "subscriber removed");
    }
    removed
  }

  pub fn broadcast(&self, event: ServerEvent) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    let subs = self.inner.subscribers.lock();
    for (id, tx) in subs.iter() {
      match tx.try_send(event) {
        Ok(()) => report.delivered += 1,
        Err(TrySendError::Full(_)) => {
          tracing::trace!(subscriber = %id, event = event.label(), "queue full, dropping event");
          report.dropped += 1;
        }
        Err(TrySendError::Closed(_)) => {
          tracing::trace!(subscriber = %id, event = event.label(), "queue closed, dropping event");
          report.dropped += 1;
        }
      }
    }
    drop(subs);
    tracing::debug!(
      event = event.label(),
      delivered = report.delivered,
      dropped = report.dropped,
      "broadcast"
    );
    report
  }

  pub fn emit_media_changed(&self) -> BroadcastReport {
    self.broadcast(ServerEvent::MediaChanged)
  }

  pub fn subscriber_count(&self) -> usize {
    self.inner.subscribers.lock().len()
  }

  pub fn queue_capacity(&self) -> usize {
    self.inner.capacity
  }
}

/// One registered connection. Dropping it removes the registration.
pub struct Subscriber {
  id: SubscriberId,
  rx: mpsc::Receiver<ServerEvent>,
  hub: Weak<Registry>,
}

impl Subscriber {
  pub fn id(&self) -> SubscriberId {
    self.id
  }

  /// Waits for the next event. `None` once the hub itself is gone.
  pub async fn recv(&mut self) -> Option<ServerEvent> {
    self.rx.recv().await
  }

  pub fn try_recv(&mut self) -> Option<ServerEvent> {
    self.rx.try_recv().ok()
  }
}

impl fmt::Debug for Subscriber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscriber").field("id", &self.id).finish()
  }
}

impl Drop for Subscriber {
  fn drop(&mut self) {
    if let Some(registry) = self.hub.upgrade() {
      if registry.remove(self.id) {
        tracing::debug!(subscriber = %self.id, "subscriber dropped");
      }
    }
  }
}
