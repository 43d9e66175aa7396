use crate::{
  app_state::AppState,
  events::{ServerEvent, Subscriber},
};
use axum::{
  extract::State,
  response::sse::{Event, KeepAlive, Sse},
};
use futures_util::{stream, Stream};
use std::convert::Infallible;
use tokio_util::sync::CancellationToken;

pub(super) async fn get_events(
  State(st): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  let subscriber = st.events.subscribe();
  tracing::info!(
    subscriber = %subscriber.id(),
    subscribers = st.events.subscriber_count(),
    "event stream connected"
  );

  Sse::new(event_stream(subscriber, st.shutdown.clone())).keep_alive(
    KeepAlive::new()
      .interval(st.keep_alive)
      .text("keep-alive"),
  )
}

/// Live state of one stream connection. Dropping it unregisters the subscriber,
/// which covers client disconnects (hyper drops the body), shutdown and panics alike.
struct Connection {
  subscriber: Subscriber,
  shutdown: CancellationToken,
}

impl Drop for Connection {
  fn drop(&mut self) {
    tracing::info!(subscriber = %self.subscriber.id(), "event stream closed");
  }
}

/// Yields one SSE record per queued event until the hub goes away or `shutdown` fires.
pub fn event_stream(
  subscriber: Subscriber,
  shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
  let conn = Connection { subscriber, shutdown };
  stream::unfold(conn, |mut conn| async move {
    let event = tokio::select! {
      biased;
      _ = conn.shutdown.cancelled() => None,
      event = conn.subscriber.recv() => event,
    };
    let event = event?;
    Some((Ok::<_, Infallible>(to_sse(event)), conn))
  })
}

fn to_sse(event: ServerEvent) -> Event {
  Event::default().event(event.label()).data(event.label())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::events::EventHub;
  use futures_util::StreamExt;
  use std::time::Duration;
  use tokio::time::timeout;

  #[tokio::test]
  async fn yields_queued_events_in_order() {
    let hub = EventHub::default();
    let stream = event_stream(hub.subscribe(), CancellationToken::new());
    tokio::pin!(stream);

    hub.emit_media_changed();
    hub.emit_media_changed();

    for _ in 0..2 {
      let item = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
      assert!(matches!(item, Some(Ok(_))));
    }
    assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());
  }

  #[tokio::test]
  async fn shutdown_ends_stream_and_unregisters() {
    let hub = EventHub::default();
    let token = CancellationToken::new();
    let stream = event_stream(hub.subscribe(), token.clone());
    tokio::pin!(stream);
    assert_eq!(hub.subscriber_count(), 1);

    let waiter = tokio::spawn({
      let token = token.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
      }
    });

    let item = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert!(item.is_none());
    waiter.await.unwrap();
    assert_eq!(hub.subscriber_count(), 0);
  }

  #[tokio::test]
  async fn dropping_stream_unregisters() {
    let hub = EventHub::default();
    let stream = event_stream(hub.subscribe(), CancellationToken::new());
    assert_eq!(hub.subscriber_count(), 1);
    drop(stream);
    assert_eq!(hub.subscriber_count(), 0);
    assert_eq!(hub.emit_media_changed().delivered, 0);
  }
}
