//! Per-subject server-sent event stream

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use latch_core::Subject;

use crate::AppState;

/// One long-lived stream per subject identity
///
/// Emits named `grant` / `revoke` / `heartbeat` events with JSON payloads.
/// Delivery is best-effort: a client that reconnects must re-check its
/// grants against the store, so a dropped stream is never a correctness
/// problem. The hub prunes this connection once the socket closes.
pub async fn events(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let subject = Subject::new(subject);
    tracing::debug!(subject = %subject, "event stream opened");

    let subscription = state.hub.subscribe(subject);
    let stream = ReceiverStream::new(subscription.into_receiver())
        .map(|event| Event::default().event(event.name()).json_data(&event));

    Sse::new(stream)
}
