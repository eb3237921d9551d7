//! WebSocket chat endpoint.
//!
//! `GET /chat` upgrades to a WebSocket and opens one routed session for the
//! connection. Two event sources feed a per-connection [`Dispatcher`]:
//!
//! - the WebSocket reader, yielding `UserLoggedIn` once, then one
//!   `UserSendsMessage` per text frame, and `UserLoggedOut` when the client
//!   goes away;
//! - the session itself, yielding `UserReceivesMessage` per inbound message.
//!
//! Client frames:
//! `{"action": "send_message", "data": {"to": "...", "message": "..."}}`
//!
//! Server frames:
//! `{"action": "receive_message", "data": {"from": "...", "message": "..."}}`
//!
//! Malformed frames and unknown actions are logged and ignored. When the
//! session is closed from the server side (node shutdown), the reader stops
//! too and the socket is closed.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use parley_core::Session;
use parley_core::event::{Dispatcher, Event, EventSource};
use parley_infra::{HttpForwarder, NodeDirectory};
use parley_types::chat::{ChatMessage, Identity};
use parley_types::error::{RouterError, SourceError};
use parley_types::event::EventKind;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::AppState;

type ChatSession = Session<NodeDirectory, HttpForwarder>;

/// Frames a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
enum ClientFrame {
    SendMessage { to: String, message: String },
}

/// Frames the server sends.
#[derive(Debug, Serialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
enum ServerFrame<'a> {
    ReceiveMessage { from: &'a str, message: &'a str },
}

fn render_receive_frame(message: &ChatMessage) -> serde_json::Result<String> {
    serde_json::to_string(&ServerFrame::ReceiveMessage {
        from: message.from.as_str(),
        message: &message.body,
    })
}

/// Upgrade an HTTP request to a chat WebSocket.
///
/// This is mounted at `/chat` in the client router.
pub async fn chat_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat_connection(socket, state))
}

async fn handle_chat_connection(socket: WebSocket, state: AppState) {
    let session = match state.router.create_session().await {
        Ok(session) => session,
        Err(err) => {
            warn!(error = %err, "failed to open chat session");
            return;
        }
    };

    let (sink, stream) = socket.split();
    run_chat(session, stream, Arc::new(Mutex::new(sink))).await;
}

/// Drive one connection until both the client and the session are done.
///
/// Returns the number of events handled.
async fn run_chat<S, W>(session: ChatSession, stream: S, writer: Arc<Mutex<W>>) -> usize
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
    W: Sink<Message> + Unpin + Send + 'static,
    W::Error: std::error::Error + Send + Sync + 'static,
{
    let identity = session.identity().clone();
    let session_ended = CancellationToken::new();

    let dispatcher = Dispatcher::new()
        .with_source(WebsocketSource::new(stream, session_ended.clone()))
        .with_source(EndSignal::new(session.clone(), session_ended));

    dispatcher.handle(EventKind::UserLoggedIn, {
        let identity = identity.clone();
        move |_event: Event| {
            let identity = identity.clone();
            async move {
                info!(%identity, "user logged in");
                anyhow::Ok(())
            }
        }
    });
    dispatcher.handle(EventKind::UserSendsMessage, {
        let session = session.clone();
        move |event: Event| on_user_sends(session.clone(), event)
    });
    dispatcher.handle(EventKind::UserReceivesMessage, {
        let writer = Arc::clone(&writer);
        move |event: Event| on_user_receives(Arc::clone(&writer), event)
    });
    dispatcher.handle(EventKind::UserLoggedOut, {
        let session = session.clone();
        move |_event: Event| {
            let session = session.clone();
            async move {
                session.close().await?;
                info!(identity = %session.identity(), "user logged out");
                anyhow::Ok(())
            }
        }
    });

    let handled = dispatcher.listen().await;

    if let Err(err) = session.close().await {
        warn!(%identity, error = %err, "failed to close session");
    }
    if let Err(err) = writer.lock().await.close().await {
        debug!(%identity, error = %err, "websocket already closed");
    }
    debug!(%identity, handled, "chat connection finished");
    handled
}

async fn on_user_sends(session: ChatSession, event: Event) -> anyhow::Result<()> {
    let Event::UserSendsMessage(payload) = event else {
        return Ok(());
    };
    let ClientFrame::SendMessage { to, message } =
        serde_json::from_value(payload).context("ignoring unrecognized client frame")?;

    match session.send(Identity::new(to), message).await {
        Ok(()) => Ok(()),
        Err(RouterError::RecipientNotFound(to)) => {
            debug!(from = %session.identity(), %to, "recipient not found, sender notified");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn on_user_receives<W>(writer: Arc<Mutex<W>>, event: Event) -> anyhow::Result<()>
where
    W: Sink<Message> + Unpin + Send,
    W::Error: std::error::Error + Send + Sync + 'static,
{
    let Event::UserReceivesMessage(message) = event else {
        return Ok(());
    };
    let frame = render_receive_frame(&message)?;
    writer
        .lock()
        .await
        .send(Message::Text(frame.into()))
        .await
        .context("failed to write frame to websocket")?;
    Ok(())
}

/// Event source over the read half of a WebSocket.
pub struct WebsocketSource<S> {
    stream: S,
    stop: CancellationToken,
    logged_in: bool,
    finished: bool,
    failure: Option<String>,
}

impl<S> WebsocketSource<S> {
    /// `stop` ends the source without a logout event.
    pub fn new(stream: S, stop: CancellationToken) -> Self {
        Self {
            stream,
            stop,
            logged_in: false,
            finished: false,
            failure: None,
        }
    }
}

impl<S> EventSource for WebsocketSource<S>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send,
{
    async fn next_event(&mut self) -> Result<Option<Event>, SourceError> {
        if !self.logged_in {
            self.logged_in = true;
            return Ok(Some(Event::UserLoggedIn));
        }

        loop {
            if self.finished {
                // A read error surfaces once, after the logout event.
                return match self.failure.take() {
                    Some(reason) => Err(SourceError::Transport(reason)),
                    None => Ok(None),
                };
            }

            let frame = tokio::select! {
                biased;
                _ = self.stop.cancelled() => return Ok(None),
                frame = self.stream.next() => frame,
            };

            match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<serde_json::Value>(text.as_str()) {
                        Ok(payload) => return Ok(Some(Event::UserSendsMessage(payload))),
                        Err(err) => {
                            warn!(raw = %text.as_str(), error = %err, "ignoring malformed websocket frame");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    self.finished = true;
                    return Ok(Some(Event::UserLoggedOut));
                }
                Some(Err(err)) => {
                    self.finished = true;
                    self.failure = Some(err.to_string());
                    return Ok(Some(Event::UserLoggedOut));
                }
                // Binary, ping and pong frames carry no chat actions.
                Some(Ok(_)) => {}
            }
        }
    }
}

/// Wraps a source and cancels `on_end` once it stops yielding events.
struct EndSignal<T> {
    inner: T,
    on_end: CancellationToken,
}

impl<T> EndSignal<T> {
    fn new(inner: T, on_end: CancellationToken) -> Self {
        Self { inner, on_end }
    }
}

impl<T: EventSource> EventSource for EndSignal<T> {
    async fn next_event(&mut self) -> Result<Option<Event>, SourceError> {
        let next = self.inner.next_event().await;
        if !matches!(next, Ok(Some(_))) {
            self.on_end.cancel();
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parley_core::Router as ChatRouter;
    use parley_infra::MemoryDirectory;
    use parley_types::chat::NodeAddress;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;

    fn text(value: serde_json::Value) -> Message {
        Message::Text(value.to_string().into())
    }

    fn make_router() -> Arc<ChatRouter<NodeDirectory, HttpForwarder>> {
        Arc::new(ChatRouter::new(
            NodeDirectory::Memory(MemoryDirectory::new()),
            HttpForwarder::new().unwrap(),
            NodeAddress::new("127.0.0.1:3000"),
        ))
    }

    fn written_frames(writer: &Arc<Mutex<Vec<Message>>>) -> Vec<serde_json::Value> {
        writer
            .try_lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                Message::Text(t) => serde_json::from_str(t.as_str()).ok(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_client_frame_parses_send_message() {
        let frame: ClientFrame = serde_json::from_value(json!({
            "action": "send_message",
            "data": {"to": "calm-otter", "message": "hi"}
        }))
        .unwrap();
        let ClientFrame::SendMessage { to, message } = frame;
        assert_eq!(to, "calm-otter");
        assert_eq!(message, "hi");
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = serde_json::from_value::<ClientFrame>(json!({
            "action": "delete_everything",
            "data": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_receive_frame_shape() {
        let msg = ChatMessage::new("calm-otter".into(), "brisk-heron".into(), "hello");
        let frame: serde_json::Value =
            serde_json::from_str(&render_receive_frame(&msg).unwrap()).unwrap();
        assert_eq!(
            frame,
            json!({"action": "receive_message", "data": {"from": "calm-otter", "message": "hello"}})
        );
    }

    #[tokio::test]
    async fn test_websocket_source_skips_noise_and_logs_out_on_close() {
        let frames = futures_util::stream::iter(vec![
            Ok(text(json!({"action": "send_message", "data": {"to": "x", "message": "1"}}))),
            Ok(Message::Text("{garbage".into())),
            Ok(Message::Binary(vec![1u8, 2, 3].into())),
            Ok(Message::Close(None)),
            Ok(text(json!({"never": "read"}))),
        ]);
        let mut source = WebsocketSource::new(frames, CancellationToken::new());

        assert_eq!(source.next_event().await.unwrap(), Some(Event::UserLoggedIn));
        let sends = source.next_event().await.unwrap().unwrap();
        assert_eq!(sends.kind(), EventKind::UserSendsMessage);
        assert_eq!(source.next_event().await.unwrap(), Some(Event::UserLoggedOut));
        assert_eq!(source.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_websocket_read_error_is_logout_then_transport_error() {
        let frames = futures_util::stream::iter(vec![Err(axum::Error::new(
            std::io::Error::other("connection reset"),
        ))]);
        let mut source = WebsocketSource::new(frames, CancellationToken::new());

        assert_eq!(source.next_event().await.unwrap(), Some(Event::UserLoggedIn));
        assert_eq!(source.next_event().await.unwrap(), Some(Event::UserLoggedOut));
        let err = source.next_event().await.unwrap_err();
        assert!(matches!(err, SourceError::Transport(ref reason) if reason.contains("connection reset")));
        assert_eq!(source.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_error_still_closes_the_session() {
        let router = make_router();
        let alice = router.create_session().await.unwrap();

        let frames = futures_util::stream::iter(vec![Err(axum::Error::new(
            std::io::Error::other("connection reset"),
        ))]);
        let writer = Arc::new(Mutex::new(Vec::<Message>::new()));
        tokio::time::timeout(
            Duration::from_secs(1),
            run_chat(alice, frames, Arc::clone(&writer)),
        )
        .await
        .expect("a failed reader must end the connection");
        assert_eq!(router.session_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_token_ends_a_waiting_reader() {
        let stop = CancellationToken::new();
        let mut source = WebsocketSource::new(futures_util::stream::pending(), stop.clone());
        assert_eq!(source.next_event().await.unwrap(), Some(Event::UserLoggedIn));

        stop.cancel();
        let next = tokio::time::timeout(Duration::from_secs(1), source.next_event())
            .await
            .expect("cancelled reader must not block");
        assert_eq!(next.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connection_relays_both_directions() {
        let router = make_router();
        let alice = router.create_session().await.unwrap();
        let bob = router.create_session().await.unwrap();
        assert!(bob.receive().await.unwrap().from.is_system());

        let (tx, rx) = mpsc::unbounded_channel::<Result<Message, axum::Error>>();
        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        });
        let writer = Arc::new(Mutex::new(Vec::<Message>::new()));
        let connection = tokio::spawn(run_chat(alice.clone(), Box::pin(stream), Arc::clone(&writer)));

        tx.send(Ok(text(json!({
            "action": "send_message",
            "data": {"to": bob.identity().as_str(), "message": "hi bob"}
        }))))
        .unwrap();
        let relayed = tokio::time::timeout(Duration::from_secs(1), bob.receive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(relayed.from, *alice.identity());
        assert_eq!(relayed.body, "hi bob");

        bob.send(alice.identity().clone(), "hi alice").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        tx.send(Ok(Message::Close(None))).unwrap();
        let handled = tokio::time::timeout(Duration::from_secs(1), connection)
            .await
            .expect("connection should end after close")
            .unwrap();
        // logged in, sends, greeting, reply, logged out
        assert_eq!(handled, 5);

        let frames = written_frames(&writer);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["data"]["from"], "SYSTEM");
        assert_eq!(frames[1]["data"]["from"], bob.identity().as_str());
        assert_eq!(frames[1]["data"]["message"], "hi alice");
        assert_eq!(router.session_count(), 1, "only bob remains");
    }

    #[tokio::test]
    async fn test_unknown_recipient_produces_system_notice_frame() {
        let router = make_router();
        let alice = router.create_session().await.unwrap();

        let (tx, rx) = mpsc::unbounded_channel::<Result<Message, axum::Error>>();
        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        });
        let writer = Arc::new(Mutex::new(Vec::<Message>::new()));
        let connection = tokio::spawn(run_chat(alice, Box::pin(stream), Arc::clone(&writer)));

        tx.send(Ok(text(json!({
            "action": "send_message",
            "data": {"to": "ghost-owl", "message": "anyone?"}
        }))))
        .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), connection)
            .await
            .unwrap()
            .unwrap();

        let frames = written_frames(&writer);
        let notice = frames
            .iter()
            .find(|f| f["data"]["message"] == "user \"ghost-owl\": not found")
            .expect("not-found notice should be written to the client");
        assert_eq!(notice["data"]["from"], "SYSTEM");
    }

    #[tokio::test]
    async fn test_server_side_close_ends_the_connection() {
        let router = make_router();
        let alice = router.create_session().await.unwrap();

        let writer = Arc::new(Mutex::new(Vec::<Message>::new()));
        let connection = tokio::spawn(run_chat(
            alice,
            futures_util::stream::pending(),
            Arc::clone(&writer),
        ));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(router.shutdown().await, 1);
        tokio::time::timeout(Duration::from_secs(1), connection)
            .await
            .expect("closing the session must end the connection")
            .unwrap();
    }
}
