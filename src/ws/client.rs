//! Coordinate stream client
//!
//! [`CoordinateStream`] owns one WebSocket connection to the tunnel backend.
//! Inbound payloads are parsed and forwarded as [`StreamEvent`]s on a
//! bounded channel by a background reader task; the write half stays with
//! the owner for the session hello. At most one connection is open at a
//! time: connecting again tears the previous one down first.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, warn};

use crate::game::WallSegment;
use crate::ws::protocol::{parse_payload, ProtocolError, StreamPayload};

/// Capacity of the event channel between the reader task and the consumer
const EVENT_CHANNEL_CAPACITY: usize = 256;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Events emitted by the coordinate stream
#[derive(Debug)]
pub enum StreamEvent {
    /// The channel is established; the session hello may be sent now.
    /// Emitted exactly once, before any segment.
    Ready,
    /// One wall-offset pair in traversal order
    Segment(WallSegment),
    /// The terminal sentinel arrived; no further segments will follow.
    Finished,
    /// Transport or protocol failure; the stream is dead.
    Error(StreamError),
}

/// Coordinate stream errors
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("WebSocket connect failed: {0}")]
    Connect(#[source] Box<tungstenite::Error>),

    #[error("WebSocket transport error: {0}")]
    Transport(#[source] Box<tungstenite::Error>),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("No coordinate stream is open")]
    NotConnected,
}

struct ActiveStream {
    sink: WsSink,
    reader: JoinHandle<()>,
}

/// Owned WebSocket client for the coordinate stream
#[derive(Default)]
pub struct CoordinateStream {
    inner: Option<ActiveStream>,
}

impl CoordinateStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the stream and return its event receiver.
    ///
    /// An already-open connection is closed first, so a session can never
    /// leak a second one.
    pub async fn connect(
        &mut self,
        url: &str,
    ) -> Result<mpsc::Receiver<StreamEvent>, StreamError> {
        self.disconnect().await;

        let (socket, _response) = connect_async(url)
            .await
            .map_err(|e| StreamError::Connect(Box::new(e)))?;
        debug!(url, "Coordinate stream connected");

        let (sink, stream) = socket.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        // Ready precedes every segment; this is the hello synchronization
        // point. The channel was just created, so the send cannot fail.
        let _ = event_tx.send(StreamEvent::Ready).await;

        let reader = tokio::spawn(read_loop(stream, event_tx));
        self.inner = Some(ActiveStream { sink, reader });

        Ok(event_rx)
    }

    /// Send one text message over the open stream
    pub async fn send(&mut self, text: String) -> Result<(), StreamError> {
        let active = self.inner.as_mut().ok_or(StreamError::NotConnected)?;
        active
            .sink
            .send(Message::Text(text))
            .await
            .map_err(|e| StreamError::Transport(Box::new(e)))
    }

    /// Tear the stream down. Idempotent; safe to call on every exit path.
    pub async fn disconnect(&mut self) {
        if let Some(mut active) = self.inner.take() {
            let _ = active.sink.send(Message::Close(None)).await;
            let _ = active.sink.close().await;
            active.reader.abort();
            debug!("Coordinate stream disconnected");
        }
    }
}

/// Forward inbound payloads as events until the sentinel, a failure, or the
/// consumer goes away.
async fn read_loop(mut stream: WsStream, events: mpsc::Sender<StreamEvent>) {
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match parse_payload(&text) {
                Ok(StreamPayload::Segment(segment)) => {
                    if events.send(StreamEvent::Segment(segment)).await.is_err() {
                        break;
                    }
                }
                Ok(StreamPayload::Finished) => {
                    debug!("Coordinate stream finished");
                    let _ = events.send(StreamEvent::Finished).await;
                    break;
                }
                Err(e) => {
                    // Reject policy: a malformed pair kills the session
                    // rather than risk NaN geometry.
                    error!(error = %e, "Malformed stream payload");
                    let _ = events.send(StreamEvent::Error(e.into())).await;
                    break;
                }
            },
            Ok(Message::Binary(_)) => {
                warn!("Received binary message, ignoring");
            }
            Ok(Message::Close(_)) => {
                debug!("Server closed the coordinate stream");
                break;
            }
            Ok(_) => {} // ping/pong/raw frames
            Err(e) => {
                let _ = events
                    .send(StreamEvent::Error(StreamError::Transport(Box::new(e))))
                    .await;
                break;
            }
        }
    }
}
