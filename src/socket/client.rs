//! WebSocket session.
//!
//! # Responsibilities
//! - Open the connection to the configured source
//! - Decode inbound JSON messages and fan them out to event handlers
//! - Encode and send outbound events
//! - Report lifecycle transitions through [`Lifecycle`]
//!
//! # Design Decisions
//! - One reader task and one writer task per connection
//! - Outbound messages go through an unbounded channel to the writer
//! - An inbound message that is not JSON ends the session

use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::socket::events::{encode_event, EventTable};
use crate::socket::lifecycle::Lifecycle;
use crate::socket::types::{CloseInfo, HandlerId, SocketConfig, SocketError, SocketResult};

/// Event-multiplexing WebSocket session.
pub struct Socket {
    source: String,
    lifecycle: Arc<ArcSwap<Lifecycle>>,
    events: Arc<EventTable>,
    outbound: Option<mpsc::UnboundedSender<Message>>,
    reader: Option<JoinHandle<()>>,
}

impl Socket {
    /// Create a session and run [`init`](Self::init).
    pub fn new(config: SocketConfig, lifecycle: Lifecycle) -> Self {
        let mut socket = Self {
            source: String::new(),
            lifecycle: Arc::new(ArcSwap::from_pointee(Lifecycle::default())),
            events: Arc::new(EventTable::new()),
            outbound: None,
            reader: None,
        };
        socket.init(config, lifecycle);
        socket
    }

    /// Replace the source, merge `lifecycle` over the current hooks, then
    /// fire `before_open`.
    pub fn init(&mut self, config: SocketConfig, lifecycle: Lifecycle) {
        self.source = config.source;

        let merged = Lifecycle::clone(&self.lifecycle.load()).merge(lifecycle);
        self.lifecycle.store(Arc::new(merged));

        self.lifecycle.load().fire_before_open();
    }

    /// Address the next connection goes to.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Re-run `init` with `config` and `lifecycle`, then connect.
    pub async fn connect_with(
        &mut self,
        config: SocketConfig,
        lifecycle: Lifecycle,
    ) -> SocketResult<()> {
        self.init(config, lifecycle);
        self.open().await
    }

    /// Connect to the current source. Fires `before_open` first.
    pub async fn connect(&mut self) -> SocketResult<()> {
        self.lifecycle.load().fire_before_open();
        self.open().await
    }

    async fn open(&mut self) -> SocketResult<()> {
        self.shutdown();

        let lifecycle = self.lifecycle.load_full();
        let stream = match connect_async(self.source.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(error) => {
                let error = SocketError::Connect {
                    source_url: self.source.clone(),
                    error,
                };
                tracing::error!(source = %self.source, error = %error, "Socket connection failed");
                lifecycle.fire_error(&error);
                lifecycle.fire_close(&CloseInfo::abnormal());
                return Err(error);
            }
        };

        tracing::info!(source = %self.source, "Socket connected");
        lifecycle.fire_open();

        let (sink, stream) = stream.split();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(write_loop(sink, rx));
        self.reader = Some(tokio::spawn(read_loop(
            stream,
            tx.clone(),
            Arc::clone(&self.lifecycle),
            Arc::clone(&self.events),
        )));
        self.outbound = Some(tx);

        Ok(())
    }

    /// True while the writer accepts messages.
    pub fn is_connected(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Register a handler for `event`. With `exclusive`, existing handlers
    /// for `event` are dropped first.
    pub fn on<F>(&self, event: &str, handler: F, exclusive: bool) -> HandlerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.events.on(event, handler, exclusive)
    }

    /// Remove one handler, or all handlers for `event` when `id` is `None`.
    pub fn off(&self, event: &str, id: Option<HandlerId>) -> usize {
        self.events.off(event, id)
    }

    /// Send `{ "event": event, ...payload }`.
    pub fn emit<T: Serialize + ?Sized>(&self, event: &str, payload: &T) -> SocketResult<()> {
        let message = encode_event(event, payload)?;
        let tx = self.outbound.as_ref().ok_or(SocketError::NotConnected)?;

        tracing::debug!(event = %event, bytes = message.len(), "Emitting event");
        tx.send(Message::text(message))
            .map_err(|_| SocketError::Closed)
    }

    /// Send a close frame. `code` defaults to 1000.
    pub fn close(&self, code: Option<u16>, reason: &str) -> SocketResult<()> {
        let tx = self.outbound.as_ref().ok_or(SocketError::NotConnected)?;
        let frame = CloseFrame {
            code: CloseCode::from(code.unwrap_or(CloseInfo::NORMAL)),
            reason: reason.to_owned().into(),
        };

        tx.send(Message::Close(Some(frame)))
            .map_err(|_| SocketError::Closed)
    }

    fn shutdown(&mut self) {
        self.outbound = None;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("source", &self.source)
            .field("connected", &self.is_connected())
            .field("events", &self.events)
            .finish()
    }
}

async fn write_loop<S>(mut sink: S, mut rx: mpsc::UnboundedReceiver<Message>)
where
    S: futures_util::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    while let Some(message) = rx.recv().await {
        let closing = message.is_close();
        if let Err(e) = sink.send(message).await {
            tracing::debug!(error = %e, "Socket write stopped");
            break;
        }
        if closing {
            break;
        }
    }
    rx.close();
}

async fn read_loop<S>(
    mut stream: S,
    tx: mpsc::UnboundedSender<Message>,
    lifecycle: Arc<ArcSwap<Lifecycle>>,
    events: Arc<EventTable>,
) where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let info = loop {
        let Some(next) = stream.next().await else {
            break CloseInfo::abnormal();
        };

        let bytes = match next {
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Binary(bytes)) => bytes.to_vec(),
            Ok(Message::Close(frame)) => {
                // Stops the writer; tungstenite has already queued the reply.
                let _ = tx.send(Message::Close(None));
                break frame.map_or_else(
                    || CloseInfo::new(CloseInfo::NORMAL, ""),
                    |f| CloseInfo::new(u16::from(f.code), f.reason.as_str()),
                );
            }
            Ok(_) => continue,
            Err(e) => {
                let error = SocketError::Transport(e);
                tracing::error!(error = %error, "Socket read failed");
                lifecycle.load().fire_error(&error);
                break CloseInfo::abnormal();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(payload) => {
                lifecycle.load().fire_message(&payload);
                events.dispatch(&payload);
            }
            Err(e) => {
                let error = SocketError::Decode(e);
                tracing::error!(error = %error, "Dropping socket after invalid message");
                lifecycle.load().fire_error(&error);

                let info = CloseInfo::new(CloseInfo::INVALID_DATA, "invalid JSON message");
                let _ = tx.send(Message::Close(Some(CloseFrame {
                    code: CloseCode::from(info.code),
                    reason: info.reason.clone().into(),
                })));
                break info;
            }
        }
    };

    tracing::info!(code = info.code, reason = %info.reason, "Socket closed");
    lifecycle.load().fire_close(&info);
}
