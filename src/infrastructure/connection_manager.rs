// WebSocket connection manager for the telemetry stream
use crate::application::event_router::{EventHandler, EventRouter};
use crate::domain::connection::ConnectionState;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("could not open telemetry stream {url}: {source}")]
    Handshake {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("telemetry stream {url} did not answer within {timeout:?}")]
    Timeout { url: String, timeout: Duration },
}

struct ActiveConnection {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Everything a connection task needs, cloned out of the manager per attempt
#[derive(Clone)]
struct Session {
    router: EventRouter,
    handler: Arc<dyn EventHandler>,
    state: Arc<watch::Sender<ConnectionState>>,
    connect_timeout: Duration,
}

/// Owns at most one stream connection. There is no automatic reconnect;
/// callers decide when to call `connect` again.
pub struct ConnectionManager {
    session: Session,
    active: Mutex<Option<ActiveConnection>>,
}

impl ConnectionManager {
    pub fn new(
        router: EventRouter,
        handler: Arc<dyn EventHandler>,
        connect_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            session: Session {
                router,
                handler,
                state: Arc::new(state),
                connect_timeout,
            },
            active: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.session.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.session.state.subscribe()
    }

    /// Open the stream and start the receive loop, waiting for the handshake to settle.
    ///
    /// Returns `true` once the stream is online. Returns `false` if a connection is already
    /// live or being opened, if the handshake failed or timed out, or if `close` cancelled
    /// it. Failures only show up as the `Disconnected` state.
    pub async fn connect(&self, url: &str) -> bool {
        let ready = {
            let mut active = self.active.lock().await;
            if active.as_ref().is_some_and(|conn| !conn.task.is_finished()) {
                tracing::warn!("Telemetry stream already connected, ignoring connect to {}", url);
                return false;
            }

            self.session.state.send_replace(ConnectionState::Connecting);
            let (shutdown, shutdown_rx) = oneshot::channel();
            let (ready, ready_rx) = oneshot::channel();
            let task = tokio::spawn(self.session.clone().run(url.to_string(), shutdown_rx, ready));
            *active = Some(ActiveConnection { shutdown, task });
            ready_rx
        };

        // The slot is released before the handshake, so close() never waits on it
        ready.await.unwrap_or(false)
    }

    /// Tear down the live connection or cancel a pending handshake, if any. Safe to call
    /// at any time and more than once; the socket is released by whichever call takes
    /// the connection.
    pub async fn close(&self) {
        let Some(conn) = self.active.lock().await.take() else {
            return;
        };

        // The task may already have exited on its own
        let _ = conn.shutdown.send(());
        if let Err(e) = conn.task.await {
            tracing::warn!("Telemetry receive loop ended abnormally: {}", e);
        }
    }
}

impl Session {
    async fn run(
        self,
        url: String,
        mut shutdown: oneshot::Receiver<()>,
        ready: oneshot::Sender<bool>,
    ) {
        let opened = tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Connect to {} cancelled", url);
                None
            }
            result = open(&url, self.connect_timeout) => match result {
                Ok(stream) => Some(stream),
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            },
        };

        let Some(stream) = opened else {
            self.state.send_replace(ConnectionState::Disconnected);
            let _ = ready.send(false);
            return;
        };

        tracing::info!("Connected to telemetry stream {}", url);
        self.state.send_replace(ConnectionState::Online);
        let _ = ready.send(true);

        self.receive_loop(stream, shutdown).await;
    }

    // Every exit path drops the socket and reports Disconnected. Dispatch is synchronous,
    // so shutdown is only observed between messages, never halfway through one.
    async fn receive_loop(&self, mut stream: WsStream, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    if let Err(e) = stream.close(None).await {
                        tracing::debug!("Close handshake failed: {}", e);
                    }
                    break;
                }
                message = stream.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            self.router.dispatch(&text, self.handler.as_ref());
                        }
                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => {
                                self.router.dispatch(text, self.handler.as_ref());
                            }
                            Err(e) => tracing::warn!("Dropping non UTF-8 binary frame: {}", e),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!("Telemetry stream closed by server: {:?}", frame);
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Telemetry stream dropped: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
            }
        }

        drop(stream);
        self.state.send_replace(ConnectionState::Disconnected);
        tracing::info!("Telemetry stream disconnected");
    }
}

async fn open(url: &str, timeout: Duration) -> Result<WsStream, TransportError> {
    let (stream, response) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
        .await
        .map_err(|_| TransportError::Timeout {
            url: url.to_string(),
            timeout,
        })?
        .map_err(|source| TransportError::Handshake {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!("Stream handshake completed with status {}", response.status());
    Ok(stream)
}
