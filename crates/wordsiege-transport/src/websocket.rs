//! WebSocket transport using `tokio-tungstenite`.
//!
//! The stream is split into independent sink and source halves so the
//! gateway can push notifications while a receive is parked — a single
//! lock around the whole stream would deadlock that pattern.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{Connection, ConnectionId, Listener, TransportError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = WebSocketStream<TcpStream>;

fn io_err(kind: io::ErrorKind, e: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(kind, e)
}

/// Listens for WebSocket connections.
pub struct WebSocketListener {
    listener: TcpListener,
}

impl WebSocketListener {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::Bind)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }
}

impl Listener for WebSocketListener {
    type Conn = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Conn, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| {
                TransportError::Accept(io_err(
                    io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "WebSocket connection accepted");

        let (sink, source) = ws.split();
        Ok(WebSocketConnection {
            id,
            sink: Mutex::new(sink),
            source: Mutex::new(source),
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, Self::Error> {
        self.listener.local_addr().map_err(TransportError::Bind)
    }
}

/// One WebSocket connection, send and receive halves locked separately.
pub struct WebSocketConnection {
    id: ConnectionId,
    sink: Mutex<SplitSink<WsStream, Message>>,
    source: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .send(Message::Binary(data.to_vec().into()))
            .await
            .map_err(|e| {
                TransportError::Send(io_err(io::ErrorKind::BrokenPipe, e))
            })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut source = self.source.lock().await;
        loop {
            match source.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                // Browser clients often send JSON as text frames.
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // ping/pong/raw frames
                Some(Err(e)) => {
                    return Err(TransportError::Receive(io_err(
                        io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::Send(io_err(io::ErrorKind::BrokenPipe, e))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
