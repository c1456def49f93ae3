//! WebSocket transport built on `tokio-tungstenite`.
//!
//! The gateway needs to read client requests and push room events at the
//! same time, so an accepted connection is immediately split into a
//! [`WsSender`] and a [`WsReceiver`]. The receiver stays in the
//! connection's handler loop; the sender moves into a writer task fed by
//! the room's event channel.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

/// A listening WebSocket endpoint.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts one connection and completes the WebSocket upgrade,
    /// returning the two halves.
    pub async fn accept(
        &self,
    ) -> Result<(WsSender, WsReceiver), TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;
        tracing::debug!(%addr, "accepted WebSocket connection");

        let (sink, stream) = ws.split();
        Ok((WsSender { sink }, WsReceiver { stream }))
    }
}

/// The write half of a WebSocket connection.
pub struct WsSender {
    sink: SplitSink<WsStream, Message>,
}

impl WsSender {
    /// Sends one message as a text frame. Payloads are JSON, and text
    /// frames are what browser clients expect.
    pub async fn send(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        let text = String::from_utf8(data).map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            ))
        })?;
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.send(Message::Close(None)).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}

/// The read half of a WebSocket connection.
pub struct WsReceiver {
    stream: SplitStream<WsStream>,
}

impl WsReceiver {
    /// Receives the next data frame. Returns `None` once the peer has
    /// closed the connection.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }
}
