//! `SnapServer` builder and accept loop.
//!
//! This is the entry point for running a Snapdeck server. It ties the
//! layers together: transport → protocol → rooms.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;

use snapdeck_protocol::{Codec, ConnectionId, JsonCodec};
use snapdeck_room::RoomRegistry;

use crate::ServerError;
use crate::gateway::handle_connection;
use crate::ws::WsListener;

/// Counter for assigning unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry lock is held only to resolve a room code into a handle; the
/// room actors themselves never run under it.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Snapdeck server.
///
/// # Example
///
/// ```rust,ignore
/// use snapdeck::prelude::*;
///
/// let server = SnapServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct SnapServerBuilder {
    bind_addr: String,
}

impl SnapServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and builds the server with `JsonCodec`.
    pub async fn build(self) -> Result<SnapServer<JsonCodec>, ServerError> {
        let listener = WsListener::bind(&self.bind_addr).await?;
        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new()),
            codec: JsonCodec,
        });
        Ok(SnapServer { listener, state })
    }
}

impl Default for SnapServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Snapdeck server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SnapServer<C: Codec> {
    listener: WsListener,
    state: Arc<ServerState<C>>,
}

impl SnapServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> SnapServerBuilder {
        SnapServerBuilder::new()
    }
}

impl<C: Codec + Clone> SnapServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Each accepted connection gets a fresh [`ConnectionId`] and its own
    /// handler task. Runs until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Snapdeck server running");

        loop {
            match self.listener.accept().await {
                Ok((sender, receiver)) => {
                    let conn = ConnectionId(
                        NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
                    );
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(sender, receiver, conn, state)
                                .await
                        {
                            tracing::debug!(
                                %conn,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
