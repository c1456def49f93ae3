//! # Snapdeck
//!
//! WebSocket server for a two-player real-time snap card game.
//!
//! Players create or join six-character room codes; when a room fills,
//! a shuffled 52-card deck is split between them and they alternate
//! playing cards onto a shared center pile. When the top two cards show
//! the same character, the first player to snap takes the pile; a false
//! snap forfeits a card. First to empty their hand wins, and both
//! players can vote to run it back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapdeck::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ServerError> {
//!     let server = SnapServer::builder()
//!         .bind("0.0.0.0:8080")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod gateway;
mod server;
mod ws;

pub use error::ServerError;
pub use server::{SnapServer, SnapServerBuilder};
pub use ws::{TransportError, WsListener, WsReceiver, WsSender};

/// Commonly used types, re-exported for one-line imports.
pub mod prelude {
    pub use snapdeck_protocol::{
        Card, Character, ClientRequest, Codec, ConnectionId, HandCount,
        JsonCodec, PlayerInfo, Recipient, RoomCode, ServerEvent, Style,
    };
    pub use snapdeck_room::{RoomError, RoomRegistry, RoomStatus};

    pub use crate::{ServerError, SnapServer, SnapServerBuilder};
}
