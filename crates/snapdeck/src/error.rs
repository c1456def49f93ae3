//! Unified error type for the Snapdeck server.

use snapdeck_protocol::ProtocolError;
use snapdeck_room::RoomError;

use crate::ws::TransportError;

/// Top-level error that wraps all layer-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, expired).
    #[error(transparent)]
    Room(#[from] RoomError),
}
