//! Error types for the room layer.
//!
//! Only *structural* problems become errors — a room that doesn't exist,
//! is full, or has vanished between games. Invalid in-game actions never
//! surface here; the state machine drops them silently.

use snapdeck_protocol::{ConnectionId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room already has two players.
    #[error("room {0} is full")]
    Full(RoomCode),

    /// A restart was requested for a room that no longer exists.
    #[error("room {0} has expired")]
    Expired(RoomCode),

    /// The connection is already in a room (at most one at a time).
    #[error("connection {0} is already in a room")]
    AlreadyInRoom(ConnectionId),

    /// The room's actor is gone or its mailbox is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
