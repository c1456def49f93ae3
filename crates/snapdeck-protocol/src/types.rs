//! Message types: identities, client requests, and server events.
//!
//! Both message enums are internally tagged (`{"type": "...", ...}`) with
//! snake_case tags, so the JSON on the wire carries the same event names
//! the browser client listens for (`card_played`, `snap_success`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Card;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one live connection.
///
/// A connection is a player: the gateway assigns an id when the socket is
/// accepted and the id dies with the socket. There is no reconnection — a
/// dropped connection tears its room down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A six-character room code, e.g. `"K3QZ7A"`.
///
/// Codes are generated server-side from uppercase alphanumerics and handed
/// to the creator; the second player joins by typing it in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Game transitions return `(Recipient, ServerEvent)` pairs; the room layer
/// resolves each recipient against its member list and delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the room.
    All,
    /// One specific player.
    Player(ConnectionId),
    /// Everyone except the specified player.
    AllExcept(ConnectionId),
}

// ---------------------------------------------------------------------------
// Payload fragments
// ---------------------------------------------------------------------------

/// Per-player hand size, broadcast after every transition so both clients
/// can render the opponent's remaining cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCount {
    pub id: ConnectionId,
    pub count: usize,
}

/// Identity + display name, sent in the deal so clients can label seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: ConnectionId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ClientRequest — inbound
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// Room-scoped requests carry the room code; the gateway resolves it
/// through the registry before anything touches game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRequest {
    /// Open a fresh room and become its first player.
    /// A missing name defaults to "Player 1" / "Player 2" server-side.
    CreateRoom { name: Option<String> },

    /// Join an existing room by code. Starts the game at two players.
    JoinRoom {
        room_id: RoomCode,
        name: Option<String>,
    },

    /// Play the top card of your hand onto the center pile.
    PlayCard { room_id: RoomCode },

    /// Claim the center pile (or eat a penalty if there is no match).
    SnapAttempt { room_id: RoomCode },

    /// Vote to restart after a finished game.
    RequestRestart { room_id: RoomCode },

    /// Leave a room. Pre-game this frees the seat; once the game has
    /// started it abandons the room like a disconnect.
    LeaveRoom { room_id: RoomCode },
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// Everything the server sends back.
///
/// Which connections receive each event is decided by the room layer via
/// [`Recipient`]; the tags on the wire are the event names the browser
/// client listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `create_room`, sent to the creator only.
    RoomCreated { room_id: RoomCode },

    /// The deal. Sent privately to each player — the `hand` differs, the
    /// rest is shared.
    GameStart {
        room_id: RoomCode,
        hand: Vec<Card>,
        opponent_count: usize,
        your_turn: bool,
        players: [PlayerInfo; 2],
    },

    /// A card hit the center pile.
    CardPlayed {
        card: Card,
        turn: ConnectionId,
        is_match: bool,
        counts: [HandCount; 2],
    },

    /// A false snap was punished. Each side gets a different message.
    PenaltyFlash { message: String },

    /// A valid snap: the caller took the pile.
    SnapSuccess {
        winner_id: ConnectionId,
        winner_name: String,
    },

    /// Turn holder and hand counts after a snap or penalty.
    GameUpdate {
        turn: ConnectionId,
        counts: [HandCount; 2],
    },

    /// The game ended.
    GameOver {
        winner_id: ConnectionId,
        loser_id: ConnectionId,
    },

    /// Your opponent voted to rematch; you have not.
    OpponentWantsRematch,

    /// Both players voted — a fresh deal follows.
    RematchSuccess,

    /// The other player disconnected or left.
    OpponentLeft,

    /// A structural error (room missing/full/expired), requester only.
    InitError { message: String },
}

// =========================================================================
// Tests
// =========================================================================
