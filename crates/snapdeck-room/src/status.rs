//! The room lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a room.
///
/// ```text
/// Waiting → Active → Ended
///              ↑_______│   (rematch consensus)
/// ```
///
/// - **Waiting**: room exists with 0 or 1 players, no deck dealt.
/// - **Active**: both seats filled, cards dealt, turns alternating.
/// - **Ended**: someone won. The room is retained so rematch votes can
///   land; only a disconnect or leave destroys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    Active,
    Ended,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a game is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if transitioning to `target` is valid.
    ///
    /// Ended → Active is the rematch edge; there is no way back to
    /// Waiting.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::Active)
                | (Self::Active, Self::Ended)
                | (Self::Ended, Self::Active)
        )
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
