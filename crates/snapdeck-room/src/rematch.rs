//! The 2-party rematch consensus sub-state machine.

use snapdeck_protocol::ConnectionId;

/// Vote state for a restart: `NoVotes → OneVote(by) → consensus`.
///
/// A set of connection ids would work too, but with exactly two parties
/// the explicit machine makes the duplicate-vote case impossible to get
/// wrong. Reset deterministically on every game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RematchVote {
    #[default]
    NoVotes,
    OneVote(ConnectionId),
}

/// What a registered vote amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// First vote in — the other player should be nudged.
    First,
    /// Same connection voted again; nothing changes.
    Duplicate,
    /// Both players have voted. The machine resets itself.
    Consensus,
}

impl RematchVote {
    /// Registers a vote from `conn`.
    pub fn register(&mut self, conn: ConnectionId) -> VoteOutcome {
        match *self {
            Self::NoVotes => {
                *self = Self::OneVote(conn);
                VoteOutcome::First
            }
            Self::OneVote(by) if by == conn => VoteOutcome::Duplicate,
            Self::OneVote(_) => {
                *self = Self::NoVotes;
                VoteOutcome::Consensus
            }
        }
    }

    /// Clears all votes. Called on every game start, rematch or not.
    pub fn reset(&mut self) {
        *self = Self::NoVotes;
    }
}
