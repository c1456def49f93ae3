//! Room lifecycle management for Snapdeck.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its two
//! occupants, the game state, and the rematch votes. All mutations of one
//! room flow through its mailbox, so no two operations on the same room
//! ever interleave — the per-room exclusion discipline the game's
//! consistency guarantees depend on. Different rooms share nothing but the
//! [`RoomRegistry`].
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, resolves codes, cleans up after
//!   disconnects
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomStatus`] — Waiting → Active → Ended (→ Active again on rematch)
//! - [`RematchVote`] — the 2-party consensus sub-state machine

mod error;
mod registry;
mod rematch;
mod room;
mod status;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use rematch::{RematchVote, VoteOutcome};
pub use room::{EventSender, LeaveOutcome, RoomHandle, RoomInfo};
pub use status::RoomStatus;
