//! The Snapdeck game core: deck handling and the turn/snap state machine.
//!
//! Everything in this crate is pure and synchronous — no sockets, no tasks,
//! no clocks. Transitions take a connection id, mutate the state, and
//! return `(Recipient, ServerEvent)` pairs for the room layer to deliver.
//! Invalid actions (wrong turn, short pile, empty hand) return an empty
//! list instead of an error: a buggy client can waste its own time but
//! never corrupt shared state.

mod deck;
mod state;

pub use deck::{DECK_SIZE, Deck, HAND_SIZE};
pub use state::{GameState, Seat};
