//! Wire protocol for Snapdeck.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identity** ([`ConnectionId`], [`RoomCode`]) — who is talking and
//!   which room they mean.
//! - **Cards** ([`Card`], [`Character`], [`Style`]) — the immutable 52-card
//!   roster that travels in deal and play messages.
//! - **Messages** ([`ClientRequest`], [`ServerEvent`]) — everything a client
//!   can ask for and everything the server broadcasts back.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages are converted
//!   to and from bytes.
//!
//! The protocol layer knows nothing about sockets or rooms. It only knows
//! how to describe and serialize messages; routing them is the gateway's
//! job.

mod card;
mod codec;
mod error;
mod types;

pub use card::{Card, Character, Style};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientRequest, ConnectionId, HandCount, PlayerInfo, Recipient, RoomCode,
    ServerEvent,
};
