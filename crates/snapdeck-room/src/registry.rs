//! The room registry: code allocation, lookup, and teardown.
//!
//! The registry is the only shared mutable state in the server. The
//! gateway holds it behind a `Mutex` and locks it briefly to resolve a
//! room code into a [`RoomHandle`]; everything stateful about a game then
//! happens inside that room's own task.

use std::collections::HashMap;

use rand::Rng;

use snapdeck_protocol::{ConnectionId, RoomCode};

use crate::room::{
    EventSender, LeaveOutcome, RoomHandle, RoomInfo, spawn_room,
};
use crate::RoomError;

/// Alphabet for generated room codes. Uppercase plus digits keeps codes
/// easy to read out loud.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated room codes. 36^6 codes makes collisions rare even
/// with thousands of live rooms; collisions that do happen are retried.
const CODE_LEN: usize = 6;

/// Tracks every live room and which room each connection sits in.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    /// Connection → room index, used for disconnect cleanup and for
    /// enforcing the one-room-per-connection rule.
    conn_rooms: HashMap<ConnectionId, RoomCode>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Creates a room, seats the creator in it, and returns the new code.
    pub async fn create_room(
        &mut self,
        conn: ConnectionId,
        name: Option<String>,
        sender: EventSender,
    ) -> Result<RoomCode, RoomError> {
        if self.conn_rooms.contains_key(&conn) {
            return Err(RoomError::AlreadyInRoom(conn));
        }

        let code = self.fresh_code();
        let handle = spawn_room(code.clone());
        handle.join(conn, name, sender).await?;

        tracing::info!(room = %code, %conn, "room created");
        self.rooms.insert(code.clone(), handle);
        self.conn_rooms.insert(conn, code.clone());
        Ok(code)
    }

    /// Seats `conn` in an existing room. Starts the game when the room
    /// fills up.
    pub async fn join_room(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
        name: Option<String>,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if self.conn_rooms.contains_key(&conn) {
            return Err(RoomError::AlreadyInRoom(conn));
        }
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        handle.join(conn, name, sender).await?;
        self.conn_rooms.insert(conn, code.clone());
        Ok(())
    }

    /// Forwards a play action to the room.
    pub async fn play(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.room(code)?.play(conn).await
    }

    /// Forwards a snap attempt to the room.
    pub async fn snap(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.room(code)?.snap(conn).await
    }

    /// Forwards a rematch vote. A missing room means the opponent already
    /// tore it down, which callers report as an expired room.
    pub async fn restart(
        &self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::Expired(code.clone()))?;
        handle.restart(conn).await
    }

    /// Removes `conn` from its room. Empty rooms are torn down, and a
    /// leave that hits a started game destroys the room like a
    /// disconnect would — a one-sided game is never kept alive.
    pub async fn leave_room(
        &mut self,
        code: &RoomCode,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let outcome = handle.leave(conn).await?;
        self.conn_rooms.remove(&conn);
        match outcome {
            LeaveOutcome::Vacated { remaining: 0 }
            | LeaveOutcome::Abandoned => {
                self.destroy_room(code).await;
            }
            LeaveOutcome::Vacated { .. } => {}
        }
        Ok(())
    }

    /// Cleans up after a dead connection: the survivor (if any) is told
    /// the opponent left, then the whole room is destroyed. A one-player
    /// game is never worth keeping alive.
    pub async fn handle_disconnect(&mut self, conn: ConnectionId) {
        let Some(code) = self.conn_rooms.remove(&conn) else {
            return;
        };
        if let Some(handle) = self.rooms.get(&code) {
            if handle.notify_disconnect(conn).await.is_err() {
                tracing::warn!(
                    room = %code,
                    %conn,
                    "room unreachable during disconnect cleanup"
                );
            }
        }
        self.destroy_room(&code).await;
    }

    /// Looks up a room's metadata snapshot.
    pub async fn room_info(
        &self,
        code: &RoomCode,
    ) -> Result<RoomInfo, RoomError> {
        self.room(code)?.info().await
    }

    fn room(&self, code: &RoomCode) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    async fn destroy_room(&mut self, code: &RoomCode) {
        if let Some(handle) = self.rooms.remove(code) {
            let _ = handle.shutdown().await;
        }
        self.conn_rooms.retain(|_, c| c != code);
        tracing::info!(room = %code, "room destroyed");
    }

    /// Generates a code not currently in use.
    fn fresh_code(&self) -> RoomCode {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| {
                    let i = rng.random_range(0..CODE_CHARSET.len());
                    CODE_CHARSET[i] as char
                })
                .collect();
            let code = RoomCode::new(code);
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    const P1: ConnectionId = ConnectionId(10);
    const P2: ConnectionId = ConnectionId(20);

    fn sender() -> EventSender {
        let (tx, rx) = mpsc::unbounded_channel();
        // Keep the receiver alive for the duration of the test.
        std::mem::forget(rx);
        tx
    }

    #[tokio::test]
    async fn test_generated_codes_are_well_formed_and_unique() {
        let mut registry = RoomRegistry::new();
        let a = registry.create_room(P1, None, sender()).await.unwrap();
        let b = registry.create_room(P2, None, sender()).await.unwrap();

        assert_ne!(a, b);
        for code in [&a, &b] {
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| CODE_CHARSET.contains(&b)));
        }
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_one_room_per_connection() {
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(P1, None, sender()).await.unwrap();

        let err = registry.create_room(P1, None, sender()).await;
        assert!(matches!(err, Err(RoomError::AlreadyInRoom(_))));

        let err = registry.join_room(&code, P1, None, sender()).await;
        assert!(matches!(err, Err(RoomError::AlreadyInRoom(_))));
    }

    #[tokio::test]
    async fn test_join_unknown_code_is_not_found() {
        let mut registry = RoomRegistry::new();
        let err = registry
            .join_room(&RoomCode::new("NOSUCH"), P1, None, sender())
            .await;
        assert!(matches!(err, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_restart_on_missing_room_is_expired() {
        let registry = RoomRegistry::new();
        let err = registry.restart(&RoomCode::new("GONE00"), P1).await;
        assert!(matches!(err, Err(RoomError::Expired(_))));
    }

    #[tokio::test]
    async fn test_disconnect_destroys_the_room() {
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(P1, None, sender()).await.unwrap();
        registry.join_room(&code, P2, None, sender()).await.unwrap();

        registry.handle_disconnect(P1).await;

        assert!(registry.is_empty());
        // The survivor's index entry is purged with the room, so they can
        // open a fresh one.
        registry.create_room(P2, None, sender()).await.unwrap();
    }

    #[tokio::test]
    async fn test_midgame_leave_destroys_the_room() {
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(P1, None, sender()).await.unwrap();
        registry.join_room(&code, P2, None, sender()).await.unwrap();

        // The game is running; leaving now must not strand an active
        // one-occupant room.
        registry.leave_room(&code, P1).await.unwrap();

        assert!(registry.is_empty());
        assert!(matches!(
            registry.room_info(&code).await,
            Err(RoomError::NotFound(_))
        ));
        // Both connections are freed for new rooms.
        registry.create_room(P1, None, sender()).await.unwrap();
        registry.create_room(P2, None, sender()).await.unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_of_unknown_connection_is_a_noop() {
        let mut registry = RoomRegistry::new();
        registry.handle_disconnect(ConnectionId(999)).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_leaving_an_empty_room_tears_it_down() {
        let mut registry = RoomRegistry::new();
        let code = registry.create_room(P1, None, sender()).await.unwrap();
        assert_eq!(registry.len(), 1);

        registry.leave_room(&code, P1).await.unwrap();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.play(&code, P1).await,
            Err(RoomError::NotFound(_))
        ));
    }
}
