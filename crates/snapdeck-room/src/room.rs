//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Each room runs in its own task and is driven exclusively through its
//! mpsc mailbox. Commands run to completion one at a time, so two
//! near-simultaneous snap attempts resolve deterministically in arrival
//! order — the second sees whatever pile the first left behind.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use snapdeck_game::GameState;
use snapdeck_protocol::{ConnectionId, Recipient, RoomCode, ServerEvent};

use crate::{RematchVote, RoomError, RoomStatus, VoteOutcome};

/// Channel sender for delivering events to one player's connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Mailbox capacity per room. Two players cannot realistically fill it.
const MAILBOX_SIZE: usize = 64;

/// Commands sent to a room actor through its mailbox.
pub(crate) enum RoomCommand {
    /// Seat a player. Fails when the room already has two.
    Join {
        conn: ConnectionId,
        name: Option<String>,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Voluntarily vacate a seat. Pre-game this just frees the seat;
    /// once cards have been dealt it abandons the room. The reply tells
    /// the registry whether the room should be reaped.
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    /// Play the top card of the caller's hand.
    Play { conn: ConnectionId },

    /// Attempt to snap the center pile.
    Snap { conn: ConnectionId },

    /// Vote for a rematch.
    Restart { conn: ConnectionId },

    /// The caller's connection died. Notifies the survivor; the registry
    /// destroys the room right after.
    Disconnect {
        conn: ConnectionId,
        reply: oneshot::Sender<()>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Stop the actor.
    Shutdown,
}

/// How a room reacted to a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Seat vacated while waiting; the room lives on.
    Vacated { remaining: usize },
    /// The leave hit a started game, which cannot continue one-sided.
    /// The survivor has been notified; the room must be destroyed.
    Abandoned,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub occupants: usize,
}

/// Handle to a running room actor. Cheap to clone — it wraps an
/// `mpsc::Sender`. The [`RoomRegistry`](crate::RoomRegistry) holds one
/// per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Seats a player in the room.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: Option<String>,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            conn,
            name,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Vacates a seat; returns how the room reacted.
    pub async fn leave(
        &self,
        conn: ConnectionId,
    ) -> Result<LeaveOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            conn,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Delivers a play action (fire-and-forget).
    pub async fn play(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Play { conn }).await
    }

    /// Delivers a snap attempt (fire-and-forget).
    pub async fn snap(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Snap { conn }).await
    }

    /// Delivers a rematch vote (fire-and-forget).
    pub async fn restart(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Restart { conn }).await
    }

    /// Reports a dead connection and waits until the survivor (if any)
    /// has been notified.
    pub async fn notify_disconnect(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Disconnect {
            conn,
            reply: reply_tx,
        })
        .await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// One seated player from the actor's point of view.
struct Occupant {
    conn: ConnectionId,
    name: String,
    sender: EventSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    status: RoomStatus,
    /// At most two, in registration order. The first occupant opens play.
    occupants: Vec<Occupant>,
    game: Option<GameState>,
    rematch: RematchVote,
    rng: StdRng,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn, reply } => {
                    let outcome = self.handle_leave(conn);
                    let _ = reply.send(outcome);
                }
                RoomCommand::Play { conn } => self.handle_play(conn),
                RoomCommand::Snap { conn } => self.handle_snap(conn),
                RoomCommand::Restart { conn } => {
                    self.handle_restart(conn)
                }
                RoomCommand::Disconnect { conn, reply } => {
                    self.handle_disconnect(conn);
                    let _ = reply.send(());
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => break,
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: Option<String>,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if self.occupants.iter().any(|o| o.conn == conn) {
            return Err(RoomError::AlreadyInRoom(conn));
        }
        if self.occupants.len() >= 2 || !self.status.is_joinable() {
            return Err(RoomError::Full(self.code.clone()));
        }

        let name = name.filter(|n| !n.trim().is_empty()).unwrap_or_else(
            || format!("Player {}", self.occupants.len() + 1),
        );
        tracing::info!(
            room = %self.code,
            %conn,
            name,
            "player joined"
        );
        self.occupants.push(Occupant { conn, name, sender });

        if self.occupants.len() == 2 {
            self.start_game();
        }

        Ok(())
    }

    /// Deals a fresh game. Used for both the first start and rematches;
    /// a rematch agreed mid-game simply abandons the running one.
    fn start_game(&mut self) {
        self.status = RoomStatus::Active;
        self.rematch.reset();

        let [first, second] = &self.occupants[..] else {
            // Only ever called with both seats filled.
            return;
        };
        let game = GameState::deal(
            [
                (first.conn, first.name.clone()),
                (second.conn, second.name.clone()),
            ],
            &mut self.rng,
        );
        let events = game.start_events(&self.code);
        self.game = Some(game);
        self.dispatch(events);

        tracing::info!(room = %self.code, "cards dealt, game started");
    }

    fn handle_play(&mut self, conn: ConnectionId) {
        if !self.status.is_active() {
            tracing::debug!(
                room = %self.code,
                %conn,
                status = %self.status,
                "play ignored outside active game"
            );
            return;
        }
        let Some(game) = &mut self.game else { return };
        let events = game.play(conn);
        let finished = game.is_finished();
        self.dispatch(events);
        if finished {
            self.finish_game();
        }
    }

    fn handle_snap(&mut self, conn: ConnectionId) {
        if !self.status.is_active() {
            tracing::debug!(
                room = %self.code,
                %conn,
                status = %self.status,
                "snap ignored outside active game"
            );
            return;
        }
        let Some(game) = &mut self.game else { return };
        let events = game.snap(conn);
        let finished = game.is_finished();
        self.dispatch(events);
        if finished {
            self.finish_game();
        }
    }

    /// Marks the game over. The room stays registered so rematch votes
    /// can land; only disconnect or leave destroys it.
    fn finish_game(&mut self) {
        self.status = RoomStatus::Ended;
        tracing::info!(room = %self.code, "game finished");
    }

    fn handle_restart(&mut self, conn: ConnectionId) {
        if !self.occupants.iter().any(|o| o.conn == conn) {
            tracing::debug!(
                room = %self.code,
                %conn,
                "restart vote from non-member, ignoring"
            );
            return;
        }
        if self.occupants.len() < 2 {
            // Alone in the room — consensus is unreachable.
            return;
        }

        match self.rematch.register(conn) {
            VoteOutcome::Duplicate => {}
            VoteOutcome::First => {
                tracing::debug!(
                    room = %self.code,
                    %conn,
                    "rematch vote registered, waiting for opponent"
                );
                self.dispatch(vec![(
                    Recipient::AllExcept(conn),
                    ServerEvent::OpponentWantsRematch,
                )]);
            }
            VoteOutcome::Consensus => {
                tracing::info!(room = %self.code, "rematch agreed");
                self.dispatch(vec![(
                    Recipient::All,
                    ServerEvent::RematchSuccess,
                )]);
                self.start_game();
            }
        }
    }

    fn handle_leave(&mut self, conn: ConnectionId) -> LeaveOutcome {
        if !self.occupants.iter().any(|o| o.conn == conn) {
            return LeaveOutcome::Vacated {
                remaining: self.occupants.len(),
            };
        }
        self.occupants.retain(|o| o.conn != conn);

        // Once cards are dealt the game cannot continue one-sided, so a
        // mid-game leave abandons the room exactly like a disconnect.
        if self.status != RoomStatus::Waiting {
            tracing::info!(
                room = %self.code,
                %conn,
                "player abandoned the game"
            );
            self.dispatch(vec![(
                Recipient::All,
                ServerEvent::OpponentLeft,
            )]);
            return LeaveOutcome::Abandoned;
        }

        tracing::info!(room = %self.code, %conn, "player left");
        self.dispatch(vec![(Recipient::All, ServerEvent::OpponentLeft)]);
        LeaveOutcome::Vacated {
            remaining: self.occupants.len(),
        }
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) {
        if !self.occupants.iter().any(|o| o.conn == conn) {
            return;
        }
        self.occupants.retain(|o| o.conn != conn);
        tracing::info!(room = %self.code, %conn, "player disconnected");
        self.dispatch(vec![(Recipient::All, ServerEvent::OpponentLeft)]);
    }

    /// Delivers events to the right occupants. A send failure means the
    /// receiving connection is already gone; the disconnect path will
    /// clean it up, so failures are dropped.
    fn dispatch(&self, events: Vec<(Recipient, ServerEvent)>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for o in &self.occupants {
                        let _ = o.sender.send(event.clone());
                    }
                }
                Recipient::Player(conn) => {
                    if let Some(o) =
                        self.occupants.iter().find(|o| o.conn == conn)
                    {
                        let _ = o.sender.send(event.clone());
                    }
                }
                Recipient::AllExcept(excluded) => {
                    for o in &self.occupants {
                        if o.conn != excluded {
                            let _ = o.sender.send(event.clone());
                        }
                    }
                }
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            status: self.status,
            occupants: self.occupants.len(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room(code: RoomCode) -> RoomHandle {
    let (tx, rx) = mpsc::channel(MAILBOX_SIZE);

    let actor = RoomActor {
        code: code.clone(),
        status: RoomStatus::Waiting,
        occupants: Vec::new(),
        game: None,
        rematch: RematchVote::default(),
        rng: StdRng::from_os_rng(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}

// =========================================================================
// Tests
// =========================================================================
