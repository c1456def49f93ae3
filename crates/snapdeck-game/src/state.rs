//! The game state machine: play, snap, penalty, and elimination.
//!
//! Hand discipline matters here. A play always removes from the *back* of
//! a hand; snap winnings and penalty cards always enter at the *front*.
//! That asymmetry is what makes won cards cycle back into play last.

use std::collections::VecDeque;

use rand::Rng;

use snapdeck_protocol::{
    Card, ConnectionId, HandCount, PlayerInfo, Recipient, RoomCode,
    ServerEvent,
};

use crate::Deck;

/// One player's side of the table.
#[derive(Debug, Clone)]
pub struct Seat {
    pub connection: ConnectionId,
    pub name: String,
    pub hand: VecDeque<Card>,
}

/// Authoritative state of one running game.
///
/// Seat order is registration order: the first-registered player sits in
/// seat 0 and holds the opening turn. Opponent lookup goes through an
/// explicit self/opponent split, never index arithmetic.
#[derive(Debug, Clone)]
pub struct GameState {
    seats: [Seat; 2],
    turn: ConnectionId,
    center_pile: Vec<Card>,
    winner: Option<ConnectionId>,
}

/// Splits the two seats into (actor, opponent) by connection id.
///
/// Returns `None` for a connection that holds neither seat.
fn split_seats(
    seats: &mut [Seat; 2],
    conn: ConnectionId,
) -> Option<(&mut Seat, &mut Seat)> {
    let [a, b] = seats;
    if a.connection == conn {
        Some((a, b))
    } else if b.connection == conn {
        Some((b, a))
    } else {
        None
    }
}

impl GameState {
    /// Deals a fresh shuffled game: 26 cards each, first player's turn.
    pub fn deal(
        players: [(ConnectionId, String); 2],
        rng: &mut impl Rng,
    ) -> Self {
        let mut deck = Deck::new();
        deck.shuffle(rng);
        let (first_hand, second_hand) = deck.deal();

        let [(first_conn, first_name), (second_conn, second_name)] = players;
        Self {
            turn: first_conn,
            seats: [
                Seat {
                    connection: first_conn,
                    name: first_name,
                    hand: first_hand.into(),
                },
                Seat {
                    connection: second_conn,
                    name: second_name,
                    hand: second_hand.into(),
                },
            ],
            center_pile: Vec::new(),
            winner: None,
        }
    }

    /// Builds a state from explicit hands, first player to move.
    ///
    /// [`GameState::deal`] is the normal entry point; this exists for
    /// scripting specific positions.
    pub fn with_hands(
        players: [(ConnectionId, String); 2],
        hands: [Vec<Card>; 2],
    ) -> Self {
        let [(first_conn, first_name), (second_conn, second_name)] = players;
        let [first_hand, second_hand] = hands;
        Self {
            turn: first_conn,
            seats: [
                Seat {
                    connection: first_conn,
                    name: first_name,
                    hand: first_hand.into(),
                },
                Seat {
                    connection: second_conn,
                    name: second_name,
                    hand: second_hand.into(),
                },
            ],
            center_pile: Vec::new(),
            winner: None,
        }
    }

    pub fn turn(&self) -> ConnectionId {
        self.turn
    }

    pub fn winner(&self) -> Option<ConnectionId> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn center_pile(&self) -> &[Card] {
        &self.center_pile
    }

    pub fn seat(&self, conn: ConnectionId) -> Option<&Seat> {
        self.seats.iter().find(|s| s.connection == conn)
    }

    /// Both hand sizes in seat order.
    pub fn hand_counts(&self) -> [HandCount; 2] {
        let [a, b] = &self.seats;
        [
            HandCount {
                id: a.connection,
                count: a.hand.len(),
            },
            HandCount {
                id: b.connection,
                count: b.hand.len(),
            },
        ]
    }

    /// The private deal announcements, one per seat.
    ///
    /// Each player sees their own hand, the opponent's card count, whose
    /// turn it is, and both names.
    pub fn start_events(
        &self,
        room_id: &RoomCode,
    ) -> Vec<(Recipient, ServerEvent)> {
        let [a, b] = &self.seats;
        let players = [
            PlayerInfo {
                id: a.connection,
                name: a.name.clone(),
            },
            PlayerInfo {
                id: b.connection,
                name: b.name.clone(),
            },
        ];

        vec![
            (
                Recipient::Player(a.connection),
                ServerEvent::GameStart {
                    room_id: room_id.clone(),
                    hand: a.hand.iter().cloned().collect(),
                    opponent_count: b.hand.len(),
                    your_turn: self.turn == a.connection,
                    players: players.clone(),
                },
            ),
            (
                Recipient::Player(b.connection),
                ServerEvent::GameStart {
                    room_id: room_id.clone(),
                    hand: b.hand.iter().cloned().collect(),
                    opponent_count: a.hand.len(),
                    your_turn: self.turn == b.connection,
                    players,
                },
            ),
        ]
    }

    /// Plays the top card of `conn`'s hand onto the center pile.
    ///
    /// Silently ignored unless the game is running, `conn` holds a seat,
    /// it is their turn, and their hand is non-empty. The turn advances to
    /// the opponent regardless of the match outcome.
    ///
    /// Emptying the hand on a non-matching play loses immediately; on a
    /// matching play the player stays alive until the snap resolves, so
    /// they keep their chance to win the pile back. If the opponent plays
    /// over that match instead of snapping, the match is buried and the
    /// deferred elimination fires.
    pub fn play(&mut self, conn: ConnectionId) -> Vec<(Recipient, ServerEvent)> {
        if self.winner.is_some() || self.turn != conn {
            return Vec::new();
        }
        let Some((actor, opponent)) = split_seats(&mut self.seats, conn)
        else {
            return Vec::new();
        };
        let Some(card) = actor.hand.pop_back() else {
            return Vec::new();
        };
        let actor_emptied = actor.hand.is_empty();
        let opponent_id = opponent.connection;
        let opponent_emptied = opponent.hand.is_empty();

        self.center_pile.push(card.clone());
        let is_match = self.top_two_match();
        self.turn = opponent_id;

        let mut out = vec![(
            Recipient::All,
            ServerEvent::CardPlayed {
                card,
                turn: opponent_id,
                is_match,
                counts: self.hand_counts(),
            },
        )];

        if actor_emptied && !is_match {
            self.winner = Some(opponent_id);
            out.push((
                Recipient::All,
                ServerEvent::GameOver {
                    winner_id: opponent_id,
                    loser_id: conn,
                },
            ));
        } else if opponent_emptied && !is_match {
            // The opponent was only alive pending a match; this play
            // buried it, so the deferred elimination lands now.
            self.winner = Some(conn);
            out.push((
                Recipient::All,
                ServerEvent::GameOver {
                    winner_id: conn,
                    loser_id: opponent_id,
                },
            ));
        }

        out
    }

    /// Resolves a snap attempt by `conn`.
    ///
    /// With a match on top of the pile the caller takes the whole pile,
    /// prepended to their hand in pile order, and keeps the turn. Without
    /// one, a single penalty card moves from the caller to the opponent —
    /// unless the caller has no cards at all, which makes the attempt a
    /// complete no-op. Piles shorter than two cards are never snappable.
    pub fn snap(&mut self, conn: ConnectionId) -> Vec<(Recipient, ServerEvent)> {
        if self.winner.is_some() || self.center_pile.len() < 2 {
            return Vec::new();
        }
        let is_match = self.top_two_match();
        let Some((actor, opponent)) = split_seats(&mut self.seats, conn)
        else {
            return Vec::new();
        };
        let opponent_id = opponent.connection;

        if is_match {
            // Prepend the pile in order: reversing the drain keeps
            // pile[0] at the very front of the hand.
            for card in self.center_pile.drain(..).rev() {
                actor.hand.push_front(card);
            }
            let winner_name = actor.name.clone();
            let opponent_emptied = opponent.hand.is_empty();
            self.turn = conn;

            let mut out = vec![
                (
                    Recipient::All,
                    ServerEvent::SnapSuccess {
                        winner_id: conn,
                        winner_name,
                    },
                ),
                (
                    Recipient::All,
                    ServerEvent::GameUpdate {
                        turn: conn,
                        counts: self.hand_counts(),
                    },
                ),
            ];

            if opponent_emptied {
                self.winner = Some(conn);
                out.push((
                    Recipient::All,
                    ServerEvent::GameOver {
                        winner_id: conn,
                        loser_id: opponent_id,
                    },
                ));
            }

            out
        } else {
            let Some(card) = actor.hand.pop_back() else {
                return Vec::new();
            };
            opponent.hand.push_front(card);
            let actor_emptied = actor.hand.is_empty();

            let mut out = vec![
                (
                    Recipient::Player(conn),
                    ServerEvent::PenaltyFlash {
                        message: "False snap! No match — you lost a card."
                            .to_string(),
                    },
                ),
                (
                    Recipient::Player(opponent_id),
                    ServerEvent::PenaltyFlash {
                        message:
                            "Your opponent snapped at nothing — you gained a card."
                                .to_string(),
                    },
                ),
                (
                    Recipient::All,
                    ServerEvent::GameUpdate {
                        turn: self.turn,
                        counts: self.hand_counts(),
                    },
                ),
            ];

            if actor_emptied {
                self.winner = Some(opponent_id);
                out.push((
                    Recipient::All,
                    ServerEvent::GameOver {
                        winner_id: opponent_id,
                        loser_id: conn,
                    },
                ));
            }

            out
        }
    }

    /// True when the top two pile cards share a character.
    fn top_two_match(&self) -> bool {
        match self.center_pile.as_slice() {
            [.., prev, last] => last.matches(prev),
            _ => false,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use snapdeck_protocol::{Character, Style};

    use super::*;
    use crate::DECK_SIZE;

    const P1: ConnectionId = ConnectionId(1);
    const P2: ConnectionId = ConnectionId(2);

    fn card(character: Character, style: Style) -> Card {
        Card::new(character, style)
    }

    fn dealt_state() -> GameState {
        let mut rng = StdRng::seed_from_u64(1);
        GameState::deal(
            [(P1, "Player 1".into()), (P2, "Player 2".into())],
            &mut rng,
        )
    }

    /// Hands are played from the back, so the *last* card in each vec is
    /// the next one out.
    fn scripted(hand1: Vec<Card>, hand2: Vec<Card>) -> GameState {
        GameState::with_hands(
            [(P1, "Player 1".into()), (P2, "Player 2".into())],
            [hand1, hand2],
        )
    }

    fn total_cards(state: &GameState) -> usize {
        state.hand_counts().iter().map(|c| c.count).sum::<usize>()
            + state.center_pile().len()
    }

    // --------------------------------------------------------------
    // Deal
    // --------------------------------------------------------------

    #[test]
    fn test_deal_gives_26_each_and_first_player_the_turn() {
        let state = dealt_state();
        let counts = state.hand_counts();
        assert_eq!(counts[0].count, 26);
        assert_eq!(counts[1].count, 26);
        assert_eq!(state.turn(), P1);
        assert!(state.center_pile().is_empty());
        assert!(!state.is_finished());
    }

    #[test]
    fn test_start_events_are_private_and_complete() {
        let state = dealt_state();
        let events = state.start_events(&RoomCode::new("AAAAAA"));
        assert_eq!(events.len(), 2);

        let (recipient, event) = &events[0];
        assert_eq!(*recipient, Recipient::Player(P1));
        match event {
            ServerEvent::GameStart {
                hand,
                opponent_count,
                your_turn,
                players,
                ..
            } => {
                assert_eq!(hand.len(), 26);
                assert_eq!(*opponent_count, 26);
                assert!(your_turn);
                assert_eq!(players[0].name, "Player 1");
                assert_eq!(players[1].name, "Player 2");
            }
            other => panic!("expected GameStart, got {other:?}"),
        }

        let (recipient, event) = &events[1];
        assert_eq!(*recipient, Recipient::Player(P2));
        match event {
            ServerEvent::GameStart { your_turn, .. } => {
                assert!(!your_turn)
            }
            other => panic!("expected GameStart, got {other:?}"),
        }
    }

    // --------------------------------------------------------------
    // Play
    // --------------------------------------------------------------

    #[test]
    fn test_play_moves_tail_card_to_pile_and_passes_turn() {
        let mut state = dealt_state();
        let expected = state
            .seat(P1)
            .unwrap()
            .hand
            .back()
            .cloned()
            .unwrap();

        let events = state.play(P1);

        assert_eq!(state.turn(), P2);
        assert_eq!(state.center_pile().len(), 1);
        assert_eq!(state.center_pile()[0], expected);
        assert_eq!(state.seat(P1).unwrap().hand.len(), 25);

        match &events[0] {
            (
                Recipient::All,
                ServerEvent::CardPlayed {
                    card,
                    turn,
                    is_match,
                    counts,
                },
            ) => {
                assert_eq!(*card, expected);
                assert_eq!(*turn, P2);
                assert!(!is_match);
                assert_eq!(counts[0].count, 25);
                assert_eq!(counts[1].count, 26);
            }
            other => panic!("expected CardPlayed, got {other:?}"),
        }
    }

    #[test]
    fn test_play_out_of_turn_is_a_noop() {
        let mut state = dealt_state();
        let events = state.play(P2);
        assert!(events.is_empty());
        assert_eq!(state.turn(), P1);
        assert!(state.center_pile().is_empty());
    }

    #[test]
    fn test_play_by_stranger_is_a_noop() {
        let mut state = dealt_state();
        let events = state.play(ConnectionId(99));
        assert!(events.is_empty());
    }

    #[test]
    fn test_play_never_removes_from_an_empty_hand() {
        // P1 empties their hand on a matching play and stays alive; P2
        // re-matches on top, so the turn returns to P1 with zero cards.
        let mut state = scripted(
            vec![
                card(Character::Tom, Style::Pixar),
                card(Character::Nobita, Style::Ghibli),
            ],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Tom, Style::Standard),
                card(Character::Tom, Style::Ghibli),
            ],
        );
        state.play(P1); // Nobita
        state.play(P2); // Tom
        state.play(P1); // Tom — match, P1 empty but alive
        state.play(P2); // Tom — match again, turn back to P1

        let events = state.play(P1);
        assert!(events.is_empty());
        assert!(!state.is_finished());
        assert_eq!(state.seat(P1).unwrap().hand.len(), 0);
        assert_eq!(state.center_pile().len(), 4);
    }

    #[test]
    fn test_conservation_holds_across_transitions() {
        let mut state = dealt_state();
        assert_eq!(total_cards(&state), DECK_SIZE);

        for _ in 0..10 {
            let turn = state.turn();
            state.play(turn);
            assert_eq!(total_cards(&state), DECK_SIZE);
            state.snap(turn);
            assert_eq!(total_cards(&state), DECK_SIZE);
            if state.is_finished() {
                break;
            }
        }
    }

    #[test]
    fn test_turn_advances_even_on_match() {
        let mut state = scripted(
            vec![
                card(Character::Nobita, Style::Ghibli),
                card(Character::Tom, Style::Pixar),
            ],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Tom, Style::Ghibli),
            ],
        );
        state.play(P1); // Tom
        let events = state.play(P2); // Tom — match
        match &events[0] {
            (_, ServerEvent::CardPlayed { is_match, turn, .. }) => {
                assert!(is_match);
                assert_eq!(*turn, P1);
            }
            other => panic!("expected CardPlayed, got {other:?}"),
        }
        assert_eq!(state.turn(), P1);
    }

    // --------------------------------------------------------------
    // Snap
    // --------------------------------------------------------------

    #[test]
    fn test_snap_on_short_pile_mutates_nothing() {
        let mut state = dealt_state();
        state.play(P1); // pile has one card
        let before = state.hand_counts();

        let events = state.snap(P2);

        assert!(events.is_empty());
        assert_eq!(state.hand_counts(), before);
        assert_eq!(state.center_pile().len(), 1);
    }

    /// A plays X, B plays a matching Y, A snaps and takes the pile
    /// prepended in order.
    #[test]
    fn test_valid_snap_takes_pile_in_order_and_keeps_turn() {
        let x = card(Character::Tom, Style::Pixar);
        let y = card(Character::Tom, Style::Ghibli);
        let mut state = scripted(
            vec![card(Character::Nobita, Style::Ghibli), x.clone()],
            vec![card(Character::Oggy, Style::Ghibli), y.clone()],
        );

        state.play(P1); // A plays X, no match
        assert_eq!(state.turn(), P2);
        state.play(P2); // B plays Y, match
        assert_eq!(state.turn(), P1);

        let events = state.snap(P1);

        assert!(state.center_pile().is_empty());
        assert_eq!(state.turn(), P1);
        let hand = &state.seat(P1).unwrap().hand;
        assert_eq!(hand.len(), 3);
        assert_eq!(hand[0], x, "pile head lands at the very front");
        assert_eq!(hand[1], y);

        match &events[0] {
            (
                Recipient::All,
                ServerEvent::SnapSuccess {
                    winner_id,
                    winner_name,
                },
            ) => {
                assert_eq!(*winner_id, P1);
                assert_eq!(winner_name, "Player 1");
            }
            other => panic!("expected SnapSuccess, got {other:?}"),
        }
        match &events[1] {
            (Recipient::All, ServerEvent::GameUpdate { turn, counts }) => {
                assert_eq!(*turn, P1);
                assert_eq!(counts[0].count, 3);
                assert_eq!(counts[1].count, 1);
            }
            other => panic!("expected GameUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_false_snap_moves_one_penalty_card() {
        let mut state = scripted(
            vec![
                card(Character::Jack, Style::Ghibli),
                card(Character::Nobita, Style::Ghibli),
                card(Character::Tom, Style::Pixar),
            ],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Jerry, Style::Ghibli),
            ],
        );
        state.play(P1); // Tom
        state.play(P2); // Jerry — no match

        let events = state.snap(P1);

        // One card moved from P1's tail to P2's front; pile untouched.
        assert_eq!(state.seat(P1).unwrap().hand.len(), 1);
        assert_eq!(state.seat(P2).unwrap().hand.len(), 2);
        assert_eq!(
            state.seat(P2).unwrap().hand[0],
            card(Character::Nobita, Style::Ghibli)
        );
        assert_eq!(state.center_pile().len(), 2);
        assert_eq!(state.turn(), P1, "penalty does not move the turn");

        let penalties: Vec<_> = events
            .iter()
            .filter(|(_, e)| matches!(e, ServerEvent::PenaltyFlash { .. }))
            .collect();
        assert_eq!(penalties.len(), 2);
        assert_eq!(penalties[0].0, Recipient::Player(P1));
        assert_eq!(penalties[1].0, Recipient::Player(P2));
        match (&penalties[0].1, &penalties[1].1) {
            (
                ServerEvent::PenaltyFlash { message: to_actor },
                ServerEvent::PenaltyFlash { message: to_opponent },
            ) => assert_ne!(to_actor, to_opponent),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_penalty_emptying_the_hand_loses_the_game() {
        let mut state = scripted(
            vec![
                card(Character::Shinchan, Style::Ghibli),
                card(Character::Tom, Style::Pixar),
            ],
            vec![
                card(Character::Jerry, Style::Sketch),
                card(Character::Oggy, Style::Ghibli),
            ],
        );
        state.play(P1); // Tom
        state.play(P2); // Oggy — no match
        let events = state.snap(P1); // false snap costs P1's last card

        assert!(state.is_finished());
        assert_eq!(state.winner(), Some(P2));
        assert_eq!(state.seat(P1).unwrap().hand.len(), 0);
        assert_eq!(state.seat(P2).unwrap().hand.len(), 2);
        assert!(matches!(
            events.last(),
            Some((
                Recipient::All,
                ServerEvent::GameOver { winner_id, .. }
            )) if *winner_id == P2
        ));
    }

    #[test]
    fn test_false_snap_with_empty_hand_is_a_noop() {
        // A zero-card player only stays alive behind a matching pile, so
        // this state is crafted directly to exercise the guard.
        let mut state = scripted(
            vec![],
            vec![
                card(Character::Jack, Style::Ghibli),
                card(Character::Himawari, Style::Pixar),
            ],
        );
        state.center_pile = vec![
            card(Character::Oggy, Style::Ghibli),
            card(Character::Jerry, Style::Sketch),
        ];
        let before = state.hand_counts();

        let events = state.snap(P1);

        assert!(events.is_empty());
        assert_eq!(state.hand_counts(), before);
        assert_eq!(state.center_pile().len(), 2);
        assert!(!state.is_finished());
    }

    // --------------------------------------------------------------
    // Elimination
    // --------------------------------------------------------------

    #[test]
    fn test_last_card_without_match_loses_immediately() {
        let mut state = scripted(
            vec![card(Character::Tom, Style::Pixar)],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Jerry, Style::Sketch),
            ],
        );
        let events = state.play(P1);

        assert!(state.is_finished());
        assert_eq!(state.winner(), Some(P2));
        match events.last() {
            Some((
                Recipient::All,
                ServerEvent::GameOver {
                    winner_id,
                    loser_id,
                },
            )) => {
                assert_eq!(*winner_id, P2);
                assert_eq!(*loser_id, P1);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn test_last_card_with_match_survives_until_snap() {
        let mut state = scripted(
            vec![
                card(Character::Tom, Style::Pixar),
                card(Character::Nobita, Style::Ghibli),
            ],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Tom, Style::Ghibli),
            ],
        );
        state.play(P1); // Nobita
        state.play(P2); // Tom
        let events = state.play(P1); // Tom — match, last card

        assert!(!state.is_finished(), "match keeps the player alive");
        assert_eq!(events.len(), 1, "no GameOver yet");

        // P1 wins the pile back and is healthy again.
        state.snap(P1);
        assert!(!state.is_finished());
        assert_eq!(state.seat(P1).unwrap().hand.len(), 3);
    }

    #[test]
    fn test_burying_a_pending_match_eliminates_the_empty_hand() {
        let mut state = scripted(
            vec![
                card(Character::Tom, Style::Pixar),
                card(Character::Nobita, Style::Ghibli),
            ],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Jerry, Style::Sketch),
                card(Character::Tom, Style::Ghibli),
            ],
        );
        state.play(P1); // Nobita
        state.play(P2); // Tom — no match
        state.play(P1); // Tom — match, P1 empty but alive
        assert!(!state.is_finished());

        // P2 plays over the match instead of snapping. The match is
        // buried, P1 has no cards and no way back in: P2 wins.
        let events = state.play(P2); // Jerry

        assert!(state.is_finished());
        assert_eq!(state.winner(), Some(P2));
        match events.last() {
            Some((
                Recipient::All,
                ServerEvent::GameOver {
                    winner_id,
                    loser_id,
                },
            )) => {
                assert_eq!(*winner_id, P2);
                assert_eq!(*loser_id, P1);
            }
            other => panic!("expected GameOver, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_snap_that_leaves_opponent_empty_wins_the_game() {
        let mut state = scripted(
            vec![
                card(Character::Nobita, Style::Ghibli),
                card(Character::Tom, Style::Pixar),
            ],
            vec![card(Character::Tom, Style::Ghibli)],
        );
        state.play(P1); // Tom
        state.play(P2); // Tom — match, P2 at zero cards but alive
        let events = state.snap(P1); // P1 takes the pile; P2 still empty

        assert!(state.is_finished());
        assert_eq!(state.winner(), Some(P1));
        assert!(matches!(
            events.last(),
            Some((
                Recipient::All,
                ServerEvent::GameOver { winner_id, .. }
            )) if *winner_id == P1
        ));
    }

    #[test]
    fn test_transitions_after_game_over_are_noops() {
        let mut state = scripted(
            vec![card(Character::Tom, Style::Pixar)],
            vec![
                card(Character::Oggy, Style::Ghibli),
                card(Character::Jerry, Style::Sketch),
            ],
        );
        state.play(P1); // game over
        assert!(state.is_finished());

        assert!(state.play(P2).is_empty());
        assert!(state.snap(P2).is_empty());
    }
}
