// SPDX-License-Identifier: MIT OR Apache-2.0

//! Match sessions: seats, turn order and the pass/forfeit state machine
//!
//! A `Match` has no lock of its own. The registry wraps each one in a mutex
//! and every method here runs with that mutex held.

use crate::error::SessionError;
use crate::{MatchId, PeerHandle, PlayerId};
use ingo_core::{Board, Color, Coord, Placement, ScoreData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    /// Created, waiting for the second seat to fill
    WaitingForOpponent,
    /// Moves are being accepted
    Playing,
    /// Ended by two consecutive passes
    GameOverPassed,
    /// Ended by a player leaving
    GameOverForfeit,
}

impl MatchState {
    /// Both game-over states are terminal
    pub fn is_over(&self) -> bool {
        matches!(self, MatchState::GameOverPassed | MatchState::GameOverForfeit)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchState::WaitingForOpponent => "WAITING_FOR_OPPONENT",
            MatchState::Playing => "PLAYING",
            MatchState::GameOverPassed => "GAME_OVER_PASSED",
            MatchState::GameOverForfeit => "GAME_OVER_FORFEIT",
        };
        f.write_str(name)
    }
}

/// How many connections a match needs before play starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// One participant plays both colors from a single connection
    Local,
    /// Two participants, one color each
    Remote,
}

impl MatchMode {
    /// Seats that must be filled to leave `WaitingForOpponent`
    pub fn seats_required(&self) -> usize {
        match self {
            MatchMode::Local => 1,
            MatchMode::Remote => 2,
        }
    }
}

/// A participant and, while connected, their transport handle
#[derive(Debug, Clone)]
pub struct Seat {
    /// Player identity, kept after the player leaves
    pub player_id: PlayerId,
    handle: Option<Arc<dyn PeerHandle>>,
}

impl Seat {
    fn new(player_id: PlayerId, handle: Arc<dyn PeerHandle>) -> Self {
        Self {
            player_id,
            handle: Some(handle),
        }
    }

    /// Transport handle, if the player is connected
    pub fn handle(&self) -> Option<Arc<dyn PeerHandle>> {
        self.handle.clone()
    }

    /// Whether a transport handle is attached
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }
}

/// Stones on the board, per color
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Stones {
    /// Black stones
    pub black: Vec<Coord>,
    /// White stones
    pub white: Vec<Coord>,
}

/// Read-only view of a match for one player
///
/// Field names on the wire are the ones existing clients decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchInfo {
    /// Board size
    pub size: u8,
    /// Plies played, passes included
    #[serde(rename = "Turn")]
    pub ply_count: u32,
    /// Whether it is this player's turn
    pub player_turn: bool,
    /// Opponent identity, `"NONE"` while the seat is empty
    #[serde(rename = "OpponentID")]
    pub opponent_id: String,
    /// Color this player moves with (the color to move, in a local match)
    pub player_color: Color,
    /// Match lifecycle state
    pub state: MatchState,
    /// Current Ing count
    #[serde(rename = "ScoreData")]
    pub score: ScoreData,
    /// Where this player may legally play right now
    pub available_spaces: Vec<Coord>,
    /// Occupied points per color
    #[serde(rename = "Spaces")]
    pub stones: Stones,
}

/// Opponent id reported while the second seat is empty
pub const NO_OPPONENT: &str = "NONE";

/// One game of Go between one or two participants
#[derive(Debug)]
pub struct Match {
    id: MatchId,
    mode: MatchMode,
    board: Board,
    seats: Vec<Seat>,
    first_player_id: PlayerId,
    ply_count: u32,
    last_ply_was_pass: bool,
    state: MatchState,
}

impl Match {
    /// Create a two-participant match; waits for an opponent
    pub fn new_remote(
        id: MatchId,
        first_player: PlayerId,
        size: u8,
        handle: Arc<dyn PeerHandle>,
    ) -> Self {
        Self::new(id, MatchMode::Remote, first_player, size, handle)
    }

    /// Create a single-participant match; play starts immediately
    pub fn new_local(id: MatchId, player: PlayerId, size: u8, handle: Arc<dyn PeerHandle>) -> Self {
        Self::new(id, MatchMode::Local, player, size, handle)
    }

    /// Create a match of either mode
    ///
    /// The board size is assumed to have been validated by the caller.
    pub fn new(
        id: MatchId,
        mode: MatchMode,
        first_player: PlayerId,
        size: u8,
        handle: Arc<dyn PeerHandle>,
    ) -> Self {
        let mut game = Self {
            id,
            mode,
            board: Board::new(size),
            seats: vec![Seat::new(first_player.clone(), handle)],
            first_player_id: first_player,
            ply_count: 0,
            last_ply_was_pass: false,
            state: MatchState::WaitingForOpponent,
        };
        game.start_if_seated();
        game
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn ply_count(&self) -> u32 {
        self.ply_count
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn first_player_id(&self) -> &str {
        &self.first_player_id
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Whether `player` holds a seat
    pub fn has_player(&self, player: &str) -> bool {
        self.seat(player).is_some()
    }

    /// Color to move: Black on even ply counts
    pub fn to_move(&self) -> Color {
        if self.ply_count % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Color `player` moves with, `None` if they have no seat
    pub fn color_of(&self, player: &str) -> Option<Color> {
        if !self.has_player(player) {
            return None;
        }
        match self.mode {
            MatchMode::Local => Some(self.to_move()),
            MatchMode::Remote if player == self.first_player_id => Some(Color::Black),
            MatchMode::Remote => Some(Color::White),
        }
    }

    /// Whether `player` is the one to move
    pub fn is_turn(&self, player: &str) -> bool {
        self.color_of(player) == Some(self.to_move())
    }

    /// The other participant's seat
    pub fn other_player(&self, player: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id != player)
    }

    /// Handle to signal after `player` changed the match
    pub fn notify_target(&self, player: &str) -> Option<Arc<dyn PeerHandle>> {
        self.other_player(player).and_then(Seat::handle)
    }

    /// Take a free seat; fills the match and starts play when enough players are seated
    pub fn join(&mut self, player: &str, handle: Arc<dyn PeerHandle>) -> Result<(), SessionError> {
        if self.has_player(player) || self.state != MatchState::WaitingForOpponent {
            return Err(SessionError::CannotJoin);
        }
        self.seats.push(Seat::new(player.to_string(), handle));
        self.start_if_seated();
        tracing::info!(match_id = %self.id, player, state = %self.state, "Player joined match");
        Ok(())
    }

    /// Rejoin if `player` already holds a seat, otherwise take the free one
    pub fn join_or_rejoin(
        &mut self,
        player: &str,
        handle: Arc<dyn PeerHandle>,
    ) -> Result<(), SessionError> {
        if self.has_player(player) {
            self.rejoin(player, handle)
        } else {
            self.join(player, handle)
        }
    }

    /// Re-attach a transport handle to an existing seat; game state is untouched
    pub fn rejoin(&mut self, player: &str, handle: Arc<dyn PeerHandle>) -> Result<(), SessionError> {
        let seat = self.seat_mut(player).ok_or(SessionError::NotAParticipant)?;
        seat.handle = Some(handle);
        tracing::debug!(match_id = %self.id, player, "Player rejoined match");
        Ok(())
    }

    /// Play a stone for `player`
    ///
    /// The board is unchanged on any error.
    pub fn place_stone(&mut self, player: &str, coord: Coord) -> Result<Placement, SessionError> {
        let color = self.ensure_can_move(player)?;

        let placement = self.board.play(coord, color).map_err(|e| {
            tracing::debug!(match_id = %self.id, player, ?coord, error = %e, "Move rejected");
            SessionError::from(e)
        })?;

        self.ply_count += 1;
        self.last_ply_was_pass = false;
        tracing::debug!(
            match_id = %self.id,
            %color,
            ?coord,
            captured = placement.captured.len(),
            "Stone placed"
        );
        Ok(placement)
    }

    /// Pass the turn; the second consecutive pass ends the match
    pub fn pass(&mut self, player: &str) -> Result<(), SessionError> {
        self.ensure_can_move(player)?;

        if self.last_ply_was_pass {
            self.state = MatchState::GameOverPassed;
            tracing::info!(match_id = %self.id, "Both players passed, match over");
        } else {
            self.last_ply_was_pass = true;
        }
        self.ply_count += 1;
        Ok(())
    }

    /// Leave the match, forfeiting it unless it already ended by passes
    ///
    /// The player's identity stays seated for the final score display.
    pub fn forfeit(&mut self, player: &str) -> Result<(), SessionError> {
        self.seat_mut(player)
            .ok_or(SessionError::NotAParticipant)?
            .handle = None;

        if self.state != MatchState::GameOverPassed {
            self.state = MatchState::GameOverForfeit;
        }
        tracing::info!(match_id = %self.id, player, state = %self.state, "Player left match");
        Ok(())
    }

    /// Everything `player` needs to render the match
    pub fn projection(&self, player: &str) -> Result<MatchInfo, SessionError> {
        let color = self.color_of(player).ok_or(SessionError::NotAParticipant)?;
        let grid = self.board.current_grid();

        let available_spaces = if self.state == MatchState::Playing {
            self.board.available_spaces(color)
        } else {
            Vec::new()
        };
        let opponent_id = self
            .other_player(player)
            .map(|s| s.player_id.clone())
            .unwrap_or_else(|| NO_OPPONENT.to_string());

        Ok(MatchInfo {
            size: self.board.size(),
            ply_count: self.ply_count,
            state: self.state,
            player_color: color,
            player_turn: self.is_turn(player),
            opponent_id,
            available_spaces,
            stones: Stones {
                black: grid.stones(Color::Black),
                white: grid.stones(Color::White),
            },
            score: ingo_core::score(grid),
        })
    }

    fn ensure_can_move(&self, player: &str) -> Result<Color, SessionError> {
        let color = self.color_of(player).ok_or(SessionError::NotAParticipant)?;
        if self.state != MatchState::Playing {
            return Err(SessionError::MatchNotActive(self.state));
        }
        if color != self.to_move() {
            return Err(SessionError::NotYourTurn);
        }
        Ok(color)
    }

    fn start_if_seated(&mut self) {
        if self.state == MatchState::WaitingForOpponent
            && self.seats.len() >= self.mode.seats_required()
        {
            self.state = MatchState::Playing;
        }
    }

    fn seat(&self, player: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.player_id == player)
    }

    fn seat_mut(&mut self, player: &str) -> Option<&mut Seat> {
        self.seats.iter_mut().find(|s| s.player_id == player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullHandle;
    use ingo_core::GameError;

    fn handle() -> Arc<dyn PeerHandle> {
        Arc::new(NullHandle)
    }

    fn remote_match() -> Match {
        let mut game = Match::new_remote("abc123".into(), "alice".into(), 9, handle());
        game.join("bob", handle()).unwrap();
        game
    }

    #[test]
    fn remote_match_waits_for_opponent() {
        let mut game = Match::new_remote("abc123".into(), "alice".into(), 9, handle());
        assert_eq!(game.state(), MatchState::WaitingForOpponent);
        assert_eq!(
            game.place_stone("alice", Coord::new(2, 2)),
            Err(SessionError::MatchNotActive(MatchState::WaitingForOpponent))
        );

        game.join("bob", handle()).unwrap();
        assert_eq!(game.state(), MatchState::Playing);
        assert_eq!(game.join("carol", handle()), Err(SessionError::CannotJoin));
        assert_eq!(game.join("bob", handle()), Err(SessionError::CannotJoin));
    }

    #[test]
    fn join_or_rejoin_picks_the_right_seat() {
        let mut game = Match::new_remote("abc123".into(), "alice".into(), 9, handle());
        assert_eq!(game.id(), "abc123");
        assert_eq!(game.mode(), MatchMode::Remote);

        // The creator reconnecting keeps the match waiting
        game.join_or_rejoin("alice", handle()).unwrap();
        assert_eq!(game.state(), MatchState::WaitingForOpponent);
        assert_eq!(game.seats().len(), 1);

        game.join_or_rejoin("bob", handle()).unwrap();
        assert_eq!(game.state(), MatchState::Playing);
        game.join_or_rejoin("bob", handle()).unwrap();
        assert_eq!(game.seats().len(), 2);

        assert_eq!(
            game.join_or_rejoin("carol", handle()),
            Err(SessionError::CannotJoin)
        );
    }

    #[test]
    fn colors_and_turns_alternate() {
        let mut game = remote_match();
        assert_eq!(game.color_of("alice"), Some(Color::Black));
        assert_eq!(game.color_of("bob"), Some(Color::White));
        assert_eq!(game.color_of("mallory"), None);
        assert!(game.is_turn("alice"));

        assert_eq!(
            game.place_stone("bob", Coord::new(3, 3)),
            Err(SessionError::NotYourTurn)
        );
        game.place_stone("alice", Coord::new(3, 3)).unwrap();
        assert!(game.is_turn("bob"));
        assert_eq!(game.ply_count(), 1);

        assert_eq!(
            game.place_stone("bob", Coord::new(3, 3)),
            Err(SessionError::IllegalMove(GameError::OccupiedPosition))
        );
        assert_eq!(game.ply_count(), 1);
        assert!(game.is_turn("bob"));
    }

    #[test]
    fn two_passes_end_the_match() {
        let mut game = remote_match();
        game.pass("alice").unwrap();
        assert_eq!(game.state(), MatchState::Playing);
        game.place_stone("bob", Coord::new(4, 4)).unwrap();
        game.pass("alice").unwrap();
        game.pass("bob").unwrap();
        assert_eq!(game.state(), MatchState::GameOverPassed);
        assert_eq!(game.ply_count(), 4);

        assert!(matches!(
            game.place_stone("alice", Coord::new(0, 0)),
            Err(SessionError::MatchNotActive(MatchState::GameOverPassed))
        ));
        game.forfeit("alice").unwrap();
        assert_eq!(game.state(), MatchState::GameOverPassed);
    }

    #[test]
    fn leaving_forfeits() {
        let mut game = remote_match();
        game.place_stone("alice", Coord::new(4, 4)).unwrap();
        game.forfeit("bob").unwrap();
        assert_eq!(game.state(), MatchState::GameOverForfeit);
        assert!(game.has_player("bob"));
        let seats = game.seats();
        assert_eq!(seats.len(), 2);
        assert!(seats[0].is_connected());
        assert!(!seats[1].is_connected());
        assert!(game.notify_target("alice").is_none());
        assert!(game.notify_target("bob").is_some());
        assert_eq!(game.pass("alice"), Err(SessionError::MatchNotActive(MatchState::GameOverForfeit)));
    }

    #[test]
    fn local_match_plays_both_colors() {
        let mut game = Match::new_local("local1".into(), "alice".into(), 9, handle());
        assert_eq!(game.mode(), MatchMode::Local);
        assert_eq!(game.state(), MatchState::Playing);
        assert_eq!(game.color_of("alice"), Some(Color::Black));

        game.place_stone("alice", Coord::new(0, 0)).unwrap();
        assert_eq!(game.color_of("alice"), Some(Color::White));
        game.place_stone("alice", Coord::new(1, 1)).unwrap();

        let info = game.projection("alice").unwrap();
        assert_eq!(info.stones.black, vec![Coord::new(0, 0)]);
        assert_eq!(info.stones.white, vec![Coord::new(1, 1)]);
        assert!(info.player_turn);
        assert_eq!(info.opponent_id, NO_OPPONENT);
        assert_eq!(game.join("bob", handle()), Err(SessionError::CannotJoin));
    }

    #[test]
    fn projection_for_each_player() {
        let mut game = remote_match();
        game.place_stone("alice", Coord::new(4, 4)).unwrap();

        let alice = game.projection("alice").unwrap();
        assert_eq!(alice.player_color, Color::Black);
        assert!(!alice.player_turn);
        assert_eq!(alice.opponent_id, "bob");
        assert_eq!(alice.available_spaces.len(), 80);
        assert_eq!(alice.state, MatchState::Playing);

        let bob = game.projection("bob").unwrap();
        assert!(bob.player_turn);
        assert_eq!(bob.opponent_id, "alice");
        assert_eq!(bob.score, alice.score);

        assert_eq!(
            game.projection("mallory"),
            Err(SessionError::NotAParticipant)
        );
    }
}
