// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors reported by sessions and the registry

use crate::session::MatchState;
use ingo_core::GameError;
use thiserror::Error;

/// Why a session operation was refused
///
/// Malformed requests, lookup failures and illegal moves are kept apart so
/// the boundary can answer each differently.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// Missing identity, unsupported size, negative coordinate
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// No match with this id
    #[error("Unknown match {0}")]
    UnknownMatch(String),

    /// Every id tried was already taken
    #[error("No free match id available")]
    NoFreeMatchId,

    /// The player has no seat in the match
    #[error("Player is not part of this match")]
    NotAParticipant,

    /// The match is full, already started, or the player already has a seat
    #[error("Cannot join this match")]
    CannotJoin,

    /// The match is not accepting moves
    #[error("Match is not active ({0})")]
    MatchNotActive(MatchState),

    /// The other color is to move
    #[error("Not this player's turn")]
    NotYourTurn,

    /// The rules engine rejected the placement
    #[error("Illegal move: {0}")]
    IllegalMove(#[from] GameError),
}

impl SessionError {
    /// Whether this is a lookup failure rather than a rejected action
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, SessionError::UnknownMatch(_) | SessionError::NotAParticipant)
    }
}
