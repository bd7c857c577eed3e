// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingo Core - Board State, Rules and Ing Counting
//!
//! This crate provides the game engine behind a networked Go match:
//! - Coordinates and 4-directional adjacency
//! - A board derived from an append-only log of placement events
//! - Group and liberty analysis by flood fill
//! - Move legality (suicide, capture, simple ko)
//! - Territory classification and scoring by the Ing counting method

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod groups;
pub mod rules;
pub mod scoring;

pub use board::{Board, Grid, Placement};
pub use rules::RuleValidator;
pub use scoring::{score, ScoreData};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Board sizes a match may be created with.
pub const ACCEPTED_SIZES: [u8; 3] = [9, 13, 19];

/// Check that `size` is one of the standard board sizes.
pub fn validate_board_size(size: u8) -> Result<u8, GameError> {
    if ACCEPTED_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(GameError::InvalidBoardSize(size))
    }
}

/// Player color in a Go game (Black or White)
///
/// An empty intersection is represented as `None` wherever a cell is
/// stored as `Option<Color>`; empty is never a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    /// Black player (moves first)
    Black,
    /// White player
    White,
}

impl Color {
    /// Returns the opposite color
    pub fn opposite(&self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => write!(f, "BLACK"),
            Color::White => write!(f, "WHITE"),
        }
    }
}

/// Board coordinate representing an intersection
///
/// Coordinates order lexicographically by `(x, y)`. Every place that walks a
/// set of coordinates relies on that order being the traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column)
    #[serde(rename = "X", alias = "x")]
    pub x: u8,
    /// Y coordinate (row)
    #[serde(rename = "Y", alias = "y")]
    pub y: u8,
}

impl Coord {
    /// Create a new coordinate
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Check if coordinate is on a board of the given size
    pub fn is_valid(&self, board_size: u8) -> bool {
        self.x < board_size && self.y < board_size
    }

    /// On-board neighbors in west, east, north, south order.
    pub fn neighbors(&self, board_size: u8) -> Vec<Coord> {
        let mut neighbors = Vec::with_capacity(4);

        if self.x > 0 {
            neighbors.push(Coord::new(self.x - 1, self.y));
        }
        if self.x + 1 < board_size {
            neighbors.push(Coord::new(self.x + 1, self.y));
        }
        if self.y > 0 {
            neighbors.push(Coord::new(self.x, self.y - 1));
        }
        if self.y + 1 < board_size {
            neighbors.push(Coord::new(self.x, self.y + 1));
        }

        neighbors
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

/// Errors that can occur during game play
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The coordinate is outside the board
    #[error("Invalid coordinate")]
    InvalidCoordinate,

    /// The position is already occupied
    #[error("Position already occupied")]
    OccupiedPosition,

    /// The move recreates the position before the opponent's last move
    #[error("Move violates ko rule")]
    KoViolation,

    /// The move would leave its own group without liberties
    #[error("Move would result in self-capture")]
    SelfCapture,

    /// Board size is not one of 9, 13 or 19
    #[error("Unsupported board size {0}")]
    InvalidBoardSize(u8),

    /// Replaying the event log produced an impossible grid
    #[error("Corrupt board history: {0}")]
    CorruptHistory(String),
}
