// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation: an append-only log of placement events
//!
//! The event log is the source of truth. The current grid and the grid one
//! ply back are kept materialised and refreshed only by [`Board::apply`],
//! which is what lets the ko check see "the position before the opponent's
//! last move" without an undo mechanism.

use crate::rules::RuleValidator;
use crate::{Color, Coord, GameError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Materialised occupancy of every intersection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    /// Size of the board (9, 13 or 19)
    size: u8,
    /// Positions on the board, `None` for empty
    positions: Vec<Option<Color>>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(size: u8) -> Self {
        let cells = (size as usize) * (size as usize);
        Self {
            size,
            positions: vec![None; cells],
        }
    }

    /// Get the size of the board
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Get the stone at the specified coordinate (`None` if empty or off board)
    pub fn get(&self, coord: Coord) -> Option<Color> {
        if !coord.is_valid(self.size) {
            return None;
        }
        self.positions[self.coord_to_index(coord)]
    }

    /// Overwrite a cell. Off-board coordinates are ignored.
    pub fn set(&mut self, coord: Coord, value: Option<Color>) {
        if coord.is_valid(self.size) {
            let idx = self.coord_to_index(coord);
            self.positions[idx] = value;
        }
    }

    /// Every coordinate of the board in `Coord` order
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let size = self.size;
        (0..size).flat_map(move |x| (0..size).map(move |y| Coord::new(x, y)))
    }

    /// Coordinates occupied by `color`, in `Coord` order
    pub fn stones(&self, color: Color) -> Vec<Coord> {
        self.coords().filter(|c| self.get(*c) == Some(color)).collect()
    }

    /// Empty coordinates, in `Coord` order
    pub fn empty_coords(&self) -> Vec<Coord> {
        self.coords().filter(|c| self.get(*c).is_none()).collect()
    }

    /// Count stones of one color
    pub fn count(&self, color: Color) -> usize {
        self.positions.iter().filter(|p| **p == Some(color)).count()
    }

    /// Apply one event, refusing anything that would make the grid impossible
    ///
    /// The grid is left untouched on error.
    pub fn apply(&mut self, event: &Placement) -> Result<(), GameError> {
        if !event.coord.is_valid(self.size) {
            return Err(GameError::CorruptHistory(format!(
                "stone at {} is off a {}x{} board",
                event.coord, self.size, self.size
            )));
        }
        if self.get(event.coord).is_some() {
            return Err(GameError::CorruptHistory(format!(
                "stone at {} placed on an occupied point",
                event.coord
            )));
        }
        for &removed in &event.captured {
            if removed == event.coord || self.get(removed).is_none() {
                return Err(GameError::CorruptHistory(format!(
                    "removal of {} which holds no stone",
                    removed
                )));
            }
        }

        self.set(event.coord, Some(event.color));
        for &removed in &event.captured {
            self.set(removed, None);
        }
        Ok(())
    }

    fn coord_to_index(&self, coord: Coord) -> usize {
        (coord.y as usize) * (self.size as usize) + (coord.x as usize)
    }
}

/// Net effect of one legal move: one stone added, captured stones removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Where the stone was placed
    pub coord: Coord,
    /// Color of the placed stone
    pub color: Color,
    /// Opponent stones removed by the capture
    pub captured: BTreeSet<Coord>,
}

impl Placement {
    /// A placement that captures nothing
    pub fn new(coord: Coord, color: Color) -> Self {
        Self {
            coord,
            color,
            captured: BTreeSet::new(),
        }
    }

    /// Attach the set of captured stones
    pub fn with_captures(mut self, captured: BTreeSet<Coord>) -> Self {
        self.captured = captured;
        self
    }
}

/// A Go board backed by its placement history
#[derive(Debug, Clone)]
pub struct Board {
    size: u8,
    history: Vec<Placement>,
    current: Grid,
    previous: Grid,
}

impl Board {
    /// Create a new empty board with the specified size
    pub fn new(size: u8) -> Self {
        Self {
            size,
            history: Vec::new(),
            current: Grid::new(size),
            previous: Grid::new(size),
        }
    }

    /// Get the size of the board
    pub fn size(&self) -> u8 {
        self.size
    }

    /// The full event log, oldest first
    pub fn history(&self) -> &[Placement] {
        &self.history
    }

    /// Grid obtained by replaying the whole history
    pub fn current_grid(&self) -> &Grid {
        &self.current
    }

    /// Grid obtained by replaying the history without its last event
    ///
    /// Equal to the empty grid while the history is empty.
    pub fn previous_grid(&self) -> &Grid {
        &self.previous
    }

    /// Get the stone at the specified coordinate
    pub fn color_at(&self, coord: Coord) -> Option<Color> {
        self.current.get(coord)
    }

    /// Coordinates occupied by `color`
    pub fn stones(&self, color: Color) -> Vec<Coord> {
        self.current.stones(color)
    }

    /// Replay the first `len` events onto an empty grid
    pub fn replay(&self, len: usize) -> Result<Grid, GameError> {
        let mut grid = Grid::new(self.size);
        for event in self.history.iter().take(len) {
            grid.apply(event)?;
        }
        Ok(grid)
    }

    /// Replay every prefix of the history and check it against the cached grids
    pub fn verify_history(&self) -> Result<(), GameError> {
        let replayed = self.replay(self.history.len())?;
        if replayed != self.current {
            return Err(GameError::CorruptHistory(
                "cached grid diverged from history".to_string(),
            ));
        }
        let previous = self.replay(self.history.len().saturating_sub(1))?;
        if previous != self.previous {
            return Err(GameError::CorruptHistory(
                "cached previous grid diverged from history".to_string(),
            ));
        }
        Ok(())
    }

    /// Append an event to the history
    ///
    /// This is the only mutator and performs no legality checking; it only
    /// refuses events that cannot be replayed onto the current grid.
    pub fn apply(&mut self, event: Placement) -> Result<(), GameError> {
        let mut next = self.current.clone();
        next.apply(&event)?;
        self.previous = std::mem::replace(&mut self.current, next);
        self.history.push(event);
        Ok(())
    }

    /// Check and play a move, capturing any opponent groups left without liberties
    ///
    /// On error the board is unchanged.
    pub fn play(&mut self, coord: Coord, color: Color) -> Result<Placement, GameError> {
        let placement =
            RuleValidator::new(&self.current, &self.previous).check_move(coord, color)?;
        self.apply(placement.clone())?;
        Ok(placement)
    }

    /// Every empty coordinate where `color` may legally play, in `Coord` order
    pub fn available_spaces(&self, color: Color) -> Vec<Coord> {
        let validator = RuleValidator::new(&self.current, &self.previous);
        self.current
            .empty_coords()
            .into_iter()
            .filter(|&c| validator.check_move(c, color).is_ok())
            .collect()
    }
}
