// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game rules and validation logic

use crate::board::{Grid, Placement};
use crate::groups::{connected_group, group_liberties, hypothetical_group};
use crate::{Color, Coord, GameError};
use std::collections::BTreeSet;

/// Validates moves against the current position
pub struct RuleValidator<'a> {
    /// The position being played on
    board: &'a Grid,
    /// Position before the opponent's last move, for the ko rule
    previous_board: &'a Grid,
}

impl<'a> RuleValidator<'a> {
    /// Create a new rules validator
    pub fn new(board: &'a Grid, previous_board: &'a Grid) -> Self {
        Self {
            board,
            previous_board,
        }
    }

    /// Check if a move is valid and work out what it captures
    ///
    /// Returns the placement event the move would append. Nothing is mutated.
    pub fn check_move(&self, coord: Coord, color: Color) -> Result<Placement, GameError> {
        if !coord.is_valid(self.board.size()) {
            return Err(GameError::InvalidCoordinate);
        }

        if self.board.get(coord).is_some() {
            return Err(GameError::OccupiedPosition);
        }

        let captured = self.find_captures(coord, color);

        if !captured.is_empty() {
            if self.recreates_previous(coord, color, &captured) {
                tracing::debug!("Ko violation detected at {:?}", coord);
                return Err(GameError::KoViolation);
            }
            return Ok(Placement::new(coord, color).with_captures(captured));
        }

        let group = hypothetical_group(self.board, coord, color);
        if group_liberties(self.board, &group, Some(coord)).is_empty() {
            return Err(GameError::SelfCapture);
        }

        Ok(Placement::new(coord, color))
    }

    /// Opponent stones that would be left without liberties once `color` occupies `coord`
    pub fn find_captures(&self, coord: Coord, color: Color) -> BTreeSet<Coord> {
        let opponent = color.opposite();
        let mut captures = BTreeSet::new();

        for neighbor in coord.neighbors(self.board.size()) {
            if self.board.get(neighbor) != Some(opponent) || captures.contains(&neighbor) {
                continue;
            }
            let group = connected_group(self.board, neighbor, Some(opponent));
            if group_liberties(self.board, &group, Some(coord)).is_empty() {
                captures.extend(group);
            }
        }

        captures
    }

    /// Whether playing the capture would restore the position before the opponent's last move
    fn recreates_previous(&self, coord: Coord, color: Color, captured: &BTreeSet<Coord>) -> bool {
        let mut after_capture = self.board.clone();
        after_capture.set(coord, Some(color));
        for &c in captured {
            after_capture.set(c, None);
        }
        after_capture == *self.previous_board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn occupied_and_off_board() {
        let mut board = Board::new(9);
        board.play(Coord::new(4, 4), Color::Black).unwrap();
        let validator = RuleValidator::new(board.current_grid(), board.previous_grid());

        assert_eq!(
            validator.check_move(Coord::new(4, 4), Color::White),
            Err(GameError::OccupiedPosition)
        );
        assert_eq!(
            validator.check_move(Coord::new(9, 0), Color::White),
            Err(GameError::InvalidCoordinate)
        );
    }

    #[test]
    fn capturing_into_an_eye_is_not_suicide() {
        let mut board = Board::new(9);
        board.play(Coord::new(0, 0), Color::White).unwrap();
        board.play(Coord::new(1, 0), Color::Black).unwrap();
        let validator = RuleValidator::new(board.current_grid(), board.previous_grid());

        let placement = validator.check_move(Coord::new(0, 1), Color::Black).unwrap();
        assert_eq!(placement.captured, BTreeSet::from([Coord::new(0, 0)]));
    }
}
