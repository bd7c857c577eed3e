// SPDX-License-Identifier: MIT OR Apache-2.0

//! Territory classification and Ing counting
//!
//! Scoring runs on a copy of the current grid. White receives up to
//! [`KOMI_STONES`] compensation stones inside Black's territory, then each
//! side fills its own territory from a fixed stone bank. Whoever is left
//! holding the last liberties wins; otherwise the side with fewer stones
//! left in the bank does. Nothing here touches the board history.

use crate::board::Grid;
use crate::groups::{bordering_colors, empty_regions};
use crate::{Color, Coord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Compensation stones White places in Black's territory
pub const KOMI_STONES: usize = 4;

/// Stones each side may place over a whole game: `(size² − 1) / 2`
pub fn stone_allowance(size: u8) -> i32 {
    let cells = (size as i32) * (size as i32);
    (cells - 1) / 2
}

/// Empty regions grouped by owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Territories {
    /// Regions bordered only by Black
    pub black: Vec<BTreeSet<Coord>>,
    /// Regions bordered only by White
    pub white: Vec<BTreeSet<Coord>>,
    /// Dame: regions bordered by both colors, or by none
    pub neutral: Vec<BTreeSet<Coord>>,
}

impl Territories {
    /// Regions owned by `color`
    pub fn owned_by(&self, color: Color) -> &[BTreeSet<Coord>] {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    /// Total number of points owned by `color`
    pub fn points(&self, color: Color) -> usize {
        self.owned_by(color).iter().map(BTreeSet::len).sum()
    }
}

/// Classify every empty region by the colors bordering it
pub fn territories(grid: &Grid) -> Territories {
    let mut result = Territories::default();
    for region in empty_regions(grid) {
        let borders = bordering_colors(grid, &region);
        let mut owners = borders.iter();
        match (owners.next(), owners.next()) {
            (Some(Color::Black), None) => result.black.push(region),
            (Some(Color::White), None) => result.white.push(region),
            _ => result.neutral.push(region),
        }
    }
    result
}

/// Take up to [`KOMI_STONES`] points out of Black's territory for White
///
/// Points are taken region by region, coordinate by coordinate. Regions
/// emptied by the komi are dropped.
pub fn place_komi(mut territories: Territories) -> (Territories, Vec<Coord>) {
    let mut komi = Vec::with_capacity(KOMI_STONES);
    for region in territories.black.iter_mut() {
        while komi.len() < KOMI_STONES {
            match region.pop_first() {
                Some(coord) => komi.push(coord),
                None => break,
            }
        }
    }
    territories.black.retain(|region| !region.is_empty());
    (territories, komi)
}

/// Outcome of a count, before it is reduced to a winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngCount {
    /// Where White's compensation stones went
    pub komi: Vec<Coord>,
    /// Black's stone bank after filling
    pub black_remaining: i32,
    /// White's stone bank after filling
    pub white_remaining: i32,
    /// Points still empty after filling
    pub empty_points: Vec<Coord>,
    /// Colors bordering those empty points
    pub last_liberty_colors: BTreeSet<Color>,
}

impl IngCount {
    /// Winner of the count
    ///
    /// A single color bordering every remaining empty point claims the last
    /// liberty. Otherwise the side with the smaller bank wins, White on a tie.
    pub fn winner(&self) -> Color {
        if !self.empty_points.is_empty() && self.last_liberty_colors.len() == 1 {
            if let Some(&color) = self.last_liberty_colors.iter().next() {
                return color;
            }
        }
        if self.black_remaining < self.white_remaining {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Winning margin; the half point means a count can never be drawn
    pub fn point_difference(&self) -> f32 {
        let empty = self.empty_points.len() as f32;
        let rb = self.black_remaining as f32;
        let rw = self.white_remaining as f32;
        match self.winner() {
            Color::Black => empty - rb + rw - 0.5,
            Color::White => empty + rb - rw + 0.5,
        }
    }
}

/// Run the Ing count on a position
pub fn count(grid: &Grid) -> IngCount {
    let allowance = stone_allowance(grid.size());
    let (territories, komi) = place_komi(territories(grid));

    let mut filled = grid.clone();
    for &coord in &komi {
        filled.set(coord, Some(Color::White));
    }

    let mut black_remaining = allowance - filled.count(Color::Black) as i32;
    let mut white_remaining = allowance - filled.count(Color::White) as i32;

    for (color, bank) in [
        (Color::Black, &mut black_remaining),
        (Color::White, &mut white_remaining),
    ] {
        for region in territories.owned_by(color) {
            for &coord in region {
                if *bank <= 0 {
                    break;
                }
                filled.set(coord, Some(color));
                *bank -= 1;
            }
        }
    }

    let empty_points = filled.empty_coords();
    let last_liberty_colors = bordering_colors(&filled, &empty_points.iter().copied().collect());

    IngCount {
        komi,
        black_remaining,
        white_remaining,
        empty_points,
        last_liberty_colors,
    }
}

/// Winner and margin shown to the players
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreData {
    /// Winning color
    pub winner: Color,
    /// Margin of victory, always a half point
    pub point_difference: f32,
}

/// Score the position by Ing counting
pub fn score(grid: &Grid) -> ScoreData {
    let count = count(grid);
    ScoreData {
        winner: count.winner(),
        point_difference: count.point_difference(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowance_per_size() {
        assert_eq!(stone_allowance(9), 40);
        assert_eq!(stone_allowance(13), 84);
        assert_eq!(stone_allowance(19), 180);
    }

    #[test]
    fn komi_takes_at_most_four_points() {
        let mut territories = Territories::default();
        territories.black.push(BTreeSet::from([Coord::new(0, 0), Coord::new(0, 1)]));
        territories
            .black
            .push(BTreeSet::from([Coord::new(5, 5), Coord::new(5, 6), Coord::new(6, 5)]));

        let (rest, komi) = place_komi(territories);
        assert_eq!(
            komi,
            vec![
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(5, 5),
                Coord::new(5, 6)
            ]
        );
        assert_eq!(rest.black, vec![BTreeSet::from([Coord::new(6, 5)])]);
    }

    #[test]
    fn komi_with_no_black_territory() {
        let (rest, komi) = place_komi(Territories::default());
        assert!(komi.is_empty());
        assert_eq!(rest, Territories::default());
    }

    #[test]
    fn white_wins_ties() {
        let count = IngCount {
            komi: vec![],
            black_remaining: 3,
            white_remaining: 3,
            empty_points: vec![],
            last_liberty_colors: BTreeSet::new(),
        };
        assert_eq!(count.winner(), Color::White);
        assert_eq!(count.point_difference(), 0.5);
    }
}
