// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group and liberty analysis
//!
//! Flood fills run over an explicit work list with a visited set, so a
//! search is bounded by the number of intersections whatever the shape.

use crate::board::Grid;
use crate::{Color, Coord};
use std::collections::BTreeSet;

/// Number of empty neighbors of `coord`
pub fn liberties(grid: &Grid, coord: Coord) -> usize {
    coord
        .neighbors(grid.size())
        .into_iter()
        .filter(|&n| grid.get(n).is_none())
        .count()
}

/// Liberties of `coord` if `occupied` were filled by a stone
///
/// Used to evaluate what a group keeps after a proposed placement without
/// touching the board.
pub fn liberties_with_occupied(grid: &Grid, coord: Coord, occupied: Coord) -> usize {
    coord
        .neighbors(grid.size())
        .into_iter()
        .filter(|&n| n != occupied && grid.get(n).is_none())
        .count()
}

/// Maximal connected set of cells holding `target`, starting from `start`
///
/// `target` may be `None` to collect a region of empty points. Returns an
/// empty set if `start` does not hold `target`.
pub fn connected_group(grid: &Grid, start: Coord, target: Option<Color>) -> BTreeSet<Coord> {
    if !start.is_valid(grid.size()) || grid.get(start) != target {
        return BTreeSet::new();
    }
    flood(grid, start, target)
}

/// The group `start` would belong to if it already held `color`
pub fn hypothetical_group(grid: &Grid, start: Coord, color: Color) -> BTreeSet<Coord> {
    if !start.is_valid(grid.size()) {
        return BTreeSet::new();
    }
    flood(grid, start, Some(color))
}

/// Distinct empty points adjacent to `group`, ignoring `excluding`
pub fn group_liberties(
    grid: &Grid,
    group: &BTreeSet<Coord>,
    excluding: Option<Coord>,
) -> BTreeSet<Coord> {
    let mut libs = BTreeSet::new();
    for &coord in group {
        for neighbor in coord.neighbors(grid.size()) {
            if Some(neighbor) == excluding || group.contains(&neighbor) {
                continue;
            }
            if grid.get(neighbor).is_none() {
                libs.insert(neighbor);
            }
        }
    }
    libs
}

/// Distinct colors of the stones bordering `region`
pub fn bordering_colors(grid: &Grid, region: &BTreeSet<Coord>) -> BTreeSet<Color> {
    region
        .iter()
        .flat_map(|c| c.neighbors(grid.size()))
        .filter_map(|n| grid.get(n))
        .collect()
}

/// Partition all empty points into maximal connected regions
///
/// Regions come out in the order their smallest coordinate is reached by a
/// `Coord`-order scan.
pub fn empty_regions(grid: &Grid) -> Vec<BTreeSet<Coord>> {
    let mut seen = BTreeSet::new();
    let mut regions = Vec::new();
    for coord in grid.coords() {
        if grid.get(coord).is_some() || seen.contains(&coord) {
            continue;
        }
        let region = flood(grid, coord, None);
        seen.extend(region.iter().copied());
        regions.push(region);
    }
    regions
}

/// Flood fill treating `start` as holding `target` regardless of its content
fn flood(grid: &Grid, start: Coord, target: Option<Color>) -> BTreeSet<Coord> {
    let mut group = BTreeSet::new();
    let mut stack = vec![start];

    while let Some(current) = stack.pop() {
        if !group.insert(current) {
            continue;
        }
        for neighbor in current.neighbors(grid.size()) {
            if grid.get(neighbor) == target && !group.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }

    group
}
