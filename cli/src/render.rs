// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII board rendering for the CLI.

use ingo_core::{Color, Coord, Grid, ScoreData};
use ingo_network::{MatchInfo, MatchState};

/// Render a grid as ASCII art, row 1 at the top
pub fn render_grid(grid: &Grid) -> String {
    let size = grid.size();
    let mut output = String::new();

    push_column_labels(&mut output, size);
    for row in 0..size {
        output.push_str(&format!("{:2} ", row + 1));
        for col in 0..size {
            let coord = Coord::new(col, row);
            let symbol = match grid.get(coord) {
                Some(Color::Black) => '●',
                Some(Color::White) => '○',
                None if is_star_point(coord, size) => '*',
                None => '+',
            };
            output.push(' ');
            output.push(symbol);
        }
        output.push_str(&format!(" {}\n", row + 1));
    }
    push_column_labels(&mut output, size);

    output
}

/// Render everything a player sees about a match
pub fn render_match(game_id: &str, info: &MatchInfo) -> String {
    let mut grid = Grid::new(info.size);
    for (color, stones) in [
        (Color::Black, &info.stones.black),
        (Color::White, &info.stones.white),
    ] {
        for &c in stones {
            grid.set(c, Some(color));
        }
    }

    let mut output = format!(
        "Match {} ({}x{}) - {} - ply {}\n",
        game_id, info.size, info.size, info.state, info.ply_count
    );
    output.push('\n');
    output.push_str(&render_grid(&grid));
    output.push('\n');

    match info.state {
        MatchState::Playing => output.push_str(&format!(
            "{} to move, {} legal points\n",
            info.player_color,
            info.available_spaces.len()
        )),
        MatchState::WaitingForOpponent => output.push_str("Waiting for an opponent\n"),
        MatchState::GameOverPassed | MatchState::GameOverForfeit => {
            output.push_str(&format!("Game over. {}\n", describe_score(&info.score)))
        }
    }
    output
}

/// One-line description of a score, e.g. `BLACK wins by 3.5`
pub fn describe_score(score: &ScoreData) -> String {
    format!("{} wins by {}", score.winner, score.point_difference)
}

/// Column letter for an index, skipping `I`
pub fn column_char(col: u8) -> char {
    if col < 8 {
        (b'A' + col) as char
    } else {
        (b'A' + col + 1) as char
    }
}

fn push_column_labels(output: &mut String, size: u8) {
    output.push_str("   ");
    for col in 0..size {
        output.push(' ');
        output.push(column_char(col));
    }
    output.push('\n');
}

/// Check if a coordinate is a star point on the board
fn is_star_point(coord: Coord, board_size: u8) -> bool {
    let (x, y) = (coord.x, coord.y);

    match board_size {
        9 => matches!((x, y), (2, 2) | (2, 6) | (4, 4) | (6, 2) | (6, 6)),
        13 => matches!((x, y), (3, 3) | (3, 9) | (6, 6) | (9, 3) | (9, 9)),
        19 => {
            let star = |v: u8| matches!(v, 3 | 9 | 15);
            star(x) && star(y)
        }
        _ => false,
    }
}
