// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingo CLI - play a local match of Go in the terminal
//!
//! Every command is turned into a protocol request and routed through the
//! same dispatcher a network transport would use.

mod render;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use ingo_core::{Coord, ACCEPTED_SIZES};
use ingo_network::config::{self, ServerConfig};
use ingo_network::protocol::{CreateGameRequest, GameRequest, PlaceStoneRequest};
use ingo_network::{Dispatcher, MatchInfo, MatchRegistry, PeerHandle, Request, Response};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(name = "ingo-cli", about = "Play Go with Ing counting in the terminal", version)]
struct Args {
    /// Board size (9, 13, or 19); defaults to the configured size
    #[clap(short, long)]
    size: Option<u8>,

    /// Path to a config file instead of the per-user default
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Player name used for the match
    #[clap(short, long, default_value = "local")]
    player: String,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

/// The terminal is the only client; refresh signals have nowhere to go
#[derive(Debug)]
struct Terminal;

impl PeerHandle for Terminal {
    fn notify_refresh(&self) -> Result<()> {
        tracing::debug!("Refresh signal for the terminal");
        Ok(())
    }
}

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Place(Coord),
    Pass,
    Leave,
    Show,
    Help,
    /// A raw JSON request, passed straight to the dispatcher
    Raw(String),
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&config, args.debug);

    let size = args.size.unwrap_or(config.default_board_size);
    if !ACCEPTED_SIZES.contains(&size) {
        bail!("Invalid board size {}. Must be 9, 13, or 19.", size);
    }

    let registry = Arc::new(MatchRegistry::with_config(&config));
    let dispatcher = Dispatcher::new(registry);
    let handle: Arc<dyn PeerHandle> = Arc::new(Terminal);

    let created = dispatcher.handle(
        handle.clone(),
        Request::CreateGameLocal(CreateGameRequest {
            user_id: args.player.clone(),
            size: i64::from(size),
        }),
    );
    let game_id = match created {
        Response::GameJoined { game_id } => game_id,
        other => bail!("Could not create a match: {:?}", other),
    };
    tracing::info!(%game_id, size, "Local match started");

    run_game_loop(&dispatcher, handle, &args.player, &game_id).await
}

fn init_tracing(config: &ServerConfig, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_game_loop(
    dispatcher: &Dispatcher,
    handle: Arc<dyn PeerHandle>,
    player: &str,
    game_id: &str,
) -> Result<()> {
    let mut info = fetch_info(dispatcher, &handle, player, game_id)?;
    println!("{}", render::render_match(game_id, &info));

    let mut stdin_lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("Enter a move (e.g. 'D4'), 'pass', 'leave', 'show', 'help' or 'quit':");

        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, shutting down...");
                break;
            }

            result = stdin_lines.next_line() => {
                let line = match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break, // EOF
                    Err(e) => {
                        eprintln!("Error reading input: {}", e);
                        continue;
                    }
                };

                let command = match parse_command(&line, info.size) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };

                let request = match command {
                    Command::Quit => break,
                    Command::Help => {
                        print_help();
                        continue;
                    }
                    Command::Show => {
                        println!("{}", render::render_match(game_id, &info));
                        continue;
                    }
                    Command::Raw(raw) => {
                        let response = dispatcher.handle_json(handle.clone(), &raw);
                        println!("{}", response.to_json()?);
                        info = fetch_info(dispatcher, &handle, player, game_id)?;
                        continue;
                    }
                    Command::Place(coord) => Request::PlaceStone(PlaceStoneRequest {
                        user_id: player.to_string(),
                        game_id: game_id.to_string(),
                        coord: coord.into(),
                    }),
                    Command::Pass => Request::Pass(game_request(player, game_id)),
                    Command::Leave => Request::LeaveGameRemote(game_request(player, game_id)),
                };

                if let Response::Error(err) = dispatcher.handle(handle.clone(), request) {
                    eprintln!("{}", err.message.unwrap_or_else(|| "Request failed".to_string()));
                    continue;
                }

                info = fetch_info(dispatcher, &handle, player, game_id)?;
                println!("{}", render::render_match(game_id, &info));

                if info.state.is_over() {
                    break;
                }
            }
        }
    }

    println!("Final count: {}", render::describe_score(&info.score));
    Ok(())
}

fn game_request(player: &str, game_id: &str) -> GameRequest {
    GameRequest {
        user_id: player.to_string(),
        game_id: game_id.to_string(),
    }
}

fn fetch_info(
    dispatcher: &Dispatcher,
    handle: &Arc<dyn PeerHandle>,
    player: &str,
    game_id: &str,
) -> Result<MatchInfo> {
    match dispatcher.handle(
        handle.clone(),
        Request::GetGameInfo(game_request(player, game_id)),
    ) {
        Response::GameInfo(info) => Ok(info),
        other => Err(anyhow!("Could not fetch match {}: {:?}", game_id, other)),
    }
}

fn print_help() {
    println!("  D4     place a stone (columns A-T without I, rows from 1)");
    println!("  pass   pass the turn; two passes in a row end the match");
    println!("  leave  forfeit the match");
    println!("  show   redraw the board");
    println!("  {{...}}  send a raw JSON request");
    println!("  quit   exit without ending the match");
}

/// Parse one line of input
fn parse_command(input: &str, board_size: u8) -> Result<Command> {
    let input = input.trim();
    if input.starts_with('{') {
        return Ok(Command::Raw(input.to_string()));
    }

    match input.to_lowercase().as_str() {
        "pass" => return Ok(Command::Pass),
        "leave" | "resign" => return Ok(Command::Leave),
        "show" | "" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    parse_coord(input, board_size).map(Command::Place)
}

/// Parse a point like `D4`
fn parse_coord(input: &str, board_size: u8) -> Result<Coord> {
    let mut chars = input.chars();
    let col_char = chars
        .next()
        .ok_or_else(|| anyhow!("Empty move"))?
        .to_ascii_lowercase();
    let row_str = chars.as_str();

    let col = match col_char {
        'a'..='h' => col_char as u8 - b'a',
        'j'..='t' => col_char as u8 - b'a' - 1,
        _ => bail!("Invalid column. Must be A-T (excluding I)."),
    };

    let row = match row_str.parse::<u8>() {
        Ok(r) if r > 0 && r <= board_size => r - 1,
        _ => bail!("Invalid row. Must be between 1 and {}.", board_size),
    };

    if col >= board_size {
        bail!("Column {} is off a {}x{} board.", col_char.to_ascii_uppercase(), board_size, board_size);
    }
    Ok(Coord::new(col, row))
}
