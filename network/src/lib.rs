// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingo Network - match sessions and the request boundary
//!
//! This crate provides everything between a transport and the rules engine:
//! - Match sessions with turn order and the pass/forfeit state machine
//! - A registry of live matches, one lock per match
//! - The JSON request/response messages and their dispatcher
//! - Server configuration
//!
//! Sockets are not handled here. A transport hands in a [`PeerHandle`] per
//! connection and receives refresh signals through it.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod session;

pub use error::SessionError;
pub use protocol::{Dispatcher, Request, Response};
pub use registry::MatchRegistry;
pub use session::{Match, MatchInfo, MatchMode, MatchState};

// Type aliases
pub type MatchId = String;
pub type PlayerId = String;

/// Transport-side handle for one connected player
///
/// The only thing the session layer ever asks of a transport is to tell the
/// player to refetch the match state.
pub trait PeerHandle: Send + Sync + std::fmt::Debug {
    /// Deliver an opaque "refresh" signal to the player
    fn notify_refresh(&self) -> anyhow::Result<()>;
}

/// Handle that drops every signal, for players without a live connection
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHandle;

impl PeerHandle for NullHandle {
    fn notify_refresh(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
