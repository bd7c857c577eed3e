// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of live matches
//!
//! The registry is an explicit object owned by whoever runs the transport.
//! Each match sits behind its own mutex; the map lock is only held long
//! enough to insert a finished match or clone an `Arc` out of the table.
//! Refresh signals go out after the match lock is released.

use crate::config::ServerConfig;
use crate::error::SessionError;
use crate::session::{Match, MatchInfo, MatchMode};
use crate::{MatchId, PeerHandle};
use ingo_core::{validate_board_size, Coord, Placement};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// Characters match ids are drawn from
pub const ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";

/// Default length of a match id
pub const DEFAULT_ID_LENGTH: usize = 6;

/// Shortest match id a config may ask for
pub const MIN_ID_LENGTH: usize = 4;

/// Random draws tried before giving up on finding a free id
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Shared handle to one match
pub type SharedMatch = Arc<Mutex<Match>>;

/// All matches alive in this process
pub struct MatchRegistry {
    matches: RwLock<HashMap<MatchId, SharedMatch>>,
    id_length: usize,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            id_length: DEFAULT_ID_LENGTH,
        }
    }

    /// Create an empty registry using the configured id length
    pub fn with_config(config: &ServerConfig) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            id_length: config.match_id_length.max(1),
        }
    }

    /// Number of live matches
    pub fn len(&self) -> usize {
        self.matches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.read().is_empty()
    }

    /// Create a match and seat its first player
    #[tracing::instrument(level = "debug", skip(self, handle))]
    pub fn create_match(
        &self,
        mode: MatchMode,
        player: &str,
        size: u8,
        handle: Arc<dyn PeerHandle>,
    ) -> Result<MatchId, SessionError> {
        if player.is_empty() {
            return Err(SessionError::Malformed("missing player id".to_string()));
        }
        let size = validate_board_size(size).map_err(|e| SessionError::Malformed(e.to_string()))?;

        let mut matches = self.matches.write();
        let id = (0..MAX_ID_ATTEMPTS)
            .map(|_| self.generate_id())
            .find(|candidate| !matches.contains_key(candidate))
            .ok_or_else(|| {
                tracing::warn!(
                    live = matches.len(),
                    "No free match id after {} attempts",
                    MAX_ID_ATTEMPTS
                );
                SessionError::NoFreeMatchId
            })?;
        let game = Match::new(id.clone(), mode, player.to_string(), size, handle);
        matches.insert(id.clone(), Arc::new(Mutex::new(game)));

        tracing::info!(match_id = %id, player, size, ?mode, "Match created");
        Ok(id)
    }

    /// Look up a match by id
    pub fn get(&self, match_id: &str) -> Result<SharedMatch, SessionError> {
        self.matches
            .read()
            .get(match_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownMatch(match_id.to_string()))
    }

    /// Take the free seat of a remote match
    #[tracing::instrument(level = "debug", skip(self, handle))]
    pub fn join_match(
        &self,
        match_id: &str,
        player: &str,
        handle: Arc<dyn PeerHandle>,
    ) -> Result<(), SessionError> {
        self.mutate(match_id, player, |game| game.join(player, handle))
    }

    /// Re-attach a connection to an existing seat
    #[tracing::instrument(level = "debug", skip(self, handle))]
    pub fn rejoin_match(
        &self,
        match_id: &str,
        player: &str,
        handle: Arc<dyn PeerHandle>,
    ) -> Result<(), SessionError> {
        self.mutate(match_id, player, |game| game.rejoin(player, handle))
    }

    /// Rejoin an existing seat, or take the free one, under a single lock
    #[tracing::instrument(level = "debug", skip(self, handle))]
    pub fn join_or_rejoin_match(
        &self,
        match_id: &str,
        player: &str,
        handle: Arc<dyn PeerHandle>,
    ) -> Result<(), SessionError> {
        self.mutate(match_id, player, |game| game.join_or_rejoin(player, handle))
    }

    /// Play a stone
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn place_stone(
        &self,
        match_id: &str,
        player: &str,
        coord: Coord,
    ) -> Result<Placement, SessionError> {
        self.mutate(match_id, player, |game| game.place_stone(player, coord))
    }

    /// Pass the turn
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn pass(&self, match_id: &str, player: &str) -> Result<(), SessionError> {
        self.mutate(match_id, player, |game| game.pass(player))
    }

    /// Leave a match, forfeiting it
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn leave_match(&self, match_id: &str, player: &str) -> Result<(), SessionError> {
        self.mutate(match_id, player, |game| game.forfeit(player))
    }

    /// Read-only view of a match for one player
    pub fn match_info(&self, match_id: &str, player: &str) -> Result<MatchInfo, SessionError> {
        let game = self.get(match_id)?;
        let guard = game.lock();
        guard.projection(player)
    }

    /// Run one operation under the match lock, then signal the other participant
    fn mutate<T>(
        &self,
        match_id: &str,
        player: &str,
        op: impl FnOnce(&mut Match) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let game = self.get(match_id)?;
        let (result, target) = {
            let mut guard = game.lock();
            let result = op(&mut *guard)?;
            (result, guard.notify_target(player))
        };

        if let Some(handle) = target {
            tracing::debug!(match_id, player, "Telling other player to refresh");
            if let Err(e) = handle.notify_refresh() {
                tracing::warn!(match_id, error = %e, "Failed to deliver refresh signal");
            }
        }
        Ok(result)
    }

    fn generate_id(&self) -> MatchId {
        let mut rng = rand::thread_rng();
        (0..self.id_length)
            .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
            .collect()
    }
}
