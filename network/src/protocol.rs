// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON messages exchanged with clients, and the dispatcher that routes them
//!
//! Every message is an envelope `{"name": ..., "data": ...}`. Payload fields
//! use the PascalCase names existing clients send and decode; snake_case
//! spellings are accepted on the way in. Requests are validated here and
//! anything malformed is answered with a `400` error without reaching the
//! registry.

use crate::error::SessionError;
use crate::registry::MatchRegistry;
use crate::session::{MatchInfo, MatchMode};
use crate::{MatchId, PeerHandle, PlayerId};
use ingo_core::{Coord, ACCEPTED_SIZES};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// Message returned for any request that fails validation
pub const INVALID_REQUEST: &str = "Invalid request format";

/// Payload of the two create requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default, rename = "UserID", alias = "user_id", alias = "userId")]
    pub user_id: PlayerId,
    #[serde(default, rename = "Size", alias = "size")]
    pub size: i64,
}

/// Payload naming a player and a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRequest {
    #[serde(default, rename = "UserID", alias = "user_id", alias = "userId")]
    pub user_id: PlayerId,
    #[serde(default, rename = "GameID", alias = "game_id", alias = "gameId")]
    pub game_id: MatchId,
}

/// Coordinate as sent by clients, before range checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCoord {
    #[serde(default, rename = "X", alias = "x")]
    pub x: i64,
    #[serde(default, rename = "Y", alias = "y")]
    pub y: i64,
}

impl WireCoord {
    /// Convert to a board coordinate; `None` if either component is negative
    ///
    /// Values past the widest board saturate, so the rules engine reports
    /// them as off the board.
    pub fn to_coord(self) -> Option<Coord> {
        if self.x < 0 || self.y < 0 {
            return None;
        }
        let clamp = |v: i64| u8::try_from(v).unwrap_or(u8::MAX);
        Some(Coord::new(clamp(self.x), clamp(self.y)))
    }
}

impl From<Coord> for WireCoord {
    fn from(c: Coord) -> Self {
        Self {
            x: i64::from(c.x),
            y: i64::from(c.y),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceStoneRequest {
    #[serde(default, rename = "UserID", alias = "user_id", alias = "userId")]
    pub user_id: PlayerId,
    #[serde(default, rename = "GameID", alias = "game_id", alias = "gameId")]
    pub game_id: MatchId,
    #[serde(default, rename = "Coord", alias = "coord")]
    pub coord: WireCoord,
}

/// Requests a client can send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "camelCase")]
pub enum Request {
    CreateGameLocal(CreateGameRequest),
    CreateGameRemote(CreateGameRequest),
    JoinGameRemote(GameRequest),
    LeaveGameRemote(GameRequest),
    GetGameInfo(GameRequest),
    PlaceStone(PlaceStoneRequest),
    Pass(GameRequest),
}

impl Request {
    /// Wire name of the request
    pub fn name(&self) -> &'static str {
        match self {
            Request::CreateGameLocal(_) => "createGameLocal",
            Request::CreateGameRemote(_) => "createGameRemote",
            Request::JoinGameRemote(_) => "joinGameRemote",
            Request::LeaveGameRemote(_) => "leaveGameRemote",
            Request::GetGameInfo(_) => "getGameInfo",
            Request::PlaceStone(_) => "placeStone",
            Request::Pass(_) => "pass",
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Error categories a client can tell apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Malformed request, or an action the match refused
    #[serde(rename = "400")]
    BadRequest,
    /// Neither rejoin nor join was possible
    #[serde(rename = "joinGame")]
    JoinGame,
    /// Unknown match, or the player is not in it
    #[serde(rename = "getGameInfo")]
    GetGameInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorData {
    #[serde(rename = "Type")]
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Replies sent back to the requesting client
///
/// Replies without a payload still carry `"data": null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    GameJoined { game_id: MatchId },
    GameLeft,
    GameInfo(MatchInfo),
    /// Refetch the match state
    Update,
    Error(ErrorData),
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    name: &'a str,
    data: T,
}

#[derive(Serialize)]
struct GameIdData<'a> {
    #[serde(rename = "GameID")]
    game_id: &'a str,
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Response::GameJoined { game_id } => Envelope {
                name: "gameJoined",
                data: GameIdData { game_id },
            }
            .serialize(serializer),
            Response::GameLeft => Envelope {
                name: "gameLeft",
                data: (),
            }
            .serialize(serializer),
            Response::GameInfo(info) => Envelope {
                name: "gameInfo",
                data: info,
            }
            .serialize(serializer),
            Response::Update => Envelope {
                name: "update",
                data: (),
            }
            .serialize(serializer),
            Response::Error(err) => Envelope {
                name: "error",
                data: err,
            }
            .serialize(serializer),
        }
    }
}

impl Response {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Response::Error(ErrorData {
            kind: ErrorKind::BadRequest,
            message: Some(message.into()),
        })
    }

    fn error(kind: ErrorKind) -> Self {
        Response::Error(ErrorData {
            kind,
            message: None,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Routes requests from any transport to the registry
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<MatchRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<MatchRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<MatchRegistry> {
        &self.registry
    }

    /// Parse a raw message and handle it
    pub fn handle_json(&self, handle: Arc<dyn PeerHandle>, raw: &str) -> Response {
        match Request::from_json(raw) {
            Ok(request) => self.handle(handle, request),
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse request");
                Response::bad_request(INVALID_REQUEST)
            }
        }
    }

    /// Handle one request on behalf of the connection behind `handle`
    pub fn handle(&self, handle: Arc<dyn PeerHandle>, request: Request) -> Response {
        tracing::info!(request = request.name(), "Request received");

        match request {
            Request::CreateGameLocal(req) => self.create(MatchMode::Local, req, handle),
            Request::CreateGameRemote(req) => self.create(MatchMode::Remote, req, handle),
            Request::JoinGameRemote(req) => self.join(req, handle),
            Request::LeaveGameRemote(req) => {
                self.act(req, "Unable to leave game", Response::GameLeft, |r, g, p| {
                    r.leave_match(g, p)
                })
            }
            Request::GetGameInfo(req) => {
                if !is_complete(&req) {
                    return Response::bad_request(INVALID_REQUEST);
                }
                match self.registry.match_info(&req.game_id, &req.user_id) {
                    Ok(info) => Response::GameInfo(info),
                    Err(e) => {
                        tracing::info!(game_id = %req.game_id, error = %e, "Unable to fetch game info");
                        Response::error(ErrorKind::GetGameInfo)
                    }
                }
            }
            Request::PlaceStone(req) => {
                let coord = match req.coord.to_coord() {
                    Some(c) if !req.user_id.is_empty() && !req.game_id.is_empty() => c,
                    _ => return Response::bad_request(INVALID_REQUEST),
                };
                let game = GameRequest {
                    user_id: req.user_id,
                    game_id: req.game_id,
                };
                self.act(game, "Unable to play move", Response::Update, |r, g, p| {
                    r.place_stone(g, p, coord).map(|_| ())
                })
            }
            Request::Pass(req) => {
                self.act(req, "Unable to pass turn", Response::Update, |r, g, p| {
                    r.pass(g, p)
                })
            }
        }
    }

    fn create(
        &self,
        mode: MatchMode,
        req: CreateGameRequest,
        handle: Arc<dyn PeerHandle>,
    ) -> Response {
        let size = match u8::try_from(req.size) {
            Ok(s) if ACCEPTED_SIZES.contains(&s) && !req.user_id.is_empty() => s,
            _ => return Response::bad_request(INVALID_REQUEST),
        };

        match self.registry.create_match(mode, &req.user_id, size, handle) {
            Ok(game_id) => {
                tracing::info!(player = %req.user_id, %game_id, "Player created game");
                Response::GameJoined { game_id }
            }
            Err(e) => Response::bad_request(e.to_string()),
        }
    }

    fn join(&self, req: GameRequest, handle: Arc<dyn PeerHandle>) -> Response {
        if !is_complete(&req) {
            return Response::bad_request(INVALID_REQUEST);
        }

        let joined = self
            .registry
            .join_or_rejoin_match(&req.game_id, &req.user_id, handle);

        match joined {
            Ok(()) => {
                tracing::info!(player = %req.user_id, game_id = %req.game_id, "Player joined game");
                Response::GameJoined {
                    game_id: req.game_id,
                }
            }
            Err(e) => {
                tracing::info!(player = %req.user_id, game_id = %req.game_id, error = %e, "Player could not join game");
                Response::error(ErrorKind::JoinGame)
            }
        }
    }

    fn act(
        &self,
        req: GameRequest,
        failure: &str,
        success: Response,
        op: impl FnOnce(&MatchRegistry, &str, &str) -> Result<(), SessionError>,
    ) -> Response {
        if !is_complete(&req) {
            return Response::bad_request(INVALID_REQUEST);
        }
        match op(&self.registry, &req.game_id, &req.user_id) {
            Ok(()) => success,
            Err(e) => {
                tracing::info!(player = %req.user_id, game_id = %req.game_id, error = %e, "{}", failure);
                Response::bad_request(failure)
            }
        }
    }
}

fn is_complete(req: &GameRequest) -> bool {
    !req.user_id.is_empty() && !req.game_id.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullHandle;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(MatchRegistry::new()))
    }

    #[test]
    fn test_request_envelope() {
        let req = Request::from_json(
            r#"{"name":"placeStone","data":{"user_id":"a","game_id":"g","coord":{"x":3,"y":4}}}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            Request::PlaceStone(PlaceStoneRequest {
                user_id: "a".into(),
                game_id: "g".into(),
                coord: WireCoord { x: 3, y: 4 },
            })
        );
    }

    #[test]
    fn test_pascal_case_fields_accepted() {
        let req =
            Request::from_json(r#"{"name":"createGameLocal","data":{"UserID":"a","Size":13}}"#)
                .unwrap();
        assert_eq!(
            req,
            Request::CreateGameLocal(CreateGameRequest {
                user_id: "a".into(),
                size: 13
            })
        );
    }

    #[test]
    fn test_response_shapes() {
        let joined = Response::GameJoined {
            game_id: "abc".into(),
        };
        assert_eq!(
            serde_json::to_value(&joined).unwrap(),
            json!({"name": "gameJoined", "data": {"GameID": "abc"}})
        );
        assert_eq!(
            serde_json::to_value(Response::bad_request("nope")).unwrap(),
            json!({"name": "error", "data": {"Type": "400", "Message": "nope"}})
        );
        assert_eq!(
            serde_json::to_value(Response::error(ErrorKind::JoinGame)).unwrap(),
            json!({"name": "error", "data": {"Type": "joinGame"}})
        );
        assert_eq!(
            serde_json::to_value(Response::Update).unwrap(),
            json!({"name": "update", "data": null})
        );
        assert_eq!(
            Response::GameLeft.to_json().unwrap(),
            r#"{"name":"gameLeft","data":null}"#
        );
    }

    #[test]
    fn test_requests_serialize_with_client_names() {
        let req = Request::PlaceStone(PlaceStoneRequest {
            user_id: "a".into(),
            game_id: "g".into(),
            coord: WireCoord { x: 3, y: 4 },
        });
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"name": "placeStone", "data": {"UserID": "a", "GameID": "g", "Coord": {"X": 3, "Y": 4}}})
        );
        assert_eq!(Request::from_json(&req.to_json().unwrap()).unwrap(), req);
    }

    #[test]
    fn test_wire_coord_conversion() {
        assert_eq!(WireCoord { x: 2, y: 5 }.to_coord(), Some(Coord::new(2, 5)));
        assert_eq!(WireCoord { x: -1, y: 5 }.to_coord(), None);
        assert_eq!(
            WireCoord { x: 4000, y: 0 }.to_coord(),
            Some(Coord::new(u8::MAX, 0))
        );
    }

    #[test]
    fn test_malformed_requests_never_reach_registry() {
        let d = dispatcher();
        let bad = [
            Request::CreateGameLocal(CreateGameRequest {
                user_id: "".into(),
                size: 9,
            }),
            Request::CreateGameRemote(CreateGameRequest {
                user_id: "a".into(),
                size: 10,
            }),
            Request::CreateGameRemote(CreateGameRequest {
                user_id: "a".into(),
                size: 265,
            }),
            Request::JoinGameRemote(GameRequest {
                user_id: "a".into(),
                game_id: "".into(),
            }),
        ];
        for req in bad {
            assert_eq!(
                d.handle(Arc::new(NullHandle), req),
                Response::bad_request(INVALID_REQUEST)
            );
        }
        assert!(d.registry().is_empty());
    }

    #[test]
    fn test_unparseable_json_is_bad_request() {
        let d = dispatcher();
        for raw in ["", "{}", r#"{"name":"dance"}"#, "[1,2]"] {
            assert_eq!(
                d.handle_json(Arc::new(NullHandle), raw),
                Response::bad_request(INVALID_REQUEST)
            );
        }
    }

    #[test]
    fn test_negative_coordinate_is_bad_request() {
        let d = dispatcher();
        let Response::GameJoined { game_id } = d.handle(
            Arc::new(NullHandle),
            Request::CreateGameLocal(CreateGameRequest {
                user_id: "a".into(),
                size: 9,
            }),
        ) else {
            panic!("expected gameJoined");
        };

        let resp = d.handle(
            Arc::new(NullHandle),
            Request::PlaceStone(PlaceStoneRequest {
                user_id: "a".into(),
                game_id,
                coord: WireCoord { x: 0, y: -3 },
            }),
        );
        assert_eq!(resp, Response::bad_request(INVALID_REQUEST));
    }
}
