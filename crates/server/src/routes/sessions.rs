use std::str::FromStr;
use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use game_core::{CastleSide, Color, Coord, GameMove, PieceKind, PlayMove};

use crate::error::AppError;
use crate::routes::{SharedRandom, SharedResponder};
use crate::session::{protocol, SessionStore};

/// A move left unanswered this long hands the turn back to white.
const STALE_TURN_SECONDS: i64 = 30;

#[derive(Deserialize)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub game_move: RawMove,
}

/// Wire shape of a submitted move, validated into a [`GameMove`] at this
/// boundary so nothing downstream sees an unrecognized piece name.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawMove {
    Resign { resign: bool },
    Play(RawPlay),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlay {
    pub piece: String,
    pub from: RawCoord,
    pub to: RawCoord,
    pub capturing: Option<String>,
    pub promoting: Option<String>,
    pub castling: Option<CastleSide>,
    #[serde(default)]
    pub check: bool,
    #[serde(default)]
    pub checkmate: bool,
    #[serde(default)]
    pub self_checkmate: bool,
    #[serde(default)]
    pub stalemate: bool,
}

#[derive(Deserialize)]
pub struct RawCoord {
    pub x: i32,
    pub y: i32,
}

fn parse_coord(raw: &RawCoord) -> Result<Coord, AppError> {
    if !(0..8).contains(&raw.x) || !(0..8).contains(&raw.y) {
        return Err(AppError::BadRequest("Invalid move".into()));
    }
    Ok(Coord::new(raw.x, raw.y))
}

fn parse_piece(name: &str) -> Result<PieceKind, AppError> {
    PieceKind::from_str(name).map_err(|_| AppError::InvalidPiece)
}

fn validate_move(raw: RawMove) -> Result<GameMove, AppError> {
    match raw {
        RawMove::Resign { resign } => Ok(GameMove::Resign { resign }),
        RawMove::Play(raw) => {
            let mut play = PlayMove::new(
                parse_piece(&raw.piece)?,
                parse_coord(&raw.from)?,
                parse_coord(&raw.to)?,
            );
            play.capturing = raw.capturing.as_deref().map(parse_piece).transpose()?;
            play.promoting = raw.promoting.as_deref().map(parse_piece).transpose()?;
            play.castling = raw.castling;
            play.check = raw.check;
            play.checkmate = raw.checkmate;
            play.self_checkmate = raw.self_checkmate;
            play.stalemate = raw.stalemate;
            Ok(GameMove::Play(play))
        }
    }
}

/// POST /session/create
pub async fn create_session(
    Extension(store): Extension<Arc<SessionStore>>,
) -> Json<JsonValue> {
    let (id, session) = store.create().await;
    let session = session.lock().await.clone();
    Json(json!({ "id": id, "session": session }))
}

/// POST /session/{id}/move
pub async fn make_move(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(responder): Extension<SharedResponder>,
    Extension(random): Extension<SharedRandom>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let session = store.get(&id).await.ok_or(AppError::SessionNotFound)?;
    let mut session = session.lock().await;
    if session.ended {
        return Err(AppError::SessionNotFound);
    }

    if session.last_move_date < Utc::now() - Duration::seconds(STALE_TURN_SECONDS) {
        session.turn = Color::White;
    }

    let user_move = validate_move(req.game_move)?;
    let outcome = protocol::apply_human_move(
        &mut session,
        user_move,
        responder.as_ref(),
        random.as_ref(),
    )
    .await?;

    Ok(Json(json!({
        "turn": session.turn,
        "move": outcome.opponent_move,
        "date": session.last_move_date,
        "response": outcome.message,
        "board": session.board,
        "gameEnd": outcome.ended,
        "sound": outcome.sound,
    })))
}

/// POST /session/{id}/latestMove
pub async fn latest_move(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<SessionStore>>,
) -> Result<Json<JsonValue>, AppError> {
    let session = store.get(&id).await.ok_or(AppError::SessionNotFound)?;
    let session = session.lock().await;
    if session.ended {
        return Err(AppError::SessionNotFound);
    }

    Ok(Json(json!({
        "turn": session.turn,
        "move": session.last_move,
        "date": session.last_move_date,
        "board": session.board,
        "gameEnd": session.ended,
    })))
}
