//! The turn cycle for one session: apply the human move, exchange text with
//! the external responder, apply its reply.
//!
//! The session is updated optimistically before the exchange and rolled back
//! (turn, last move, and board together) if the exchange fails or yields no
//! parseable move.

use chrono::Utc;

use game_core::board::MoveDescriptor;
use game_core::moves::{generate_move_string, parse_move_string};
use game_core::{Color, GameMove, Sound};

use crate::clients::responder::Responder;
use crate::error::AppError;
use crate::session::{prompts, GameSession};

/// Chance of a reminder clause riding along with a move instruction.
pub const REMINDER_CHANCE: f32 = 0.32;

/// Source of uniform samples in [0, 1). Injected so tests can force the
/// reminder branch either way.
pub trait RandomSource: Send + Sync {
    fn roll(&self) -> f32;
}

pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn roll(&self) -> f32 {
        rand::random()
    }
}

/// What one accepted human move produced.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    /// The opponent's move, absent when the game ended on the human's move
    /// or the reply did not parse.
    pub opponent_move: Option<GameMove>,
    /// Raw reply text, or a closing message when no exchange happened.
    pub message: String,
    pub ended: bool,
    pub sound: Sound,
}

/// Run one full turn: validate, apply the human move, exchange with the
/// responder, apply the reply. The caller must hold the session's lock.
pub async fn apply_human_move(
    session: &mut GameSession,
    user_move: GameMove,
    responder: &dyn Responder,
    random: &dyn RandomSource,
) -> Result<MoveOutcome, AppError> {
    if session.turn != Color::White {
        return Err(AppError::OutOfTurn);
    }

    // Optimistic update; everything below that fails must restore these.
    session.turn = Color::Black;
    session.last_move_date = Utc::now();
    let prev_last_move = session.last_move;
    session.last_move = Some(user_move);

    let play = match user_move {
        GameMove::Resign { .. } => {
            session.ended = true;
            tracing::info!("Session {}: human resigned", session.id);
            return Ok(MoveOutcome {
                opponent_move: None,
                message: prompts::RESIGN_MESSAGE.to_string(),
                ended: true,
                sound: Sound::End,
            });
        }
        GameMove::Play(play) => play,
    };

    let snapshot = session.board.snapshot();
    session
        .board
        .apply(&MoveDescriptor::from_play(&play, Color::White));

    if play.checkmate || play.self_checkmate || play.stalemate {
        session.ended = true;
        let message = if play.checkmate {
            prompts::CHECKMATE_MESSAGE
        } else if play.self_checkmate {
            prompts::SELF_CHECKMATE_MESSAGE
        } else {
            prompts::STALEMATE_MESSAGE
        };
        return Ok(MoveOutcome {
            opponent_move: None,
            message: message.to_string(),
            ended: true,
            sound: Sound::End,
        });
    }

    let mut prompt = generate_move_string(&user_move);
    if session.continuation.is_fresh() {
        prompt = format!("{}{}", prompts::OPENING_PROMPT, prompt);
    } else if random.roll() < REMINDER_CHANCE {
        prompt.push_str(prompts::REMINDER_PROMPT);
    }

    let reply = match responder.respond(&prompt, &session.continuation).await {
        Ok(reply) => reply,
        Err(err) => {
            session.turn = Color::White;
            session.last_move = prev_last_move;
            session.board.restore(snapshot);
            return Err(err.into());
        }
    };

    session.continuation = reply.continuation;

    let Some(opponent_move) = parse_move_string(&reply.text) else {
        // Soft outcome, not an error: the exchange went through but produced
        // no move, so the turn comes straight back to the human.
        tracing::warn!("Session {}: unparsable reply: {:?}", session.id, reply.text);
        session.turn = Color::White;
        session.last_move_date = Utc::now();
        session.last_move = prev_last_move;
        session.board.restore(snapshot);
        return Ok(MoveOutcome {
            opponent_move: None,
            message: reply.text,
            ended: false,
            sound: Sound::Error,
        });
    };

    let reply_play = match opponent_move {
        GameMove::Resign { .. } => {
            session.ended = true;
            tracing::info!("Session {}: opponent resigned", session.id);
            return Ok(MoveOutcome {
                opponent_move: Some(opponent_move),
                message: reply.text,
                ended: true,
                sound: Sound::End,
            });
        }
        GameMove::Play(play) => play,
    };

    let sound = session
        .board
        .apply(&MoveDescriptor::from_play(&reply_play, Color::Black));

    if reply_play.checkmate || reply_play.stalemate {
        session.ended = true;
        return Ok(MoveOutcome {
            opponent_move: Some(opponent_move),
            message: reply.text,
            ended: true,
            sound: Sound::End,
        });
    }

    session.turn = Color::White;
    session.last_move_date = Utc::now();
    session.last_move = Some(opponent_move);

    Ok(MoveOutcome {
        opponent_move: Some(opponent_move),
        message: reply.text,
        ended: false,
        sound,
    })
}
