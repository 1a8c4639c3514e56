use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use game_core::{Coord, GameMove, PieceKind, PlayMove};
use server::clients::responder::{Continuation, Responder, ResponderError, ResponderReply};
use server::session::protocol::RandomSource;
use server::session::GameSession;

/// Deterministic stand-in for the external responder: hands out scripted
/// replies in order and records every prompt it was sent.
pub struct ScriptedResponder {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedResponder {
    pub fn with_replies(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err("scripted outage".to_string())])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(
        &self,
        prompt: &str,
        _continuation: &Continuation,
    ) -> Result<ResponderReply, ResponderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(ResponderReply {
                text,
                continuation: Continuation {
                    server: Some(1),
                    user: None,
                    conversation_id: Some("conv-1".to_string()),
                    message_id: Some("msg-1".to_string()),
                },
            }),
            Some(Err(reason)) => Err(ResponderError::Refused(reason)),
            None => Err(ResponderError::Refused("script exhausted".to_string())),
        }
    }
}

/// Random source pinned to one value, to force the reminder branch.
pub struct FixedRandom(pub f32);

impl RandomSource for FixedRandom {
    fn roll(&self) -> f32 {
        self.0
    }
}

pub fn new_session() -> GameSession {
    GameSession::new("test-session".to_string())
}

pub fn play(piece: PieceKind, from: (i32, i32), to: (i32, i32)) -> GameMove {
    GameMove::Play(PlayMove::new(
        piece,
        Coord::new(from.0, from.1),
        Coord::new(to.0, to.1),
    ))
}
