//! Move text codec: structured moves to instruction sentences and back.
//!
//! The opponent replies in free prose, not a strict protocol, so parsing has
//! to survive punctuation, casing, and surrounding chatter while still
//! extracting one deterministic move.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;

pub const CHECK: &str = "check";
pub const CHECKMATE: &str = "checkmate";
pub const STALEMATE: &str = "stalemate";
pub const CASTLE: &str = "castling";
pub const RESIGN: &str = "resign";
pub const END: &str = "end";

/// Phrases that read as the opponent declaring the game over. Substring
/// matched against the whole reply, ahead of any move extraction.
const GAME_END_WORDS: &[&str] = &[
    "won",
    "win",
    "congratulations",
    "congrats",
    "good game",
    "good job",
    "lose",
    "lost",
    "victory",
    "defeat",
];

/// Punctuation stripped character-by-character before tokenizing.
const FILTER_CHARS: &[char] = &[
    '.', ',', '!', '?', ':', ';', '(', ')', '[', ']', '{', '}', '/', '\\', '|', '-', '_', '+', '=',
    '*', '&', '^', '%', '$', '#', '@', '~', '`', '"', '\'', '>', '<',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Rook => "rook",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PieceKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pawn" => Ok(PieceKind::Pawn),
            "rook" => Ok(PieceKind::Rook),
            "knight" => Ok(PieceKind::Knight),
            "bishop" => Ok(PieceKind::Bishop),
            "queen" => Ok(PieceKind::Queen),
            "king" => Ok(PieceKind::King),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::White => "white",
            Color::Black => "black",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastleSide {
    #[serde(rename = "kingSide")]
    KingSide,
    #[serde(rename = "queenSide")]
    QueenSide,
}

/// A piece relocation, possibly decorated with capture/promotion/castling
/// and the opponent's declared game-state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayMove {
    pub piece: PieceKind,
    pub from: Coord,
    pub to: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capturing: Option<PieceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoting: Option<PieceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castling: Option<CastleSide>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub check: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub checkmate: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub self_checkmate: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stalemate: bool,
}

impl PlayMove {
    pub fn new(piece: PieceKind, from: Coord, to: Coord) -> Self {
        Self {
            piece,
            from,
            to,
            capturing: None,
            promoting: None,
            castling: None,
            check: false,
            checkmate: false,
            self_checkmate: false,
            stalemate: false,
        }
    }
}

/// A move as exchanged with clients and the opponent: either a relocation or
/// a resignation. Serializes to the same JSON shapes the game API speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameMove {
    Play(PlayMove),
    Resign { resign: bool },
}

impl GameMove {
    pub fn resign() -> Self {
        GameMove::Resign { resign: true }
    }

    pub fn is_resign(&self) -> bool {
        matches!(self, GameMove::Resign { .. })
    }
}

fn is_move_starter(token: &str) -> bool {
    token.parse::<PieceKind>().is_ok()
        || matches!(token, CHECK | CHECKMATE | STALEMATE | CASTLE | RESIGN | END)
}

fn castling_move(text: &str) -> GameMove {
    // Castling sentences carry no usable coordinates; the board engine
    // repositions king and rook by file, so the from/to here only matter to
    // clients animating the move.
    if text.contains("queen") {
        GameMove::Play(PlayMove {
            castling: Some(CastleSide::QueenSide),
            ..PlayMove::new(PieceKind::King, Coord::new(4, 0), Coord::new(2, 0))
        })
    } else {
        GameMove::Play(PlayMove {
            castling: Some(CastleSide::KingSide),
            ..PlayMove::new(PieceKind::King, Coord::new(4, 0), Coord::new(6, 0))
        })
    }
}

/// Serialize a move into the instruction sentence sent to the opponent.
pub fn generate_move_string(game_move: &GameMove) -> String {
    let play = match game_move {
        GameMove::Resign { .. } => return RESIGN.to_string(),
        GameMove::Play(play) => play,
    };

    if let Some(side) = play.castling {
        return match side {
            CastleSide::KingSide => format!("{CASTLE} king side"),
            CastleSide::QueenSide => format!("{CASTLE} queen side"),
        };
    }

    let mut out = format!(
        "{} from {} to {}",
        play.piece,
        play.from.to_algebraic(),
        play.to.to_algebraic()
    );
    if let Some(piece) = play.capturing {
        out.push_str(&format!(" capturing {piece}"));
    }
    if let Some(piece) = play.promoting {
        out.push_str(&format!(" promoting to {piece}"));
    }

    if play.checkmate || play.self_checkmate {
        out.push_str(" checkmate");
    } else if play.stalemate {
        out.push_str(" stalemate");
    } else if play.check {
        out.push_str(" check");
    }

    out
}

/// Extract a move from the opponent's free-text reply.
///
/// The reply may bury the move in prose, so every token that could start a
/// move clause is tried as an anchor, last occurrence first: when the reply
/// contains several plausible sentences, the most recent one wins. Castling
/// mentioned anywhere overrides a from/to clause, and game-over phrasing
/// anywhere overrides everything.
pub fn parse_move_string(text: &str) -> Option<GameMove> {
    let lowered = text.to_lowercase();
    let lowered = lowered.trim();

    let cleaned: String = lowered.chars().filter(|c| !FILTER_CHARS.contains(c)).collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let mut starts: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| is_move_starter(token))
        .map(|(i, _)| i)
        .collect();
    starts.reverse();

    if GAME_END_WORDS.iter().any(|word| lowered.contains(word)) {
        return Some(GameMove::resign());
    }

    let mut castling: Option<GameMove> = None;

    for &start in &starts {
        if lowered.contains(RESIGN) || lowered.contains(END) {
            return Some(GameMove::resign());
        }

        if lowered.contains("castl") {
            castling = Some(castling_move(lowered));
        }

        let words = &tokens[start..];

        if words.get(1).copied() != Some("from") || words.get(3).copied() != Some("to") {
            match castling {
                Some(mv) => return Some(mv),
                None => continue,
            }
        }

        let piece = match words[0].parse::<PieceKind>() {
            Ok(piece) => piece,
            Err(()) => match castling {
                Some(mv) => return Some(mv),
                None => continue,
            },
        };

        let from = words.get(2).copied().and_then(Coord::from_algebraic);
        let to = words.get(4).copied().and_then(Coord::from_algebraic);
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            _ => match castling {
                Some(mv) => return Some(mv),
                None => continue,
            },
        };

        // A detected castling wins over the from/to clause just parsed.
        if let Some(mv) = castling {
            return Some(mv);
        }

        let mut play = PlayMove::new(piece, from, to);

        match words.get(5).copied() {
            Some("capturing") => {
                match words.get(6).and_then(|w| w.parse::<PieceKind>().ok()) {
                    Some(kind) => play.capturing = Some(kind),
                    None => continue,
                }
            }
            Some("promoting") if words.get(6).copied() == Some("to") => {
                // Tolerate one filler word before the piece name
                // ("promoting to a queen").
                let kind = words
                    .get(7)
                    .and_then(|w| w.parse::<PieceKind>().ok())
                    .or_else(|| words.get(8).and_then(|w| w.parse::<PieceKind>().ok()));
                match kind {
                    Some(kind) => play.promoting = Some(kind),
                    None => continue,
                }
            }
            _ => {
                if words.contains(&CHECK) {
                    play.check = true;
                } else if lowered.contains(CHECKMATE) {
                    play.checkmate = true;
                } else if lowered.contains(STALEMATE) {
                    play.stalemate = true;
                }
            }
        }

        return Some(GameMove::Play(play));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(text: &str) -> PlayMove {
        match parse_move_string(text) {
            Some(GameMove::Play(play)) => play,
            other => panic!("expected play move from {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_basic_move() {
        let mv = GameMove::Play(PlayMove::new(
            PieceKind::Pawn,
            Coord::new(4, 1),
            Coord::new(4, 3),
        ));
        assert_eq!(generate_move_string(&mv), "pawn from e2 to e4");
    }

    #[test]
    fn test_generate_capture_and_suffix_precedence() {
        let mut play = PlayMove::new(PieceKind::Rook, Coord::new(0, 0), Coord::new(0, 6));
        play.capturing = Some(PieceKind::Pawn);
        play.check = true;
        play.checkmate = true;
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "rook from a1 to a7 capturing pawn checkmate"
        );

        play.checkmate = false;
        play.stalemate = true;
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "rook from a1 to a7 capturing pawn stalemate"
        );

        play.stalemate = false;
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "rook from a1 to a7 capturing pawn check"
        );
    }

    #[test]
    fn test_generate_promotion() {
        let mut play = PlayMove::new(PieceKind::Pawn, Coord::new(6, 6), Coord::new(6, 7));
        play.promoting = Some(PieceKind::Queen);
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "pawn from g7 to g8 promoting to queen"
        );
    }

    #[test]
    fn test_generate_castling_and_resign() {
        let mut play = PlayMove::new(PieceKind::King, Coord::new(4, 0), Coord::new(6, 0));
        play.castling = Some(CastleSide::KingSide);
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "castling king side"
        );
        play.castling = Some(CastleSide::QueenSide);
        assert_eq!(
            generate_move_string(&GameMove::Play(play)),
            "castling queen side"
        );
        assert_eq!(generate_move_string(&GameMove::resign()), "resign");
    }

    #[test]
    fn test_parse_plain_move() {
        let mv = play("pawn from e7 to e5");
        assert_eq!(mv.piece, PieceKind::Pawn);
        assert_eq!(mv.from, Coord::new(4, 6));
        assert_eq!(mv.to, Coord::new(4, 4));
        assert_eq!(mv.capturing, None);
    }

    #[test]
    fn test_parse_survives_punctuation_and_prose() {
        let mv = play("Sure! My move: knight, from g8, to f6.");
        assert_eq!(mv.piece, PieceKind::Knight);
        assert_eq!(mv.from, Coord::new(6, 7));
        assert_eq!(mv.to, Coord::new(5, 5));
    }

    #[test]
    fn test_parse_generate_round_trip() {
        let original = GameMove::Play(PlayMove::new(
            PieceKind::Bishop,
            Coord::new(5, 0),
            Coord::new(2, 3),
        ));
        assert_eq!(
            parse_move_string(&generate_move_string(&original)),
            Some(original)
        );
    }

    #[test]
    fn test_parse_capturing() {
        let mv = play("rook from a1 to a7 capturing pawn");
        assert_eq!(mv.capturing, Some(PieceKind::Pawn));
    }

    #[test]
    fn test_parse_capturing_unknown_piece_rejects_candidate() {
        assert_eq!(parse_move_string("rook from a1 to a7 capturing dragon"), None);
    }

    #[test]
    fn test_parse_promoting_with_filler_word() {
        let mv = play("pawn from g7 to g8 promoting to queen");
        assert_eq!(mv.promoting, Some(PieceKind::Queen));

        let mv = play("pawn from g7 to g8 promoting to a queen");
        assert_eq!(mv.promoting, Some(PieceKind::Queen));
    }

    #[test]
    fn test_parse_check_and_mate_flags() {
        assert!(play("queen from d1 to h5 check").check);
        assert!(play("queen from d1 to h5 checkmate").checkmate);
        assert!(play("queen from d1 to h5 stalemate").stalemate);
    }

    #[test]
    fn test_parse_last_clause_wins() {
        // Two complete clauses: the later one is the authoritative move.
        let mv = play("pawn from e2 to e4\npawn from d2 to d4");
        assert_eq!(mv.from, Coord::new(3, 1));
        assert_eq!(mv.to, Coord::new(3, 3));
    }

    #[test]
    fn test_parse_castling() {
        let mv = play("I'll castle: castling king side");
        assert_eq!(mv.castling, Some(CastleSide::KingSide));
        assert_eq!(mv.to, Coord::new(6, 0));

        let mv = play("castling queen side");
        assert_eq!(mv.castling, Some(CastleSide::QueenSide));
        assert_eq!(mv.to, Coord::new(2, 0));
    }

    #[test]
    fn test_parse_castling_beats_from_to_clause() {
        let mv = play("castling king side, or rather rook from h1 to f1");
        assert_eq!(mv.castling, Some(CastleSide::KingSide));
    }

    #[test]
    fn test_parse_game_over_phrases_short_circuit() {
        assert_eq!(parse_move_string("Good game!"), Some(GameMove::resign()));
        assert_eq!(
            parse_move_string("Congratulations, you won!"),
            Some(GameMove::resign())
        );
        // Overrides an otherwise parseable move in the same reply.
        assert_eq!(
            parse_move_string("pawn from e7 to e5. Good game!"),
            Some(GameMove::resign())
        );
    }

    #[test]
    fn test_parse_resign_and_end_substrings() {
        assert_eq!(parse_move_string("resign"), Some(GameMove::resign()));
        assert_eq!(parse_move_string("end"), Some(GameMove::resign()));
        // "defend" contains "end"; once any starter token is present the
        // substring check fires.
        assert_eq!(
            parse_move_string("pawn from e7 to e5 to defend"),
            Some(GameMove::resign())
        );
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_move_string(""), None);
        assert_eq!(parse_move_string("I cannot decide on a move."), None);
        assert_eq!(parse_move_string("pawn to e4"), None);
        assert_eq!(parse_move_string("pawn from z9 to e4"), None);
    }

    #[test]
    fn test_game_move_json_shapes() {
        let resign: GameMove = serde_json::from_str(r#"{"resign":true}"#).unwrap();
        assert!(resign.is_resign());

        let mv: GameMove = serde_json::from_str(
            r#"{"piece":"pawn","from":{"x":4,"y":1},"to":{"x":4,"y":3}}"#,
        )
        .unwrap();
        match mv {
            GameMove::Play(play) => {
                assert_eq!(play.piece, PieceKind::Pawn);
                assert_eq!(play.to, Coord::new(4, 3));
            }
            GameMove::Resign { .. } => panic!("expected play move"),
        }
    }
}
