//! Board engine: applies a move descriptor to the piece layout.
//!
//! The engine never rejects a move. The opponent is not a verified rules
//! source, so the board trusts the move description, repairs what it can
//! (off-by-one origins, missing pieces), and reports what happened through a
//! sound event for the client to render.

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::moves::{CastleSide, Color, PieceKind, PlayMove};

/// Category of board change, for client feedback. Not an audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    Normal,
    Capture,
    Spawn,
    Castle,
    Promote,
    Check,
    End,
    Error,
}

/// One piece on the board. `last_coord` is where it stood before the most
/// recent move, kept for client animation. `castle` tags the original rooks
/// so castling can find them after they wander.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub piece: PieceKind,
    pub color: Color,
    pub coord: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_coord: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castle: Option<CastleSide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastlingRights {
    pub king_side: bool,
    pub queen_side: bool,
}

/// Per-color derived state. The flags are propagated verbatim from declared
/// moves, never computed from the position. `en_passant` is carried for the
/// client's benefit but nothing here ever sets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRecord {
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub castling: CastlingRights,
    pub en_passant: Option<Coord>,
}

impl Default for SideRecord {
    fn default() -> Self {
        Self {
            check: false,
            checkmate: false,
            stalemate: false,
            castling: CastlingRights {
                king_side: true,
                queen_side: true,
            },
            en_passant: None,
        }
    }
}

/// Everything the board engine needs to apply one move.
#[derive(Debug, Clone)]
pub struct MoveDescriptor {
    pub piece: PieceKind,
    pub from: Coord,
    pub to: Coord,
    pub color: Color,
    pub capturing: Option<PieceKind>,
    pub promoting: Option<PieceKind>,
    pub castling: Option<CastleSide>,
    pub check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
}

impl MoveDescriptor {
    pub fn from_play(play: &PlayMove, color: Color) -> Self {
        Self {
            piece: play.piece,
            from: play.from,
            to: play.to,
            color,
            capturing: play.capturing,
            promoting: play.promoting,
            castling: play.castling,
            check: play.check,
            checkmate: play.checkmate,
            stalemate: play.stalemate,
        }
    }
}

const AROUND: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub items: Vec<Placement>,
    pub white: SideRecord,
    pub black: SideRecord,
}

impl Board {
    /// Standard opening layout, corner rooks tagged with their castle side.
    pub fn starting() -> Self {
        let back_rank = [
            (PieceKind::Rook, Some(CastleSide::QueenSide)),
            (PieceKind::Knight, None),
            (PieceKind::Bishop, None),
            (PieceKind::Queen, None),
            (PieceKind::King, None),
            (PieceKind::Bishop, None),
            (PieceKind::Knight, None),
            (PieceKind::Rook, Some(CastleSide::KingSide)),
        ];

        let mut items = Vec::with_capacity(32);
        for (x, &(piece, castle)) in back_rank.iter().enumerate() {
            items.push(Placement {
                piece,
                color: Color::White,
                coord: Coord::new(x as i32, 0),
                last_coord: None,
                castle,
            });
            items.push(Placement {
                piece: PieceKind::Pawn,
                color: Color::White,
                coord: Coord::new(x as i32, 1),
                last_coord: None,
                castle: None,
            });
            items.push(Placement {
                piece: PieceKind::Pawn,
                color: Color::Black,
                coord: Coord::new(x as i32, 6),
                last_coord: None,
                castle: None,
            });
            items.push(Placement {
                piece,
                color: Color::Black,
                coord: Coord::new(x as i32, 7),
                last_coord: None,
                castle,
            });
        }

        Self {
            items,
            white: SideRecord::default(),
            black: SideRecord::default(),
        }
    }

    pub fn side(&self, color: Color) -> &SideRecord {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn side_mut(&mut self, color: Color) -> &mut SideRecord {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Capture the board for later rollback.
    pub fn snapshot(&self) -> Board {
        self.clone()
    }

    /// Roll the board back to a previously taken snapshot.
    pub fn restore(&mut self, snapshot: Board) {
        *self = snapshot;
    }

    fn find_index(&self, piece: PieceKind, coord: Coord, color: Color) -> Option<usize> {
        self.items.iter().position(|item| {
            item.piece == piece && item.coord == coord && item.color == color
        })
    }

    /// First same-kind same-color piece on one of the eight squares around
    /// `coord`, in fixed offset order. Tolerates the opponent reporting an
    /// origin square off by one hop.
    fn find_index_around(&self, piece: PieceKind, coord: Coord, color: Color) -> Option<usize> {
        for (dx, dy) in AROUND {
            let neighbor = Coord::new(coord.x + dx, coord.y + dy);
            let hit = self
                .items
                .iter()
                .position(|item| item.coord == neighbor)
                .filter(|&i| self.items[i].piece == piece && self.items[i].color == color);
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    /// Nearest placement of `piece`/`color` to `coord` by Manhattan distance.
    fn find_nearest_index(&self, coord: Coord, piece: PieceKind, color: Color) -> Option<usize> {
        let mut nearest: Option<(usize, i32)> = None;
        for (i, item) in self.items.iter().enumerate() {
            if item.piece != piece || item.color != color {
                continue;
            }
            let distance = (item.coord.x - coord.x).abs() + (item.coord.y - coord.y).abs();
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((i, distance));
            }
        }
        nearest.map(|(i, _)| i)
    }

    /// Apply one move, mutating the board in place. Always completes; the
    /// returned sound describes what happened, including "error" when a
    /// castling move names a king or rook that no longer exists.
    pub fn apply(&mut self, mv: &MoveDescriptor) -> Sound {
        let mut sound = Sound::Normal;
        let color = mv.color;
        let opponent = color.opponent();

        self.side_mut(color).check = false;

        for item in &mut self.items {
            item.last_coord = Some(item.coord);
        }

        let mut target = self
            .find_index(mv.piece, mv.from, color)
            .or_else(|| self.find_index_around(mv.piece, mv.from, color));

        // Moving a king, even illegally, forfeits castling.
        if mv.piece == PieceKind::King {
            self.side_mut(color).castling = CastlingRights {
                king_side: false,
                queen_side: false,
            };
        }

        // The first time a rook appears to move, infer which right to drop
        // from its file.
        if mv.piece == PieceKind::Rook {
            let castling = &mut self.side_mut(color).castling;
            if castling.king_side && castling.queen_side {
                if mv.from.x < 4 {
                    castling.queen_side = false;
                } else {
                    castling.king_side = false;
                }
            }
        }

        if let Some(side) = mv.castling {
            let king = self
                .items
                .iter()
                .position(|item| item.piece == PieceKind::King && item.color == color);
            let Some(king) = king else {
                return Sound::Error;
            };
            let rook = self.items.iter().position(|item| {
                item.piece == PieceKind::Rook && item.color == color && item.castle == Some(side)
            });
            let Some(rook) = rook else {
                return Sound::Error;
            };

            self.items[king].last_coord = Some(self.items[king].coord);
            self.items[rook].last_coord = Some(self.items[rook].coord);
            match side {
                CastleSide::KingSide => {
                    self.items[king].coord.x = 6;
                    self.items[rook].coord.x = 5;
                }
                CastleSide::QueenSide => {
                    self.items[king].coord.x = 2;
                    self.items[rook].coord.x = 3;
                }
            }

            return Sound::Castle;
        }

        // A missing king means the origin was wrong, not that a second king
        // should appear.
        if target.is_none() && mv.piece == PieceKind::King {
            target = self
                .items
                .iter()
                .position(|item| item.piece == PieceKind::King && item.color == color);
        }

        let mut moved = match target {
            None => {
                // No such piece anywhere near the origin: trust the move
                // description and spawn it at the destination.
                sound = Sound::Spawn;
                self.items.push(Placement {
                    piece: mv.piece,
                    color,
                    coord: mv.to,
                    last_coord: Some(mv.from),
                    castle: None,
                });
                self.items.len() - 1
            }
            Some(i) => {
                self.items[i].last_coord = Some(self.items[i].coord);
                self.items[i].coord = mv.to;
                i
            }
        };

        if let Some(captured) = mv.capturing {
            sound = Sound::Capture;
            // Removals only ever hit opponent pieces, never the mover, but
            // they do shift the moved piece's index.
            if let Some(i) = self.find_nearest_index(mv.to, captured, opponent) {
                self.items.remove(i);
                if i < moved {
                    moved -= 1;
                }
            }

            // White's captures additionally sweep every black piece sitting
            // exactly on the destination square.
            if color == Color::White {
                let mut i = 0;
                while i < self.items.len() {
                    if self.items[i].coord == mv.to && self.items[i].color == Color::Black {
                        self.items.remove(i);
                        if i < moved {
                            moved -= 1;
                        }
                    } else {
                        i += 1;
                    }
                }
            }
        }

        if let Some(promoted) = mv.promoting {
            sound = Sound::Promote;
            self.items[moved].piece = promoted;
        }

        if mv.check {
            sound = Sound::Check;
        }
        if mv.checkmate || mv.stalemate {
            sound = Sound::End;
        }

        let side = self.side_mut(opponent);
        side.check = mv.check;
        side.checkmate = mv.checkmate;
        side.stalemate = mv.stalemate;

        sound
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}
