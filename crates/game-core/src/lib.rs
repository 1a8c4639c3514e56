//! Core game model for chess played against a free-text opponent.
//!
//! The board engine applies whatever move it is told without legality
//! checking; the move text codec translates between structured moves and the
//! loose natural-language protocol the opponent speaks.

pub mod board;
pub mod coord;
pub mod moves;

pub use board::{Board, MoveDescriptor, Placement, SideRecord, Sound};
pub use coord::Coord;
pub use moves::{CastleSide, Color, GameMove, PieceKind, PlayMove};
