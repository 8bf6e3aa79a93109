//! Move representation and the external wire shape.
//!
//! The wire shape is fixed: `(fromRow, fromCol, toRow, toCol, [[capRow, capCol], ...])`,
//! coordinates zero-indexed 0..=7, captured squares in capture order. Any
//! persistence or distribution layer built on top of this crate must see
//! exactly that tuple, so `Move` serializes through a raw tuple type rather
//! than a struct map.

use serde::{Deserialize, Serialize};

/// A board coordinate. Playable squares satisfy `(row + col) % 2 == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Raw wire tuple for a move.
type MoveWire = (u8, u8, u8, u8, Vec<(u8, u8)>);

/// A single move: origin, destination, and the squares captured along the way.
///
/// Generated capture moves carry exactly one captured square; multi-capture
/// chains are realized as successive applications with turn retention (see
/// `GameSession::apply`). The `captured` vector stays a sequence so recorded
/// chains survive the wire shape unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MoveWire", from = "MoveWire")]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Vec<Square>,
}

impl Move {
    pub fn simple(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: Vec::new(),
        }
    }

    pub fn capture(from: Square, to: Square, captured: Square) -> Self {
        Self {
            from,
            to,
            captured: vec![captured],
        }
    }

    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }
}

impl From<Move> for MoveWire {
    fn from(m: Move) -> MoveWire {
        (
            m.from.row,
            m.from.col,
            m.to.row,
            m.to.col,
            m.captured.iter().map(|s| (s.row, s.col)).collect(),
        )
    }
}

impl From<MoveWire> for Move {
    fn from(w: MoveWire) -> Move {
        let (fr, fc, tr, tc, caps) = w;
        Move {
            from: Square::new(fr, fc),
            to: Square::new(tr, tc),
            captured: caps.into_iter().map(|(r, c)| Square::new(r, c)).collect(),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.from.row, self.from.col, self.to.row, self.to.col
        )?;
        if self.is_capture() {
            write!(f, " x{}", self.captured.len())?;
        }
        Ok(())
    }
}
