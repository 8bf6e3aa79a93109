//! Game session: the single place that mutates a `Board` via the rules.

use crate::board::{Board, Piece, Rank, Side};
use crate::moves::Move;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("illegal move {mv} for {side:?} in current position")]
    IllegalMove { mv: Move, side: Side },
}

/// Match state from the rules' point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won(Side),
    Drawn,
}

/// One match in progress: board, side to move, ply counter, and an
/// append-only log of applied moves.
///
/// A session is exclusively owned by the task driving it; it is created at
/// match start, mutated only through `apply`, and dropped at match end.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    to_move: Side,
    ply: u32,
    log: Vec<Move>,
}

impl GameSession {
    /// Fresh match from the standard opening position, Red to move.
    pub fn new() -> Self {
        Self::with_position(Board::initial(), Side::Red)
    }

    /// Session over an arbitrary position (tests, search restarts).
    pub fn with_position(board: Board, to_move: Side) -> Self {
        Self {
            board,
            to_move,
            ply: 0,
            log: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    /// Ordered log of every move applied so far.
    pub fn log(&self) -> &[Move] {
        &self.log
    }

    /// Legal moves for the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves(self.to_move)
    }

    /// Apply a move for the side to move.
    ///
    /// The move must be a member of the current legal-move set; anything else
    /// is a contract violation and fails without touching the board. After a
    /// capturing move, the turn is retained when the landing square offers a
    /// further capture for the same side (multi-capture continuation).
    pub fn apply(&mut self, mv: &Move) -> Result<(), ApplyError> {
        if !self.legal_moves().contains(mv) {
            return Err(ApplyError::IllegalMove {
                mv: mv.clone(),
                side: self.to_move,
            });
        }

        // Relocation is infallible from here on: membership above implies a
        // piece of the mover sits on `from`.
        let mut piece = match self.board.piece_at(mv.from) {
            Some(p) => p,
            None => {
                return Err(ApplyError::IllegalMove {
                    mv: mv.clone(),
                    side: self.to_move,
                })
            }
        };
        self.board.set_piece(mv.from, None);
        for &cap in &mv.captured {
            self.board.set_piece(cap, None);
        }
        if piece.rank == Rank::Man && mv.to.row == piece.side.crowning_row() {
            piece = Piece::king(piece.side);
        }
        self.board.set_piece(mv.to, Some(piece));

        let continues = mv.is_capture() && !self.board.captures_from(mv.to).is_empty();
        if !continues {
            self.to_move = self.to_move.opponent();
        }

        self.ply += 1;
        self.log.push(mv.clone());
        Ok(())
    }

    /// Winner determination.
    ///
    /// Zero pieces on a side decides the game outright. Otherwise only the
    /// side to move matters: with no legal move it loses, unless the opponent
    /// is equally stuck, which is a draw.
    pub fn status(&self) -> Status {
        let red = self.board.piece_count(Side::Red);
        let black = self.board.piece_count(Side::Black);
        if red == 0 && black == 0 {
            return Status::Drawn;
        }
        if red == 0 {
            return Status::Won(Side::Black);
        }
        if black == 0 {
            return Status::Won(Side::Red);
        }
        if self.board.legal_moves(self.to_move).is_empty() {
            if self.board.legal_moves(self.to_move.opponent()).is_empty() {
                Status::Drawn
            } else {
                Status::Won(self.to_move.opponent())
            }
        } else {
            Status::InProgress
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self.status(), Status::InProgress)
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
