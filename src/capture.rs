//! Capture chains: after a jump the same piece keeps jumping while it can.

use log::debug;

use crate::board::Board;
use crate::movegen;
use crate::types::{Move, PieceId};

/// Result of re-examining a piece that has just captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// The chain is still open; only these jumps are legal.
    Open(Vec<Move>),
    Closed,
}

impl Continuation {
    pub fn is_open(&self) -> bool {
        matches!(self, Continuation::Open(_))
    }
}

/// Looks for further jumps by `id` from where it stands now.
/// Any direction the piece may use is allowed at each hop.
pub fn resolve(board: &Board, id: PieceId) -> Continuation {
    let Some(piece) = board.piece(id) else {
        return Continuation::Closed;
    };

    let jumps = movegen::captures(board, piece);
    if jumps.is_empty() {
        Continuation::Closed
    } else {
        debug!(
            "piece {id} at {} must continue: {} jump(s) available",
            piece.coord,
            jumps.len()
        );
        Continuation::Open(jumps)
    }
}
