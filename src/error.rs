//! Error types for engine operations.

use thiserror::Error;

use crate::types::{Coord, PieceId};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Why a selection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no piece on {0}")]
    EmptySquare(Coord),

    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),

    #[error("piece {0} belongs to the other player")]
    NotYourPiece(PieceId),

    #[error("piece {0} has no legal moves")]
    NoLegalMoves(PieceId),

    /// Only raised under `CaptureRule::BoardWide`.
    #[error("piece {0} cannot capture while another piece can")]
    CaptureRequiredElsewhere(PieceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),

    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Coord, to: Coord },

    #[error("piece {forced} must keep capturing")]
    ForcedContinuationViolation { forced: PieceId },

    /// Caller or engine bug. The game should be discarded.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::InvariantViolation(_))
    }
}
