use wasm_bindgen::prelude::*;

pub mod board;
pub mod capture;
pub mod config;
pub mod error;
pub mod game;
pub mod movegen;
pub mod promotion;
pub mod types;
pub mod wasm;

pub use board::Board;
pub use config::{CaptureRule, GameConfig};
pub use error::{EngineError, Result, SelectionError};
pub use game::{FirstLegalMoveSelector, GameState, MoveSelector, Selection};
pub use types::{CommitResult, Coord, GameOutcome, GameSnapshot, Move, Piece, PieceId, PieceKind, Player};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
