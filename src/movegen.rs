//! Candidate steps and jumps for a single piece.
//!
//! Men move and capture diagonally forward only; kings use all four
//! diagonals. A piece that can capture offers no steps.

use log::trace;

use crate::board::Board;
use crate::types::{Coord, Move, Piece, PieceKind, Player};

const NORTH_EAST: Coord = Coord::new(1, 1);
const NORTH_WEST: Coord = Coord::new(-1, 1);
const SOUTH_EAST: Coord = Coord::new(1, -1);
const SOUTH_WEST: Coord = Coord::new(-1, -1);

const KING_DIRECTIONS: [Coord; 4] = [NORTH_EAST, NORTH_WEST, SOUTH_EAST, SOUTH_WEST];
const BLACK_MAN_DIRECTIONS: [Coord; 2] = [NORTH_EAST, NORTH_WEST];
const WHITE_MAN_DIRECTIONS: [Coord; 2] = [SOUTH_EAST, SOUTH_WEST];

/// Diagonal unit vectors a piece of this kind and owner may travel along.
pub fn legal_directions(kind: PieceKind, owner: Player) -> &'static [Coord] {
    match (kind, owner) {
        (PieceKind::King, _) => &KING_DIRECTIONS,
        (PieceKind::Man, Player::Black) => &BLACK_MAN_DIRECTIONS,
        (PieceKind::Man, Player::White) => &WHITE_MAN_DIRECTIONS,
    }
}

/// Raw candidates for one piece, before capture precedence is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveSet {
    pub steps: Vec<Move>,
    pub captures: Vec<Move>,
}

impl MoveSet {
    pub fn has_capture(&self) -> bool {
        !self.captures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.captures.is_empty()
    }

    /// Applies capture precedence: captures if there are any, otherwise steps.
    pub fn into_legal(self) -> Vec<Move> {
        if self.has_capture() {
            self.captures
        } else {
            self.steps
        }
    }
}

pub fn generate(board: &Board, piece: &Piece) -> MoveSet {
    let mut set = MoveSet::default();

    for &dir in legal_directions(piece.kind, piece.owner) {
        let adjacent = piece.coord + dir;
        if !board.is_inside(adjacent) {
            continue;
        }

        match board.piece_at(adjacent) {
            None => set.steps.push(Move::step(piece.coord, adjacent)),
            Some(other) if other.owner != piece.owner => {
                let landing = adjacent + dir;
                if board.is_empty_at(landing) {
                    set.captures.push(Move::jump(piece.coord, adjacent, landing));
                }
            }
            Some(_) => {}
        }
    }

    trace!(
        "piece {} at {}: {} steps, {} captures",
        piece.id,
        piece.coord,
        set.steps.len(),
        set.captures.len()
    );
    set
}

pub fn captures(board: &Board, piece: &Piece) -> Vec<Move> {
    generate(board, piece).captures
}

/// Legal moves of one piece with per-piece capture precedence.
pub fn legal_moves(board: &Board, piece: &Piece) -> Vec<Move> {
    generate(board, piece).into_legal()
}

/// Whether any piece of `owner` has a capture available.
pub fn any_capture(board: &Board, owner: Player) -> bool {
    board
        .pieces_of(owner)
        .any(|piece| generate(board, piece).has_capture())
}
