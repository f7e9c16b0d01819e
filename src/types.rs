use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A board coordinate. `x` is the column, `y` the row; row 0 is Black's back rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Dark squares are the only playable ones.
    pub fn is_dark(self) -> bool {
        (self.x + self.y).rem_euclid(2) == 0
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Player {
    /// Starts on the low rows and advances toward increasing `y`.
    Black,
    /// Starts on the high rows and advances toward decreasing `y`.
    White,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    /// Row delta of a forward step.
    pub fn forward(self) -> i32 {
        match self {
            Player::Black => 1,
            Player::White => -1,
        }
    }

    /// Wire code used by the JS front end: 1 = black, 2 = white.
    pub fn from_code(code: u8) -> Option<Player> {
        match code {
            1 => Some(Player::Black),
            2 => Some(Player::White),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Player::Black => 1,
            Player::White => 2,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => f.write_str("black"),
            Player::White => f.write_str("white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PieceKind {
    Man,
    King,
}

pub type PieceId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    pub coord: Coord,
    pub owner: Player,
    pub kind: PieceKind,
}

impl Piece {
    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    /// Promotes the piece. There is no way back.
    pub fn crown(&mut self) {
        self.kind = PieceKind::King;
    }
}

/// A single step or a single jump. A capture chain is a sequence of jumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
    #[serde(default)]
    pub captured: Option<Coord>,
}

impl Move {
    pub fn step(from: Coord, to: Coord) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    pub fn jump(from: Coord, over: Coord, to: Coord) -> Self {
        Self {
            from,
            to,
            captured: Some(over),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.captured {
            Some(over) => write!(f, "{} x{} -> {}", self.from, over, self.to),
            None => write!(f, "{} -> {}", self.from, self.to),
        }
    }
}

/// Outcome of one committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub piece_id: PieceId,
    pub mv: Move,
    pub captured_piece_id: Option<PieceId>,
    pub promoted: bool,
    /// Contract:
    /// - `true` when the same piece must capture again before the turn passes.
    /// - `next_player` is then the mover.
    pub continuation_required: bool,
    pub next_player: Player,
    /// Revision of the game state after this commit.
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "winner")]
pub enum GameOutcome {
    InProgress,
    Won(Player),
}

/// Read-only projection of a game for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major cells, see `Board::to_array`.
    pub cells: Vec<u8>,
    pub pieces: Vec<Piece>,
    pub current_player: Player,
    pub selected: Option<PieceId>,
    pub forced_piece: Option<PieceId>,
    pub black_count: u32,
    pub white_count: u32,
    pub outcome: GameOutcome,
    pub revision: u64,
}
