use std::collections::BTreeMap;
use std::fmt;

use crate::config::{GameConfig, check_dimension};
use crate::error::{EngineError, Result};
use crate::types::{Coord, Piece, PieceId, PieceKind, Player};

/// Square grid holding the pieces, indexed both by id and by coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    squares: Vec<Option<PieceId>>,
    pieces: BTreeMap<PieceId, Piece>,
    next_id: PieceId,
}

impl Board {
    /// Creates an empty board. Dimensions must be even, from 4 to `MAX_BOARD_SIZE`.
    pub fn empty(width: i32, height: i32) -> Result<Self> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;

        Ok(Self {
            width,
            height,
            squares: vec![None; (width * height) as usize],
            pieces: BTreeMap::new(),
            next_id: 0,
        })
    }

    /// Creates the standard layout: `rows_per_side` rows of men on the dark
    /// squares at each end, Black on the low rows.
    pub fn standard(config: &GameConfig) -> Result<Self> {
        config.validate()?;
        let mut board = Self::empty(config.width, config.height)?;

        for y in 0..config.height {
            let owner = if y < config.rows_per_side {
                Player::Black
            } else if y >= config.height - config.rows_per_side {
                Player::White
            } else {
                continue;
            };

            for x in 0..config.width {
                let coord = Coord::new(x, y);
                if coord.is_dark() {
                    board.add(coord, owner, PieceKind::Man)?;
                }
            }
        }

        Ok(board)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_inside(&self, coord: Coord) -> bool {
        (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y)
    }

    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        let id = (*self.squares.get(self.index(coord)?)?)?;
        self.pieces.get(&id)
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.is_inside(coord) && self.piece_at(coord).is_none()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// All pieces, ordered by id.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn pieces_of(&self, owner: Player) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |piece| piece.owner == owner)
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u32, u32) {
        let black = self.pieces_of(Player::Black).count() as u32;
        (black, self.pieces.len() as u32 - black)
    }

    /// Adds a new piece during setup and returns its id.
    pub fn add(&mut self, coord: Coord, owner: Player, kind: PieceKind) -> Result<PieceId> {
        let id = self.next_id;
        self.place(Piece {
            id,
            coord,
            owner,
            kind,
        })?;
        Ok(id)
    }

    /// Puts a piece on its coordinate. Reusing an id or an occupied square is a bug.
    pub fn place(&mut self, piece: Piece) -> Result<()> {
        let index = self.index(piece.coord).ok_or_else(|| {
            EngineError::InvariantViolation(format!(
                "piece {} placed outside the board at {}",
                piece.id, piece.coord
            ))
        })?;
        if let Some(other) = self.squares[index] {
            return Err(EngineError::InvariantViolation(format!(
                "piece {} placed on {} already held by piece {other}",
                piece.id, piece.coord
            )));
        }
        if self.pieces.contains_key(&piece.id) {
            return Err(EngineError::InvariantViolation(format!(
                "piece id {} is already on the board",
                piece.id
            )));
        }

        self.squares[index] = Some(piece.id);
        self.pieces.insert(piece.id, piece);
        self.next_id = self.next_id.max(piece.id.saturating_add(1));
        Ok(())
    }

    pub fn remove(&mut self, id: PieceId) -> Option<Piece> {
        let piece = self.pieces.remove(&id)?;
        if let Some(index) = self.index(piece.coord) {
            self.squares[index] = None;
        }
        Some(piece)
    }

    /// Relocates a piece. The destination must be inside and empty.
    pub fn relocate(&mut self, id: PieceId, to: Coord) -> Result<()> {
        let from = self
            .pieces
            .get(&id)
            .map(|piece| piece.coord)
            .ok_or_else(|| EngineError::InvariantViolation(format!("piece {id} is not on the board")))?;
        let to_index = self.index(to).ok_or_else(|| {
            EngineError::InvariantViolation(format!("piece {id} moved outside the board to {to}"))
        })?;
        if let Some(other) = self.squares[to_index] {
            return Err(EngineError::InvariantViolation(format!(
                "piece {id} moved onto {to} already held by piece {other}"
            )));
        }

        if let Some(from_index) = self.index(from) {
            self.squares[from_index] = None;
        }
        self.squares[to_index] = Some(id);
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.coord = to;
        }
        Ok(())
    }

    /// Promotes a piece to king. Returns `true` if it was a man before.
    pub fn crown(&mut self, id: PieceId) -> bool {
        match self.pieces.get_mut(&id) {
            Some(piece) if !piece.is_king() => {
                piece.crown();
                true
            }
            _ => false,
        }
    }

    /// Row-major cells: 0=empty, 1=black man, 2=white man, 3=black king, 4=white king.
    pub fn to_array(&self) -> Vec<u8> {
        self.squares
            .iter()
            .map(|cell| match cell.and_then(|id| self.pieces.get(&id)) {
                None => 0,
                Some(piece) => match (piece.owner, piece.kind) {
                    (Player::Black, PieceKind::Man) => 1,
                    (Player::White, PieceKind::Man) => 2,
                    (Player::Black, PieceKind::King) => 3,
                    (Player::White, PieceKind::King) => 4,
                },
            })
            .collect()
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        self.is_inside(coord)
            .then(|| (coord.y * self.width + coord.x) as usize)
    }
}

impl fmt::Display for Board {
    /// Top row first. `b`/`w` are men, `B`/`W` kings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let symbol = match self.piece_at(Coord::new(x, y)) {
                    Some(piece) => match (piece.owner, piece.kind) {
                        (Player::Black, PieceKind::Man) => 'b',
                        (Player::White, PieceKind::Man) => 'w',
                        (Player::Black, PieceKind::King) => 'B',
                        (Player::White, PieceKind::King) => 'W',
                    },
                    None if Coord::new(x, y).is_dark() => '.',
                    None => ' ',
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
