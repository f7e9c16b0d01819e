use crate::board::Board;
use crate::types::{Piece, PieceId, Player};

/// The row on which a man of `owner` is crowned.
pub fn promotion_row(owner: Player, height: i32) -> i32 {
    match owner {
        Player::Black => height - 1,
        Player::White => 0,
    }
}

pub fn reaches_back_rank(piece: &Piece, height: i32) -> bool {
    piece.coord.y == promotion_row(piece.owner, height)
}

/// Crowns the piece if it stands on its promotion row.
/// Returns `true` only when this call changed it from man to king.
pub fn apply(board: &mut Board, id: PieceId) -> bool {
    let height = board.height();
    match board.piece(id) {
        Some(piece) if reaches_back_rank(piece, height) => board.crown(id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, PieceKind};

    #[test]
    fn promotion_rows_are_the_far_ends() {
        assert_eq!(promotion_row(Player::Black, 8), 7);
        assert_eq!(promotion_row(Player::White, 8), 0);
        assert_eq!(promotion_row(Player::Black, 10), 9);
    }

    #[test]
    fn man_on_far_row_is_crowned_once() {
        let mut board = Board::empty(8, 8).unwrap();
        let id = board.add(Coord::new(2, 0), Player::White, PieceKind::Man).unwrap();

        assert!(apply(&mut board, id));
        assert!(board.piece(id).unwrap().is_king());
        assert!(!apply(&mut board, id));
    }

    #[test]
    fn own_back_row_does_not_promote() {
        let mut board = Board::empty(8, 8).unwrap();
        let id = board.add(Coord::new(0, 0), Player::Black, PieceKind::Man).unwrap();

        assert!(!apply(&mut board, id));
        assert!(!board.piece(id).unwrap().is_king());
    }
}
