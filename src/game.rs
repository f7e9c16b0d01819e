use log::{debug, warn};

use crate::board::Board;
use crate::capture::{self, Continuation};
use crate::config::{CaptureRule, GameConfig};
use crate::error::{EngineError, Result, SelectionError};
use crate::movegen;
use crate::promotion;
use crate::types::{CommitResult, Coord, GameOutcome, GameSnapshot, Move, Piece, PieceId, Player};

/// Picks the next move for automated play.
pub trait MoveSelector {
    fn select_move(&self, game: &GameState) -> Option<Move>;
}

/// Plays the first legal move of the lowest-id movable piece.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&self, game: &GameState) -> Option<Move> {
        game.board()
            .pieces_of(game.current_player())
            .find_map(|piece| game.legal_moves(piece.id).into_iter().next())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Idle,
    Selected(PieceId),
    /// Entered only by a capture that left the piece another capture.
    ForcedContinuation(PieceId),
}

/// One game session. Every engine call goes through this value.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    current_player: Player,
    selection: Selection,
    capture_rule: CaptureRule,
    revision: u64,
    history: Vec<CommitResult>,
}

impl GameState {
    /// Starts a game on the standard layout described by `config`.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let board = Board::standard(config)?;
        Ok(Self::with_board(board, config.first_player, config.capture_rule))
    }

    /// Starts a game from a custom placement.
    pub fn with_board(board: Board, first_player: Player, capture_rule: CaptureRule) -> Self {
        Self {
            board,
            current_player: first_player,
            selection: Selection::Idle,
            capture_rule,
            revision: 0,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn capture_rule(&self) -> CaptureRule {
        self.capture_rule
    }

    /// Incremented by every commit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history(&self) -> &[CommitResult] {
        &self.history
    }

    pub fn selected_piece(&self) -> Option<PieceId> {
        match self.selection {
            Selection::Idle => None,
            Selection::Selected(id) | Selection::ForcedContinuation(id) => Some(id),
        }
    }

    pub fn forced_piece(&self) -> Option<PieceId> {
        match self.selection {
            Selection::ForcedContinuation(id) => Some(id),
            _ => None,
        }
    }

    /// Moves the piece may make right now. Empty for the opponent's pieces,
    /// for unknown ids, and for every piece but the forced one mid-chain.
    pub fn legal_moves(&self, id: PieceId) -> Vec<Move> {
        match self.board.piece(id) {
            Some(piece) if piece.owner == self.current_player => self.moves_for(piece),
            _ => Vec::new(),
        }
    }

    /// Legal moves of the selected piece.
    pub fn legal_targets(&self) -> Vec<Move> {
        self.selected_piece()
            .map(|id| self.legal_moves(id))
            .unwrap_or_default()
    }

    /// Whether `player` could move if it were their turn now. Pure query.
    pub fn has_any_legal_move(&self, player: Player) -> bool {
        if player == self.current_player {
            self.board
                .pieces_of(player)
                .any(|piece| !self.moves_for(piece).is_empty())
        } else {
            self.board
                .pieces_of(player)
                .any(|piece| !movegen::legal_moves(&self.board, piece).is_empty())
        }
    }

    /// A player to move with no legal move has lost.
    pub fn outcome(&self) -> GameOutcome {
        if self.has_any_legal_move(self.current_player) {
            GameOutcome::InProgress
        } else {
            GameOutcome::Won(self.current_player.opponent())
        }
    }

    pub fn select(&mut self, id: PieceId) -> Result<()> {
        if let Some(forced) = self.forced_piece() {
            if forced == id {
                return Ok(());
            }
            warn!("selection of piece {id} refused: piece {forced} must keep capturing");
            return Err(EngineError::ForcedContinuationViolation { forced });
        }

        let piece = self
            .board
            .piece(id)
            .ok_or(SelectionError::UnknownPiece(id))?;
        self.check_movable(piece)?;

        self.selection = Selection::Selected(id);
        Ok(())
    }

    /// Selects whatever piece stands on `coord`.
    pub fn select_at(&mut self, coord: Coord) -> Result<()> {
        match self.board.piece_at(coord) {
            Some(piece) => {
                let id = piece.id;
                self.select(id)
            }
            None => match self.forced_piece() {
                Some(forced) => Err(EngineError::ForcedContinuationViolation { forced }),
                None => Err(SelectionError::EmptySquare(coord).into()),
            },
        }
    }

    /// Drops the selection. A pending capture chain cannot be abandoned.
    pub fn deselect(&mut self) -> Result<()> {
        if let Some(forced) = self.forced_piece() {
            return Err(EngineError::ForcedContinuationViolation { forced });
        }
        self.selection = Selection::Idle;
        Ok(())
    }

    /// Commits one step or jump. The moving piece is the one on `mv.from`.
    pub fn commit(&mut self, mv: Move) -> Result<CommitResult> {
        let piece = *self.board.piece_at(mv.from).ok_or(EngineError::IllegalMove {
            from: mv.from,
            to: mv.to,
        })?;
        let checked = self.checked_move(&piece, mv.to, |candidate| *candidate == mv)?;
        self.apply(piece.id, checked)
    }

    /// Like `commit`, but rejects moves computed against an older revision.
    pub fn commit_at(&mut self, revision: u64, mv: Move) -> Result<CommitResult> {
        if revision != self.revision {
            return Err(EngineError::InvariantViolation(format!(
                "move {mv} was computed at revision {revision}, game is at {}",
                self.revision
            )));
        }
        self.commit(mv)
    }

    /// Moves `id` to `target`, whichever legal step or jump gets it there.
    pub fn request_move(&mut self, id: PieceId, target: Coord) -> Result<CommitResult> {
        let piece = *self
            .board
            .piece(id)
            .ok_or(SelectionError::UnknownPiece(id))?;
        let checked = self.checked_move(&piece, target, |candidate| candidate.to == target)?;
        self.apply(id, checked)
    }

    /// Lets `selector` make one commit. `None` when it finds nothing to play.
    pub fn play_selected(&mut self, selector: &dyn MoveSelector) -> Result<Option<CommitResult>> {
        match selector.select_move(self) {
            Some(mv) => self.commit(mv).map(Some),
            None => Ok(None),
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let (black_count, white_count) = self.board.count();
        GameSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            cells: self.board.to_array(),
            pieces: self.board.pieces().copied().collect(),
            current_player: self.current_player,
            selected: self.selected_piece(),
            forced_piece: self.forced_piece(),
            black_count,
            white_count,
            outcome: self.outcome(),
            revision: self.revision,
        }
    }

    fn moves_for(&self, piece: &Piece) -> Vec<Move> {
        if let Some(forced) = self.forced_piece() {
            return if forced == piece.id {
                movegen::captures(&self.board, piece)
            } else {
                Vec::new()
            };
        }

        let set = movegen::generate(&self.board, piece);
        if !set.has_capture()
            && self.capture_rule == CaptureRule::BoardWide
            && movegen::any_capture(&self.board, piece.owner)
        {
            return Vec::new();
        }
        set.into_legal()
    }

    fn check_movable(&self, piece: &Piece) -> Result<()> {
        if piece.owner != self.current_player {
            return Err(SelectionError::NotYourPiece(piece.id).into());
        }
        if self.moves_for(piece).is_empty() {
            let blocked_by_rule = self.capture_rule == CaptureRule::BoardWide
                && !movegen::generate(&self.board, piece).is_empty();
            return Err(if blocked_by_rule {
                SelectionError::CaptureRequiredElsewhere(piece.id).into()
            } else {
                SelectionError::NoLegalMoves(piece.id).into()
            });
        }
        Ok(())
    }

    /// All validation for a commit. Nothing is mutated here.
    fn checked_move(
        &self,
        piece: &Piece,
        target: Coord,
        matches: impl Fn(&Move) -> bool,
    ) -> Result<Move> {
        if let Some(forced) = self.forced_piece()
            && forced != piece.id
        {
            warn!("commit by piece {} refused: piece {forced} must keep capturing", piece.id);
            return Err(EngineError::ForcedContinuationViolation { forced });
        }
        if piece.owner != self.current_player {
            return Err(SelectionError::NotYourPiece(piece.id).into());
        }

        self.moves_for(piece)
            .into_iter()
            .find(|candidate| matches(candidate))
            .ok_or_else(|| {
                warn!("illegal move by piece {} from {} to {target}", piece.id, piece.coord);
                EngineError::IllegalMove {
                    from: piece.coord,
                    to: target,
                }
            })
    }

    fn apply(&mut self, id: PieceId, mv: Move) -> Result<CommitResult> {
        let captured_piece_id = match mv.captured {
            Some(over) => Some(
                self.board
                    .piece_at(over)
                    .map(|piece| piece.id)
                    .ok_or_else(|| {
                        EngineError::InvariantViolation(format!("no piece to capture on {over}"))
                    })?,
            ),
            None => None,
        };

        self.board.relocate(id, mv.to)?;
        if let Some(captured) = captured_piece_id {
            self.board.remove(captured);
        }

        let promoted = promotion::apply(&mut self.board, id);
        if promoted {
            debug!("piece {id} crowned on {}", mv.to);
        }

        let mover = self.current_player;
        let continuation = if mv.is_capture() {
            capture::resolve(&self.board, id)
        } else {
            Continuation::Closed
        };
        let continuation_required = continuation.is_open();
        if continuation_required {
            self.selection = Selection::ForcedContinuation(id);
        } else {
            self.selection = Selection::Idle;
            self.current_player = mover.opponent();
        }
        self.revision += 1;

        let result = CommitResult {
            piece_id: id,
            mv,
            captured_piece_id,
            promoted,
            continuation_required,
            next_player: self.current_player,
            revision: self.revision,
        };
        debug!("{mover} played {mv} (revision {})", self.revision);
        self.history.push(result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::types::PieceKind;

    fn custom(pieces: &[(i32, i32, Player, PieceKind)], rule: CaptureRule) -> GameState {
        let mut board = Board::empty(8, 8).unwrap();
        for &(x, y, owner, kind) in pieces {
            board.add(Coord::new(x, y), owner, kind).unwrap();
        }
        GameState::with_board(board, Player::Black, rule)
    }

    fn id_at(game: &GameState, x: i32, y: i32) -> PieceId {
        game.board().piece_at(Coord::new(x, y)).unwrap().id
    }

    fn king_chain_position(with_second_victim: bool) -> GameState {
        let mut pieces = vec![
            (2, 4, Player::Black, PieceKind::King),
            (0, 0, Player::Black, PieceKind::Man),
            (3, 5, Player::White, PieceKind::Man),
            (5, 7, Player::White, PieceKind::Man),
        ];
        if with_second_victim {
            pieces.push((5, 5, Player::White, PieceKind::Man));
        }
        custom(&pieces, CaptureRule::PerPiece)
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameState::new(&GameConfig::default()).unwrap();
        let state = game.snapshot();

        assert_eq!(state.current_player, Player::Black);
        assert_eq!(state.black_count, 12);
        assert_eq!(state.white_count, 12);
        assert_eq!(state.outcome, GameOutcome::InProgress);
        assert_eq!(state.selected, None);
        assert_eq!(state.revision, 0);

        let moves: usize = game
            .board()
            .pieces_of(Player::Black)
            .map(|piece| game.legal_moves(piece.id).len())
            .sum();
        assert_eq!(moves, 7);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            width: 7,
            ..GameConfig::default()
        };
        assert!(matches!(
            GameState::new(&config),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn t04_selecting_an_opponent_piece_leaves_state_unchanged() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let before = game.snapshot();
        let white = game.board().pieces_of(Player::White).next().unwrap().id;

        let err = game.select(white).unwrap_err();

        assert_eq!(
            err,
            EngineError::InvalidSelection(SelectionError::NotYourPiece(white))
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn selecting_empty_square_or_blocked_piece_fails() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();

        assert_eq!(
            game.select_at(Coord::new(3, 3)).unwrap_err(),
            EngineError::from(SelectionError::EmptySquare(Coord::new(3, 3)))
        );

        let back_corner = id_at(&game, 0, 0);
        assert_eq!(
            game.select(back_corner).unwrap_err(),
            EngineError::from(SelectionError::NoLegalMoves(back_corner))
        );
        assert_eq!(
            game.select(999).unwrap_err(),
            EngineError::from(SelectionError::UnknownPiece(999))
        );
        assert_eq!(game.selection(), Selection::Idle);
    }

    #[test]
    fn select_then_deselect_returns_to_idle() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let id = id_at(&game, 2, 2);

        game.select(id).unwrap();
        assert_eq!(game.selection(), Selection::Selected(id));
        assert_eq!(game.legal_targets().len(), 2);

        game.deselect().unwrap();
        assert_eq!(game.selection(), Selection::Idle);
        assert!(game.legal_targets().is_empty());
    }

    #[test]
    fn step_passes_the_turn() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let id = id_at(&game, 2, 2);

        let result = game.request_move(id, Coord::new(3, 3)).unwrap();

        assert_eq!(result.mv, Move::step(Coord::new(2, 2), Coord::new(3, 3)));
        assert_eq!(result.captured_piece_id, None);
        assert!(!result.promoted);
        assert!(!result.continuation_required);
        assert_eq!(result.next_player, Player::White);
        assert_eq!(game.current_player(), Player::White);
        assert_eq!(game.revision(), 1);
        assert_eq!(game.history(), &[result]);
        assert!(game.legal_moves(id).is_empty());
    }

    #[test]
    fn t03_man_offers_only_forward_steps() {
        let game = custom(
            &[
                (3, 3, Player::Black, PieceKind::Man),
                (7, 7, Player::White, PieceKind::Man),
            ],
            CaptureRule::PerPiece,
        );

        let mut targets: Vec<Coord> = game
            .legal_moves(id_at(&game, 3, 3))
            .into_iter()
            .map(|mv| mv.to)
            .collect();
        targets.sort();

        assert_eq!(targets, vec![Coord::new(2, 4), Coord::new(4, 4)]);
    }

    #[test]
    fn t01_king_capture_without_follow_up_ends_the_turn() {
        let mut game = king_chain_position(false);
        let king = id_at(&game, 2, 4);
        let victim = id_at(&game, 3, 5);

        let result = game
            .commit(Move::jump(Coord::new(2, 4), Coord::new(3, 5), Coord::new(4, 6)))
            .unwrap();

        assert_eq!(result.piece_id, king);
        assert_eq!(result.captured_piece_id, Some(victim));
        assert!(!result.continuation_required);
        assert_eq!(result.next_player, Player::White);
        assert!(game.board().piece(victim).is_none());
        assert!(game.board().piece_at(Coord::new(3, 5)).is_none());
        assert_eq!(game.forced_piece(), None);
    }

    #[test]
    fn t02_open_chain_locks_the_turn_to_the_capturing_piece() {
        let mut game = king_chain_position(true);
        let king = id_at(&game, 2, 4);
        let other = id_at(&game, 0, 0);

        let result = game
            .commit(Move::jump(Coord::new(2, 4), Coord::new(3, 5), Coord::new(4, 6)))
            .unwrap();

        assert!(result.continuation_required);
        assert_eq!(result.next_player, Player::Black);
        assert_eq!(game.current_player(), Player::Black);
        assert_eq!(game.selection(), Selection::ForcedContinuation(king));
        assert_eq!(
            game.legal_moves(king),
            vec![Move::jump(Coord::new(4, 6), Coord::new(5, 5), Coord::new(6, 4))]
        );
        assert!(game.legal_moves(other).is_empty());

        let before = game.snapshot();
        let forced = EngineError::ForcedContinuationViolation { forced: king };
        assert_eq!(game.select(other).unwrap_err(), forced);
        assert_eq!(game.select_at(Coord::new(1, 1)).unwrap_err(), forced);
        assert_eq!(game.deselect().unwrap_err(), forced);
        assert_eq!(
            game.commit(Move::step(Coord::new(0, 0), Coord::new(1, 1)))
                .unwrap_err(),
            forced
        );
        assert_eq!(game.snapshot(), before);

        game.select(king).unwrap();
        let last = game.request_move(king, Coord::new(6, 4)).unwrap();
        assert!(!last.continuation_required);
        assert_eq!(game.current_player(), Player::White);
        assert_eq!(game.board().count(), (2, 1));
    }

    #[test]
    fn t05_legal_moves_after_a_jump_reflect_the_new_square() {
        let mut game = custom(
            &[
                (1, 1, Player::Black, PieceKind::Man),
                (2, 2, Player::White, PieceKind::Man),
                (4, 4, Player::White, PieceKind::Man),
                (2, 4, Player::White, PieceKind::Man),
            ],
            CaptureRule::PerPiece,
        );
        let id = id_at(&game, 1, 1);

        let result = game.request_move(id, Coord::new(3, 3)).unwrap();
        assert!(result.continuation_required);

        let moves = game.legal_moves(id);
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|mv| mv.from == Coord::new(3, 3) && mv.is_capture()));
        assert!(moves.iter().all(|mv| mv.captured != Some(Coord::new(2, 2))));
    }

    #[test]
    fn t06_promotion_mid_chain_grants_backward_captures() {
        let mut game = custom(
            &[
                (3, 5, Player::Black, PieceKind::Man),
                (4, 6, Player::White, PieceKind::Man),
                (6, 6, Player::White, PieceKind::Man),
            ],
            CaptureRule::PerPiece,
        );
        let id = id_at(&game, 3, 5);

        let result = game.request_move(id, Coord::new(5, 7)).unwrap();

        assert!(result.promoted);
        assert!(result.continuation_required);
        assert!(game.board().piece(id).unwrap().is_king());
        assert_eq!(
            game.legal_moves(id),
            vec![Move::jump(Coord::new(5, 7), Coord::new(6, 6), Coord::new(7, 5))]
        );

        let last = game.request_move(id, Coord::new(7, 5)).unwrap();
        assert!(!last.promoted);
        assert!(game.board().piece(id).unwrap().is_king());
        assert_eq!(game.outcome(), GameOutcome::Won(Player::Black));
    }

    #[test]
    fn step_is_illegal_while_the_piece_can_capture() {
        let mut game = custom(
            &[
                (2, 2, Player::Black, PieceKind::Man),
                (3, 3, Player::White, PieceKind::Man),
            ],
            CaptureRule::PerPiece,
        );
        let before = game.snapshot();

        let err = game
            .commit(Move::step(Coord::new(2, 2), Coord::new(1, 3)))
            .unwrap_err();

        assert_eq!(
            err,
            EngineError::IllegalMove {
                from: Coord::new(2, 2),
                to: Coord::new(1, 3)
            }
        );
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn commit_from_an_empty_square_is_illegal() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();

        let err = game
            .commit(Move::step(Coord::new(3, 3), Coord::new(4, 4)))
            .unwrap_err();

        assert!(matches!(err, EngineError::IllegalMove { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn stale_revision_is_fatal() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let stale = game.revision();
        game.commit(Move::step(Coord::new(2, 2), Coord::new(3, 3)))
            .unwrap();
        let before = game.snapshot();

        let err = game
            .commit_at(stale, Move::step(Coord::new(3, 5), Coord::new(2, 4)))
            .unwrap_err();

        assert!(err.is_fatal());
        assert_eq!(game.snapshot(), before);
        assert!(
            game.commit_at(game.revision(), Move::step(Coord::new(3, 5), Coord::new(2, 4)))
                .is_ok()
        );
    }

    #[test]
    fn board_wide_rule_restricts_selection_to_capturing_pieces() {
        let pieces = [
            (0, 2, Player::Black, PieceKind::Man),
            (4, 2, Player::Black, PieceKind::Man),
            (5, 3, Player::White, PieceKind::Man),
        ];
        let mut strict = custom(&pieces, CaptureRule::BoardWide);
        let idle = id_at(&strict, 0, 2);
        let capturer = id_at(&strict, 4, 2);

        assert_eq!(
            strict.select(idle).unwrap_err(),
            EngineError::from(SelectionError::CaptureRequiredElsewhere(idle))
        );
        assert!(strict.legal_moves(idle).is_empty());
        assert!(strict.select(capturer).is_ok());

        let mut relaxed = custom(&pieces, CaptureRule::PerPiece);
        assert!(relaxed.select(idle).is_ok());
        assert_eq!(relaxed.legal_moves(capturer).len(), 1);
    }

    #[test]
    fn player_without_moves_has_lost() {
        let game = custom(
            &[
                (0, 6, Player::Black, PieceKind::Man),
                (1, 7, Player::White, PieceKind::Man),
                (7, 7, Player::White, PieceKind::Man),
            ],
            CaptureRule::PerPiece,
        );

        // Black (0,6) is blocked by (1,7); the jump would leave the board.
        assert!(!game.has_any_legal_move(Player::Black));
        assert!(game.has_any_legal_move(Player::White));
        assert_eq!(game.outcome(), GameOutcome::Won(Player::White));
    }

    #[test]
    fn per_piece_rule_offers_exactly_the_generator_moves() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();

        for _ in 0..60 {
            if game.forced_piece().is_none() {
                for piece in game.board().pieces_of(game.current_player()) {
                    assert_eq!(
                        game.legal_moves(piece.id),
                        movegen::legal_moves(game.board(), piece)
                    );
                }
            }
            if game.play_selected(&FirstLegalMoveSelector).unwrap().is_none() {
                break;
            }
        }
    }

    #[test]
    fn first_legal_selector_plays_a_consistent_game() {
        let mut game = GameState::new(&GameConfig::default()).unwrap();
        let mut kings: HashSet<PieceId> = HashSet::new();

        for _ in 0..300 {
            if game.outcome() != GameOutcome::InProgress {
                break;
            }
            let mover = game.current_player();
            let Some(result) = game.play_selected(&FirstLegalMoveSelector).unwrap() else {
                break;
            };

            let squares: HashSet<Coord> = game.board().pieces().map(|p| p.coord).collect();
            assert_eq!(squares.len(), game.board().pieces().count());

            for id in &kings {
                if let Some(piece) = game.board().piece(*id) {
                    assert!(piece.is_king());
                }
            }
            kings.extend(game.board().pieces().filter(|p| p.is_king()).map(|p| p.id));

            if result.promoted {
                assert!(game.board().piece(result.piece_id).unwrap().is_king());
            }
            if result.continuation_required {
                assert_eq!(game.current_player(), mover);
                assert!(
                    game.legal_moves(result.piece_id)
                        .iter()
                        .all(|mv| mv.is_capture())
                );
            } else {
                assert_eq!(game.current_player(), mover.opponent());
            }
        }

        assert!(!game.history().is_empty());
        assert_eq!(game.history().len() as u64, game.revision());
    }
}
