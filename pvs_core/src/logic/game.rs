use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{Bitboard, PieceKind, Side};
use crate::logic::generator::{
    chess_color, chess_piece, generate_captures, generate_quiet_moves, side_of,
};
use crate::logic::oracle::{OracleError, PositionOracle};
use chess::{Board, ChessMove, ALL_SQUARES, EMPTY};
use std::str::FromStr;

/// Position oracle over the `chess` crate, copy-make style.
#[derive(Debug, Clone)]
pub struct ChessOracle {
    current: Board,
    history: Vec<Board>,
}

impl ChessOracle {
    pub fn new(board: Board) -> Self {
        Self {
            current: board,
            history: Vec::with_capacity(128),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, OracleError> {
        Board::from_str(fen)
            .map(Self::new)
            .map_err(|_| OracleError::InvalidFen {
                fen: fen.to_string(),
            })
    }

    pub fn fen(&self) -> String {
        self.current.to_string()
    }

    /// Number of positions below the current one.
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    fn to_chess_move(mv: &Move) -> Option<ChessMove> {
        let src = ALL_SQUARES.get(usize::from(mv.from)).copied()?;
        let dest = ALL_SQUARES.get(usize::from(mv.to)).copied()?;
        Some(ChessMove::new(src, dest, mv.promotion.map(chess_piece)))
    }
}

impl PositionOracle for ChessOracle {
    type Snapshot = String;

    fn generate_captures(&self) -> MoveList {
        generate_captures(&self.current)
    }

    fn generate_quiet_moves(&self) -> MoveList {
        generate_quiet_moves(&self.current)
    }

    fn make_move(&mut self, mv: &Move) -> bool {
        self.history.push(self.current);
        match Self::to_chess_move(mv) {
            Some(cm) if self.current.legal(cm) => {
                self.current = self.current.make_move_new(cm);
                true
            }
            _ => false,
        }
    }

    fn unmake_move(&mut self) {
        if let Some(previous) = self.history.pop() {
            self.current = previous;
        }
    }

    fn make_null_move(&mut self) {
        self.history.push(self.current);
        if let Some(next) = self.current.null_move() {
            self.current = next;
        } else {
            log::warn!("null move requested while in check: {}", self.current);
        }
    }

    fn unmake_null_move(&mut self) {
        self.unmake_move();
    }

    fn position_hash(&self) -> u64 {
        self.current.get_hash()
    }

    fn pawn_hash(&self) -> u64 {
        self.current.get_pawn_hash()
    }

    fn side_to_move(&self) -> Side {
        side_of(self.current.side_to_move())
    }

    fn in_check(&self) -> bool {
        *self.current.checkers() != EMPTY
    }

    fn pieces(&self, side: Side, kind: PieceKind) -> Bitboard {
        (*self.current.pieces(chess_piece(kind)) & *self.current.color_combined(chess_color(side))).0
    }

    fn snapshot(&self) -> String {
        self.fen()
    }

    fn from_snapshot(snapshot: &String) -> Result<Self, OracleError> {
        Self::from_fen(snapshot)
    }
}
