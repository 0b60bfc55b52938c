use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{Bitboard, PieceKind, Side};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("invalid FEN: {fen}")]
    InvalidFen { fen: String },
    #[error("unknown tree node {id}")]
    UnknownNode { id: usize },
}

/// Board-side collaborator the search drives.
///
/// Every implementation owns its own position and is mutated by make/unmake
/// pairs. Move lists come back pre-scored for ordering.
pub trait PositionOracle: Sized {
    /// Self-contained description of a position, handed across threads.
    type Snapshot: Clone + Send + 'static;

    /// All legal moves, captures first.
    fn generate_moves(&self) -> MoveList {
        let mut moves = self.generate_captures();
        moves.extend(&self.generate_quiet_moves());
        moves
    }

    /// Captures, en-passant captures and promotions.
    fn generate_captures(&self) -> MoveList;

    fn generate_quiet_moves(&self) -> MoveList;

    /// Returns `false` when the move could not be played. The position is
    /// still pushed so that the matching `unmake_move` stays balanced.
    fn make_move(&mut self, mv: &Move) -> bool;

    fn unmake_move(&mut self);

    fn make_null_move(&mut self);

    fn unmake_null_move(&mut self);

    fn position_hash(&self) -> u64;

    fn pawn_hash(&self) -> u64;

    fn side_to_move(&self) -> Side;

    fn in_check(&self) -> bool;

    fn pieces(&self, side: Side, kind: PieceKind) -> Bitboard;

    fn snapshot(&self) -> Self::Snapshot;

    fn from_snapshot(snapshot: &Self::Snapshot) -> Result<Self, OracleError>;

    fn move_label(&self, mv: &Move) -> String {
        mv.to_string()
    }
}
