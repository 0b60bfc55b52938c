use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{rank_of, BitboardIterator, Bitboard, PieceKind, Side};
use crate::logic::eval_constants::{
    pst_index, PST_BISHOP, PST_KING, PST_KING_ENDGAME, PST_KNIGHT, PST_PAWN,
};
use crate::logic::lookup::PawnMasks;
use crate::logic::oracle::PositionOracle;
use std::collections::HashMap;
use std::sync::Arc;

/// Hand-tuned positional evaluator.
///
/// Pawn structure is scored once per pawn hash and kept in a private cache,
/// so an evaluator belongs to a single search task.
pub struct StaticEvaluator {
    config: Arc<EngineConfig>,
    pawn_cache: HashMap<u64, i32>,
}

impl StaticEvaluator {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            config,
            pawn_cache: HashMap::new(),
        }
    }

    pub fn pawn_cache_len(&self) -> usize {
        self.pawn_cache.len()
    }

    /// Score from White's point of view.
    pub fn white_relative<O: PositionOracle>(&mut self, pos: &O) -> i32 {
        let white_pawns = pos.pieces(Side::White, PieceKind::Pawn);
        let black_pawns = pos.pieces(Side::Black, PieceKind::Pawn);

        let key = pos.pawn_hash();
        let mut score = if let Some(&cached) = self.pawn_cache.get(&key) {
            cached
        } else {
            let pawns = self.pawn_side(Side::White, white_pawns, black_pawns)
                - self.pawn_side(Side::Black, black_pawns, white_pawns);
            self.pawn_cache.insert(key, pawns);
            pawns
        };

        let side = pos.side_to_move();
        score += side.sign() * self.config.tempo;
        if pos.in_check() {
            score -= side.sign() * self.config.check_penalty;
        }

        score += self.king(pos, Side::White, white_pawns) - self.king(pos, Side::Black, black_pawns);
        score += self.pieces(pos, Side::White) - self.pieces(pos, Side::Black);
        score
    }

    fn pawn_side(&self, side: Side, own: Bitboard, enemy: Bitboard) -> i32 {
        let masks = PawnMasks::get();
        let s = side.index();
        let cfg = &self.config;
        let mut score = 0;

        for sq in BitboardIterator::new(own) {
            score += cfg.val_pawn + table(&PST_PAWN, side, sq);

            if own & masks.adjacent_files[sq] == 0 {
                score += cfg.pawn_isolated;
            }
            if enemy & masks.front_file[s][sq] == 0 {
                score += cfg.pawn_open;
                if enemy & masks.front_span[s][sq] == 0 {
                    score += cfg.pawn_passed;
                }
            }
            if own & masks.defenders[s][sq] != 0 {
                score += cfg.pawn_defended;
            }
            if own & masks.rear_span[s][sq] == 0 {
                score += cfg.pawn_backward;
            }
        }
        score
    }

    fn king<O: PositionOracle>(&self, pos: &O, side: Side, own_pawns: Bitboard) -> i32 {
        let Some(sq) = BitboardIterator::new(pos.pieces(side, PieceKind::King)).next() else {
            return 0;
        };
        if self.config.endgame {
            return table(&PST_KING_ENDGAME, side, sq);
        }
        let shield = (own_pawns & PawnMasks::get().king_shield[side.index()][sq]).count_ones();
        let bonus = self.config.king_shield;
        let shield_bonus = bonus
            .get(shield as usize)
            .or_else(|| bonus.last())
            .copied()
            .unwrap_or(0);
        table(&PST_KING, side, sq) + shield_bonus
    }

    fn pieces<O: PositionOracle>(&self, pos: &O, side: Side) -> i32 {
        let cfg = &self.config;
        let mut score = 0;

        for (i, sq) in BitboardIterator::new(pos.pieces(side, PieceKind::Knight)).enumerate() {
            if i > 0 {
                score += cfg.pair_knight;
            }
            score += cfg.val_knight + table(&PST_KNIGHT, side, sq);
        }

        for (i, sq) in BitboardIterator::new(pos.pieces(side, PieceKind::Bishop)).enumerate() {
            if i > 0 {
                score += cfg.pair_bishop;
            }
            score += cfg.val_bishop + table(&PST_BISHOP, side, sq);
        }

        let seventh = match side {
            Side::White => 6,
            Side::Black => 1,
        };
        let mut previous: Option<usize> = None;
        for sq in BitboardIterator::new(pos.pieces(side, PieceKind::Rook)) {
            if let Some(prev) = previous {
                score += cfg.pair_rook;
                // Connected: shares a file or rank with the previous rook.
                if prev & 7 == sq & 7 || rank_of(prev) == rank_of(sq) {
                    score += cfg.rook_connected;
                }
            }
            if rank_of(sq) == seventh {
                score += cfg.rook_seventh;
            }
            score += cfg.val_rook;
            previous = Some(sq);
        }

        let queens = pos.pieces(side, PieceKind::Queen).count_ones();
        score += cfg.val_queen * i32::try_from(queens).unwrap_or(0);
        score
    }
}

fn table(pst: &[i32; 64], side: Side, sq: usize) -> i32 {
    pst.get(pst_index(side, sq)).copied().unwrap_or(0)
}

impl<O: PositionOracle> Evaluator<O> for StaticEvaluator {
    fn evaluate(&mut self, pos: &O) -> i32 {
        self.white_relative(pos) * pos.side_to_move().sign()
    }
}
