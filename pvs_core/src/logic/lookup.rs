use crate::logic::board::{file_of, rank_of, Bitboard, Side};
use std::sync::OnceLock;

const FILE_A: Bitboard = 0x0101_0101_0101_0101;

/// Pawn-structure and king-zone masks, indexed `[side][square]` where the
/// side matters.
pub struct PawnMasks {
    /// Both neighbouring files, every rank.
    pub adjacent_files: [Bitboard; 64],
    /// Same file, ranks in front.
    pub front_file: [[Bitboard; 64]; 2],
    /// Own and neighbouring files, ranks in front.
    pub front_span: [[Bitboard; 64]; 2],
    /// Own and neighbouring files, ranks behind.
    pub rear_span: [[Bitboard; 64]; 2],
    /// Squares a friendly pawn would defend this square from.
    pub defenders: [[Bitboard; 64]; 2],
    /// Two ranks in front of the king, one file either side.
    pub king_shield: [[Bitboard; 64]; 2],
}

impl PawnMasks {
    fn new() -> Self {
        let mut masks = Self {
            adjacent_files: [0; 64],
            front_file: [[0; 64]; 2],
            front_span: [[0; 64]; 2],
            rear_span: [[0; 64]; 2],
            defenders: [[0; 64]; 2],
            king_shield: [[0; 64]; 2],
        };

        for sq in 0..64 {
            let file = file_of(sq);
            let files = span_files(file);
            masks.adjacent_files[sq] = files & !(FILE_A << file);

            for side in [Side::White, Side::Black] {
                let s = side.index();
                let ahead = ranks_ahead(side, rank_of(sq));
                let behind = ranks_ahead(side.opposite(), rank_of(sq));

                masks.front_file[s][sq] = (FILE_A << file) & ahead;
                masks.front_span[s][sq] = files & ahead;
                masks.rear_span[s][sq] = files & behind;
                masks.defenders[s][sq] = files & !(FILE_A << file) & next_rank(side.opposite(), sq);
                masks.king_shield[s][sq] =
                    files & (next_rank(side, sq) | two_ranks_ahead(side, sq));
            }
        }

        masks
    }

    pub fn get() -> &'static Self {
        static INSTANCE: OnceLock<PawnMasks> = OnceLock::new();
        INSTANCE.get_or_init(PawnMasks::new)
    }
}

fn span_files(file: usize) -> Bitboard {
    let mut files = FILE_A << file;
    if file > 0 {
        files |= FILE_A << (file - 1);
    }
    if file < 7 {
        files |= FILE_A << (file + 1);
    }
    files
}

const fn rank_mask(rank: usize) -> Bitboard {
    0xFF << (rank * 8)
}

fn ranks_ahead(side: Side, rank: usize) -> Bitboard {
    match side {
        Side::White => ((rank + 1)..8).fold(0, |acc, r| acc | rank_mask(r)),
        Side::Black => (0..rank).fold(0, |acc, r| acc | rank_mask(r)),
    }
}

fn next_rank(side: Side, sq: usize) -> Bitboard {
    let rank = rank_of(sq);
    match side {
        Side::White if rank < 7 => rank_mask(rank + 1),
        Side::Black if rank > 0 => rank_mask(rank - 1),
        _ => 0,
    }
}

fn two_ranks_ahead(side: Side, sq: usize) -> Bitboard {
    let rank = rank_of(sq);
    match side {
        Side::White if rank < 6 => rank_mask(rank + 2),
        Side::Black if rank > 1 => rank_mask(rank - 2),
        _ => 0,
    }
}
