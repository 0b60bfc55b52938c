use crate::logic::board::{PieceKind, Side};

// Piece Values
pub const VAL_PAWN: i32 = 100;
pub const VAL_KNIGHT: i32 = 320;
pub const VAL_BISHOP: i32 = 370;
pub const VAL_ROOK: i32 = 600;
pub const VAL_QUEEN: i32 = 1100;

pub const PAIR_KNIGHT: i32 = 10;
pub const PAIR_BISHOP: i32 = 30;
pub const PAIR_ROOK: i32 = 40;

pub const PAWN_OPEN: i32 = 15;
pub const PAWN_PASSED: i32 = 40;
pub const PAWN_DEFENDED: i32 = 15;
pub const PAWN_BACKWARD: i32 = -15;
pub const PAWN_ISOLATED: i32 = -25;

pub const ROOK_SEVENTH: i32 = 20;
pub const ROOK_CONNECTED: i32 = 10;

pub const TEMPO: i32 = 10;
pub const CHECK_PENALTY: i32 = 30;

/// Indexed by the number of own pawns in the king's shield zone.
pub const KING_SHIELD: [i32; 6] = [5, 10, 30, 30, 35, 40];

/// Exchange values used by quiescence pruning and capture ordering,
/// indexed by `PieceKind::index()` (slot 0 unused).
pub const CAPTURE_VALUES: [i32; 7] = [0, 100, 320, 340, 500, 975, 10000];

// Piece-Square Tables, laid out as seen from White: first row is rank 8.
// White reads them at `sq ^ 56`, Black at `sq`.

#[rustfmt::skip]
pub const PST_PAWN: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    20, 20, 30, 40, 40, 30, 20, 20,
     5,  5, 10, 30, 30, 10,  5,  5,
     0,  0,  0, 25, 25,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-30,-30, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
pub const PST_KNIGHT: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-30,-20,-30,-30,-20,-30,-50,
];

#[rustfmt::skip]
pub const PST_BISHOP: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-40,-10,-10,-40,-10,-20,
];

#[rustfmt::skip]
pub const PST_KING: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
pub const PST_KING_ENDGAME: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

/// Index into a White-oriented table for a piece of `side` on `sq` (a1 = 0).
pub const fn pst_index(side: Side, sq: usize) -> usize {
    match side {
        Side::White => (sq ^ 56) & 63,
        Side::Black => sq & 63,
    }
}

/// Table entry for ordering purposes. Rooks and queens have no table.
pub fn get_pst_value(kind: PieceKind, side: Side, sq: usize) -> i32 {
    let table = match kind {
        PieceKind::Pawn => &PST_PAWN,
        PieceKind::Knight => &PST_KNIGHT,
        PieceKind::Bishop => &PST_BISHOP,
        PieceKind::King => &PST_KING,
        PieceKind::Rook | PieceKind::Queen => return 0,
    };
    table.get(pst_index(side, sq)).copied().unwrap_or(0)
}

pub fn capture_value(kind: PieceKind) -> i32 {
    CAPTURE_VALUES.get(kind.index()).copied().unwrap_or(0)
}
