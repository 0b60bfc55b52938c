use crate::engine::move_list::MoveList;
use crate::engine::Move;
use crate::logic::board::{PieceKind, Side};
use crate::logic::eval_constants::{capture_value, get_pst_value};
use chess::{Board, ChessMove, Color, MoveGen, Piece, EMPTY};

pub const fn piece_kind(piece: Piece) -> PieceKind {
    match piece {
        Piece::Pawn => PieceKind::Pawn,
        Piece::Knight => PieceKind::Knight,
        Piece::Bishop => PieceKind::Bishop,
        Piece::Rook => PieceKind::Rook,
        Piece::Queen => PieceKind::Queen,
        Piece::King => PieceKind::King,
    }
}

pub const fn chess_piece(kind: PieceKind) -> Piece {
    match kind {
        PieceKind::Pawn => Piece::Pawn,
        PieceKind::Knight => Piece::Knight,
        PieceKind::Bishop => Piece::Bishop,
        PieceKind::Rook => Piece::Rook,
        PieceKind::Queen => Piece::Queen,
        PieceKind::King => Piece::King,
    }
}

pub const fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

pub const fn chess_color(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::Black,
    }
}

/// Legal captures (en passant included) and promotions, MVV-LVA scored.
pub fn generate_captures(board: &Board) -> MoveList {
    let mut moves = MoveList::new();
    for cm in MoveGen::new_legal(board) {
        let mv = describe(board, cm);
        if mv.is_capture() || mv.is_promotion() {
            moves.push(mv);
        }
    }
    moves
}

/// Legal non-capturing, non-promoting moves, scored by piece-square gain.
pub fn generate_quiet_moves(board: &Board) -> MoveList {
    let mut moves = MoveList::new();
    for cm in MoveGen::new_legal(board) {
        let mv = describe(board, cm);
        if !mv.is_capture() && !mv.is_promotion() {
            moves.push(mv);
        }
    }
    moves
}

#[allow(clippy::cast_possible_truncation)]
fn describe(board: &Board, cm: ChessMove) -> Move {
    let src = cm.get_source();
    let dest = cm.get_dest();
    let us = board.side_to_move();
    let attacker = board.piece_on(src).map_or(PieceKind::Pawn, piece_kind);

    let mut captured = board.piece_on(dest).map(piece_kind);
    // En passant: a pawn changing file onto an empty square.
    if captured.is_none() && attacker == PieceKind::Pawn && src.get_file() != dest.get_file() {
        captured = Some(PieceKind::Pawn);
    }
    let promotion = cm.get_promotion().map(piece_kind);

    let mut mv = Move {
        from: src.to_index() as u8,
        to: dest.to_index() as u8,
        promotion,
        captured,
        bad_capture: false,
        score: 0,
    };

    if let Some(victim) = captured {
        let victim_value = capture_value(victim);
        let attacker_value = capture_value(attacker);
        mv.score = victim_value * 10 - attacker_value;
        if attacker_value > victim_value {
            let enemy_pawns = *board.pieces(Piece::Pawn) & *board.color_combined(!us);
            mv.bad_capture = chess::get_pawn_attacks(dest, us, enemy_pawns) != EMPTY;
        }
    }
    if let Some(kind) = promotion {
        mv.score += capture_value(kind);
    }
    if !mv.is_capture() && !mv.is_promotion() {
        let side = side_of(us);
        mv.score = get_pst_value(attacker, side, dest.to_index())
            - get_pst_value(attacker, side, src.to_index());
    }
    mv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn test_split_covers_all_legal_moves() {
        let b = board("r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/5N2/PPP2PPP/RNBQKB1R b KQkq - 0 3");
        let captures = generate_captures(&b);
        let quiets = generate_quiet_moves(&b);
        assert_eq!(captures.len() + quiets.len(), MoveGen::new_legal(&b).len());
        assert!(captures.iter().all(Move::is_capture));
        assert!(quiets.iter().all(|mv| !mv.is_capture()));
    }

    #[test]
    fn test_mvv_lva_prefers_cheap_attacker() {
        // Pawn and queen can both take the rook on d5.
        let b = board("4k3/8/8/3r4/4P3/8/8/3QK3 w - - 0 1");
        let captures = generate_captures(&b);
        let by_pawn = captures.iter().find(|mv| mv.from == 28).map(|mv| mv.score);
        let by_queen = captures.iter().find(|mv| mv.from == 3).map(|mv| mv.score);
        assert_eq!(by_pawn, Some(500 * 10 - 100));
        assert_eq!(by_queen, Some(500 * 10 - 975));
    }

    #[test]
    fn test_bad_capture_flag() {
        // Queen takes a knight defended by a pawn.
        let b = board("4k3/2p5/3n4/8/8/8/8/3QK3 w - - 0 1");
        let captures = generate_captures(&b);
        let qxd6 = captures.iter().find(|mv| mv.to == 43);
        assert_eq!(qxd6.map(|mv| mv.bad_capture), Some(true));
        assert_eq!(qxd6.and_then(|mv| mv.captured), Some(PieceKind::Knight));
    }

    #[test]
    fn test_en_passant_is_a_capture() {
        let b = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let captures = generate_captures(&b);
        let ep = captures.iter().find(|mv| mv.from == 36 && mv.to == 43);
        assert_eq!(ep.and_then(|mv| mv.captured), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_promotions_are_in_capture_phase() {
        let b = board("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let captures = generate_captures(&b);
        assert_eq!(captures.len(), 4);
        let best = captures.picker().next();
        assert_eq!(best.and_then(|mv| mv.promotion), Some(PieceKind::Queen));
    }
}
