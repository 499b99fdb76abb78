use chess::{BitBoard, Board, Color, File, Piece, Rank, Square};

/// Desirability of a position. Positive favors the maximizing side.
pub type Score = f64;

// ---------------------------
// Reserved score bands
// ---------------------------
// MATE_SCORE > NEAR_MATE_SCORE > any additive heuristic sum > |DRAW_SCORE|
pub const MATE_SCORE: Score = 10_000.0;
pub const NEAR_MATE_SCORE: Score = 1_000.0;
pub const DRAW_SCORE: Score = -2.0;

pub const DEFAULT_DEPTH: u32 = 3;
pub const MAX_SEARCH_DEPTH: u32 = 8;

// ---------------------------
// Tunables / weights
// ---------------------------
pub const MATERIAL_SCALE: Score = 0.2;
pub const PST_SCALE: Score = 0.1;
pub const CENTER_BONUS: Score = 0.1;
pub const BISHOP_PAIR_BONUS: Score = 0.3;
pub const TEMPO_BONUS: Score = 0.5;

// Weights applied to the composite terms, in summation order.
pub const PAWN_STRUCTURE_WEIGHT: Score = 0.2;
pub const MOBILITY_WEIGHT: Score = 0.2;
pub const KING_SAFETY_WEIGHT: Score = 0.2;
pub const CHECK_POTENTIAL_WEIGHT: Score = 0.5;

// Pawn structure
pub const DOUBLED_PAWN_PENALTY: Score = 0.5;
pub const ISOLATED_PAWN_PENALTY: Score = 0.3;
pub const PASSED_PAWN_BONUS: Score = 0.6;
pub const PASSED_PAWN_ADVANCE_STEP: Score = 0.1;
pub const PAWN_CHAIN_BONUS: Score = 0.4;

// Mobility / checking potential
pub const MOBILITY_SCALE: Score = 0.1;
pub const CHECK_MOVE_SCALE: Score = 0.2;

// King safety
pub const KINGSIDE_CASTLE_BONUS: Score = 0.4;
pub const QUEENSIDE_CASTLE_BONUS: Score = 0.2;
pub const KING_CORNER_BONUS: Score = 0.2;
pub const SHIELD_PAWN_ON_FILE: Score = 1.5;
pub const SHIELD_PAWN_ADJACENT: Score = 1.0;
pub const KING_DEFENDER_BONUS: Score = 0.1;
pub const KING_SAFETY_SCALE: Score = 0.2;
pub const KING_OPEN_FILE_PENALTY: Score = 0.3;
pub const DIRECT_CHECK_BONUS: Score = 0.5;

// Move ordering
pub const ORDER_CHECK_BONUS: i32 = 1;

pub const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

pub const ALL_PIECES: [Piece; 6] = [
    Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King,
];

// ---------------------------
// Piece-square tables
// ---------------------------
// Laid out as a diagram seen from White: index 0 is a8, index 63 is h1.
// Use `pst_index_for` to map a square of either color onto them.
pub const PST_PAWN: [Score; 64] = [
    0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,
    5.0,  5.0,  5.0,  5.0,  5.0,  5.0,  5.0,  5.0,
    1.0,  1.0,  2.0,  3.0,  3.0,  2.0,  1.0,  1.0,
    0.0,  0.0,  0.0,  4.0,  4.0,  0.0,  0.0,  0.0,
    0.0,  0.0,  0.0,  5.0,  5.0,  0.0,  0.0,  0.0,
    1.0, -1.0, -1.0,  2.0,  2.0, -1.0, -1.0,  1.0,
    1.0,  2.0,  2.0, -2.0, -2.0,  2.0,  2.0,  1.0,
    0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,
];

pub const PST_KNIGHT: [Score; 64] = [
   -5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0,
   -4.0, -2.0,  0.0,  0.0,  0.0,  0.0, -2.0, -4.0,
   -3.0,  0.0,  1.0,  1.5,  1.5,  1.0,  0.0, -3.0,
   -3.0,  0.5,  1.5,  2.0,  2.0,  1.5,  0.5, -3.0,
   -3.0,  0.0,  1.5,  2.0,  2.0,  1.5,  0.0, -3.0,
   -3.0,  0.5,  1.0,  1.5,  1.5,  1.0,  0.5, -3.0,
   -4.0, -2.0,  0.0,  0.5,  0.5,  0.0, -2.0, -4.0,
   -5.0, -4.0, -3.0, -3.0, -3.0, -3.0, -4.0, -5.0,
];

pub const PST_BISHOP: [Score; 64] = [
   -2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0,
   -1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0,
   -1.0,  0.0,  0.5,  1.0,  1.0,  0.5,  0.0, -1.0,
   -1.0,  0.5,  0.5,  1.0,  1.0,  0.5,  0.5, -1.0,
   -1.0,  0.0,  1.0,  1.0,  1.0,  1.0,  0.0, -1.0,
   -1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0, -1.0,
   -1.0,  0.5,  0.0,  0.0,  0.0,  0.0,  0.5, -1.0,
   -2.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -2.0,
];

pub const PST_ROOK: [Score; 64] = [
    0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0,
    0.5,  1.0,  1.0,  1.0,  1.0,  1.0,  1.0,  0.5,
   -0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5,
   -0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5,
   -0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5,
   -0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5,
   -0.5,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -0.5,
    0.0,  0.0,  0.0,  0.5,  0.5,  0.0,  0.0,  0.0,
];

pub const PST_QUEEN: [Score; 64] = [
   -2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0,
   -1.0,  0.0,  0.0,  0.0,  0.0,  0.0,  0.0, -1.0,
   -1.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0,
   -0.5,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5,
    0.0,  0.0,  0.5,  0.5,  0.5,  0.5,  0.0, -0.5,
   -1.0,  0.5,  0.5,  0.5,  0.5,  0.5,  0.0, -1.0,
   -1.0,  0.0,  0.5,  0.0,  0.0,  0.0,  0.0, -1.0,
   -2.0, -1.0, -1.0, -0.5, -0.5, -1.0, -1.0, -2.0,
];

pub const PST_KING_MG: [Score; 64] = [
   -3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0,
   -3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0,
   -3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0,
   -3.0, -4.0, -4.0, -5.0, -5.0, -4.0, -4.0, -3.0,
   -2.0, -3.0, -3.0, -4.0, -4.0, -3.0, -3.0, -2.0,
   -1.0, -2.0, -2.0, -2.0, -2.0, -2.0, -2.0, -1.0,
    2.0,  2.0,  0.0,  0.0,  0.0,  0.0,  2.0,  2.0,
    2.0,  3.0,  1.0,  0.0,  0.0,  1.0,  3.0,  2.0,
];

// ---------------------------
// PST helpers
// ---------------------------
#[inline] pub fn pst_for(piece: Piece, idx: usize) -> Score {
    match piece {
        Piece::Pawn => PST_PAWN[idx],
        Piece::Knight => PST_KNIGHT[idx],
        Piece::Bishop => PST_BISHOP[idx],
        Piece::Rook => PST_ROOK[idx],
        Piece::Queen => PST_QUEEN[idx],
        Piece::King => PST_KING_MG[idx],
    }
}
#[inline] pub fn pst_index_for(color: Color, sq: Square) -> usize {
    let i = sq.to_index();
    if color == Color::White { i ^ 56 } else { i }
}

// ---------------------------
// Small helpers
// ---------------------------
/// Material value in pawns. The bishop is worth slightly more than the knight.
#[inline] pub fn material_value(pc: Piece) -> Score {
    match pc {
        Piece::Pawn => 1.0, Piece::Knight => 3.0, Piece::Bishop => 3.1,
        Piece::Rook => 5.0, Piece::Queen => 9.0, Piece::King => 0.0,
    }
}
/// Capture value used by move ordering (minor pieces are equal here).
#[inline] pub fn capture_value(pc: Piece) -> i32 {
    match pc {
        Piece::Pawn => 1, Piece::Knight | Piece::Bishop => 3,
        Piece::Rook => 5, Piece::Queen => 9, Piece::King => 0,
    }
}
#[inline] pub fn opp(c: Color) -> Color { !c }

/// +1 for the maximizing side's pieces, -1 for the opponent's.
#[inline] pub fn sign_for(color: Color, maximizing: Color) -> Score {
    if color == maximizing { 1.0 } else { -1.0 }
}

#[inline] pub fn file_idx(sq: Square) -> i32 { sq.get_file().to_index() as i32 }
#[inline] pub fn rank_idx(sq: Square) -> i32 { sq.get_rank().to_index() as i32 }

#[inline] pub fn relative_rank(color: Color, sq: Square) -> i32 {
    let r = rank_idx(sq);
    if color == Color::White { r } else { 7 - r }
}

/// Square at (file, rank), or `None` off the board.
#[inline] pub fn square_at(file: i32, rank: i32) -> Option<Square> {
    if !(0..8).contains(&file) || !(0..8).contains(&rank) { return None; }
    Some(Square::make_square(Rank::from_index(rank as usize), File::from_index(file as usize)))
}

/// a1 is dark.
#[inline] pub fn is_dark_square(sq: Square) -> bool { (file_idx(sq) + rank_idx(sq)) % 2 == 0 }

/// Rank step a pawn of `color` advances by.
#[inline] pub fn forward(color: Color) -> i32 { if color == Color::White { 1 } else { -1 } }

pub fn count_pieces(b: &Board, piece: Piece, color: Color) -> i32 {
    (b.pieces(piece) & b.color_combined(color)).popcnt() as i32
}

// ---------------------------
// Pawn structure helpers
// ---------------------------
pub fn pawns_per_file(pawns: BitBoard) -> [i32; 8] {
    let mut files = [0; 8];
    for ps in pawns { files[file_idx(ps) as usize] += 1; }
    files
}

/// Pawns beyond the first on each file.
pub fn count_doubled_pawns(pawns: BitBoard) -> i32 {
    pawns_per_file(pawns).iter().map(|&n| (n - 1).max(0)).sum()
}

/// Pawns with no friendly pawn on either adjacent file.
pub fn count_isolated_pawns(pawns: BitBoard) -> i32 {
    let files = pawns_per_file(pawns);
    let has_on = |ff: i32| -> bool { (0..8).contains(&ff) && files[ff as usize] > 0 };
    (0..8)
        .filter(|&f| files[f as usize] > 0 && !(has_on(f - 1) || has_on(f + 1)))
        .map(|f| files[f as usize])
        .sum()
}

pub fn is_passed_pawn(b: &Board, sq: Square, us: Color) -> bool {
    let them_pawns = b.color_combined(opp(us)) & b.pieces(Piece::Pawn);
    let f = file_idx(sq);
    let step = forward(us);
    let mut r = rank_idx(sq) + step;
    while (0..8).contains(&r) {
        for df in -1..=1 {
            if let Some(ahead) = square_at(f + df, r) {
                if (them_pawns & BitBoard::from_square(ahead)).popcnt() > 0 {
                    return false;
                }
            }
        }
        r += step;
    }
    true
}

/// Passed pawns weighted by advancement: each counts 1 plus a step per rank advanced.
pub fn passed_pawn_score(b: &Board, color: Color) -> Score {
    let pawns = b.color_combined(color) & b.pieces(Piece::Pawn);
    let mut total = 0.0;
    for ps in pawns {
        if is_passed_pawn(b, ps, color) {
            total += 1.0 + relative_rank(color, ps) as Score * PASSED_PAWN_ADVANCE_STEP;
        }
    }
    total
}

/// Number of (pawn, diagonal defender) pairs among `color`'s pawns.
pub fn count_pawn_chain_links(pawns: BitBoard, color: Color) -> i32 {
    let behind = -forward(color);
    let mut links = 0;
    for ps in pawns {
        for df in [-1, 1] {
            if let Some(guard) = square_at(file_idx(ps) + df, rank_idx(ps) + behind) {
                if (pawns & BitBoard::from_square(guard)).popcnt() > 0 { links += 1; }
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pst_mirrors_between_colors() {
        // e2 for White and e7 for Black are the same relative square.
        assert_eq!(pst_index_for(Color::White, Square::E2), pst_index_for(Color::Black, Square::E7));
        assert_eq!(pst_for(Piece::Pawn, pst_index_for(Color::White, Square::A7)), 5.0);
        assert_eq!(pst_for(Piece::Pawn, pst_index_for(Color::Black, Square::A2)), 5.0);
        assert_eq!(pst_for(Piece::King, pst_index_for(Color::White, Square::G1)), 3.0);
    }

    #[test]
    fn square_colors() {
        assert!(is_dark_square(Square::A1));
        assert!(is_dark_square(Square::D6));
        assert!(!is_dark_square(Square::D3));
        assert!(!is_dark_square(Square::H1));
    }

    #[test]
    fn doubled_and_isolated_counts() {
        // White pawns: a2, a3 (doubled and isolated), c2, d2.
        let b = Board::from_str("4k3/8/8/8/8/P7/P1PP4/4K3 w - - 0 1").unwrap();
        let pawns = b.color_combined(Color::White) & b.pieces(Piece::Pawn);
        assert_eq!(count_doubled_pawns(pawns), 1);
        assert_eq!(count_isolated_pawns(pawns), 2);
    }

    #[test]
    fn passed_pawn_looks_towards_promotion() {
        // The black pawn on d6 sits ahead of the white e4 pawn on an adjacent file.
        let b = Board::from_str("4k3/8/3p4/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(!is_passed_pawn(&b, Square::E4, Color::White));
        assert!(!is_passed_pawn(&b, Square::D6, Color::Black));

        let b = Board::from_str("4k3/8/p7/8/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert!(is_passed_pawn(&b, Square::E4, Color::White));
        assert!((passed_pawn_score(&b, Color::White) - 1.3).abs() < 1e-9);
    }

    #[test]
    fn pawn_chain_links_count_defenders() {
        let b = Board::from_str("4k3/8/8/8/3P4/2P1P3/8/4K3 w - - 0 1").unwrap();
        let pawns = b.color_combined(Color::White) & b.pieces(Piece::Pawn);
        assert_eq!(count_pawn_chain_links(pawns, Color::White), 2);
    }
}
