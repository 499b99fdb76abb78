use chess::{Board, BoardStatus, ChessMove, Color, Piece, Square};
use tracing::trace;

use crate::position::Position;
use crate::types::*;

/// Static evaluator. Scores are from `maximizing`'s point of view.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    maximizing: Color,
}

impl Evaluator {
    pub fn new(maximizing: Color) -> Self { Self { maximizing } }

    #[inline] pub fn maximizing(&self) -> Color { self.maximizing }

    /// Scores `pos`. The position is only borrowed mutably to try moves and
    /// the other side's options; it is unchanged when this returns.
    pub fn evaluate(&self, pos: &mut Position) -> Score {
        match self.terminal_score(pos) {
            Some(terminal) => terminal,
            None => self.heuristic_score(pos),
        }
    }

    /// Weighted sum of the positional heuristics, without the mate/draw bands.
    pub fn heuristic_score(&self, pos: &mut Position) -> Score {
        let b = *pos.board();
        let mut score = 0.0;

        score += self.material(&b);
        score += self.piece_squares(&b);
        score += self.center_control(&b);
        score += self.bishop_pair(&b);
        score += self.pawn_structure(&b) * PAWN_STRUCTURE_WEIGHT;
        score += self.mobility(pos) * MOBILITY_WEIGHT;
        score += self.king_safety(pos) * KING_SAFETY_WEIGHT;
        score += self.check_potential(pos) * CHECK_POTENTIAL_WEIGHT;

        // tempo
        score += if pos.side_to_move() == self.maximizing { -TEMPO_BONUS } else { TEMPO_BONUS };
        score
    }

    /// Mate, draw and mate-in-one scores, which bypass the heuristics.
    fn terminal_score(&self, pos: &mut Position) -> Option<Score> {
        match pos.board().status() {
            BoardStatus::Checkmate => {
                // The side to move has been mated.
                return Some(if pos.side_to_move() == self.maximizing { -MATE_SCORE } else { MATE_SCORE });
            }
            BoardStatus::Stalemate => return Some(DRAW_SCORE),
            BoardStatus::Ongoing => {}
        }
        if pos.is_insufficient_material() || pos.is_fifty_moves() || pos.is_repetition() {
            return Some(DRAW_SCORE);
        }

        if can_checkmate_in_one(pos, self.maximizing) {
            trace!(fen = %pos, side = ?self.maximizing, "maximizing side has mate in one");
            return Some(NEAR_MATE_SCORE);
        }
        if can_checkmate_in_one(pos, opp(self.maximizing)) {
            trace!(fen = %pos, side = ?opp(self.maximizing), "minimizing side has mate in one");
            return Some(-NEAR_MATE_SCORE);
        }
        None
    }

    fn material(&self, b: &Board) -> Score {
        let mut score = 0.0;
        for &color in &[Color::White, Color::Black] {
            let sgn = sign_for(color, self.maximizing);
            for &piece in &ALL_PIECES {
                let n = count_pieces(b, piece, color) as Score;
                score += sgn * material_value(piece) * MATERIAL_SCALE * n;
            }
        }
        score
    }

    fn piece_squares(&self, b: &Board) -> Score {
        let mut score = 0.0;
        for &color in &[Color::White, Color::Black] {
            let sgn = sign_for(color, self.maximizing);
            for &piece in &ALL_PIECES {
                for sq in b.pieces(piece) & b.color_combined(color) {
                    score += sgn * pst_for(piece, pst_index_for(color, sq)) * PST_SCALE;
                }
            }
        }
        score
    }

    fn center_control(&self, b: &Board) -> Score {
        CENTER_SQUARES
            .iter()
            .filter_map(|&sq| b.color_on(sq))
            .map(|c| sign_for(c, self.maximizing) * CENTER_BONUS)
            .sum()
    }

    fn bishop_pair(&self, b: &Board) -> Score {
        let mut score = 0.0;
        for &color in &[Color::White, Color::Black] {
            if count_pieces(b, Piece::Bishop, color) >= 2 {
                score += sign_for(color, self.maximizing) * BISHOP_PAIR_BONUS;
            }
        }
        score
    }

    fn pawn_structure(&self, b: &Board) -> Score {
        let mut score = 0.0;
        for &color in &[Color::White, Color::Black] {
            let sgn = sign_for(color, self.maximizing);
            let pawns = b.color_combined(color) & b.pieces(Piece::Pawn);

            score -= sgn * DOUBLED_PAWN_PENALTY * count_doubled_pawns(pawns) as Score;
            score -= sgn * ISOLATED_PAWN_PENALTY * count_isolated_pawns(pawns) as Score;
            score += sgn * PASSED_PAWN_BONUS * passed_pawn_score(b, color);
            score += sgn * PAWN_CHAIN_BONUS * count_pawn_chain_links(pawns, color) as Score;
        }
        score
    }

    fn mobility(&self, pos: &mut Position) -> Score {
        let ours = moves_for(pos, self.maximizing).len() as Score;
        let theirs = moves_for(pos, opp(self.maximizing)).len() as Score;
        (ours - theirs) * MOBILITY_SCALE
    }

    fn check_potential(&self, pos: &mut Position) -> Score {
        let ours = checking_moves_for(pos, self.maximizing) as Score;
        let theirs = checking_moves_for(pos, opp(self.maximizing)) as Score;
        (ours - theirs) * CHECK_MOVE_SCALE
    }

    fn king_safety(&self, pos: &Position) -> Score {
        let mut score = 0.0;
        for &color in &[Color::White, Color::Black] {
            let sgn = sign_for(color, self.maximizing);
            let ksq = pos.king_square(color);
            score += sgn * king_shelter(pos, color, ksq) * KING_SAFETY_SCALE;
            score -= sgn * open_files_near_king(pos.board(), ksq) as Score * KING_OPEN_FILE_PENALTY;
        }
        if pos.is_check() {
            score += if pos.side_to_move() == self.maximizing { -DIRECT_CHECK_BONUS } else { DIRECT_CHECK_BONUS };
        }
        score
    }
}

/// True if `color` has a move that checkmates immediately.
///
/// When `color` is not to move the turn is handed over to look for the mate; if
/// that is impossible (the side to move is in check) the answer is `false`.
pub fn can_checkmate_in_one(pos: &mut Position, color: Color) -> bool {
    let Some(mut turn) = pos.with_side_to_move(color) else { return false; };
    for mv in turn.legal_moves() {
        let child = turn.play(mv);
        if child.is_check() && child.is_checkmate() {
            return true;
        }
    }
    false
}

// The turn cannot be handed over while the side to move is in check; the
// other side's moves then come from attack tables.
fn moves_for(pos: &mut Position, color: Color) -> Vec<ChessMove> {
    let legal = pos.with_side_to_move(color).map(|turn| turn.legal_moves());
    legal.unwrap_or_else(|| pos.pseudo_legal_moves(color))
}

fn checking_moves_for(pos: &mut Position, color: Color) -> usize {
    let legal = pos
        .with_side_to_move(color)
        .map(|turn| turn.legal_moves().into_iter().filter(|&m| turn.gives_check(m)).count());
    legal.unwrap_or_else(|| {
        pos.pseudo_legal_moves(color).into_iter().filter(|&m| pos.attacks_king_after(m, color)).count()
    })
}

/// Castling rights, corner placement, pawn shield and nearby defenders.
fn king_shelter(pos: &Position, color: Color, ksq: Square) -> Score {
    let mut safety = 0.0;
    let rights = pos.castle_rights(color);
    if rights.has_kingside() { safety += KINGSIDE_CASTLE_BONUS; }
    if rights.has_queenside() { safety += QUEENSIDE_CASTLE_BONUS; }

    let (kf, kr) = (file_idx(ksq), rank_idx(ksq));
    if (kf == 0 || kf == 7) && (kr == 0 || kr == 7) {
        safety += KING_CORNER_BONUS;
    }

    safety += pawn_shield(pos, color, ksq);
    safety += king_defenders(pos, color, ksq) as Score * KING_DEFENDER_BONUS;
    safety
}

/// Friendly pawns one or two ranks in front of the king, on its file and the adjacent ones.
fn pawn_shield(pos: &Position, color: Color, ksq: Square) -> Score {
    let (kf, kr) = (file_idx(ksq), rank_idx(ksq));
    let step = forward(color);
    let mut shield = 0.0;
    for f in (kf - 1)..=(kf + 1) {
        for dist in 1..=2 {
            let Some(sq) = square_at(f, kr + step * dist) else { continue };
            if pos.piece_at(sq) == Some((Piece::Pawn, color)) {
                shield += if f == kf { SHIELD_PAWN_ON_FILE } else { SHIELD_PAWN_ADJACENT };
            }
        }
    }
    shield
}

/// Attacks by `color` on the squares around its king.
fn king_defenders(pos: &Position, color: Color, ksq: Square) -> u32 {
    let (kf, kr) = (file_idx(ksq), rank_idx(ksq));
    let mut count = 0;
    for df in -1..=1 {
        for dr in -1..=1 {
            if df == 0 && dr == 0 { continue; }
            if let Some(sq) = square_at(kf + df, kr + dr) {
                count += pos.attackers(color, sq).popcnt();
            }
        }
    }
    count
}

/// Files on or next to the king's file with no pawn of either color.
fn open_files_near_king(b: &Board, ksq: Square) -> i32 {
    let files = pawns_per_file(*b.pieces(Piece::Pawn));
    let kf = file_idx(ksq);
    ((kf - 1).max(0)..=(kf + 1).min(7))
        .filter(|&f| files[f as usize] == 0)
        .count() as i32
}
