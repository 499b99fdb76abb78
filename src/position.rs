//! Mutable game state on top of the `chess` crate.
//!
//! `chess::Board` is an immutable value: every move produces a new board. The
//! search wants a single live position that it mutates and restores, so
//! `Position` keeps a stack of prior boards (plus the move counters the board
//! does not track) and exposes `apply`/`undo` and scoped guards over them.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves,
    BitBoard, Board, BoardStatus, CastleRights, ChessMove, Color, MoveGen, Piece, Rank, Square,
};

use crate::error::EngineError;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Undo {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    undo_stack: Vec<Undo>,
    // Hash of every position reached in this game, current one last.
    keys: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self { Self::new() }
}

impl Position {
    pub fn new() -> Self { Self::from_board(Board::default()) }

    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
            undo_stack: Vec::new(),
            keys: vec![board.get_hash()],
        }
    }

    /// Parses a FEN string. The move counters are optional and default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 || parts.len() > 6 {
            return Err(EngineError::InvalidFen(format!("expected 4 to 6 fields, got {}", parts.len())));
        }
        let halfmove_clock = match parts.get(4) {
            Some(s) => s.parse::<u32>().map_err(|_| EngineError::InvalidFen(format!("bad halfmove clock '{}'", s)))?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(s) => s.parse::<u32>().map_err(|_| EngineError::InvalidFen(format!("bad fullmove number '{}'", s)))?,
            None => 1,
        };
        let normalized = format!("{} {} {}", parts[..4].join(" "), halfmove_clock, fullmove_number);
        let board = Board::from_str(&normalized)
            .map_err(|e| EngineError::InvalidFen(format!("{}: {}", fen, e)))?;

        let mut pos = Self::from_board(board);
        pos.halfmove_clock = halfmove_clock;
        pos.fullmove_number = fullmove_number.max(1);
        Ok(pos)
    }

    #[inline] pub fn board(&self) -> &Board { &self.board }
    #[inline] pub fn side_to_move(&self) -> Color { self.board.side_to_move() }
    #[inline] pub fn halfmove_clock(&self) -> u32 { self.halfmove_clock }
    #[inline] pub fn fullmove_number(&self) -> u32 { self.fullmove_number }
    /// Number of applied moves that can still be undone.
    #[inline] pub fn ply(&self) -> usize { self.undo_stack.len() }

    // ---------------------------
    // Moves
    // ---------------------------
    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    pub fn is_legal(&self, mv: ChessMove) -> bool {
        MoveGen::new_legal(&self.board).any(|m| m == mv)
    }

    /// Applies a legal move in place.
    pub fn apply(&mut self, mv: ChessMove) {
        let mover = self.board.side_to_move();
        let resets_clock = self.is_capture(mv) || self.board.piece_on(mv.get_source()) == Some(Piece::Pawn);

        self.undo_stack.push(Undo {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });
        self.board = self.board.make_move_new(mv);
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
        if mover == Color::Black { self.fullmove_number += 1; }
        self.keys.push(self.board.get_hash());
    }

    /// Restores the state from before the most recent `apply`.
    ///
    /// Panics if nothing has been applied.
    pub fn undo(&mut self) {
        let Some(prev) = self.undo_stack.pop() else {
            panic!("Position::undo called with no move applied");
        };
        self.keys.pop();
        self.board = prev.board;
        self.halfmove_clock = prev.halfmove_clock;
        self.fullmove_number = prev.fullmove_number;
    }

    /// Applies `mv` for the lifetime of the returned guard. The move is undone
    /// when the guard drops, including while unwinding.
    pub fn play(&mut self, mv: ChessMove) -> Applied<'_> {
        self.apply(mv);
        Applied { pos: self }
    }

    /// Hands the move to `color` for the lifetime of the returned guard.
    ///
    /// Returns `None` when the side to move is in check and is not `color`:
    /// giving the turn away would leave a capturable king.
    pub fn with_side_to_move(&mut self, color: Color) -> Option<TurnGuard<'_>> {
        let saved = self.board;
        if self.board.side_to_move() != color {
            self.board = self.board.null_move()?;
        }
        let depth = self.undo_stack.len();
        Some(TurnGuard { pos: self, saved, depth })
    }

    /// Parses and applies a move given in long algebraic notation.
    ///
    /// A pawn reaching the last rank without a promotion suffix promotes to a queen.
    pub fn push_uci(&mut self, text: &str) -> Result<ChessMove, EngineError> {
        let mut mv = parse_uci_move(text).ok_or_else(|| EngineError::InvalidMoveSyntax(text.to_string()))?;
        if mv.get_promotion().is_none() && self.board.piece_on(mv.get_source()) == Some(Piece::Pawn) {
            let last = if self.side_to_move() == Color::White { Rank::Eighth } else { Rank::First };
            if mv.get_dest().get_rank() == last {
                mv = ChessMove::new(mv.get_source(), mv.get_dest(), Some(Piece::Queen));
            }
        }
        if !self.is_legal(mv) {
            return Err(EngineError::IllegalMove(text.to_string()));
        }
        self.apply(mv);
        Ok(mv)
    }

    // ---------------------------
    // Game status
    // ---------------------------
    #[inline] pub fn is_checkmate(&self) -> bool { self.board.status() == BoardStatus::Checkmate }
    #[inline] pub fn is_stalemate(&self) -> bool { self.board.status() == BoardStatus::Stalemate }
    #[inline] pub fn is_check(&self) -> bool { self.board.checkers().popcnt() > 0 }
    #[inline] pub fn is_fifty_moves(&self) -> bool { self.halfmove_clock >= 100 }

    /// Neither side can ever deliver mate.
    pub fn is_insufficient_material(&self) -> bool {
        self.has_insufficient_material(Color::White) && self.has_insufficient_material(Color::Black)
    }

    /// `color` cannot mate with any sequence of legal moves, whatever the
    /// opponent plays. A lone knight only fails against a bare king (or
    /// queens, which cannot be forced to block). Bishops only fail when every
    /// bishop on the board stands on one square color and no knight or pawn
    /// can build a mating net.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        let b = &self.board;
        let ours = *b.color_combined(color);
        let heavy = self.pieces(Piece::Pawn, color) | self.pieces(Piece::Rook, color) | self.pieces(Piece::Queen, color);
        if heavy.popcnt() > 0 { return false; }

        if self.pieces(Piece::Knight, color).popcnt() > 0 {
            let theirs = *b.color_combined(!color);
            let blockers = theirs & !*b.pieces(Piece::King) & !*b.pieces(Piece::Queen);
            return ours.popcnt() <= 2 && blockers.popcnt() == 0;
        }

        if self.pieces(Piece::Bishop, color).popcnt() > 0 {
            let bishops = *b.pieces(Piece::Bishop);
            let dark = bishops.into_iter().filter(|&sq| is_dark_square(sq)).count();
            let same_color = dark == 0 || dark == bishops.popcnt() as usize;
            let others = *b.pieces(Piece::Pawn) | *b.pieces(Piece::Knight);
            return same_color && others.popcnt() == 0;
        }
        true
    }

    /// The current position has occurred at least three times in this game.
    pub fn is_repetition(&self) -> bool {
        let k = self.board.get_hash();
        self.keys.iter().filter(|&&x| x == k).count() >= 3
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.is_insufficient_material() || self.is_fifty_moves() || self.is_repetition()
    }

    pub fn is_game_over(&self) -> bool { self.is_checkmate() || self.is_draw() }

    // ---------------------------
    // Move and board queries
    // ---------------------------
    pub fn gives_check(&self, mv: ChessMove) -> bool {
        self.board.make_move_new(mv).checkers().popcnt() > 0
    }

    /// Captures including en passant.
    pub fn is_capture(&self, mv: ChessMove) -> bool {
        self.captured_piece(mv).is_some()
    }

    /// Kind of the piece `mv` would take, if any.
    pub fn captured_piece(&self, mv: ChessMove) -> Option<Piece> {
        let b = &self.board;
        let to = mv.get_dest();
        if b.color_on(to) == Some(opp(b.side_to_move())) {
            return b.piece_on(to);
        }
        let is_ep = b.piece_on(mv.get_source()) == Some(Piece::Pawn)
            && mv.get_source().get_file() != to.get_file()
            && b.piece_on(to).is_none();
        if is_ep { Some(Piece::Pawn) } else { None }
    }

    #[inline] pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        Some((self.board.piece_on(sq)?, self.board.color_on(sq)?))
    }

    #[inline] pub fn pieces(&self, piece: Piece, color: Color) -> BitBoard {
        self.board.pieces(piece) & self.board.color_combined(color)
    }

    #[inline] pub fn king_square(&self, color: Color) -> Square { self.board.king_square(color) }

    #[inline] pub fn castle_rights(&self, color: Color) -> CastleRights { self.board.castle_rights(color) }

    /// Pieces of `color` attacking `sq`, whatever stands on it.
    pub fn attackers(&self, color: Color, sq: Square) -> BitBoard {
        attack_set(sq, color, *self.board.combined(), |p| self.pieces(p, color))
    }

    /// Moves of `color` generated from attack tables, ignoring whose turn it
    /// is and whether the own king is left attacked. Castling and en passant
    /// are not included, and the enemy king is never a target.
    pub fn pseudo_legal_moves(&self, color: Color) -> Vec<ChessMove> {
        let b = &self.board;
        let occupied = *b.combined();
        let enemy_king = BitBoard::from_square(b.king_square(!color));
        let targets = !*b.color_combined(color) & !enemy_king;
        let mut moves = Vec::new();

        let push_all = |from: Square, tos: BitBoard, moves: &mut Vec<ChessMove>| {
            for to in tos { moves.push(ChessMove::new(from, to, None)); }
        };
        for sq in self.pieces(Piece::Knight, color) { push_all(sq, get_knight_moves(sq) & targets, &mut moves); }
        for sq in self.pieces(Piece::Bishop, color) { push_all(sq, get_bishop_moves(sq, occupied) & targets, &mut moves); }
        for sq in self.pieces(Piece::Rook, color) { push_all(sq, get_rook_moves(sq, occupied) & targets, &mut moves); }
        for sq in self.pieces(Piece::Queen, color) {
            let tos = (get_bishop_moves(sq, occupied) | get_rook_moves(sq, occupied)) & targets;
            push_all(sq, tos, &mut moves);
        }
        for sq in self.pieces(Piece::King, color) { push_all(sq, get_king_moves(sq) & targets, &mut moves); }

        let enemies = *b.color_combined(!color) & !enemy_king;
        let step = forward(color);
        for sq in self.pieces(Piece::Pawn, color) {
            let mut tos: Vec<Square> = get_pawn_attacks(sq, color, enemies).into_iter().collect();
            if let Some(one) = square_at(file_idx(sq), rank_idx(sq) + step) {
                if b.piece_on(one).is_none() {
                    tos.push(one);
                    if relative_rank(color, sq) == 1 {
                        if let Some(two) = square_at(file_idx(sq), rank_idx(sq) + 2 * step) {
                            if b.piece_on(two).is_none() { tos.push(two); }
                        }
                    }
                }
            }
            for to in tos {
                if relative_rank(color, to) == 7 {
                    for promo in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
                        moves.push(ChessMove::new(sq, to, Some(promo)));
                    }
                } else {
                    moves.push(ChessMove::new(sq, to, None));
                }
            }
        }
        moves
    }

    /// Whether `color`, playing `mv`, leaves its pieces attacking the enemy
    /// king. Works for moves of the side not to move, where `gives_check`
    /// cannot be asked of the rules engine.
    pub fn attacks_king_after(&self, mv: ChessMove, color: Color) -> bool {
        let b = &self.board;
        let Some(moved) = b.piece_on(mv.get_source()) else { return false };
        let landed = mv.get_promotion().unwrap_or(moved);
        let from = BitBoard::from_square(mv.get_source());
        let to = BitBoard::from_square(mv.get_dest());
        let occupied = (*b.combined() & !from) | to;
        let after = |p: Piece| {
            let bb = self.pieces(p, color) & !from & !to;
            if p == landed { bb | to } else { bb }
        };
        attack_set(b.king_square(!color), color, occupied, after).popcnt() > 0
    }
}

/// Pieces of `color` (as given by `pieces`) attacking `sq` under `occupied`.
fn attack_set(sq: Square, color: Color, occupied: BitBoard, pieces: impl Fn(Piece) -> BitBoard) -> BitBoard {
    let diagonal = pieces(Piece::Bishop) | pieces(Piece::Queen);
    let straight = pieces(Piece::Rook) | pieces(Piece::Queen);
    (get_bishop_moves(sq, occupied) & diagonal)
        | (get_rook_moves(sq, occupied) & straight)
        | (get_knight_moves(sq) & pieces(Piece::Knight))
        | (get_king_moves(sq) & pieces(Piece::King))
        | get_pawn_attacks(sq, !color, pieces(Piece::Pawn))
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fen = self.board.to_string();
        let fields: Vec<&str> = fen.split_whitespace().take(4).collect();
        write!(f, "{} {} {}", fields.join(" "), self.halfmove_clock, self.fullmove_number)
    }
}

/// A move applied for as long as this guard lives.
pub struct Applied<'a> {
    pos: &'a mut Position,
}

impl Deref for Applied<'_> {
    type Target = Position;
    fn deref(&self) -> &Position { self.pos }
}

impl DerefMut for Applied<'_> {
    fn deref_mut(&mut self) -> &mut Position { self.pos }
}

impl Drop for Applied<'_> {
    fn drop(&mut self) { self.pos.undo(); }
}

/// A temporary side-to-move override.
pub struct TurnGuard<'a> {
    pos: &'a mut Position,
    saved: Board,
    depth: usize,
}

impl Deref for TurnGuard<'_> {
    type Target = Position;
    fn deref(&self) -> &Position { self.pos }
}

impl DerefMut for TurnGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position { self.pos }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        debug_assert!(
            std::thread::panicking() || self.pos.undo_stack.len() == self.depth,
            "moves applied under a turn override were not undone"
        );
        self.pos.board = self.saved;
    }
}

pub fn parse_uci_move(s: &str) -> Option<ChessMove> {
    if s.len() < 4 || s.len() > 5 || !s.is_ascii() { return None; }
    let from = Square::from_str(&s[0..2]).ok()?;
    let to = Square::from_str(&s[2..4]).ok()?;
    let promo = if s.len() == 5 {
        match &s[4..5] {
            "q" => Some(Piece::Queen),
            "r" => Some(Piece::Rook),
            "b" => Some(Piece::Bishop),
            "n" => Some(Piece::Knight),
            _ => return None,
        }
    } else { None };
    Some(ChessMove::new(from, to, promo))
}
