//! Engine-against-engine games with a separate search depth per side.
//!
//! Both sides use `Search` playing for themselves. A game ends on any
//! game-over condition or after `max_plies` half-moves.

use std::fmt;
use std::time::{Duration, Instant};

use chess::{ChessMove, Color};
use tracing::{debug, info};

use crate::position::Position;
use crate::search::Search;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoves,
    Repetition,
    MaxPlies,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient-material",
            Termination::FiftyMoves => "fifty-moves",
            Termination::Repetition => "repetition",
            Termination::MaxPlies => "max-plies",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelfPlayConfig {
    pub white_depth: u32,
    pub black_depth: u32,
    pub max_plies: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self { white_depth: 3, black_depth: 3, max_plies: 400 }
    }
}

#[derive(Debug, Clone)]
pub struct GameReport {
    pub result: GameResult,
    pub termination: Termination,
    pub moves: Vec<ChessMove>,
    pub final_position: Position,
    pub white_nodes: u64,
    pub black_nodes: u64,
    pub white_time: Duration,
    pub black_time: Duration,
}

impl GameReport {
    pub fn summary(&self) -> String {
        format!(
            "result={} termination={} plies={} fullmoves={} white_nodes={} black_nodes={} white_ms={} black_ms={}",
            self.result,
            self.termination,
            self.moves.len(),
            self.final_position.fullmove_number(),
            self.white_nodes,
            self.black_nodes,
            self.white_time.as_millis(),
            self.black_time.as_millis()
        )
    }

    /// Moves in long algebraic notation, separated by spaces.
    pub fn move_list(&self) -> String {
        self.moves.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ")
    }
}

/// How the game stands: `None` while it is still running.
pub fn outcome(pos: &Position) -> Option<(GameResult, Termination)> {
    if pos.is_checkmate() {
        let winner = if pos.side_to_move() == Color::White { GameResult::BlackWins } else { GameResult::WhiteWins };
        return Some((winner, Termination::Checkmate));
    }
    let draw = if pos.is_stalemate() {
        Termination::Stalemate
    } else if pos.is_insufficient_material() {
        Termination::InsufficientMaterial
    } else if pos.is_fifty_moves() {
        Termination::FiftyMoves
    } else if pos.is_repetition() {
        Termination::Repetition
    } else {
        return None;
    };
    Some((GameResult::Draw, draw))
}

/// Plays `start` out to the end. Depths below one are raised to one so every
/// turn produces a move.
pub fn play_game(start: Position, config: &SelfPlayConfig) -> GameReport {
    let mut pos = start;
    let mut moves = Vec::new();
    let (mut white_nodes, mut black_nodes) = (0u64, 0u64);
    let (mut white_time, mut black_time) = (Duration::ZERO, Duration::ZERO);

    let (result, termination) = loop {
        if let Some(done) = outcome(&pos) {
            break done;
        }
        if moves.len() as u32 >= config.max_plies {
            break (GameResult::Draw, Termination::MaxPlies);
        }

        let mover = pos.side_to_move();
        let depth = (if mover == Color::White { config.white_depth } else { config.black_depth }).max(1);
        let mut search = Search::new(mover);
        let started = Instant::now();
        let best = search.find_best_move(&mut pos, depth);
        let elapsed = started.elapsed();

        match mover {
            Color::White => {
                white_nodes += search.nodes;
                white_time += elapsed;
            }
            Color::Black => {
                black_nodes += search.nodes;
                black_time += elapsed;
            }
        }

        // A running game always has a legal move.
        let Some(mv) = best else { break (GameResult::Draw, Termination::Stalemate) };
        debug!(ply = moves.len() + 1, side = ?mover, mv = %mv, nodes = search.nodes, "selfplay move");
        pos.apply(mv);
        moves.push(mv);
    };

    info!(%result, %termination, plies = moves.len(), "selfplay finished");
    GameReport {
        result,
        termination,
        moves,
        final_position: pos,
        white_nodes,
        black_nodes,
        white_time,
        black_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::parse_uci_move;

    #[test]
    fn shallow_mate_ends_the_game() {
        let start = Position::from_fen("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2").unwrap();
        let report = play_game(start, &SelfPlayConfig { white_depth: 1, black_depth: 1, max_plies: 10 });
        assert_eq!(report.result, GameResult::BlackWins);
        assert_eq!(report.termination, Termination::Checkmate);
        assert_eq!(report.moves, vec![parse_uci_move("d8h4").unwrap()]);
        assert_eq!(report.white_nodes, 0);
        assert!(report.black_nodes > 0);
        assert_eq!(report.move_list(), "d8h4");
    }

    #[test]
    fn finished_positions_play_no_moves() {
        let stalemate = Position::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
        let report = play_game(stalemate, &SelfPlayConfig::default());
        assert_eq!((report.result, report.termination), (GameResult::Draw, Termination::Stalemate));
        assert!(report.moves.is_empty());

        let bare = Position::from_fen("8/5k2/8/8/8/8/5K2/8 w - - 0 1").unwrap();
        assert_eq!(outcome(&bare), Some((GameResult::Draw, Termination::InsufficientMaterial)));
    }

    #[test]
    fn ply_limit_stops_a_running_game() {
        let config = SelfPlayConfig { white_depth: 1, black_depth: 1, max_plies: 6 };
        let report = play_game(Position::new(), &config);
        assert_eq!(report.termination, Termination::MaxPlies);
        assert_eq!(report.result, GameResult::Draw);
        assert_eq!(report.moves.len(), 6);
        assert_eq!(report.final_position.fullmove_number(), 4);

        // Every move was legal when it was played.
        let mut replay = Position::new();
        for &mv in &report.moves {
            assert!(replay.is_legal(mv));
            replay.apply(mv);
        }
        assert_eq!(replay.board(), report.final_position.board());
        assert!(report.summary().starts_with("result=1/2-1/2 termination=max-plies plies=6"));
    }
}
