use std::time::Instant;

use chess::{ChessMove, Color};
use tracing::{debug, trace};

use crate::eval::Evaluator;
use crate::ordering::MoveOrderer;
use crate::position::Position;
use crate::types::Score;

/// Depth-limited minimax with alpha-beta pruning.
///
/// Nothing is cached between nodes or between calls. Recursion depth is the
/// requested depth plus the one-ply mate lookahead inside evaluation, so callers
/// are expected to keep `depth` small.
pub struct Search {
    pub nodes: u64,
    eval: Evaluator,
    orderer: MoveOrderer,
}

impl Search {
    /// A search that plays for `maximizing`.
    pub fn new(maximizing: Color) -> Self {
        Self { nodes: 0, eval: Evaluator::new(maximizing), orderer: MoveOrderer }
    }

    #[inline] pub fn maximizing(&self) -> Color { self.eval.maximizing() }

    #[inline] pub fn evaluate(&self, pos: &mut Position) -> Score { self.eval.evaluate(pos) }

    /// Best move for the side to move, or `None` when there is nothing to
    /// choose: no legal moves, or `depth == 0` (a bare leaf evaluation).
    pub fn find_best_move(&mut self, pos: &mut Position, depth: u32) -> Option<ChessMove> {
        self.find_best_move_scored(pos, depth).0
    }

    /// Like `find_best_move`, also returning the backed-up score.
    pub fn find_best_move_scored(&mut self, pos: &mut Position, depth: u32) -> (Option<ChessMove>, Score) {
        self.nodes = 1;
        let start = Instant::now();

        let maximizing = pos.side_to_move() == self.maximizing();
        let (score, best) = if depth == 0 {
            (self.eval.evaluate(pos), None)
        } else {
            let moves = self.orderer.order(pos, pos.legal_moves(), maximizing);
            if moves.is_empty() {
                (self.eval.evaluate(pos), None)
            } else {
                self.expand(pos, moves, depth, Score::NEG_INFINITY, Score::INFINITY, maximizing, true)
            }
        };

        debug!(
            depth,
            nodes = self.nodes,
            score,
            best = %best.map(|m| m.to_string()).unwrap_or_else(|| "none".to_string()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search complete"
        );
        (best, score)
    }

    /// Score of `pos` searched `depth` plies deep, and the move achieving it.
    pub fn minimax(
        &mut self,
        pos: &mut Position,
        depth: u32,
        alpha: Score,
        beta: Score,
        maximizing: bool,
    ) -> (Score, Option<ChessMove>) {
        self.nodes += 1;

        if depth == 0 || pos.is_game_over() {
            return (self.eval.evaluate(pos), None);
        }

        let moves = self.orderer.order(pos, pos.legal_moves(), maximizing);
        self.expand(pos, moves, depth, alpha, beta, maximizing, false)
    }

    // Strict comparisons: the first move in `moves` reaching the best score wins ties.
    #[allow(clippy::too_many_arguments)]
    fn expand(
        &mut self,
        pos: &mut Position,
        moves: Vec<ChessMove>,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        root: bool,
    ) -> (Score, Option<ChessMove>) {
        let mut best = if maximizing { Score::NEG_INFINITY } else { Score::INFINITY };
        let mut best_move = None;

        for m in moves {
            let score = {
                let mut child = pos.play(m);
                self.minimax(&mut child, depth - 1, alpha, beta, !maximizing).0
            };
            if root {
                debug!(mv = %m, score, "root move");
            }

            if maximizing {
                if score > best {
                    best = score;
                    best_move = Some(m);
                }
                alpha = alpha.max(best);
            } else {
                if score < best {
                    best = score;
                    best_move = Some(m);
                }
                beta = beta.min(best);
            }

            if beta <= alpha {
                trace!(depth, alpha, beta, "cutoff");
                break;
            }
        }
        (best, best_move)
    }
}
