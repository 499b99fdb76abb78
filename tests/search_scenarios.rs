use chess::{ChessMove, Color, Piece};

use engine::{
    can_checkmate_in_one, parse_uci_move, Evaluator, MoveOrderer, Position, Score, Search, DRAW_SCORE,
    MATE_SCORE, NEAR_MATE_SCORE,
};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const ITALIAN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
const PAWN_ENDING: &str = "8/5k2/8/8/8/8/4P3/4K3 b - - 0 1";
const BEFORE_FOOLS_MATE: &str = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";

/// Plain minimax over the same move ordering, with no pruning.
fn full_minimax(eval: &Evaluator, pos: &mut Position, depth: u32, maximizing: bool, root: bool) -> (Score, Option<ChessMove>) {
    if depth == 0 || (!root && pos.is_game_over()) {
        return (eval.evaluate(pos), None);
    }
    let moves = MoveOrderer.order(pos, pos.legal_moves(), maximizing);
    if moves.is_empty() {
        return (eval.evaluate(pos), None);
    }
    let mut best = if maximizing { Score::NEG_INFINITY } else { Score::INFINITY };
    let mut best_move = None;
    for m in moves {
        let score = {
            let mut child = pos.play(m);
            full_minimax(eval, &mut child, depth - 1, !maximizing, false).0
        };
        let better = if maximizing { score > best } else { score < best };
        if better {
            best = score;
            best_move = Some(m);
        }
    }
    (best, best_move)
}

fn assert_matches_full_minimax(fen: &str, depth: u32, side: Color) {
    let mut pos = Position::from_fen(fen).unwrap();
    let eval = Evaluator::new(side);
    let maximizing = pos.side_to_move() == side;
    let (want_score, want_move) = full_minimax(&eval, &mut pos, depth, maximizing, true);

    let mut search = Search::new(side);
    let (got_move, got_score) = search.find_best_move_scored(&mut pos, depth);
    assert_eq!(got_move, want_move, "{} at depth {}", fen, depth);
    assert_eq!(got_score, want_score, "{} at depth {}", fen, depth);
}

#[test]
fn pruning_does_not_change_the_result() {
    assert_matches_full_minimax(START, 2, Color::White);
    assert_matches_full_minimax(ITALIAN, 2, Color::White);
    assert_matches_full_minimax(PAWN_ENDING, 3, Color::Black);
}

#[test]
fn pruning_does_not_change_the_result_when_minimizing_at_the_root() {
    assert_matches_full_minimax(ITALIAN, 2, Color::Black);
}

#[test]
fn search_leaves_the_position_untouched() {
    for fen in [START, ITALIAN, PAWN_ENDING, BEFORE_FOOLS_MATE] {
        for depth in 0..=2 {
            let mut pos = Position::from_fen(fen).unwrap();
            let before = pos.clone();
            Search::new(Color::White).find_best_move(&mut pos, depth);
            assert_eq!(pos, before, "{} at depth {}", fen, depth);
            assert_eq!(pos.to_string(), fen);
        }
    }
}

#[test]
fn chosen_mate_evaluates_as_mate() {
    let mut pos = Position::from_fen(BEFORE_FOOLS_MATE).unwrap();
    let mut search = Search::new(Color::Black);
    let best = search.find_best_move(&mut pos, 2).unwrap();
    assert_eq!(Some(best), parse_uci_move("d8h4"));

    let mut after = pos.play(best);
    assert!(after.is_checkmate());
    assert_eq!(Evaluator::new(Color::Black).evaluate(&mut after), MATE_SCORE);
}

#[test]
fn depth_zero_never_picks_a_move() {
    for fen in [START, ITALIAN, BEFORE_FOOLS_MATE] {
        let mut pos = Position::from_fen(fen).unwrap();
        assert_eq!(Search::new(Color::White).find_best_move(&mut pos, 0), None);
    }
}

#[test]
fn terminal_positions_score_in_their_bands() {
    let mated = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    let mut pos = Position::from_fen(mated).unwrap();
    let mut search = Search::new(Color::White);
    let (best, score) = search.find_best_move_scored(&mut pos, 2);
    assert_eq!(best, None);
    assert_eq!(score, -MATE_SCORE);

    let mut stalemate = Position::from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1").unwrap();
    let (best, score) = Search::new(Color::White).find_best_move_scored(&mut stalemate, 3);
    assert_eq!(best, None);
    assert_eq!(score, DRAW_SCORE);
}

#[test]
fn heuristic_scores_stay_below_the_mate_bands() {
    let mut pos = Position::from_fen(ITALIAN).unwrap();
    let (_, score) = Search::new(Color::White).find_best_move_scored(&mut pos, 2);
    assert!(score.abs() < NEAR_MATE_SCORE);
}

#[test]
fn start_position_depth_one() {
    let mut pos = Position::new();
    let mut search = Search::new(Color::White);
    let best = search.find_best_move(&mut pos, 1).unwrap();
    assert!(pos.legal_moves().contains(&best));
    assert_eq!(search.nodes, 21);
}

#[test]
fn defends_against_scholars_mate() {
    // Qxf7 would mate; Black must deal with it.
    let mut pos = Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 4").unwrap();
    let best = Search::new(Color::Black).find_best_move(&mut pos, 2).unwrap();
    let mut after = pos.play(best);
    assert!(!can_checkmate_in_one(&mut after, Color::White), "{} allows mate", best);
}

#[test]
fn mates_instead_of_stalemating() {
    // Rb1 stalemates, Rc8 mates.
    for depth in 1..=2 {
        let mut pos = Position::from_fen("k7/8/1K6/8/8/8/8/2R5 w - - 0 1").unwrap();
        let best = Search::new(Color::White).find_best_move(&mut pos, depth).unwrap();
        let after = pos.play(best);
        assert!(!after.is_stalemate());
        assert!(after.is_checkmate(), "depth {} played {}", depth, best);
    }
}

#[test]
fn takes_the_queen_with_check() {
    let mut pos = Position::from_fen("5rk1/ppp2ppp/3p4/4n3/2B5/2P2Q2/PP3PPP/R5K1 b - - 0 1").unwrap();
    let best = Search::new(Color::Black).find_best_move(&mut pos, 2).unwrap();
    assert_eq!(Some(best), parse_uci_move("e5f3"));
    assert_eq!(pos.captured_piece(best), Some(Piece::Queen));
    assert!(pos.gives_check(best));
}

#[test]
fn winning_side_avoids_threefold_repetition() {
    // Black is a queen up; the knight and king shuffle until Kd8-e8 would repeat a third time.
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/q7/4K1N1 w - - 0 1").unwrap();
    for mv in ["g1f3", "e8d8", "f3g1", "d8e8", "g1f3", "e8d8", "f3g1"] {
        pos.push_uci(mv).unwrap();
    }
    let repeat = parse_uci_move("d8e8").unwrap();
    {
        let after = pos.play(repeat);
        assert!(after.is_repetition());
    }

    for depth in 1..=2 {
        let best = Search::new(Color::Black).find_best_move(&mut pos, depth).unwrap();
        assert_ne!(best, repeat, "depth {}", depth);
        let after = pos.play(best);
        assert!(!after.is_repetition());
    }
}

#[test]
fn opposite_colored_bishops_are_still_played() {
    let mut pos = Position::from_fen("8/5k2/3b4/8/8/3B4/5K2/8 w - - 0 1").unwrap();
    assert!(!pos.is_game_over());
    let (best, score) = Search::new(Color::White).find_best_move_scored(&mut pos, 2);
    assert!(best.is_some());
    assert!(score.abs() < NEAR_MATE_SCORE);
}
