use std::io::{self, BufRead, Write};

use anyhow::Result;
use chess::Color;
use engine::{play_game, EngineConfig, EngineError, Evaluator, Position, Search, SelfPlayConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const ENGINE_NAME: &str = "MinimaxChess (alpha-beta)";

fn print_id() {
    println!("id name {}", ENGINE_NAME);
    println!("id author open-source");
    println!("uciok");
}

/// Builds the position described by the arguments of a `position` command.
/// Moves after an illegal one are still attempted; each rejected move is reported.
fn parse_position(args: &str) -> Result<(Position, Vec<String>), EngineError> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let (mut pos, idx) = match parts.first() {
        Some(&"startpos") => (Position::new(), 1),
        Some(&"fen") => {
            let end = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
            (Position::from_fen(&parts[1..end].join(" "))?, end)
        }
        _ => return Err(EngineError::InvalidFen("expected startpos or fen".to_string())),
    };

    let mut rejected = Vec::new();
    if parts.get(idx) == Some(&"moves") {
        for mv_str in &parts[idx + 1..] {
            if let Err(e) = pos.push_uci(mv_str) {
                rejected.push(e.to_string());
            }
        }
    }
    Ok((pos, rejected))
}

/// Depth requested by a `go` command, if any.
fn parse_go_depth(args: &str) -> Option<u32> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    parts
        .windows(2)
        .find(|w| w[0] == "depth")
        .and_then(|w| w[1].parse::<u32>().ok())
}

/// Arguments of `selfplay [white_depth] [black_depth] [max_plies]`; missing
/// or unreadable values fall back to the configured depth and the default ply cap.
fn parse_selfplay(args: &str, config: &EngineConfig) -> SelfPlayConfig {
    let mut values = args.split_whitespace().map(|v| v.parse::<u32>().ok());
    let mut next = || values.next().flatten();
    let white_depth = config.clamp_depth(next().unwrap_or(config.depth));
    let black_depth = config.clamp_depth(next().unwrap_or(config.depth));
    let max_plies = next().unwrap_or(SelfPlayConfig::default().max_plies);
    SelfPlayConfig { white_depth, black_depth, max_plies }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = EngineConfig::from_env();
    info!(?config, "engine starting");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut board = Position::new();

    print_id();
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = line.trim();
        if cmd.is_empty() { continue; }
        debug!(cmd, "recv");

        let (head, rest) = cmd.split_once(' ').unwrap_or((cmd, ""));
        match head {
            "uci" => print_id(),
            "isready" => println!("readyok"),
            "ucinewgame" => board = Position::new(),
            "position" => match parse_position(rest) {
                Ok((pos, rejected)) => {
                    for e in rejected {
                        println!("info string dbg=bad-move {}", e);
                    }
                    board = pos;
                }
                Err(e) => {
                    println!("info string dbg=position-parse-error {}", e);
                    board = Position::new();
                }
            },
            "go" => {
                let depth = config.clamp_depth(parse_go_depth(rest).unwrap_or(config.depth));
                let mut search = Search::new(board.side_to_move());
                let (best, score) = search.find_best_move_scored(&mut board, depth);
                println!("info depth {} nodes {} score {:.2}", depth, search.nodes, score);
                match best {
                    Some(m) => println!("bestmove {}", m),
                    None => println!("bestmove 0000"),
                }
            }
            "eval" => {
                let side = match rest.trim() {
                    "" => config.side,
                    s => engine::config::parse_color(s).unwrap_or(config.side),
                };
                let score = Evaluator::new(side).evaluate(&mut board);
                let name = if side == Color::White { "white" } else { "black" };
                println!("info string eval {:.3} for {}", score, name);
            }
            "selfplay" => {
                let sp = parse_selfplay(rest, &config);
                let report = play_game(board.clone(), &sp);
                println!("info string selfplay white_depth {} black_depth {}", sp.white_depth, sp.black_depth);
                println!("info string selfplay moves {}", report.move_list());
                println!("info string selfplay {}", report.summary());
            }
            "d" => println!("info string fen {}", board),
            "quit" => {
                println!("info string dbg=quit");
                stdout.flush()?;
                break;
            }
            _ => println!("info string dbg=unknown-command '{}'", cmd),
        }
        stdout.flush()?;
    }

    Ok(())
}
