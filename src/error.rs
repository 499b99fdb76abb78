use std::fmt;

/// Errors raised at the boundary between callers and the engine.
///
/// The search and evaluation core never returns these: they only come out of
/// position construction and caller-supplied move handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The provided FEN string is invalid or could not be parsed.
    InvalidFen(String),
    /// The move text is not long algebraic notation (e.g. `e2e4`, `e7e8q`).
    InvalidMoveSyntax(String),
    /// The move is well formed but not legal in the current position.
    IllegalMove(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen(detail) => write!(f, "invalid FEN: {}", detail),
            EngineError::InvalidMoveSyntax(text) => write!(f, "malformed move '{}'", text),
            EngineError::IllegalMove(text) => write!(f, "illegal move '{}'", text),
        }
    }
}

impl std::error::Error for EngineError {}
