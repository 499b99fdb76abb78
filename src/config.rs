use std::env;

use chess::Color;
use tracing::warn;

use crate::types::{DEFAULT_DEPTH, MAX_SEARCH_DEPTH};

/// Runtime settings, read from the environment.
///
/// - `ENGINE_DEPTH`: search depth when `go` names none (default 3)
/// - `ENGINE_MAX_DEPTH`: upper bound applied to every requested depth (default 8)
/// - `ENGINE_SIDE`: `white` or `black`, the side `eval` reports for (default black)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub depth: u32,
    pub max_depth: u32,
    pub side: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH, max_depth: MAX_SEARCH_DEPTH, side: Color::Black }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or unparsable keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = lookup("ENGINE_MAX_DEPTH") {
            match v.trim().parse::<u32>() {
                Ok(d) if d >= 1 => cfg.max_depth = d,
                _ => warn!(value = %v, "ignoring ENGINE_MAX_DEPTH"),
            }
        }
        if let Some(v) = lookup("ENGINE_DEPTH") {
            match v.trim().parse::<u32>() {
                Ok(d) => cfg.depth = d,
                Err(_) => warn!(value = %v, "ignoring ENGINE_DEPTH"),
            }
        }
        if let Some(v) = lookup("ENGINE_SIDE") {
            match parse_color(&v) {
                Some(c) => cfg.side = c,
                None => warn!(value = %v, "ignoring ENGINE_SIDE"),
            }
        }
        cfg.depth = cfg.clamp_depth(cfg.depth);
        cfg
    }

    /// Keeps a requested depth within `1..=max_depth`.
    #[inline]
    pub fn clamp_depth(&self, depth: u32) -> u32 {
        depth.clamp(1, self.max_depth)
    }
}

pub fn parse_color(s: &str) -> Option<Color> {
    match s.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(from_map(&[]), EngineConfig::default());
    }

    #[test]
    fn reads_and_clamps_values() {
        let cfg = from_map(&[("ENGINE_DEPTH", "12"), ("ENGINE_MAX_DEPTH", "5"), ("ENGINE_SIDE", "White")]);
        assert_eq!(cfg.depth, 5);
        assert_eq!(cfg.max_depth, 5);
        assert_eq!(cfg.side, Color::White);
        assert_eq!(cfg.clamp_depth(0), 1);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = from_map(&[("ENGINE_DEPTH", "deep"), ("ENGINE_MAX_DEPTH", "0"), ("ENGINE_SIDE", "red")]);
        assert_eq!(cfg, EngineConfig::default());
    }
}
