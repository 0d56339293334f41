use crate::ai::RandomSelector;
use crate::engine::types::Color;

/// Engine configuration parsed from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delay before the automated side replies, in milliseconds.
    pub ai_think_ms: u64,
    /// Seed for reproducible automated play. `None` uses the thread RNG.
    pub ai_seed: Option<u64>,
    /// Side played by the automated selector.
    pub ai_color: Color,
    /// Ply cap for self-play.
    pub max_plies: u32,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = EngineConfig::default();
        EngineConfig {
            ai_think_ms: lookup("CHESS_AI_THINK_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.ai_think_ms),
            ai_seed: lookup("CHESS_AI_SEED").and_then(|v| v.trim().parse().ok()),
            ai_color: lookup("CHESS_AI_COLOR")
                .and_then(|v| Color::from_str_loose(v.trim()))
                .unwrap_or(defaults.ai_color),
            max_plies: lookup("CHESS_MAX_PLIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_plies),
        }
    }

    /// Selector for the automated side.
    pub fn selector(&self) -> RandomSelector {
        match self.ai_seed {
            Some(seed) => RandomSelector::seeded(seed),
            None => RandomSelector::new(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ai_think_ms: 500,
            ai_seed: None,
            ai_color: Color::Black,
            max_plies: 300,
        }
    }
}
