//! Configuration file loading for the bot arena.
//!
//! This module provides types and functions for loading and managing
//! arena configuration from TOML files.
//!
//! ```toml
//! [engines.deep]
//! kind = "negamax"
//! depth = 4
//!
//! [presets.quick]
//! games = 4
//! max_plies = 200
//! movetime_ms = 100
//! openings = ["rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"]
//!
//! [rating]
//! elo_k = 24
//!
//! [rating.glicko]
//! tau = 0.5
//! rd_ceiling = 350
//! ```

use chess_core::{Board, FenError};
use chess_rating::{elo::DEFAULT_K_FACTOR, Glicko2Config, Leaderboard};
use chess_search::{
    AlphaBetaConfig, Engine, EngineConfig, IterativeDeepeningConfig, MctsConfig, QuiescenceConfig,
    RandomConfig, SearchError, SearchLimits,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or using the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Requested engine was not found in the configuration.
    #[error("Engine not found: {0}")]
    EngineNotFound(String),
    /// Requested preset was not found in the configuration.
    #[error("Preset not found: {0}")]
    PresetNotFound(String),
    /// An engine entry has settings it cannot search with.
    #[error("Invalid engine {name}: {source}")]
    InvalidEngine {
        name: String,
        #[source]
        source: SearchError,
    },
    /// A preset asks for a zero per-move time budget.
    #[error("Invalid preset: movetime_ms must be at least 1")]
    ZeroMovetime,
    /// A preset opening is not a usable FEN.
    #[error("Invalid opening {fen:?}: {source}")]
    InvalidOpening {
        fen: String,
        #[source]
        source: FenError,
    },
}

/// Configuration for a match preset.
///
/// Presets define reusable match settings including number of games,
/// opening positions, and time controls.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PresetConfig {
    /// Number of games to play in a match. Defaults to 10.
    #[serde(default = "default_games")]
    pub games: u32,
    /// Games still running after this many plies are drawn. Defaults to 500.
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    /// Starting positions as FEN, cycled through game by game.
    /// Defaults to empty (use standard starting position).
    #[serde(default)]
    pub openings: Vec<String>,
    /// Per-move time budget overriding the engines' own settings.
    #[serde(default)]
    pub movetime_ms: Option<u64>,
}

fn default_games() -> u32 {
    10
}

fn default_max_plies() -> u32 {
    500
}

impl Default for PresetConfig {
    fn default() -> Self {
        PresetConfig {
            games: default_games(),
            max_plies: default_max_plies(),
            openings: Vec::new(),
            movetime_ms: None,
        }
    }
}

impl PresetConfig {
    /// Checks the settings that engines would otherwise misread.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMovetime`] for `movetime_ms = 0`, which
    /// would leave time-bounded engines without a move on every turn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.movetime_ms == Some(0) {
            return Err(ConfigError::ZeroMovetime);
        }
        Ok(())
    }

    /// Search limits applied to every move of a game.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            depth: None,
            movetime: self.movetime_ms.map(Duration::from_millis),
        }
    }

    /// The opening positions, or just the standard start when none are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOpening`] for the first FEN that does
    /// not describe a legal position.
    pub fn opening_boards(&self) -> Result<Vec<Board>, ConfigError> {
        if self.openings.is_empty() {
            return Ok(vec![Board::new()]);
        }
        self.openings
            .iter()
            .map(|fen| {
                Board::from_fen(fen).map_err(|source| ConfigError::InvalidOpening {
                    fen: fen.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// Rating system settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RatingConfig {
    #[serde(default)]
    pub glicko: Glicko2Config,
    /// Elo K-factor. Defaults to 32.
    #[serde(default = "default_elo_k")]
    pub elo_k: f64,
}

fn default_elo_k() -> f64 {
    DEFAULT_K_FACTOR
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            glicko: Glicko2Config::default(),
            elo_k: default_elo_k(),
        }
    }
}

impl RatingConfig {
    /// An empty leaderboard using these settings.
    pub fn leaderboard(&self) -> Leaderboard {
        Leaderboard::new(self.glicko, self.elo_k)
    }
}

/// Main arena configuration structure.
///
/// Contains all engine definitions and match presets loaded from the
/// configuration file. Uses `arena.toml` in the current directory
/// by default.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ArenaConfig {
    /// Engines by name. Defaults to one engine of each kind.
    #[serde(default = "default_engines")]
    pub engines: BTreeMap<String, EngineConfig>,
    /// Map of preset names to their configurations.
    #[serde(default)]
    pub presets: HashMap<String, PresetConfig>,
    #[serde(default)]
    pub rating: RatingConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            engines: default_engines(),
            presets: HashMap::new(),
            rating: RatingConfig::default(),
        }
    }
}

/// The built-in roster: every engine kind with its default settings.
pub fn default_engines() -> BTreeMap<String, EngineConfig> {
    [
        EngineConfig::Random(RandomConfig::default()),
        EngineConfig::Minimax(AlphaBetaConfig::default()),
        EngineConfig::Negamax(AlphaBetaConfig::default()),
        EngineConfig::IterativeDeepening(IterativeDeepeningConfig::default()),
        EngineConfig::Quiescence(QuiescenceConfig::default()),
        EngineConfig::Mcts(MctsConfig::default()),
    ]
    .into_iter()
    .map(|config| (config.kind().to_string(), config))
    .collect()
}

impl ArenaConfig {
    /// Loads the arena configuration from `arena.toml`, falling back to
    /// the defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the path to the configuration file.
    ///
    /// Currently returns `arena.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("arena.toml")
    }

    /// Retrieves an engine configuration by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EngineNotFound`] if no engine with the given name exists.
    pub fn get_engine(&self, name: &str) -> Result<&EngineConfig, ConfigError> {
        self.engines
            .get(name)
            .ok_or_else(|| ConfigError::EngineNotFound(name.to_string()))
    }

    /// Builds a fresh engine instance for `name`.
    pub fn build_engine(&self, name: &str) -> Result<Engine, ConfigError> {
        let config = self.get_engine(name)?;
        Engine::from_config(config).map_err(|source| ConfigError::InvalidEngine {
            name: name.to_string(),
            source,
        })
    }

    /// Retrieves a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PresetNotFound`] if no preset with the given name exists,
    /// or the error from [`PresetConfig::validate`] if it has unusable settings.
    pub fn get_preset(&self, name: &str) -> Result<&PresetConfig, ConfigError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))?;
        preset.validate()?;
        Ok(preset)
    }
}
