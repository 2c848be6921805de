//! Engine configuration.
//!
//! Engines are described in TOML by a `kind` tag plus per-kind settings.
//! Every setting has a default, so `kind = "mcts"` alone is a valid engine.
//!
//! ```toml
//! kind = "quiescence"
//! depth = 3
//! q_depth = 5
//! evaluator = "heuristic"
//! ```

use crate::{Evaluator, SearchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of one in-process engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineConfig {
    Random(RandomConfig),
    Minimax(AlphaBetaConfig),
    Negamax(AlphaBetaConfig),
    IterativeDeepening(IterativeDeepeningConfig),
    Quiescence(QuiescenceConfig),
    Mcts(MctsConfig),
}

impl EngineConfig {
    /// The `kind` tag of this configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineConfig::Random(_) => "random",
            EngineConfig::Minimax(_) => "minimax",
            EngineConfig::Negamax(_) => "negamax",
            EngineConfig::IterativeDeepening(_) => "iterative_deepening",
            EngineConfig::Quiescence(_) => "quiescence",
            EngineConfig::Mcts(_) => "mcts",
        }
    }

    /// Checks that the engine can actually search with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for a zero search depth, a
    /// zero time budget, or a negative or non-finite exploration constant.
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            EngineConfig::Random(_) => Ok(()),
            EngineConfig::Minimax(c) | EngineConfig::Negamax(c) => positive_depth("depth", c.depth),
            EngineConfig::IterativeDeepening(c) => {
                positive_depth("max_depth", c.max_depth)?;
                positive_time(c.movetime_ms)
            }
            EngineConfig::Quiescence(c) => {
                positive_depth("depth", c.depth)?;
                c.movetime_ms.map_or(Ok(()), positive_time)
            }
            EngineConfig::Mcts(c) => {
                positive_time(c.movetime_ms)?;
                if !c.exploration.is_finite() || c.exploration < 0.0 {
                    return Err(SearchError::InvalidConfig(format!(
                        "exploration must be a non-negative number, got {}",
                        c.exploration
                    )));
                }
                if c.iterations == Some(0) {
                    return Err(SearchError::InvalidConfig(
                        "iterations must be at least 1".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn positive_depth(field: &str, depth: u8) -> Result<(), SearchError> {
    if depth == 0 {
        return Err(SearchError::InvalidConfig(format!(
            "{} must be at least 1",
            field
        )));
    }
    Ok(())
}

fn positive_time(movetime_ms: u64) -> Result<(), SearchError> {
    if movetime_ms == 0 {
        return Err(SearchError::InvalidConfig(
            "movetime_ms must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Settings for the random-move baseline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Seed for reproducible games. Entropy-seeded when absent.
    pub seed: Option<u64>,
}

/// Settings shared by the fixed-depth minimax and negamax engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphaBetaConfig {
    pub depth: u8,
    pub evaluator: Evaluator,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        AlphaBetaConfig {
            depth: 3,
            evaluator: Evaluator::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IterativeDeepeningConfig {
    pub max_depth: u8,
    pub movetime_ms: u64,
    pub evaluator: Evaluator,
}

impl IterativeDeepeningConfig {
    pub fn movetime(&self) -> Duration {
        Duration::from_millis(self.movetime_ms)
    }
}

impl Default for IterativeDeepeningConfig {
    fn default() -> Self {
        IterativeDeepeningConfig {
            max_depth: 4,
            movetime_ms: 1000,
            evaluator: Evaluator::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuiescenceConfig {
    /// Nominal alpha-beta depth.
    pub depth: u8,
    /// Maximum plies of captures and checks searched past the horizon.
    pub q_depth: u8,
    /// Optional budget, checked before each root move. The root move in
    /// progress when it runs out is finished, so a search can overrun by
    /// up to one root subtree.
    pub movetime_ms: Option<u64>,
    pub evaluator: Evaluator,
}

impl QuiescenceConfig {
    pub fn movetime(&self) -> Option<Duration> {
        self.movetime_ms.map(Duration::from_millis)
    }
}

impl Default for QuiescenceConfig {
    fn default() -> Self {
        QuiescenceConfig {
            depth: 3,
            q_depth: 5,
            movetime_ms: None,
            evaluator: Evaluator::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Budget checked between simulations; the simulation running when it
    /// runs out completes first.
    pub movetime_ms: u64,
    /// Stop after this many simulations even if time remains.
    pub iterations: Option<u64>,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Rollouts are cut off and evaluated after this many plies.
    pub rollout_plies: u32,
    pub seed: Option<u64>,
    pub evaluator: Evaluator,
}

impl MctsConfig {
    pub fn movetime(&self) -> Duration {
        Duration::from_millis(self.movetime_ms)
    }
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            movetime_ms: 1000,
            iterations: None,
            exploration: std::f64::consts::SQRT_2,
            rollout_plies: 200,
            seed: None,
            evaluator: Evaluator::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_each_kind() {
        let config: EngineConfig = toml::from_str(r#"kind = "random""#).unwrap();
        assert_eq!(config, EngineConfig::Random(RandomConfig { seed: None }));

        let config: EngineConfig = toml::from_str(
            r#"
kind = "negamax"
depth = 4
evaluator = "material"
"#,
        )
        .unwrap();
        assert_eq!(
            config,
            EngineConfig::Negamax(AlphaBetaConfig {
                depth: 4,
                evaluator: Evaluator::Material,
            })
        );

        let config: EngineConfig = toml::from_str(
            r#"
kind = "iterative_deepening"
max_depth = 6
movetime_ms = 250
"#,
        )
        .unwrap();
        match config {
            EngineConfig::IterativeDeepening(c) => {
                assert_eq!(c.max_depth, 6);
                assert_eq!(c.movetime(), Duration::from_millis(250));
                assert_eq!(c.evaluator, Evaluator::Heuristic);
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config: EngineConfig = toml::from_str(r#"kind = "quiescence""#).unwrap();
        assert_eq!(config, EngineConfig::Quiescence(QuiescenceConfig::default()));
        assert_eq!(config.kind(), "quiescence");

        let config: EngineConfig = toml::from_str(r#"kind = "mcts""#).unwrap();
        match config {
            EngineConfig::Mcts(c) => {
                assert_eq!(c.movetime_ms, 1000);
                assert_eq!(c.iterations, None);
                assert!((c.exploration - 1.414).abs() < 1e-3);
                assert_eq!(c.rollout_plies, 200);
            }
            other => panic!("unexpected config {:?}", other),
        }

        let config: EngineConfig = toml::from_str(r#"kind = "minimax""#).unwrap();
        assert_eq!(config, EngineConfig::Minimax(AlphaBetaConfig::default()));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(toml::from_str::<EngineConfig>(r#"kind = "alphazero""#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(EngineConfig::Minimax(AlphaBetaConfig::default()).validate().is_ok());
        assert!(EngineConfig::Negamax(AlphaBetaConfig {
            depth: 0,
            ..Default::default()
        })
        .validate()
        .is_err());
        assert!(EngineConfig::IterativeDeepening(IterativeDeepeningConfig {
            movetime_ms: 0,
            ..Default::default()
        })
        .validate()
        .is_err());
        assert!(EngineConfig::Mcts(MctsConfig {
            exploration: f64::NAN,
            ..Default::default()
        })
        .validate()
        .is_err());
        assert!(EngineConfig::Mcts(MctsConfig {
            iterations: Some(0),
            ..Default::default()
        })
        .validate()
        .is_err());
        assert!(EngineConfig::Quiescence(QuiescenceConfig {
            q_depth: 0,
            ..Default::default()
        })
        .validate()
        .is_ok());
    }
}
