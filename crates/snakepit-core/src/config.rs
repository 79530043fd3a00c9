//! Tuning knobs for snakes and their population.
//!
//! Defaults reproduce the behaviour of the terminal game. A config can be
//! loaded from JSON; any field left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::persistence::SaveError;

/// Per-snake movement, growth and combat rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeRules {
    /// Seconds between moves
    pub move_interval: f32,
    /// Chance per move of resampling the heading
    pub turn_chance: f64,
    pub initial_length: usize,
    /// Eggs eaten past this length are consumed without growth
    pub max_length: usize,
    /// Rattles granted to the attacker on every bite
    pub rattles_per_bite: usize,
    /// A bitten snake must have more segments than this to lose one
    pub bite_min_segments: usize,
    pub bite_message_secs: f32,
}

impl Default for SnakeRules {
    fn default() -> Self {
        Self {
            move_interval: 0.5,
            turn_chance: 0.3,
            initial_length: 3,
            max_length: 15,
            rattles_per_bite: 2,
            bite_min_segments: 3,
            bite_message_secs: 2.0,
        }
    }
}

/// Population-level spawn settings plus the rules every snake follows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Seconds between spawn attempts
    pub spawn_interval: f32,
    pub max_snakes: usize,
    /// Candidate cells tried per spawn attempt
    pub spawn_attempts: usize,
    /// Spawn offsets are drawn from `-spawn_radius..=spawn_radius` on each axis
    pub spawn_radius: i32,
    /// Fixed rng seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub rules: SnakeRules,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            spawn_interval: 10.0,
            max_snakes: 5,
            spawn_attempts: 10,
            spawn_radius: 10,
            seed: None,
            rules: SnakeRules::default(),
        }
    }
}

impl PopulationConfig {
    pub fn from_json(text: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Validation errors for population configs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveMoveInterval(f32),
    NonPositiveSpawnInterval(f32),
    TurnChanceOutOfRange(f64),
    ZeroInitialLength,
    /// max_length below initial_length
    MaxBelowInitial { max: usize, initial: usize },
    ZeroSpawnAttempts,
    NegativeSpawnRadius(i32),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveMoveInterval(v) => {
                write!(f, "move_interval must be positive, got {}", v)
            }
            ConfigError::NonPositiveSpawnInterval(v) => {
                write!(f, "spawn_interval must be positive, got {}", v)
            }
            ConfigError::TurnChanceOutOfRange(v) => {
                write!(f, "turn_chance must be within [0, 1], got {}", v)
            }
            ConfigError::ZeroInitialLength => write!(f, "initial_length must be at least 1"),
            ConfigError::MaxBelowInitial { max, initial } => write!(
                f,
                "max_length {} is below initial_length {}",
                max, initial
            ),
            ConfigError::ZeroSpawnAttempts => write!(f, "spawn_attempts must be at least 1"),
            ConfigError::NegativeSpawnRadius(v) => {
                write!(f, "spawn_radius must not be negative, got {}", v)
            }
        }
    }
}

/// Validate a config, returning every problem found.
pub fn validate_config(config: &PopulationConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    let rules = &config.rules;

    if rules.move_interval.is_nan() || rules.move_interval <= 0.0 {
        errors.push(ConfigError::NonPositiveMoveInterval(rules.move_interval));
    }
    if config.spawn_interval.is_nan() || config.spawn_interval <= 0.0 {
        errors.push(ConfigError::NonPositiveSpawnInterval(config.spawn_interval));
    }
    if !(0.0..=1.0).contains(&rules.turn_chance) {
        errors.push(ConfigError::TurnChanceOutOfRange(rules.turn_chance));
    }
    if rules.initial_length == 0 {
        errors.push(ConfigError::ZeroInitialLength);
    }
    if rules.max_length < rules.initial_length {
        errors.push(ConfigError::MaxBelowInitial {
            max: rules.max_length,
            initial: rules.initial_length,
        });
    }
    if config.spawn_attempts == 0 {
        errors.push(ConfigError::ZeroSpawnAttempts);
    }
    if config.spawn_radius < 0 {
        errors.push(ConfigError::NegativeSpawnRadius(config.spawn_radius));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(validate_config(&PopulationConfig::default()).is_empty());
    }

    #[test]
    fn defaults_match_game() {
        let config = PopulationConfig::default();
        assert_eq!(config.max_snakes, 5);
        assert_eq!(config.spawn_attempts, 10);
        assert_eq!(config.rules.max_length, 15);
        assert_eq!(config.rules.initial_length, 3);
        assert!((config.rules.move_interval - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            PopulationConfig::from_json(r#"{ "max_snakes": 2, "rules": { "max_length": 6 } }"#)
                .unwrap();
        assert_eq!(config.max_snakes, 2);
        assert_eq!(config.rules.max_length, 6);
        assert_eq!(config.rules.rattles_per_bite, 2);
        assert_eq!(config.spawn_attempts, 10);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            PopulationConfig::from_json("{ max_snakes: }"),
            Err(SaveError::Json(_))
        ));
    }

    #[test]
    fn bad_values_are_all_reported() {
        let mut config = PopulationConfig::default();
        config.spawn_interval = 0.0;
        config.spawn_attempts = 0;
        config.rules.turn_chance = 1.5;
        config.rules.max_length = 2;
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::NonPositiveSpawnInterval(0.0)));
        assert!(errors.contains(&ConfigError::ZeroSpawnAttempts));
        assert!(errors.contains(&ConfigError::TurnChanceOutOfRange(1.5)));
        assert!(errors.contains(&ConfigError::MaxBelowInitial { max: 2, initial: 3 }));
        assert_eq!(errors.len(), 4);
    }
}
