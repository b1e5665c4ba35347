use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Probability that a candidate holding a consecutive pair is kept.
pub const PAIR_KEEP_PROBABILITY: f64 = 0.3;
/// Probability that the hybrid generator injects a single cold number (two otherwise).
pub const SINGLE_COLD_PROBABILITY: f64 = 0.7;
/// Size of the cold pool the hybrid generator injects from.
pub const COLD_POOL_SIZE: usize = 15;
/// Kill-list size that switches on the hot-neighbor and hot-carryover rules.
pub const CHALLENGE_KILL_COUNT: usize = 5;
/// Upper bound on `kill_count`; keeps at least 29 numbers eligible for sampling.
pub const MAX_KILL_COUNT: usize = 10;

/// Successive generations of the heuristic, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Three recency windows, tight sum range, rejects 5-of-6 history overlaps.
    Classic,
    /// Cold boost, wider sum range, consecutive pairs discouraged.
    Trend,
    /// Trend plus the kill-list cascade.
    Kill,
    /// Kill plus forced cold-number injection.
    #[default]
    Hybrid,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Classic, Preset::Trend, Preset::Kill, Preset::Hybrid];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Trend => "trend",
            Preset::Kill => "kill",
            Preset::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyWindow {
    pub size: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub base: f64,
    pub windows: Vec<RecencyWindow>,
    /// Numbers absent from this many recent draws receive `cold_boost`.
    pub cold_window: usize,
    pub cold_boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// K: maximum size of the kill list.
    pub kill_count: usize,
    /// Shorter histories produce an empty kill list.
    pub min_history: usize,
    /// Block every number drawn in each of the last three draws.
    pub streak_guard: bool,
    /// The hot-digit rule stops once the kill list reaches this size.
    pub digit_rule_limit: usize,
    /// Kill-list size from which the neighbor and carryover rules apply.
    pub challenge_threshold: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColdInjection {
    pub single_probability: f64,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Upper bound of the uniform jitter added to each sampling weight.
    pub jitter: f64,
    pub cold_injection: Option<ColdInjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub min_sum: u32,
    pub max_sum: u32,
    /// Longest accepted run of consecutive integers.
    pub max_run: usize,
    pub pair_keep_probability: f64,
    /// Reject when a past draw shares at least this many numbers.
    pub max_history_overlap: usize,
    pub min_ac: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    pub preset: Preset,
    pub score: ScoreConfig,
    pub exclusion: ExclusionConfig,
    pub generator: GeneratorConfig,
    pub validator: ValidatorConfig,
    pub max_attempts: usize,
}

impl PredictorConfig {
    pub fn preset(preset: Preset) -> Self {
        let trend_score = ScoreConfig {
            base: 20.0,
            windows: vec![
                RecencyWindow { size: 5, weight: 40.0 },
                RecencyWindow { size: 10, weight: 10.0 },
                RecencyWindow { size: 30, weight: 20.0 },
            ],
            cold_window: 15,
            cold_boost: 15.0,
        };
        let trend_validator = ValidatorConfig {
            min_sum: 80,
            max_sum: 200,
            max_run: 2,
            pair_keep_probability: PAIR_KEEP_PROBABILITY,
            max_history_overlap: 6,
            min_ac: 5,
        };
        let exclusion = |kill_count| ExclusionConfig {
            kill_count,
            min_history: 15,
            streak_guard: true,
            digit_rule_limit: 3,
            challenge_threshold: CHALLENGE_KILL_COUNT,
        };

        match preset {
            Preset::Classic => Self {
                preset,
                score: ScoreConfig {
                    base: 10.0,
                    windows: vec![
                        RecencyWindow { size: 5, weight: 50.0 },
                        RecencyWindow { size: 30, weight: 20.0 },
                        RecencyWindow { size: 50, weight: 5.0 },
                    ],
                    cold_window: 0,
                    cold_boost: 0.0,
                },
                exclusion: exclusion(0),
                generator: GeneratorConfig { jitter: 5.0, cold_injection: None },
                validator: ValidatorConfig {
                    min_sum: 100,
                    max_sum: 170,
                    max_run: 2,
                    pair_keep_probability: 1.0,
                    max_history_overlap: 5,
                    min_ac: 5,
                },
                max_attempts: 5000,
            },
            Preset::Trend => Self {
                preset,
                score: trend_score,
                exclusion: exclusion(0),
                generator: GeneratorConfig { jitter: 10.0, cold_injection: None },
                validator: trend_validator,
                max_attempts: 2000,
            },
            Preset::Kill => Self {
                preset,
                score: trend_score,
                exclusion: exclusion(3),
                generator: GeneratorConfig { jitter: 10.0, cold_injection: None },
                validator: trend_validator,
                max_attempts: 2000,
            },
            Preset::Hybrid => Self {
                preset,
                score: trend_score,
                exclusion: exclusion(3),
                generator: GeneratorConfig {
                    jitter: 10.0,
                    cold_injection: Some(ColdInjection {
                        single_probability: SINGLE_COLD_PROBABILITY,
                        pool_size: COLD_POOL_SIZE,
                    }),
                },
                validator: trend_validator,
                max_attempts: 2000,
            },
        }
    }

    /// Overrides K. Presets without a kill list keep theirs empty.
    pub fn with_kill_count(mut self, kill_count: usize) -> Self {
        if matches!(self.preset, Preset::Kill | Preset::Hybrid) {
            self.exclusion.kill_count = kill_count;
        }
        self
    }

    pub fn is_challenge(&self) -> bool {
        self.exclusion.kill_count >= self.exclusion.challenge_threshold
    }

    pub fn validate(&self) -> Result<()> {
        if self.exclusion.kill_count > MAX_KILL_COUNT {
            bail!("kill_count {} exceeds {}", self.exclusion.kill_count, MAX_KILL_COUNT);
        }
        if self.validator.min_sum > self.validator.max_sum {
            bail!("min_sum {} above max_sum {}", self.validator.min_sum, self.validator.max_sum);
        }
        if !(0.0..=1.0).contains(&self.validator.pair_keep_probability) {
            bail!("pair_keep_probability must lie in [0, 1]");
        }
        if let Some(cold) = &self.generator.cold_injection {
            if !(0.0..=1.0).contains(&cold.single_probability) {
                bail!("single_probability must lie in [0, 1]");
            }
        }
        if self.score.base < 0.0 {
            bail!("score base must not be negative");
        }
        if let Some(window) = self.score.windows.iter().find(|w| w.weight < 0.0) {
            bail!("weight of the {}-draw window must not be negative", window.size);
        }
        if self.score.cold_boost < 0.0 {
            bail!("cold_boost must not be negative");
        }
        if self.generator.jitter < 0.0 {
            bail!("jitter must not be negative");
        }
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Cannot write {:?}", path))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read configuration {:?}", path))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid configuration in {:?}", path))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}
