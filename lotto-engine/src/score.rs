use serde::Serialize;

use lotto_history::{Draw, POOL_SIZE};

use crate::config::ScoreConfig;

/// Per-number weight used by the sampler. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    scores: [f64; POOL_SIZE as usize],
}

impl ScoreTable {
    /// `draws[0]` must be the most recent draw.
    pub fn compute(draws: &[Draw], config: &ScoreConfig) -> Self {
        let mut scores = [config.base; POOL_SIZE as usize];
        if draws.is_empty() {
            return Self { scores };
        }

        // A number drawn several times inside a window collects the weight each time.
        for window in &config.windows {
            for draw in draws.iter().take(window.size) {
                for &n in &draw.numbers {
                    scores[(n - 1) as usize] += window.weight;
                }
            }
        }

        if config.cold_window > 0 {
            let mut seen = [false; POOL_SIZE as usize];
            for draw in draws.iter().take(config.cold_window) {
                for &n in &draw.numbers {
                    seen[(n - 1) as usize] = true;
                }
            }
            for (score, seen) in scores.iter_mut().zip(seen) {
                if !seen {
                    *score += config.cold_boost;
                }
            }
        }

        Self { scores }
    }

    pub fn get(&self, number: u8) -> f64 {
        self.scores[(number - 1) as usize]
    }

    /// `(number, score)` for 1..=45.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.scores.iter().enumerate().map(|(i, &s)| (i as u8 + 1, s))
    }
}

/// A rounded score as exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreEntry {
    pub number: u8,
    pub score: i64,
    pub excluded: bool,
}
