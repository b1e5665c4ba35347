use rand::{Rng, RngExt};

use lotto_history::Draw;

use crate::candidate::Candidate;
use crate::config::ValidatorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Sum(u32),
    /// All odd or all even.
    Parity(usize),
    Run(usize),
    /// Consecutive pair dropped by the keep-probability draw.
    Pair,
    HistoryOverlap { draw_id: u32, matches: usize },
    Ac(u32),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Sum(sum) => write!(f, "sum {sum} out of range"),
            Rejection::Parity(odd) => write!(f, "{odd} odd numbers"),
            Rejection::Run(len) => write!(f, "{len} consecutive numbers"),
            Rejection::Pair => write!(f, "consecutive pair discarded"),
            Rejection::HistoryOverlap { draw_id, matches } => {
                write!(f, "{matches} numbers shared with draw {draw_id}")
            }
            Rejection::Ac(ac) => write!(f, "AC {ac} too low"),
        }
    }
}

/// Structural metrics of an accepted candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inspection {
    pub sum: u32,
    pub odd: usize,
    pub ac: u32,
    pub has_pair: bool,
}

pub struct Validator<'a> {
    config: &'a ValidatorConfig,
    history: &'a [Draw],
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a ValidatorConfig, history: &'a [Draw]) -> Self {
        Self { config, history }
    }

    /// Deterministic checks only; calling it twice gives the same answer.
    pub fn inspect(&self, candidate: &Candidate) -> Result<Inspection, Rejection> {
        let run = candidate.longest_run();
        if run > self.config.max_run {
            return Err(Rejection::Run(run));
        }

        let odd = candidate.odd_count();
        if odd == 0 || odd == candidate.numbers().len() {
            return Err(Rejection::Parity(odd));
        }

        let sum = candidate.sum();
        if sum < self.config.min_sum || sum > self.config.max_sum {
            return Err(Rejection::Sum(sum));
        }

        for draw in self.history {
            let matches = draw.matches(candidate.numbers());
            if matches >= self.config.max_history_overlap {
                return Err(Rejection::HistoryOverlap { draw_id: draw.draw_id, matches });
            }
        }

        let ac = candidate.ac();
        if ac < self.config.min_ac {
            return Err(Rejection::Ac(ac));
        }

        Ok(Inspection { sum, odd, ac, has_pair: run >= 2 })
    }

    /// `inspect` followed by the random consecutive-pair filter.
    pub fn validate<R: Rng + ?Sized>(&self, candidate: &Candidate, rng: &mut R) -> Result<Inspection, Rejection> {
        let inspection = self.inspect(candidate)?;
        if inspection.has_pair && rng.random::<f64>() > self.config.pair_keep_probability {
            return Err(Rejection::Pair);
        }
        Ok(inspection)
    }
}
