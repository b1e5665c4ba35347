use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::index;
use rand::{Rng, RngExt};

use lotto_history::{PICK_COUNT, POOL_SIZE};

use crate::candidate::Candidate;
use crate::config::GeneratorConfig;
use crate::exclusion::ExclusionSet;
use crate::score::ScoreTable;

/// Weighted sampler over the numbers left eligible by the exclusion set.
pub struct CandidateGenerator<'a> {
    scores: &'a ScoreTable,
    exclusions: &'a ExclusionSet,
    config: &'a GeneratorConfig,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(scores: &'a ScoreTable, exclusions: &'a ExclusionSet, config: &'a GeneratorConfig) -> Self {
        Self { scores, exclusions, config }
    }

    /// One number from `pool`, each weighted by its score plus a fresh jitter.
    /// `None` when the pool is empty or the weights are unusable (negative, all zero).
    pub fn pick_number<R: Rng + ?Sized>(&self, pool: &[u8], rng: &mut R) -> Option<u8> {
        let weights: Vec<f64> = pool
            .iter()
            .map(|&n| self.scores.get(n) + rng.random::<f64>() * self.config.jitter)
            .collect();
        let dist = WeightedIndex::new(&weights).ok()?;
        Some(pool[dist.sample(rng)])
    }

    /// The `size` lowest-scored eligible numbers, lower number first on ties.
    pub fn cold_pool(&self, size: usize) -> Vec<u8> {
        let mut eligible: Vec<u8> = (1..=POOL_SIZE).filter(|&n| !self.exclusions.contains(n)).collect();
        eligible.sort_by(|&a, &b| self.scores.get(a).total_cmp(&self.scores.get(b)).then(a.cmp(&b)));
        eligible.truncate(size);
        eligible
    }

    /// `None` only if fewer than six numbers remain eligible.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Candidate> {
        let mut selection: Vec<u8> = Vec::with_capacity(PICK_COUNT);

        if let Some(cold) = &self.config.cold_injection {
            let count = if rng.random::<f64>() < cold.single_probability { 1 } else { 2 };
            let pool = self.cold_pool(cold.pool_size);
            let picked = index::sample(rng, pool.len(), count.min(pool.len()));
            selection.extend(picked.iter().map(|i| pool[i]));
        }

        while selection.len() < PICK_COUNT {
            let pool: Vec<u8> = (1..=POOL_SIZE)
                .filter(|&n| !selection.contains(&n) && !self.exclusions.contains(n))
                .collect();
            selection.push(self.pick_number(&pool, rng)?);
        }

        Candidate::new(&selection)
    }
}
