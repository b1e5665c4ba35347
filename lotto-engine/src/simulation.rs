use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, RngExt, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use lotto_history::{Draw, History, PICK_COUNT, POOL_SIZE};

use crate::candidate::Candidate;
use crate::config::PredictorConfig;
use crate::predictor::Predictor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Miss,
}

impl Rank {
    pub const ALL: [Rank; 6] = [Rank::First, Rank::Second, Rank::Third, Rank::Fourth, Rank::Fifth, Rank::Miss];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::First => "1st",
            Rank::Second => "2nd",
            Rank::Third => "3rd",
            Rank::Fourth => "4th",
            Rank::Fifth => "5th",
            Rank::Miss => "Miss",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Prize tier of `ticket` against `target`. Ticket order does not matter.
pub fn rank(ticket: &[u8], target: &Draw) -> Rank {
    let matches = target.matches(ticket);
    match matches {
        6 => Rank::First,
        5 if ticket.contains(&target.bonus) => Rank::Second,
        5 => Rank::Third,
        4 => Rank::Fourth,
        3 => Rank::Fifth,
        _ => Rank::Miss,
    }
}

/// Prize per rank and ticket price, in won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTable {
    pub first: u64,
    pub second: u64,
    pub third: u64,
    pub fourth: u64,
    pub fifth: u64,
    pub ticket_price: u64,
}

impl Default for PrizeTable {
    fn default() -> Self {
        Self {
            first: 2_000_000_000,
            second: 50_000_000,
            third: 1_500_000,
            fourth: 50_000,
            fifth: 5_000,
            ticket_price: 1_000,
        }
    }
}

impl PrizeTable {
    pub fn prize(&self, rank: Rank) -> u64 {
        match rank {
            Rank::First => self.first,
            Rank::Second => self.second,
            Rank::Third => self.third,
            Rank::Fourth => self.fourth,
            Rank::Fifth => self.fifth,
            Rank::Miss => 0,
        }
    }

    /// Uses the draw's recorded first prize when it has one.
    pub fn for_draw(&self, draw: &Draw) -> Self {
        Self { first: draw.first_prize.unwrap_or(self.first), ..*self }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    /// Indexed by `Rank::index`.
    pub counts: [u64; 6],
    /// Prize money per rank, same indexing.
    pub winnings: [u64; 6],
    pub cost: u64,
    pub revenue: u64,
    /// Tickets produced by the predictor's fallback path.
    pub fallbacks: u64,
}

impl SimulationStats {
    pub fn record(&mut self, rank: Rank, prizes: &PrizeTable) {
        let prize = prizes.prize(rank);
        self.counts[rank.index()] += 1;
        self.winnings[rank.index()] += prize;
        self.cost += prizes.ticket_price;
        self.revenue += prize;
    }

    pub fn merge(&mut self, other: &SimulationStats) {
        for i in 0..Rank::ALL.len() {
            self.counts[i] += other.counts[i];
            self.winnings[i] += other.winnings[i];
        }
        self.cost += other.cost;
        self.revenue += other.revenue;
        self.fallbacks += other.fallbacks;
    }

    pub fn iterations(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn count(&self, rank: Rank) -> u64 {
        self.counts[rank.index()]
    }

    pub fn wins(&self) -> u64 {
        self.iterations() - self.count(Rank::Miss)
    }

    pub fn profit(&self) -> i64 {
        self.revenue as i64 - self.cost as i64
    }

    /// `(revenue - cost) / cost`; 0 before any ticket is recorded.
    pub fn roi(&self) -> f64 {
        if self.cost == 0 {
            return 0.0;
        }
        self.profit() as f64 / self.cost as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Every iteration plays this draw, trained on the draws before it.
    Fixed(u32),
    /// Every iteration picks a draw with at least `min_lookback` earlier draws.
    Randomized { min_lookback: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Predictor(PredictorConfig),
    /// Six numbers drawn uniformly, the baseline.
    Random,
}

impl Strategy {
    pub fn label(&self) -> String {
        match self {
            Strategy::Predictor(config) => {
                if config.is_challenge() {
                    format!("{} (K={})", config.preset, config.exclusion.kill_count)
                } else {
                    config.preset.to_string()
                }
            }
            Strategy::Random => "random".to_string(),
        }
    }
}

/// Six uniformly drawn numbers.
pub fn random_ticket<R: Rng + ?Sized>(rng: &mut R) -> Candidate {
    let selection: Vec<u8> = index::sample(rng, POOL_SIZE as usize, PICK_COUNT)
        .iter()
        .map(|i| i as u8 + 1)
        .collect();
    Candidate::new(&selection).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub iterations: usize,
    pub batch_size: usize,
    /// Batch `i` is seeded with `seed + i`; drawn from entropy when absent.
    pub seed: Option<u64>,
    pub target: Target,
    pub prizes: PrizeTable,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            batch_size: 1_000,
            seed: None,
            target: Target::Randomized { min_lookback: 50 },
            prizes: PrizeTable::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub batch: usize,
    pub stats: SimulationStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub strategy: String,
    /// Set in fixed-target mode.
    pub target: Option<u32>,
    pub seed: u64,
    pub batches: Vec<BatchReport>,
    pub total: SimulationStats,
}

pub struct SimulationHarness<'h> {
    history: &'h History,
    settings: SimulationSettings,
}

impl<'h> SimulationHarness<'h> {
    /// Fails when the target draw is unknown or the history is too short.
    pub fn new(history: &'h History, settings: SimulationSettings) -> Result<Self> {
        if settings.iterations == 0 {
            bail!("iterations must be at least 1");
        }
        if settings.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        match settings.target {
            Target::Fixed(id) => {
                history
                    .find(id)
                    .with_context(|| format!("Target draw {} not found in history", id))?;
            }
            Target::Randomized { min_lookback } => {
                if history.len() <= min_lookback {
                    bail!(
                        "History holds {} draws, more than {} are needed for randomized targets",
                        history.len(),
                        min_lookback
                    );
                }
            }
        }
        Ok(Self { history, settings })
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn run(&self, strategy: &Strategy) -> Result<SimulationReport> {
        self.run_with_progress(strategy, |_| {})
    }

    /// `progress` receives the ticket count of each finished batch, from any thread.
    pub fn run_with_progress<F>(&self, strategy: &Strategy, progress: F) -> Result<SimulationReport>
    where
        F: Fn(u64) + Sync,
    {
        let seed = self.settings.seed.unwrap_or_else(|| rand::rng().random());
        let iterations = self.settings.iterations;
        let batch_size = self.settings.batch_size;
        let n_batches = iterations.div_ceil(batch_size);

        info!(
            strategy = %strategy.label(),
            iterations,
            batches = n_batches,
            seed,
            "starting simulation"
        );

        // Fixed mode builds one predictor shared by every batch.
        let fixed = match self.settings.target {
            Target::Fixed(id) => {
                let target = self
                    .history
                    .find(id)
                    .with_context(|| format!("Target draw {} not found in history", id))?;
                let predictor = match strategy {
                    Strategy::Predictor(config) => {
                        Some(Predictor::from_window(self.history.before(id), config.clone()))
                    }
                    Strategy::Random => None,
                };
                Some((target, predictor))
            }
            Target::Randomized { .. } => None,
        };

        let batches: Vec<BatchReport> = (0..n_batches)
            .into_par_iter()
            .map(|batch| {
                let size = batch_size.min(iterations - batch * batch_size);
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(batch as u64));
                let mut stats = SimulationStats::default();

                for _ in 0..size {
                    match &fixed {
                        Some((target, predictor)) => {
                            self.play(strategy, predictor.as_ref(), target, &mut stats, &mut rng);
                        }
                        None => {
                            let (target, training) = self.pick_target(&mut rng);
                            let predictor = match strategy {
                                Strategy::Predictor(config) => {
                                    Some(Predictor::from_window(training, config.clone()))
                                }
                                Strategy::Random => None,
                            };
                            self.play(strategy, predictor.as_ref(), target, &mut stats, &mut rng);
                        }
                    }
                }

                progress(size as u64);
                BatchReport { batch, stats }
            })
            .collect();

        let mut total = SimulationStats::default();
        for batch in &batches {
            total.merge(&batch.stats);
        }

        info!(
            strategy = %strategy.label(),
            wins = total.wins(),
            fallbacks = total.fallbacks,
            roi = total.roi(),
            "simulation finished"
        );

        Ok(SimulationReport {
            strategy: strategy.label(),
            target: match self.settings.target {
                Target::Fixed(id) => Some(id),
                Target::Randomized { .. } => None,
            },
            seed,
            batches,
            total,
        })
    }

    /// A random draw with enough earlier draws, and those earlier draws.
    fn pick_target<R: Rng + ?Sized>(&self, rng: &mut R) -> (&'h Draw, &'h [Draw]) {
        let draws = self.history.draws();
        let min_lookback = match self.settings.target {
            Target::Randomized { min_lookback } => min_lookback,
            Target::Fixed(_) => 0,
        };
        let idx = rng.random_range(0..draws.len() - min_lookback);
        (&draws[idx], &draws[idx + 1..])
    }

    fn play<R: Rng + ?Sized>(
        &self,
        strategy: &Strategy,
        predictor: Option<&Predictor<'_>>,
        target: &Draw,
        stats: &mut SimulationStats,
        rng: &mut R,
    ) {
        let ticket = match (strategy, predictor) {
            (Strategy::Predictor(_), Some(predictor)) => {
                let result = predictor.predict_with(rng);
                if result.fallback {
                    stats.fallbacks += 1;
                }
                result.numbers
            }
            _ => random_ticket(rng),
        };
        let prizes = self.settings.prizes.for_draw(target);
        stats.record(rank(ticket.numbers(), target), &prizes);
    }
}

/// Runs every strategy on the same settings, in order.
pub fn compare(
    history: &History,
    settings: &SimulationSettings,
    strategies: &[Strategy],
) -> Result<Vec<SimulationReport>> {
    let harness = SimulationHarness::new(history, settings.clone())?;
    strategies.iter().map(|s| harness.run(s)).collect()
}
