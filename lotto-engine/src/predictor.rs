use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace, warn};

use lotto_history::{Draw, History, PICK_COUNT, POOL_SIZE};

use crate::candidate::Candidate;
use crate::config::{MAX_KILL_COUNT, Preset, PredictorConfig};
use crate::exclusion::{ExclusionEngine, ExclusionSet};
use crate::generator::CandidateGenerator;
use crate::score::{ScoreEntry, ScoreTable};
use crate::validator::Validator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub numbers: Candidate,
    pub analysis: Vec<String>,
    /// Candidates generated, the accepted one included.
    pub attempts: usize,
    /// The retry budget ran out and `numbers` did not pass validation.
    pub fallback: bool,
}

/// Scores and kill list are computed once, then every `predict` call reuses them.
pub struct Predictor<'h> {
    history: &'h [Draw],
    config: PredictorConfig,
    scores: ScoreTable,
    exclusions: ExclusionSet,
}

impl<'h> Predictor<'h> {
    pub fn new(history: &'h History, config: PredictorConfig) -> Self {
        Self::from_window(history.draws(), config)
    }

    /// `draws` must be sorted most recent first, as `History` keeps them.
    pub fn from_window(draws: &'h [Draw], mut config: PredictorConfig) -> Self {
        config.exclusion.kill_count = config.exclusion.kill_count.min(MAX_KILL_COUNT);
        let scores = ScoreTable::compute(draws, &config.score);
        let exclusions = ExclusionEngine::new(&config.exclusion).evaluate(draws);
        debug!(
            preset = %config.preset,
            draws = draws.len(),
            kills = exclusions.kills().len(),
            blocked = exclusions.blocked().len(),
            "predictor ready"
        );
        Self { history: draws, config, scores, exclusions }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn history(&self) -> &[Draw] {
        self.history
    }

    pub fn score_table(&self) -> &ScoreTable {
        &self.scores
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn predict(&self) -> PredictionResult {
        let mut rng = rand::rng();
        self.predict_with(&mut rng)
    }

    pub fn predict_with<R: Rng + ?Sized>(&self, rng: &mut R) -> PredictionResult {
        let generator = CandidateGenerator::new(&self.scores, &self.exclusions, &self.config.generator);
        let validator = Validator::new(&self.config.validator, self.history);

        let mut last = None;
        for attempt in 1..=self.config.max_attempts {
            let Some(candidate) = generator.generate(rng) else {
                break;
            };
            match validator.validate(&candidate, rng) {
                Ok(_) => {
                    return PredictionResult {
                        numbers: candidate,
                        analysis: self.analyze(&candidate),
                        attempts: attempt,
                        fallback: false,
                    };
                }
                Err(rejection) => trace!(attempt, %rejection, "candidate rejected"),
            }
            last = Some(candidate);
        }

        let numbers = last.unwrap_or_else(|| self.strongest_eligible());
        warn!(
            preset = %self.config.preset,
            max_attempts = self.config.max_attempts,
            numbers = %numbers,
            "retry budget exhausted, keeping last candidate"
        );
        PredictionResult {
            numbers,
            analysis: self.analyze(&numbers),
            attempts: self.config.max_attempts,
            fallback: true,
        }
    }

    fn strongest_eligible(&self) -> Candidate {
        let top: Vec<u8> = self.all_scores().iter().take(PICK_COUNT).map(|e| e.number).collect();
        Candidate::new(&top).unwrap_or_default()
    }

    /// Rounded scores of `numbers`, in the given order.
    pub fn scores_for(&self, numbers: &[u8]) -> Vec<ScoreEntry> {
        numbers
            .iter()
            .filter(|n| (1..=POOL_SIZE).contains(n))
            .map(|&n| self.entry(n))
            .collect()
    }

    /// All 45 numbers by descending score, lower number first on ties and
    /// excluded numbers after every eligible one.
    pub fn all_scores(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = (1..=POOL_SIZE).map(|n| self.entry(n)).collect();
        entries.sort_by(|a, b| {
            a.excluded
                .cmp(&b.excluded)
                .then(b.score.cmp(&a.score))
                .then(a.number.cmp(&b.number))
        });
        entries
    }

    fn entry(&self, number: u8) -> ScoreEntry {
        ScoreEntry {
            number,
            score: self.scores.get(number).round() as i64,
            excluded: self.exclusions.contains(number),
        }
    }

    /// Numbers of `candidate` within the cold pool: rounded score at or below
    /// the pool-size-th lowest, excluded numbers counting as the lowest.
    pub fn cold_numbers(&self, candidate: &Candidate) -> Vec<u8> {
        let pool_size = self
            .config
            .generator
            .cold_injection
            .map(|c| c.pool_size)
            .unwrap_or(crate::config::COLD_POOL_SIZE);
        let mut ascending: Vec<ScoreEntry> = self.all_scores();
        ascending.reverse();
        let Some(threshold) = ascending.get(pool_size.saturating_sub(1)) else {
            return candidate.numbers().to_vec();
        };
        if threshold.excluded {
            return Vec::new();
        }
        candidate
            .numbers()
            .iter()
            .copied()
            .filter(|&n| self.entry(n).score <= threshold.score)
            .collect()
    }

    /// Human-readable rationale, most specific strategy first.
    pub fn analyze(&self, candidate: &Candidate) -> Vec<String> {
        let mut lines = Vec::new();
        let preset = self.config.preset;

        if preset == Preset::Hybrid {
            let cold = self.cold_numbers(candidate);
            lines.push("Hybrid strategy: hot trend plus forced cold numbers".to_string());
            lines.push(format!("Cold numbers included: {} {:?}", cold.len(), cold));
        }

        if matches!(preset, Preset::Kill | Preset::Hybrid) {
            let kills = self.exclusions.kills();
            if kills.is_empty() && self.config.exclusion.kill_count == 0 {
                lines.push("Kill list disabled (K=0)".to_string());
            } else if kills.is_empty() {
                lines.push(format!(
                    "Kill list inactive: {} draws available, {} needed",
                    self.history.len(),
                    self.config.exclusion.min_history
                ));
            } else {
                let listed = kills
                    .iter()
                    .map(|k| format!("{}({})", k.number, k.reason()))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mode = if self.config.is_challenge() { "challenge" } else { "standard" };
                lines.push(format!("{}-kill {mode}: [{listed}] excluded", kills.len()));
            }
        }

        let hottest = candidate
            .numbers()
            .iter()
            .copied()
            .max_by(|&a, &b| self.scores.get(a).total_cmp(&self.scores.get(b)).then(b.cmp(&a)))
            .unwrap_or(candidate.numbers()[0]);
        if preset == Preset::Classic {
            lines.push(format!("Recency-weighted frequency, key number [{hottest}]"));
        } else {
            lines.push(format!("Recency weighting with cold boost, key number [{hottest}]"));
        }

        let validator = &self.config.validator;
        let odd = candidate.odd_count();
        lines.push(format!(
            "AC:{}, sum:{} ({}~{}), odd/even {}:{}",
            candidate.ac(),
            candidate.sum(),
            validator.min_sum,
            validator.max_sum,
            odd,
            PICK_COUNT - odd
        ));
        if validator.max_history_overlap >= PICK_COUNT {
            lines.push("Exact repeats of past draws excluded".to_string());
        } else {
            lines.push(format!(
                "Combinations sharing {}+ numbers with a past draw excluded",
                validator.max_history_overlap
            ));
        }

        let streak = self.exclusions.streak();
        if !streak.is_empty() {
            lines.push(format!("Streak guard: {:?} drawn in each of the last 3 draws", streak));
        }
        lines
    }
}
