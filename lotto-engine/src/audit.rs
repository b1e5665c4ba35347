use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use lotto_history::History;

use crate::candidate::Candidate;
use crate::config::ExclusionConfig;
use crate::exclusion::{Exclusion, ExclusionEngine};

/// Kill list built on the draws before `draw_id`, checked against that draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillBacktest {
    pub draw_id: u32,
    pub kills: Vec<Exclusion>,
    /// Killed numbers that were drawn anyway.
    pub hits: Vec<u8>,
}

impl KillBacktest {
    pub fn success(&self) -> bool {
        self.hits.is_empty()
    }
}

pub fn backtest_kills(history: &History, config: &ExclusionConfig, targets: &[u32]) -> Result<Vec<KillBacktest>> {
    let engine = ExclusionEngine::new(config);
    targets
        .iter()
        .map(|&draw_id| {
            let target = history
                .find(draw_id)
                .with_context(|| format!("Draw {} not found in history", draw_id))?;
            let set = engine.evaluate(history.before(draw_id));
            let kills = set.kills().to_vec();
            let hits = kills.iter().map(|k| k.number).filter(|&n| target.contains(n)).collect();
            Ok(KillBacktest { draw_id, kills, hits })
        })
        .collect()
}

/// Ids of the `n` most recent draws.
pub fn recent_targets(history: &History, n: usize) -> Vec<u32> {
    history.recent(n).iter().map(|d| d.draw_id).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSurvival {
    pub rule: &'static str,
    /// Times the rule would have excluded a number.
    pub cases: u64,
    /// Cases where the excluded number stayed out of the next draw.
    pub survived: u64,
}

impl RuleSurvival {
    pub fn rate(&self) -> f64 {
        if self.cases == 0 {
            return 0.0;
        }
        self.survived as f64 / self.cases as f64
    }
}

/// How often the 3-in-a-row and last-bonus exclusions held over the history.
pub fn rule_survival(history: &History) -> Vec<RuleSurvival> {
    let draws = history.draws();
    let mut streak = RuleSurvival { rule: "3-in-a-row", cases: 0, survived: 0 };
    let mut bonus = RuleSurvival { rule: "last bonus", cases: 0, survived: 0 };

    for (i, draw) in draws.iter().enumerate() {
        if let Some(previous) = draws.get(i + 1) {
            bonus.cases += 1;
            if !draw.contains(previous.bonus) {
                bonus.survived += 1;
            }
        }

        if i + 3 < draws.len() {
            let before = &draws[i + 1..i + 4];
            for &n in &before[0].numbers {
                if before[1..].iter().all(|d| d.contains(n)) {
                    streak.cases += 1;
                    if !draw.contains(n) {
                        streak.survived += 1;
                    }
                }
            }
        }
    }

    vec![streak, bonus]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AcDistribution {
    /// AC value to number of draws.
    pub counts: BTreeMap<u32, u64>,
    /// `(draw_id, ac)` of draws at or below the low threshold, most recent first.
    pub low: Vec<(u32, u32)>,
}

pub fn ac_distribution(history: &History, low_threshold: u32) -> AcDistribution {
    let mut dist = AcDistribution::default();
    for draw in history {
        let Some(numbers) = Candidate::new(&draw.numbers) else {
            continue;
        };
        let ac = numbers.ac();
        *dist.counts.entry(ac).or_insert(0) += 1;
        if ac <= low_threshold {
            dist.low.push((draw.draw_id, ac));
        }
    }
    dist
}
