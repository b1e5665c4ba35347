use serde::Serialize;
use tracing::debug;

use lotto_history::{Draw, POOL_SIZE};

use crate::config::ExclusionConfig;

/// Why a number was put on the kill list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum KillRule {
    /// Drawn in each of the last three draws.
    ThreeInARow,
    /// Stand-in for `ThreeInARow`: most frequent number of the last 10 draws.
    HottestRecent { hits: u32 },
    LastBonus,
    /// Least frequent number sharing the dominant last digit of the last 5 draws.
    WeakestOfHotDigit { digit: u8 },
    HotNeighbor,
    HotCarryover,
    Filler { hits: u32 },
}

impl std::fmt::Display for KillRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KillRule::ThreeInARow => write!(f, "3-consecutive"),
            KillRule::HottestRecent { hits } => write!(f, "max freq last 10 ({hits} hits)"),
            KillRule::LastBonus => write!(f, "last bonus"),
            KillRule::WeakestOfHotDigit { digit } => write!(f, "weakest of hot digit {digit}"),
            KillRule::HotNeighbor => write!(f, "hot neighbor (last 5 draws)"),
            KillRule::HotCarryover => write!(f, "hot carryover (last 10 draws)"),
            KillRule::Filler { hits } => write!(f, "fallback hot 10 ({hits} hits)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    pub number: u8,
    #[serde(flatten)]
    pub rule: KillRule,
}

impl Exclusion {
    pub fn reason(&self) -> String {
        self.rule.to_string()
    }
}

/// Numbers removed from sampling for the lifetime of one predictor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExclusionSet {
    kills: Vec<Exclusion>,
    streak: Vec<u8>,
    previews: Vec<Exclusion>,
    #[serde(skip)]
    blocked: Vec<u8>,
}

impl ExclusionSet {
    pub(crate) fn new(kills: Vec<Exclusion>, streak: Vec<u8>, previews: Vec<Exclusion>) -> Self {
        let mut blocked: Vec<u8> = kills.iter().map(|k| k.number).chain(streak.iter().copied()).collect();
        blocked.sort_unstable();
        blocked.dedup();
        Self { kills, streak, previews, blocked }
    }

    /// The kill list in cascade order, at most K entries.
    pub fn kills(&self) -> &[Exclusion] {
        &self.kills
    }

    /// Numbers drawn in each of the last three draws, blocked regardless of K.
    pub fn streak(&self) -> &[u8] {
        &self.streak
    }

    /// Hot-neighbor and hot-carryover picks, reported even when K leaves them inactive.
    pub fn previews(&self) -> &[Exclusion] {
        &self.previews
    }

    /// Every number unavailable to the sampler, ascending.
    pub fn blocked(&self) -> &[u8] {
        &self.blocked
    }

    pub fn contains(&self, number: u8) -> bool {
        self.blocked.binary_search(&number).is_ok()
    }

    pub fn is_killed(&self, number: u8) -> bool {
        self.kills.iter().any(|k| k.number == number)
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }
}

/// Appends to the kill list while respecting K and skipping duplicates.
struct KillList {
    limit: usize,
    entries: Vec<Exclusion>,
}

impl KillList {
    fn is_full(&self) -> bool {
        self.entries.len() >= self.limit
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn add(&mut self, number: u8, rule: KillRule) {
        if self.is_full() || self.entries.iter().any(|e| e.number == number) {
            return;
        }
        self.entries.push(Exclusion { number, rule });
    }
}

/// Occurrences of each number, indexed by the number itself.
fn counts(draws: &[Draw]) -> [u32; POOL_SIZE as usize + 1] {
    let mut counts = [0u32; POOL_SIZE as usize + 1];
    for draw in draws {
        for &n in &draw.numbers {
            counts[n as usize] += 1;
        }
    }
    counts
}

/// Numbers seen at least once, most frequent first, higher number first on ties.
fn hot_ranking(counts: &[u32; POOL_SIZE as usize + 1]) -> Vec<u8> {
    let mut ranking: Vec<u8> = (1..=POOL_SIZE).filter(|&n| counts[n as usize] > 0).collect();
    ranking.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]).then(b.cmp(&a)));
    ranking
}

fn in_last_three(draws: &[Draw]) -> Vec<u8> {
    if draws.len() < 3 {
        return Vec::new();
    }
    (1..=POOL_SIZE)
        .filter(|&n| draws[..3].iter().all(|d| d.contains(n)))
        .collect()
}

pub struct ExclusionEngine<'a> {
    config: &'a ExclusionConfig,
}

impl<'a> ExclusionEngine<'a> {
    pub fn new(config: &'a ExclusionConfig) -> Self {
        Self { config }
    }

    /// `draws[0]` must be the most recent draw.
    pub fn evaluate(&self, draws: &[Draw]) -> ExclusionSet {
        let streak = if self.config.streak_guard { in_last_three(draws) } else { Vec::new() };

        if draws.len() < self.config.min_history {
            debug!(
                draws = draws.len(),
                min_history = self.config.min_history,
                "history too short for the kill list"
            );
            return ExclusionSet::new(Vec::new(), streak, Vec::new());
        }
        let Some(latest) = draws.first() else {
            return ExclusionSet::new(Vec::new(), streak, Vec::new());
        };

        let mut kills = KillList { limit: self.config.kill_count, entries: Vec::new() };
        let counts10 = counts(&draws[..draws.len().min(10)]);
        let hot10 = hot_ranking(&counts10);
        let counts5 = counts(&draws[..draws.len().min(5)]);

        // 1. Three in a row, else the hottest number of the last 10 draws.
        match in_last_three(draws).first() {
            Some(&n) => kills.add(n, KillRule::ThreeInARow),
            None => {
                if let Some(&n) = hot10.first() {
                    kills.add(n, KillRule::HottestRecent { hits: counts10[n as usize] });
                }
            }
        }

        // 2. Bonus ball of the latest draw.
        if !kills.is_full() {
            kills.add(latest.bonus, KillRule::LastBonus);
        }

        // 3. Weakest numbers of the dominant last digit.
        if !kills.is_full() {
            let mut digit_counts = [0u32; 10];
            for draw in &draws[..draws.len().min(5)] {
                for &n in &draw.numbers {
                    digit_counts[(n % 10) as usize] += 1;
                }
            }
            let mut digit = 0u8;
            for d in 1..10u8 {
                if digit_counts[d as usize] > digit_counts[digit as usize] {
                    digit = d;
                }
            }

            let mut candidates: Vec<u8> = (1..=POOL_SIZE).filter(|n| n % 10 == digit).collect();
            candidates.sort_by_key(|&n| counts5[n as usize]);
            for n in candidates {
                kills.add(n, KillRule::WeakestOfHotDigit { digit });
                if kills.len() >= self.config.digit_rule_limit {
                    break;
                }
            }
        }

        let challenge = self.config.kill_count >= self.config.challenge_threshold;
        let mut previews = Vec::new();

        // 4. Neighbor of the latest numbers with the most hits over 5 draws.
        let mut neighbors: Vec<u8> = Vec::new();
        for &n in &latest.numbers {
            for m in [n - 1, n + 1] {
                if (1..=POOL_SIZE).contains(&m) && !neighbors.contains(&m) {
                    neighbors.push(m);
                }
            }
        }
        let mut best_neighbor: Option<u8> = None;
        for &m in &neighbors {
            let better = best_neighbor.is_none_or(|b| counts5[m as usize] > counts5[b as usize]);
            if better {
                best_neighbor = Some(m);
            }
        }
        if let Some(n) = best_neighbor {
            previews.push(Exclusion { number: n, rule: KillRule::HotNeighbor });
            if challenge {
                kills.add(n, KillRule::HotNeighbor);
            }
        }

        // 5. Latest number ranked highest over 10 draws.
        if let Some(&n) = hot10.iter().find(|&&n| latest.contains(n)) {
            previews.push(Exclusion { number: n, rule: KillRule::HotCarryover });
            if challenge {
                kills.add(n, KillRule::HotCarryover);
            }
        }

        // 6. Fill what is left from the 10-draw ranking.
        for &n in &hot10 {
            if kills.is_full() {
                break;
            }
            kills.add(n, KillRule::Filler { hits: counts10[n as usize] });
        }

        ExclusionSet::new(kills.entries, streak, previews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Preset, PredictorConfig};
    use lotto_history::models::make_test_draws;
    use lotto_history::History;

    fn draw(id: u32, numbers: [u8; 6], bonus: u8) -> Draw {
        Draw::new(id, numbers, bonus).unwrap()
    }

    fn kill_config(kill_count: usize) -> ExclusionConfig {
        PredictorConfig::preset(Preset::Kill).with_kill_count(kill_count).exclusion
    }

    /// 15 draws, most recent first; 10 is drawn in the three latest ones.
    fn streak_history() -> Vec<Draw> {
        let mut draws = vec![
            draw(115, [3, 10, 21, 30, 38, 44], 7),
            draw(114, [5, 10, 16, 25, 33, 40], 2),
            draw(113, [1, 10, 19, 27, 36, 42], 8),
        ];
        for (i, d) in make_test_draws(12).into_iter().enumerate() {
            draws.push(Draw { draw_id: 112 - i as u32, ..d });
        }
        draws
    }

    #[test]
    fn test_short_history_yields_empty_kill_list() {
        let config = kill_config(3);
        let history = History::new(make_test_draws(14));
        let set = ExclusionEngine::new(&config).evaluate(history.draws());
        assert!(set.kills().is_empty());
        assert!(set.previews().is_empty());
    }

    #[test]
    fn test_empty_history() {
        let config = kill_config(5);
        let set = ExclusionEngine::new(&config).evaluate(&[]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_three_in_a_row_then_last_bonus() {
        let config = kill_config(3);
        let set = ExclusionEngine::new(&config).evaluate(&streak_history());
        let kills = set.kills();
        assert_eq!(kills.len(), 3);
        assert_eq!(kills[0].number, 10);
        assert_eq!(kills[0].reason(), "3-consecutive");
        assert_eq!(kills[1].number, 7);
        assert_eq!(kills[1].rule, KillRule::LastBonus);
        assert!(matches!(kills[2].rule, KillRule::WeakestOfHotDigit { .. }));
        assert_eq!(set.streak(), &[10]);
    }

    #[test]
    fn test_hot_digit_rule() {
        let config = kill_config(3);
        let set = ExclusionEngine::new(&config).evaluate(&streak_history());
        // Over the 5 latest draws digit 0 shows up five times (10 three times, 30, 40).
        let third = set.kills()[2];
        assert_eq!(third.rule, KillRule::WeakestOfHotDigit { digit: 0 });
        // Among 10, 20, 30, 40 the least drawn, lower number first on ties.
        assert_eq!(third.number, 20);
    }

    #[test]
    fn test_max_freq_substitute_prefers_higher_number() {
        // No number in the three latest draws; 44 and 12 both drawn twice in 10.
        let mut draws = vec![
            draw(20, [1, 12, 23, 34, 41, 44], 9),
            draw(19, [2, 13, 24, 35, 42, 44], 8),
            draw(18, [3, 12, 25, 36, 43, 45], 7),
        ];
        for i in 0..12u32 {
            let base = (i % 2) as u8;
            draws.push(draw(17 - i, [4 + base, 6 + base, 14 + base, 16 + base, 26 + base, 28 + base], 30));
        }
        let config = kill_config(1);
        let set = ExclusionEngine::new(&config).evaluate(&draws);
        assert_eq!(set.kills().len(), 1);
        // The even pattern fills four of the seven older draws in the window.
        assert_eq!(set.kills()[0].rule, KillRule::HottestRecent { hits: 4 });
        // Shared by 4, 6, 14, 16, 26, 28: the highest wins.
        assert_eq!(set.kills()[0].number, 28);
        assert!(set.streak().is_empty());
    }

    #[test]
    fn test_challenge_mode_applies_neighbor_and_carryover() {
        let history = History::new(make_test_draws(40));
        let normal = ExclusionEngine::new(&kill_config(3)).evaluate(history.draws());
        let challenge = ExclusionEngine::new(&kill_config(5)).evaluate(history.draws());

        assert_eq!(normal.previews().len(), 2);
        assert_eq!(normal.previews(), challenge.previews());
        assert_eq!(normal.kills().len(), 3);
        assert_eq!(challenge.kills().len(), 5);
        assert!(!normal.kills().iter().any(|k| matches!(k.rule, KillRule::HotNeighbor | KillRule::HotCarryover)));
        for preview in challenge.previews() {
            assert!(challenge.is_killed(preview.number));
        }
    }

    /// 15 draws with ties at every challenge rule:
    /// neighbors 6 and 13 both drawn twice in 5, latest numbers 12 and 28 both
    /// drawn three times in 10 (17 too), 37 the hottest with four.
    fn tie_history() -> Vec<Draw> {
        vec![
            draw(15, [5, 12, 20, 28, 33, 41], 44),
            draw(14, [6, 13, 17, 37, 39, 43], 1),
            draw(13, [2, 6, 13, 22, 37, 45], 3),
            draw(12, [7, 12, 18, 28, 31, 36], 9),
            draw(11, [8, 14, 23, 30, 35, 38], 10),
            draw(10, [12, 17, 24, 37, 40, 44], 15),
            draw(9, [17, 25, 28, 37, 39, 42], 16),
            draw(8, [1, 9, 19, 26, 32, 43], 20),
            draw(7, [3, 11, 21, 27, 34, 45], 25),
            draw(6, [4, 10, 16, 29, 36, 41], 30),
            draw(5, [1, 2, 3, 4, 5, 6], 7),
            draw(4, [7, 8, 9, 10, 11, 12], 13),
            draw(3, [13, 14, 15, 16, 17, 18], 19),
            draw(2, [19, 20, 21, 22, 23, 24], 25),
            draw(1, [25, 26, 27, 28, 29, 30], 31),
        ]
    }

    fn numbers(set: &ExclusionSet) -> Vec<u8> {
        set.kills().iter().map(|k| k.number).collect()
    }

    #[test]
    fn test_challenge_rules_break_ties() {
        let draws = tie_history();

        let set = ExclusionEngine::new(&kill_config(5)).evaluate(&draws);
        assert_eq!(numbers(&set), vec![37, 44, 3, 6, 28]);
        let kills = set.kills();
        assert_eq!(kills[0].rule, KillRule::HottestRecent { hits: 4 });
        assert_eq!(kills[1].rule, KillRule::LastBonus);
        // Digits 3 and 8 both appear five times; the lower digit wins.
        assert_eq!(kills[2].rule, KillRule::WeakestOfHotDigit { digit: 3 });
        // 6 is inserted before 13 (neighbors of 5, then of 12).
        assert_eq!(kills[3].rule, KillRule::HotNeighbor);
        // 28 and 12 tie on 10-draw hits; the higher number ranks first.
        assert_eq!(kills[4].rule, KillRule::HotCarryover);
        assert!(set.streak().is_empty());
    }

    #[test]
    fn test_filler_order_on_ties() {
        let set = ExclusionEngine::new(&kill_config(7)).evaluate(&tie_history());
        assert_eq!(numbers(&set), vec![37, 44, 3, 6, 28, 17, 12]);
        assert_eq!(set.kills()[5].rule, KillRule::Filler { hits: 3 });
        assert_eq!(set.kills()[6].rule, KillRule::Filler { hits: 3 });

        // Below challenge mode the same rules only preview.
        let set = ExclusionEngine::new(&kill_config(3)).evaluate(&tie_history());
        assert_eq!(numbers(&set), vec![37, 44, 3]);
        let previews: Vec<u8> = set.previews().iter().map(|p| p.number).collect();
        assert_eq!(previews, vec![6, 28]);
    }

    #[test]
    fn test_kill_list_bounded_and_unique() {
        let history = History::new(make_test_draws(60));
        for k in 0..=10 {
            let set = ExclusionEngine::new(&kill_config(k)).evaluate(history.draws());
            assert!(set.kills().len() <= k);
            let mut numbers: Vec<u8> = set.kills().iter().map(|e| e.number).collect();
            numbers.sort_unstable();
            numbers.dedup();
            assert_eq!(numbers.len(), set.kills().len());
        }
    }

    #[test]
    fn test_filler_completes_large_k() {
        let history = History::new(make_test_draws(60));
        let set = ExclusionEngine::new(&kill_config(10)).evaluate(history.draws());
        assert_eq!(set.kills().len(), 10);
        assert!(set.kills().iter().any(|k| matches!(k.rule, KillRule::Filler { .. })));
    }
}
