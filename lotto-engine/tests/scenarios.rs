use rand::SeedableRng;
use rand::rngs::StdRng;

use lotto_engine::exclusion::ExclusionEngine;
use lotto_engine::simulation::{PrizeTable, SimulationStats, rank};
use lotto_engine::{
    KillRule, Preset, PredictorConfig, Predictor, Rank, SimulationHarness, SimulationSettings, Strategy, Target,
};
use lotto_history::models::make_test_draws;
use lotto_history::{Draw, History};

fn draw(id: u32, numbers: [u8; 6], bonus: u8) -> Draw {
    Draw::new(id, numbers, bonus).unwrap()
}

/// Three draws sharing 13, most recent bonus 7.
fn three_draws() -> History {
    History::new(vec![
        draw(3, [2, 13, 22, 30, 36, 41], 7),
        draw(2, [5, 13, 19, 27, 33, 44], 9),
        draw(1, [1, 11, 13, 24, 38, 40], 17),
    ])
}

#[test]
fn number_in_three_latest_draws_is_killed_first() {
    let mut config = PredictorConfig::preset(Preset::Kill).exclusion;
    config.min_history = 3;
    let history = three_draws();
    let set = ExclusionEngine::new(&config).evaluate(history.draws());

    let first = set.kills()[0];
    assert_eq!(first.number, 13);
    assert_eq!(first.rule, KillRule::ThreeInARow);
    assert_eq!(first.reason(), "3-consecutive");
}

#[test]
fn last_bonus_is_killed_second() {
    let mut config = PredictorConfig::preset(Preset::Kill).exclusion;
    config.min_history = 3;
    let history = three_draws();
    let set = ExclusionEngine::new(&config).evaluate(history.draws());

    assert_eq!(set.kills()[1].number, 7);
    assert_eq!(set.kills()[1].rule, KillRule::LastBonus);
}

#[test]
fn default_minimum_keeps_kill_list_empty_but_blocks_streak() {
    let history = three_draws();
    let predictor = Predictor::new(&history, PredictorConfig::preset(Preset::Kill));
    assert!(predictor.exclusions().kills().is_empty());
    assert_eq!(predictor.exclusions().streak(), &[13]);

    let mut rng = StdRng::seed_from_u64(21);
    for _ in 0..50 {
        assert!(!predictor.predict_with(&mut rng).numbers.contains(13));
    }
}

#[test]
fn empty_history_still_predicts() {
    let history = History::default();
    for preset in Preset::ALL {
        let predictor = Predictor::new(&history, PredictorConfig::preset(preset));
        let result = predictor.predict_with(&mut StdRng::seed_from_u64(3));
        let c = result.numbers;
        let validator = &predictor.config().validator;
        assert!((validator.min_sum..=validator.max_sum).contains(&c.sum()), "{preset}");
        assert!((1..=5).contains(&c.odd_count()), "{preset}");
        assert!(c.longest_run() <= 2, "{preset}");
        assert!(c.ac() >= 5, "{preset}");
    }
}

#[test]
fn ranks_against_known_draw() {
    let target = draw(1210, [1, 7, 9, 17, 27, 38], 31);
    assert_eq!(rank(&[1, 7, 9, 17, 27, 38], &target), Rank::First);
    assert_eq!(rank(&[1, 7, 9, 17, 27, 31], &target), Rank::Second);
    assert_eq!(rank(&[1, 7, 9, 17, 27, 40], &target), Rank::Third);
}

#[test]
fn no_wins_means_full_loss() {
    let prizes = PrizeTable::default();
    let mut stats = SimulationStats::default();
    for _ in 0..1_000 {
        stats.record(Rank::Miss, &prizes);
    }
    assert_eq!(stats.cost, 1_000 * prizes.ticket_price);
    assert_eq!(stats.revenue, 0);
    assert_eq!(stats.roi(), -1.0);
}

#[test]
fn fixed_target_simulation_matches_iterations() {
    let history = History::new(make_test_draws(80));
    let settings = SimulationSettings {
        iterations: 300,
        batch_size: 64,
        seed: Some(1210),
        target: Target::Fixed(80),
        prizes: PrizeTable::default(),
    };
    let harness = SimulationHarness::new(&history, settings).unwrap();
    for strategy in [
        Strategy::Predictor(PredictorConfig::preset(Preset::Hybrid).with_kill_count(5)),
        Strategy::Random,
    ] {
        let report = harness.run(&strategy).unwrap();
        assert_eq!(report.total.iterations(), 300);
        assert_eq!(report.batches.len(), 5);
        assert_eq!(report.total.cost, 300_000);
        let revenue: u64 = Rank::ALL
            .iter()
            .map(|&r| report.total.count(r) * PrizeTable::default().prize(r))
            .sum();
        assert_eq!(report.total.revenue, revenue);
    }
}
