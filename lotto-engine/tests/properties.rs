use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use lotto_engine::config::MAX_KILL_COUNT;
use lotto_engine::simulation::{PrizeTable, Rank, SimulationStats, rank};
use lotto_engine::validator::Validator;
use lotto_engine::{Preset, PredictorConfig, Predictor};
use lotto_history::{Draw, History};

fn arb_preset() -> impl Strategy<Value = Preset> {
    prop_oneof![
        Just(Preset::Classic),
        Just(Preset::Trend),
        Just(Preset::Kill),
        Just(Preset::Hybrid),
    ]
}

/// Seven distinct numbers, one of them promoted to bonus.
fn arb_numbers_and_bonus() -> impl Strategy<Value = ([u8; 6], u8)> {
    (prop::sample::subsequence((1..=45u8).collect::<Vec<_>>(), 7), 0..7usize).prop_map(|(seven, b)| {
        let bonus = seven[b];
        let mut numbers = [0u8; 6];
        for (slot, n) in numbers.iter_mut().zip(seven.into_iter().filter(|&n| n != bonus)) {
            *slot = n;
        }
        (numbers, bonus)
    })
}

fn arb_history(min: usize, max: usize) -> impl Strategy<Value = History> {
    prop::collection::vec(arb_numbers_and_bonus(), min..max).prop_map(|rows| {
        let draws = rows
            .into_iter()
            .enumerate()
            .map(|(i, (numbers, bonus))| Draw::new(i as u32 + 1, numbers, bonus).unwrap())
            .collect();
        History::new(draws)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn all_scores_cover_every_number_once(history in arb_history(0, 40), preset in arb_preset()) {
        let predictor = Predictor::new(&history, PredictorConfig::preset(preset));
        let all = predictor.all_scores();
        prop_assert_eq!(all.len(), 45);
        let mut numbers: Vec<u8> = all.iter().map(|e| e.number).collect();
        numbers.sort_unstable();
        prop_assert_eq!(numbers, (1..=45u8).collect::<Vec<_>>());
    }

    #[test]
    fn kill_list_bounded_and_distinct(history in arb_history(15, 60), k in 0..=MAX_KILL_COUNT) {
        let config = PredictorConfig::preset(Preset::Kill).with_kill_count(k);
        let predictor = Predictor::new(&history, config);
        let kills = predictor.exclusions().kills();
        prop_assert!(kills.len() <= k);
        let mut numbers: Vec<u8> = kills.iter().map(|e| e.number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        prop_assert_eq!(numbers.len(), kills.len());
    }

    #[test]
    fn predictions_are_well_formed(history in arb_history(0, 50), preset in arb_preset(), seed in any::<u64>()) {
        let predictor = Predictor::new(&history, PredictorConfig::preset(preset));
        let mut rng = StdRng::seed_from_u64(seed);
        let result = predictor.predict_with(&mut rng);
        let numbers = result.numbers.numbers();
        prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(numbers.iter().all(|n| (1..=45).contains(n)));
        prop_assert!(numbers.iter().all(|&n| !predictor.exclusions().contains(n)));
    }

    #[test]
    fn accepted_candidates_revalidate(history in arb_history(0, 30), seed in any::<u64>()) {
        let predictor = Predictor::new(&history, PredictorConfig::preset(Preset::Hybrid));
        let result = predictor.predict_with(&mut StdRng::seed_from_u64(seed));
        prop_assume!(!result.fallback);
        let validator = Validator::new(&predictor.config().validator, predictor.history());
        let first = validator.inspect(&result.numbers);
        prop_assert!(first.is_ok());
        prop_assert_eq!(first, validator.inspect(&result.numbers));
    }

    #[test]
    fn rank_ignores_ticket_order(
        (numbers, bonus) in arb_numbers_and_bonus(),
        ticket in prop::sample::subsequence((1..=45u8).collect::<Vec<_>>(), 6),
        shuffled_seed in any::<u64>(),
    ) {
        let target = Draw::new(1, numbers, bonus).unwrap();
        let mut shuffled = ticket.clone();
        // Deterministic permutation driven by the seed.
        let len = shuffled.len();
        for i in 0..len {
            let j = (shuffled_seed.rotate_left(i as u32) as usize) % len;
            shuffled.swap(i, j);
        }
        prop_assert_eq!(rank(&ticket, &target), rank(&shuffled, &target));
    }

    #[test]
    fn cost_and_revenue_follow_counts(counts in prop::collection::vec(0u64..50, 6)) {
        let prizes = PrizeTable::default();
        let mut stats = SimulationStats::default();
        for (rank, &count) in Rank::ALL.iter().zip(&counts) {
            for _ in 0..count {
                stats.record(*rank, &prizes);
            }
        }
        let iterations: u64 = counts.iter().sum();
        prop_assert_eq!(stats.cost, iterations * prizes.ticket_price);
        let revenue: u64 = Rank::ALL.iter().zip(&counts).map(|(r, c)| c * prizes.prize(*r)).sum();
        prop_assert_eq!(stats.revenue, revenue);
        if iterations > 0 && stats.wins() == 0 {
            prop_assert_eq!(stats.roi(), -1.0);
        }
    }
}
