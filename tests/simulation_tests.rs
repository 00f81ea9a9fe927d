use starforce::enhance::{
    build_table, compute_cost, LevelEntry, ProbabilityTable, TableOptions, BASE_LEVEL,
    PROBABILITY_TOLERANCE,
};
use starforce::simulation::{
    run_monte_carlo, run_monte_carlo_parallel, run_trial, summarize, Journey, Rng, TrialOutcome,
};
use starforce::{ConfigError, SimulationError, SimulationRequest};

fn journey(start_level: u32, target_level: u32) -> Journey {
    Journey {
        start_level,
        target_level,
        penalty: 5000.0,
        protect_below_18: false,
    }
}

/// Synthetic table with no destruction anywhere: half success, half maintain.
fn indestructible_table() -> ProbabilityTable {
    let entries = (0..15)
        .map(|offset| LevelEntry {
            level: BASE_LEVEL + offset,
            success_prob: 0.5,
            maintain_prob: 0.5,
            destroy_prob: 0.0,
            attempt_cost: 10 + offset as u64,
        })
        .collect();
    ProbabilityTable::from_entries(entries).expect("synthetic table is valid")
}

#[test]
fn tier_100_level_17_cost_matches_hardcoded_value() {
    // floor(100^3 * 18^2.7 / 150 / 1_000_000) rounded = 16
    assert_eq!(compute_cost(17, 100, false).round(), 16.0);
    let table = build_table(&TableOptions {
        equipment_tier: 100,
        ..TableOptions::default()
    })
    .unwrap();
    assert_eq!(table.entry(17).unwrap().attempt_cost, 16);
    let costs: Vec<u64> = table.entries().iter().map(|e| e.attempt_cost).collect();
    assert_eq!(
        costs,
        vec![8, 10, 16, 40, 72, 18, 33, 23, 26, 29, 33, 36, 40, 44, 48]
    );
}

#[test]
fn every_tier_and_option_combination_keeps_rows_normalized() {
    for tier in [100, 150, 200, 250] {
        for bits in 0..8u8 {
            let table = build_table(&TableOptions {
                equipment_tier: tier,
                discount_cost: bits & 1 != 0,
                boost_15_16: bits & 2 != 0,
                reduce_destroy: bits & 4 != 0,
            })
            .unwrap();
            for entry in table.entries() {
                assert!((entry.probability_sum() - 1.0).abs() <= PROBABILITY_TOLERANCE);
            }
        }
    }
}

#[test]
fn trial_from_target_or_above_costs_nothing() {
    let table = build_table(&TableOptions::default()).unwrap();
    for seed in 0..20 {
        let outcome = run_trial(&table, &journey(20, 20), &mut Rng::new(seed)).unwrap();
        assert_eq!(outcome, TrialOutcome::ZERO);
    }
}

#[test]
fn indestructible_table_never_destroys_and_costs_are_path_sums() {
    let table = indestructible_table();
    let batch = run_monte_carlo(&journey(15, 20), &table, 2_000, 8).unwrap();
    // Each attempt at level L costs 10 + (L - 15). Every path visits 15..20 and repeats
    // attempts only on maintain, so the minimum is the straight path sum.
    let straight: f64 = (15..20).map(|level| (10 + level - 15) as f64).sum();
    for outcome in &batch {
        assert_eq!(outcome.destruction_count, 0);
        assert!(outcome.total_cost >= straight);
    }
    assert!(batch.iter().any(|o| o.total_cost == straight));
}

#[test]
fn certain_success_table_costs_exactly_the_path_sum() {
    let entries = (0..15)
        .map(|offset| LevelEntry {
            level: BASE_LEVEL + offset,
            success_prob: 1.0,
            maintain_prob: 0.0,
            destroy_prob: 0.0,
            attempt_cost: 100 * (offset as u64 + 1),
        })
        .collect();
    let table = ProbabilityTable::from_entries(entries).unwrap();
    let batch = run_monte_carlo(&journey(17, 21), &table, 50, 1).unwrap();
    for outcome in batch {
        assert_eq!(outcome.total_cost, (300 + 400 + 500 + 600) as f64);
        assert_eq!(outcome.destruction_count, 0);
    }
}

#[test]
fn boosted_single_step_is_always_one_attempt() {
    let table = build_table(&TableOptions {
        boost_15_16: true,
        ..TableOptions::default()
    })
    .unwrap();
    let cost = table.entry(15).unwrap().attempt_cost as f64;
    let batch = run_monte_carlo_parallel(&journey(15, 16), &table, 100_000, 2024).unwrap();
    assert_eq!(batch.len(), 100_000);
    assert!(batch
        .iter()
        .all(|o| o.destruction_count == 0 && o.total_cost == cost));
}

#[test]
fn destruction_resets_to_base_level_not_start() {
    // Level 18 is a coin flip between success and destruction; every other row always succeeds.
    let entries = (0..15)
        .map(|offset| {
            let level = BASE_LEVEL + offset;
            let (success_prob, destroy_prob) = if level == 18 { (0.5, 0.5) } else { (1.0, 0.0) };
            LevelEntry {
                level,
                success_prob,
                maintain_prob: 0.0,
                destroy_prob,
                attempt_cost: 1,
            }
        })
        .collect();
    let table = ProbabilityTable::from_entries(entries).unwrap();
    let from_18 = Journey {
        penalty: 0.0,
        ..journey(18, 19)
    };
    let batch = run_monte_carlo(&from_18, &table, 1_000, 12).unwrap();
    // Each destruction costs the failed attempt plus the climb 15 -> 16 -> 17 -> 18.
    for outcome in &batch {
        assert_eq!(
            outcome.total_cost,
            1.0 + 4.0 * outcome.destruction_count as f64
        );
    }
    assert!(batch.iter().any(|o| o.destruction_count > 0));
}

#[test]
fn protection_below_18_prevents_all_destruction_up_to_18() {
    let table = build_table(&TableOptions::default()).unwrap();
    let protected = Journey {
        protect_below_18: true,
        ..journey(15, 18)
    };
    let batch = run_monte_carlo(&protected, &table, 5_000, 17).unwrap();
    assert!(batch.iter().all(|o| o.destruction_count == 0));

    let unprotected = run_monte_carlo(&journey(15, 18), &table, 5_000, 17).unwrap();
    assert!(unprotected.iter().any(|o| o.destruction_count > 0));
}

#[test]
fn penalty_is_charged_per_destruction() {
    let table = build_table(&TableOptions::default()).unwrap();
    let free = Journey {
        penalty: 0.0,
        ..journey(17, 22)
    };
    let costly = Journey {
        penalty: 1_000.0,
        ..journey(17, 22)
    };
    let a = run_monte_carlo(&free, &table, 300, 5).unwrap();
    let b = run_monte_carlo(&costly, &table, 300, 5).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.destruction_count, y.destruction_count);
        assert_eq!(y.total_cost - x.total_cost, 1_000.0 * x.destruction_count as f64);
    }
}

#[test]
fn same_seed_gives_bit_identical_batches() {
    let table = build_table(&TableOptions {
        reduce_destroy: true,
        ..TableOptions::default()
    })
    .unwrap();
    let a = run_monte_carlo(&journey(16, 23), &table, 1_000, 99).unwrap();
    let b = run_monte_carlo(&journey(16, 23), &table, 1_000, 99).unwrap();
    let c = run_monte_carlo_parallel(&journey(16, 23), &table, 1_000, 99).unwrap();
    let bits = |batch: &[TrialOutcome]| -> Vec<(u64, u32)> {
        batch
            .iter()
            .map(|o| (o.total_cost.to_bits(), o.destruction_count))
            .collect()
    };
    assert_eq!(bits(&a[..]), bits(&b[..]));
    assert_eq!(bits(&a[..]), bits(&c[..]));
}

#[test]
fn summary_percentiles_are_ordered() {
    let table = build_table(&TableOptions::default()).unwrap();
    let batch = run_monte_carlo(&journey(17, 22), &table, 2_000, 31).unwrap();
    let summary = summarize(&batch).unwrap();
    assert!(summary.cost.windows(2).all(|w| w[0] <= w[1]));
    assert!(summary.destructions.windows(2).all(|w| w[0] <= w[1]));
    assert!(summary.cost[0] <= summary.cost_mean && summary.cost_mean <= summary.cost[4]);
}

#[test]
fn single_outcome_summary_repeats_the_value() {
    let summary = summarize(&[TrialOutcome {
        total_cost: 777.0,
        destruction_count: 2,
    }])
    .unwrap();
    assert_eq!(summary.cost, [777.0; 5]);
    assert_eq!(summary.destructions, [2.0; 5]);
}

#[test]
fn request_errors_surface_before_simulation() {
    let err = SimulationRequest {
        start_level: 22,
        target_level: 22,
        seed: Some(1),
        ..SimulationRequest::default()
    }
    .simulate()
    .unwrap_err();
    assert_eq!(
        err,
        SimulationError::Configuration(ConfigError::TargetNotAboveStart {
            start: 22,
            target: 22
        })
    );

    let err = run_monte_carlo(&journey(20, 31), &build_table(&TableOptions::default()).unwrap(), 10, 0)
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn report_serializes_to_the_output_contract() {
    let report = SimulationRequest {
        start_level: 17,
        target_level: 19,
        trial_count: 50,
        seed: Some(4),
        ..SimulationRequest::default()
    }
    .simulate()
    .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["seed"], 4);
    assert_eq!(value["summary"]["cost"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["summary"]["destructions"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["table"].as_array().map(Vec::len), Some(15));
    assert_eq!(value["table"][0]["level"], 15);
    assert!(value["table"][0]["attempt_cost"].is_u64());
}
