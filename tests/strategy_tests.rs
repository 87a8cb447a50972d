use fastrand::Rng;
use magicube::config::{AnnealParams, Config, SidewaysParams};
use magicube::optimizer::runner::{run_trials, TrialOptions};
use magicube::optimizer::{self, SimulatedAnnealing, Strategy};
use magicube::{CostModel, CubeState, Objective, StrategyKind, Termination};
use rstest::rstest;
use strum::IntoEnumIterator;

fn small_budget_config() -> Config {
    let mut config = Config::default();
    config.hill.max_iterations = 50;
    config.sideways.max_iterations = 50;
    config.sideways.max_sideways_moves = 10;
    config.restart.max_restarts = 3;
    config.restart.max_iterations_per_restart = 50;
    config.stochastic.max_iterations = 500;
    config.anneal.max_iterations = 500;
    config.anneal.stage_iterations = 100;
    config.genetic.population_size = 20;
    config.genetic.generations = 10;
    config.genetic.seed_from_start = true;
    config
}

#[rstest]
#[case(StrategyKind::SteepestAscent)]
#[case(StrategyKind::SidewaysMove)]
#[case(StrategyKind::RandomRestart)]
#[case(StrategyKind::Stochastic)]
#[case(StrategyKind::SimulatedAnnealing)]
#[case(StrategyKind::Genetic)]
fn test_single_cell_cube_is_solved_immediately(#[case] kind: StrategyKind) {
    let model = CostModel::standard(1).unwrap();
    let strategy = optimizer::build(kind, &Config::default()).unwrap();
    let start = CubeState::from_flat(1, vec![1]).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(0)).unwrap();

    assert_eq!(record.strategy, kind);
    assert_eq!(record.termination, Termination::Solved);
    assert_eq!(record.iterations, 0);
    assert_eq!(record.final_cost, 0.0);
    assert!(record.is_solved());
}

#[test]
fn test_no_strategy_ends_worse_than_its_start() {
    let model = CostModel::standard(3).unwrap();
    let config = small_budget_config();
    let start = CubeState::random(3, &mut Rng::with_seed(5)).unwrap();

    for kind in StrategyKind::iter() {
        let strategy = optimizer::build(kind, &config).unwrap();
        let record = strategy
            .run(&model, start.clone(), &mut Rng::with_seed(11))
            .unwrap();
        assert!(
            record.final_cost <= record.initial_cost,
            "{}: {} > {}",
            kind,
            record.final_cost,
            record.initial_cost
        );
        assert_eq!(record.final_cube.len(), 27);
        assert!(magicube::cube::is_permutation(record.final_cube.values()));
        // Recorded cost matches a fresh evaluation of the returned grid
        let fresh = model.cost(&record.final_cube, strategy.objective());
        assert!((fresh - record.final_cost).abs() < 1e-9, "{}", kind);
    }
}

#[test]
fn test_same_seed_same_outcome() {
    let model = CostModel::standard(3).unwrap();
    let config = small_budget_config();

    for kind in StrategyKind::iter() {
        let strategy = optimizer::build(kind, &config).unwrap();
        let start = CubeState::random(3, &mut Rng::with_seed(8)).unwrap();
        let a = strategy
            .run(&model, start.clone(), &mut Rng::with_seed(21))
            .unwrap();
        let b = strategy.run(&model, start, &mut Rng::with_seed(21)).unwrap();
        assert_eq!(a.final_cube, b.final_cube, "{}", kind);
        assert_eq!(a.iterations, b.iterations, "{}", kind);
        assert_eq!(a.moves, b.moves, "{}", kind);
    }
}

#[test]
fn test_restart_reports_every_leg() {
    let model = CostModel::standard(3).unwrap();
    let config = small_budget_config();
    let strategy = optimizer::build(StrategyKind::RandomRestart, &config).unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(3)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(4)).unwrap();

    // No 3-cube satisfies all 37 lines, so every leg runs
    assert_eq!(record.iterations_per_restart.len(), 3);
    assert_eq!(record.termination, Termination::BudgetExhausted);
    assert!(record
        .iterations_per_restart
        .iter()
        .all(|&n| n <= config.restart.max_iterations_per_restart));
}

#[test]
fn test_genetic_trace_has_one_entry_per_generation() {
    let model = CostModel::standard(3).unwrap();
    let config = small_budget_config();
    let strategy = optimizer::build(StrategyKind::Genetic, &config).unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(6)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(7)).unwrap();

    assert_eq!(record.termination, Termination::BudgetExhausted);
    assert_eq!(record.iterations, 10);
    assert_eq!(record.generations.len(), 10);
    assert_eq!(record.cost_history.len(), 10);
    // Elitism keeps the best-so-far in every generation
    for w in record.generations.windows(2) {
        assert!(w[1].best <= w[0].best);
    }
    for g in &record.generations {
        assert!(g.mean >= g.best);
    }
}

#[test]
fn test_annealing_stops_at_temperature_floor() {
    let model = CostModel::standard(3).unwrap();
    let strategy = SimulatedAnnealing::new(AnnealParams {
        initial_temperature: 1.0,
        min_temperature: 0.5,
        cooling_rates: "0.1,0.1,0.1".to_string(),
        ..AnnealParams::default()
    })
    .unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(2)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(2)).unwrap();

    assert_eq!(record.termination, Termination::TemperatureFloor);
    assert_eq!(record.iterations, 1);
}

#[test]
fn test_annealing_moves_carry_acceptance() {
    let model = CostModel::standard(3).unwrap();
    let strategy = SimulatedAnnealing::new(AnnealParams {
        max_iterations: 300,
        min_temperature: 0.0,
        ..AnnealParams::default()
    })
    .unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(12)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(12)).unwrap();

    assert!(record.iterations <= 300);
    assert!(record.moves.len() <= record.iterations);
    for m in &record.moves {
        let p = m.acceptance.unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn test_trials_share_a_fixed_start_grid() {
    let model = CostModel::standard(3).unwrap();
    let config = small_budget_config();
    let strategy = optimizer::build(StrategyKind::Stochastic, &config).unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(1)).unwrap();
    let initial = model.cost(&start, strategy.objective());

    let summary = run_trials(
        strategy.as_ref(),
        &model,
        TrialOptions {
            trials: 3,
            size: 3,
            seed: Some(100),
            start: Some(start),
        },
    )
    .unwrap();

    assert_eq!(summary.runs.len(), 3);
    for r in &summary.runs {
        assert_eq!(r.initial_cost, initial);
    }
    let best = summary.best_run().final_cost;
    assert!(summary.runs.iter().all(|r| r.final_cost >= best));
}

#[test]
fn test_build_rejects_invalid_config() {
    let mut config = Config::default();
    config.anneal.cooling_rates = "0.9,0.9".to_string();
    assert!(optimizer::build(StrategyKind::SimulatedAnnealing, &config).is_err());

    let mut config = Config::default();
    config.genetic.mutation_rate = 1.5;
    assert!(optimizer::build(StrategyKind::Genetic, &config).is_err());

    let mut config = Config::default();
    config.genetic.generations = 0;
    assert!(optimizer::build(StrategyKind::Genetic, &config).is_err());
}

fn identity_two() -> CubeState {
    CubeState::from_flat(2, (1..=8).collect()).unwrap()
}

#[rstest]
#[case(0)]
#[case(9)]
#[case(42)]
fn test_steepest_on_two_cube_reaches_local_optimum(#[case] seed: u64) {
    // No 2-cube satisfies all 20 lines
    let model = CostModel::standard(2).unwrap();
    let config = Config::default();
    let strategy = optimizer::build(StrategyKind::SteepestAscent, &config).unwrap();
    let start = CubeState::random(2, &mut Rng::with_seed(seed)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(seed)).unwrap();

    assert_eq!(record.termination, Termination::LocalOptimum);
    assert!(record.iterations <= config.hill.max_iterations);
    assert!(record.final_cost > 0.0);
    assert!(record.final_cost <= record.initial_cost);
    for w in record.cost_history.windows(2) {
        assert!(w[1] < w[0]);
    }
}

fn sideways_config(max_sideways_moves: usize, max_repeated_swaps: usize) -> Config {
    let mut config = Config::default();
    config.sideways = SidewaysParams {
        max_sideways_moves,
        tabu_size: 5,
        max_repeated_swaps,
        objective: Objective::Violations,
        ..SidewaysParams::default()
    };
    config
}

#[test]
fn test_sideways_stops_on_spent_plateau_budget() {
    let model = CostModel::standard(2).unwrap();
    let strategy = optimizer::build(StrategyKind::SidewaysMove, &sideways_config(10, 0)).unwrap();
    let record = strategy
        .run(&model, identity_two(), &mut Rng::with_seed(0))
        .unwrap();

    assert_eq!(record.termination, Termination::PlateauExhausted);
    assert_eq!(record.sideways_moves, 10);
}

#[test]
fn test_sideways_stops_on_cycling_pair() {
    let model = CostModel::standard(2).unwrap();
    let strategy = optimizer::build(StrategyKind::SidewaysMove, &sideways_config(100, 3)).unwrap();
    let record = strategy
        .run(&model, identity_two(), &mut Rng::with_seed(0))
        .unwrap();

    assert_eq!(record.termination, Termination::RepeatedSwap);
    assert!(record.sideways_moves < 100);
    let last = record.moves.last().unwrap();
    let key = (last.first.min(last.second), last.first.max(last.second));
    let seen = record
        .moves
        .iter()
        .filter(|m| (m.first.min(m.second), m.first.max(m.second)) == key)
        .count();
    assert!(seen >= 3);
}

#[test]
fn test_annealing_is_greedy_once_frozen() {
    let model = CostModel::standard(3).unwrap();
    let strategy = SimulatedAnnealing::new(AnnealParams {
        initial_temperature: 1.0,
        min_temperature: 0.0,
        cooling_rates: "0.000001,0.000001,0.000001".to_string(),
        multi_swap_probability: 0.0,
        max_iterations: 1000,
        objective: Objective::Violations,
        ..AnnealParams::default()
    })
    .unwrap();
    let start = CubeState::random(3, &mut Rng::with_seed(14)).unwrap();
    let record = strategy.run(&model, start, &mut Rng::with_seed(14)).unwrap();

    // Only the first proposal is made at T0; after that no worse move is taken
    let mut previous = record.initial_cost;
    for m in &record.moves {
        if m.iteration >= 1 {
            assert!(m.cost <= previous, "iter {}: {} > {}", m.iteration, m.cost, previous);
            assert_eq!(m.acceptance, Some(1.0));
        }
        previous = m.cost;
    }
    assert!(record.final_cost <= record.initial_cost);
}
