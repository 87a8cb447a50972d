use crate::error::{MagicCubeError, McResult};
use crate::scorer::Objective;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub hill: HillClimbParams,
    #[command(flatten)]
    pub sideways: SidewaysParams,
    #[command(flatten)]
    pub restart: RestartParams,
    #[command(flatten)]
    pub stochastic: StochasticParams,
    #[command(flatten)]
    pub anneal: AnnealParams,
    #[command(flatten)]
    pub genetic: GeneticParams,
    #[command(flatten)]
    pub weights: CostWeights,
}

/// How the sideways-move climber builds its candidate list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateMode {
    /// Every pair of cells, in positional order.
    Exhaustive,
    /// Pairs drawn from the worst lines plus a few random pairs.
    Guided,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    /// Order crossover on the flattened grid (always a permutation).
    Ordered,
    /// Leading levels or rows copied from the second parent, then repaired.
    Block,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbParams {
    #[arg(id = "hc_max_iterations", long = "hc-max-iterations", default_value_t = 1000)]
    pub max_iterations: usize,
    #[arg(id = "hc_objective", long = "hc-objective", default_value_t = Objective::Violations)]
    pub objective: Objective,
}

impl Default for HillClimbParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            objective: Objective::Violations,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SidewaysParams {
    #[arg(id = "sm_max_iterations", long = "sm-max-iterations", default_value_t = 1000)]
    pub max_iterations: usize,
    #[arg(long = "sm-max-sideways-moves", default_value_t = 100)]
    pub max_sideways_moves: usize,
    #[arg(long = "sm-tabu-size", default_value_t = 50)]
    pub tabu_size: usize,
    #[arg(long = "sm-max-repeated-swaps", default_value_t = 3)]
    pub max_repeated_swaps: usize,
    #[arg(long = "sm-candidates", default_value_t = CandidateMode::Exhaustive)]
    pub candidates: CandidateMode,
    // Worst lines per category that seed guided candidates
    #[arg(long = "sm-top-lines", default_value_t = 5)]
    pub top_lines: usize,
    #[arg(id = "sm_objective", long = "sm-objective", default_value_t = Objective::Weighted)]
    pub objective: Objective,
}

impl Default for SidewaysParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_sideways_moves: 100,
            tabu_size: 50,
            max_repeated_swaps: 3,
            candidates: CandidateMode::Exhaustive,
            top_lines: 5,
            objective: Objective::Weighted,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartParams {
    #[arg(long = "rr-max-restarts", default_value_t = 10)]
    pub max_restarts: usize,
    #[arg(long = "rr-max-iterations-per-restart", default_value_t = 1000)]
    pub max_iterations_per_restart: usize,
    #[arg(id = "rr_objective", long = "rr-objective", default_value_t = Objective::Violations)]
    pub objective: Objective,
}

impl Default for RestartParams {
    fn default() -> Self {
        Self {
            max_restarts: 10,
            max_iterations_per_restart: 1000,
            objective: Objective::Violations,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    #[arg(id = "sh_max_iterations", long = "sh-max-iterations", default_value_t = 1000)]
    pub max_iterations: usize,
    #[arg(id = "sh_objective", long = "sh-objective", default_value_t = Objective::Violations)]
    pub objective: Objective,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            objective: Objective::Violations,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealParams {
    #[arg(long = "sa-initial-temperature", default_value_t = 1000.0)]
    pub initial_temperature: f64,
    #[arg(long = "sa-min-temperature", default_value_t = 0.01)]
    pub min_temperature: f64,
    #[arg(id = "sa_max_iterations", long = "sa-max-iterations", default_value_t = 5000)]
    pub max_iterations: usize,
    #[arg(long = "sa-stage-iterations", default_value_t = 1000)]
    pub stage_iterations: usize,
    #[arg(long = "sa-multi-swap-probability", default_value_t = 0.3)]
    pub multi_swap_probability: f64,

    // Early, middle and late cooling factors
    #[arg(long = "sa-cooling-rates", default_value = "0.999,0.997,0.995")]
    pub cooling_rates: String,

    #[arg(long = "sa-reheat-after", default_value_t = 5000)]
    pub reheat_after: usize,
    #[arg(long = "sa-reheat-factor", default_value_t = 0.5)]
    pub reheat_factor: f64,
    #[arg(long = "sa-stuck-window", default_value_t = 1000)]
    pub stuck_window: usize,

    // Cap on the cost-normalized delta fed to exp()
    #[arg(long = "sa-delta-cap", default_value_t = 5.0)]
    pub delta_cap: f64,

    #[arg(long = "sa-intelligent-bias", default_value_t = 0.8)]
    pub intelligent_bias: f64,
    #[arg(long = "sa-hot-line-fraction", default_value_t = 0.05)]
    pub hot_line_fraction: f64,
    #[arg(long = "sa-match-fraction", default_value_t = 0.1)]
    pub match_fraction: f64,
    #[arg(id = "sa_objective", long = "sa-objective", default_value_t = Objective::Violations)]
    pub objective: Objective,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            min_temperature: 0.01,
            max_iterations: 5000,
            stage_iterations: 1000,
            multi_swap_probability: 0.3,
            cooling_rates: "0.999,0.997,0.995".to_string(),
            reheat_after: 5000,
            reheat_factor: 0.5,
            stuck_window: 1000,
            delta_cap: 5.0,
            intelligent_bias: 0.8,
            hot_line_fraction: 0.05,
            match_fraction: 0.1,
            objective: Objective::Violations,
        }
    }
}

impl AnnealParams {
    pub fn get_cooling_rates(&self) -> McResult<[f64; 3]> {
        parse_f64_array::<3>(&self.cooling_rates, "sa-cooling-rates")
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    #[arg(long = "ga-population-size", default_value_t = 100)]
    pub population_size: usize,
    #[arg(long = "ga-generations", default_value_t = 1000)]
    pub generations: usize,
    #[arg(long = "ga-mutation-rate", default_value_t = 0.1)]
    pub mutation_rate: f64,
    #[arg(long = "ga-tournament-size", default_value_t = 3)]
    pub tournament_size: usize,
    #[arg(long = "ga-elitism", default_value_t = true, action = clap::ArgAction::Set)]
    pub elitism: bool,
    #[arg(long = "ga-crossover", default_value_t = CrossoverKind::Ordered)]
    pub crossover: CrossoverKind,

    // Fill the first generation with copies of the start cube
    #[arg(long = "ga-seed-from-start", default_value_t = false)]
    pub seed_from_start: bool,

    #[arg(id = "ga_objective", long = "ga-objective", default_value_t = Objective::Weighted)]
    pub objective: Objective,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 1000,
            mutation_rate: 0.1,
            tournament_size: 3,
            elitism: true,
            crossover: CrossoverKind::Ordered,
            seed_from_start: false,
            objective: Objective::Weighted,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CostWeights {
    // === CATEGORY WEIGHTS ===
    #[arg(long, default_value_t = 1.0)]
    pub weight_row: f64,
    #[arg(long, default_value_t = 1.0)]
    pub weight_column: f64,
    #[arg(long, default_value_t = 1.2)]
    pub weight_pillar: f64,
    #[arg(long, default_value_t = 1.5)]
    pub weight_level_diagonal: f64,
    #[arg(long, default_value_t = 2.0)]
    pub weight_space_diagonal: f64,

    // === LARGE DEVIATION PENALTY ===
    #[arg(long, default_value_t = 0.1)]
    pub deviation_penalty: f64,

    // Fractions of the magic number above which the penalty applies
    #[arg(long, default_value_t = 0.2)]
    pub threshold_row: f64,
    #[arg(long, default_value_t = 0.2)]
    pub threshold_column: f64,
    #[arg(long, default_value_t = 0.2)]
    pub threshold_pillar: f64,
    #[arg(long, default_value_t = 0.15)]
    pub threshold_level_diagonal: f64,
    #[arg(long, default_value_t = 0.1)]
    pub threshold_space_diagonal: f64,

    #[arg(long, default_value_t = 1.5)]
    pub penalty_scale_level_diagonal: f64,
    #[arg(long, default_value_t = 2.0)]
    pub penalty_scale_space_diagonal: f64,

    // === BALANCE ===
    #[arg(long, default_value_t = 0.5)]
    pub balance_weight: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            weight_row: 1.0,
            weight_column: 1.0,
            weight_pillar: 1.2,
            weight_level_diagonal: 1.5,
            weight_space_diagonal: 2.0,
            deviation_penalty: 0.1,
            threshold_row: 0.2,
            threshold_column: 0.2,
            threshold_pillar: 0.2,
            threshold_level_diagonal: 0.15,
            threshold_space_diagonal: 0.1,
            penalty_scale_level_diagonal: 1.5,
            penalty_scale_space_diagonal: 2.0,
            balance_weight: 0.5,
        }
    }
}

impl CostWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> McResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Copies onto `self` only the flags the user actually typed.
    pub fn merge_from_cli(&mut self, cli_weights: &CostWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field;
                }
            };
        }

        update_if_present!(weight_row);
        update_if_present!(weight_column);
        update_if_present!(weight_pillar);
        update_if_present!(weight_level_diagonal);
        update_if_present!(weight_space_diagonal);

        update_if_present!(deviation_penalty);

        update_if_present!(threshold_row);
        update_if_present!(threshold_column);
        update_if_present!(threshold_pillar);
        update_if_present!(threshold_level_diagonal);
        update_if_present!(threshold_space_diagonal);

        update_if_present!(penalty_scale_level_diagonal);
        update_if_present!(penalty_scale_space_diagonal);

        update_if_present!(balance_weight);
    }
}

impl Config {
    /// Rejects tunables no strategy can run with.
    pub fn validate(&self) -> McResult<()> {
        let g = &self.genetic;
        if g.population_size == 0 {
            return Err(config_err("ga-population-size must be at least 1"));
        }
        if g.generations == 0 {
            return Err(config_err("ga-generations must be at least 1"));
        }
        if g.tournament_size == 0 {
            return Err(config_err("ga-tournament-size must be at least 1"));
        }
        check_probability(g.mutation_rate, "ga-mutation-rate")?;

        let a = &self.anneal;
        check_probability(a.multi_swap_probability, "sa-multi-swap-probability")?;
        check_probability(a.intelligent_bias, "sa-intelligent-bias")?;
        if a.initial_temperature <= 0.0 || !a.initial_temperature.is_finite() {
            return Err(config_err("sa-initial-temperature must be positive"));
        }
        if a.min_temperature < 0.0 {
            return Err(config_err("sa-min-temperature must not be negative"));
        }
        if a.stage_iterations == 0 {
            return Err(config_err("sa-stage-iterations must be at least 1"));
        }
        if a.delta_cap <= 0.0 {
            return Err(config_err("sa-delta-cap must be positive"));
        }
        for rate in a.get_cooling_rates()? {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(config_err("sa-cooling-rates must lie in (0, 1]"));
            }
        }

        if self.restart.max_restarts == 0 {
            return Err(config_err("rr-max-restarts must be at least 1"));
        }
        Ok(())
    }
}

fn config_err(msg: &str) -> MagicCubeError {
    MagicCubeError::Config(msg.to_string())
}

fn check_probability(p: f64, name: &str) -> McResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(MagicCubeError::Config(format!(
            "{} must lie in [0, 1], got {}",
            name, p
        )))
    }
}

fn parse_f64_array<const N: usize>(s: &str, name: &str) -> McResult<[f64; N]> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(MagicCubeError::Config(format!(
            "--{} requires {} values",
            name, N
        )));
    }
    let mut arr = [0.0; N];
    for (i, p) in parts.iter().enumerate() {
        arr[i] = p
            .trim()
            .parse()
            .map_err(|_| MagicCubeError::Config(format!("Invalid number in {}", name)))?;
    }
    Ok(arr)
}
