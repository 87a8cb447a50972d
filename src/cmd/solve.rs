use crate::reports;
use clap::Args;
use magicube::config::{Config, CostWeights};
use magicube::optimizer::runner::{run_trials, TrialOptions};
use magicube::optimizer::{self, StrategyKind};
use magicube::scorer::CostModel;
use magicube::{CubeState, McResult};

const DEFAULT_SIZE: usize = 5;

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[arg(short = 's', long, default_value_t = StrategyKind::SteepestAscent)]
    pub strategy: StrategyKind,

    // Defaults to 5, or to the grid's size when --grid is given
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    #[arg(short, long)]
    pub grid: Option<String>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value_t = 1)]
    pub trials: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub config: Config,
}

pub fn run(args: SolveArgs, weights: CostWeights) -> McResult<()> {
    let mut config = args.config;
    config.weights = weights;

    let start = match &args.grid {
        Some(path) => Some(CubeState::load_from_file(path, args.size)?),
        None => None,
    };
    let size = start
        .as_ref()
        .map(|c| c.size())
        .or(args.size)
        .unwrap_or(DEFAULT_SIZE);

    let model = CostModel::new(size, config.weights.clone())?;
    let strategy = optimizer::build(args.strategy, &config)?;

    if !args.json {
        println!(
            "\n🧊 Solving a {}-cube (magic number {}) with {} [{} objective]",
            size,
            model.magic_number(),
            args.strategy,
            strategy.objective()
        );
    }

    let summary = run_trials(
        strategy.as_ref(),
        &model,
        TrialOptions {
            trials: args.trials,
            size,
            seed: args.seed,
            start,
        },
    )?;

    if args.json {
        let out = if summary.runs.len() == 1 {
            serde_json::to_string_pretty(summary.best_run())?
        } else {
            serde_json::to_string_pretty(&summary)?
        };
        println!("{}", out);
        return Ok(());
    }

    reports::print_trials(&summary);
    let best = summary.best_run();
    reports::print_run_details(best);
    println!("\n🏆 Best final grid:");
    reports::print_cube(&best.final_cube);
    Ok(())
}
