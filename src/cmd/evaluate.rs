use crate::reports;
use clap::Args;
use magicube::config::CostWeights;
use magicube::scorer::CostModel;
use magicube::{CubeState, McResult};

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(short, long)]
    pub grid: String,

    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub weights: CostWeights,
}

pub fn run(args: EvaluateArgs, weights: CostWeights) -> McResult<()> {
    let cube = CubeState::load_from_file(&args.grid, args.size)?;
    let model = CostModel::new(cube.size(), weights)?;
    let breakdown = model.evaluate(&cube);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    println!("\n🔎 === CUBE AUDIT: {} === 🔎", args.grid);
    reports::print_cube(&cube);
    reports::print_breakdown(&breakdown);
    Ok(())
}
