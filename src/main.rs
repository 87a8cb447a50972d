use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use magicube::config::CostWeights;
use std::process;
use tracing::Level;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long)]
    weights: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Solve(cmd::solve::SolveArgs),
    Evaluate(cmd::evaluate::EvaluateArgs),
}

fn main() {
    // 1. Parse Raw Matches (to distinguish user input from defaults)
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // 2. Pull the CLI weights and the subcommand's own matches
    let (cli_weights, sub_matches) = match &cli.command {
        Commands::Solve(args) => (&args.config.weights, matches.subcommand_matches("solve")),
        Commands::Evaluate(args) => (&args.weights, matches.subcommand_matches("evaluate")),
    };

    // 3. Resolve Weights: JSON file as base, explicit flags on top
    let weights = match &cli.weights {
        Some(path) => {
            let mut file_weights = CostWeights::load_from_file(path).unwrap_or_else(|e| {
                eprintln!("❌ Failed to load weights from '{}': {}", path, e);
                process::exit(1);
            });
            if let Some(sub) = sub_matches {
                file_weights.merge_from_cli(cli_weights, sub);
            }
            file_weights
        }
        None => cli_weights.clone(),
    };

    // 4. Execute
    let result = match cli.command {
        Commands::Solve(args) => cmd::solve::run(args, weights),
        Commands::Evaluate(args) => cmd::evaluate::run(args, weights),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        process::exit(1);
    }
}
