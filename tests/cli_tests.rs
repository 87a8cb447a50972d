use regex::Regex;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    _dir: TempDir,
    grid_path: PathBuf,
    flat_path: PathBuf,
    bad_path: PathBuf,
    weights_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let grid_path = dir.path().join("semi_perfect.json");
        let flat_path = dir.path().join("flat.json");
        let bad_path = dir.path().join("duplicate.json");
        let weights_path = dir.path().join("weights.json");

        // Rows, columns, pillars and space diagonals all hit 42
        let mut f = File::create(&grid_path).unwrap();
        writeln!(
            f,
            "[[[8,24,10],[12,7,23],[22,11,9]],\
              [[15,1,26],[25,14,3],[2,27,13]],\
              [[19,17,6],[5,21,16],[18,4,20]]]"
        )
        .unwrap();

        let mut f = File::create(&flat_path).unwrap();
        writeln!(f, "[1,2,3,4,5,6,7,8]").unwrap();

        let mut f = File::create(&bad_path).unwrap();
        writeln!(f, "[1,1,3,4,5,6,7,8]").unwrap();

        let mut f = File::create(&weights_path).unwrap();
        writeln!(f, r#"{{"balance_weight": 0.0, "deviation_penalty": 0.0}}"#).unwrap();

        Self {
            _dir: dir,
            grid_path,
            flat_path,
            bad_path,
            weights_path,
        }
    }
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_magicube"))
        .args(args)
        .output()
        .expect("Failed to execute binary")
}

fn stdout_json(out: &Output) -> Value {
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not JSON")
}

#[test]
fn test_evaluate_json() {
    let ctx = TestContext::new();
    let out = run(&["evaluate", "--grid", ctx.grid_path.to_str().unwrap(), "--json"]);
    let v = stdout_json(&out);

    assert_eq!(v["size"], 3);
    assert_eq!(v["magic_number"], 42);
    assert_eq!(v["total_lines"], 37);
    assert_eq!(v["violations"], 4);
    assert_eq!(v["categories"].as_array().unwrap().len(), 5);
}

#[test]
fn test_evaluate_table() {
    let ctx = TestContext::new();
    let out = run(&["evaluate", "-g", ctx.grid_path.to_str().unwrap()]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(Regex::new(r"Violations\s+\|\s+4 / 37").unwrap().is_match(&stdout));
    assert!(Regex::new(r"Magic number\s+\|\s+42").unwrap().is_match(&stdout));
    assert!(stdout.contains("NOT MAGIC"));
    assert!(stdout.contains("Level 2"));
}

#[test]
fn test_weights_file_and_flags() {
    let ctx = TestContext::new();
    let grid = ctx.grid_path.to_str().unwrap();
    let weights = ctx.weights_path.to_str().unwrap();

    // Only level diagonals miss: 1.5 * (18 + 3 + 18 + 3)
    let v = stdout_json(&run(&["evaluate", "-g", grid, "--json", "--weights", weights]));
    let cost = v["weighted_cost"].as_f64().unwrap();
    assert!((cost - 63.0).abs() < 1e-9, "cost {}", cost);

    let v = stdout_json(&run(&[
        "evaluate",
        "-g",
        grid,
        "--json",
        "--weights",
        weights,
        "--weight-level-diagonal",
        "1.0",
    ]));
    let cost = v["weighted_cost"].as_f64().unwrap();
    assert!((cost - 42.0).abs() < 1e-9, "cost {}", cost);
}

#[test]
fn test_solve_is_reproducible_with_seed() {
    let args = [
        "solve",
        "-s",
        "stochastic",
        "-n",
        "3",
        "-S",
        "42",
        "--sh-max-iterations",
        "300",
        "--json",
    ];
    let a = stdout_json(&run(&args));
    let b = stdout_json(&run(&args));

    assert_eq!(a["strategy"], "stochastic");
    assert_eq!(a["final_cube"], b["final_cube"]);
    assert_eq!(a["final_cube"]["size"], 3);
    assert!(a["final_cost"].as_f64().unwrap() <= a["initial_cost"].as_f64().unwrap());
}

#[test]
fn test_solve_from_flat_grid() {
    let ctx = TestContext::new();
    let v = stdout_json(&run(&[
        "solve",
        "-g",
        ctx.flat_path.to_str().unwrap(),
        "-S",
        "1",
        "--json",
    ]));
    assert_eq!(v["size"], 2);
    assert_eq!(v["strategy"], "steepest_ascent");
}

#[test]
fn test_solve_trials_summary() {
    let v = stdout_json(&run(&[
        "solve",
        "-s",
        "genetic",
        "-n",
        "2",
        "-t",
        "3",
        "-S",
        "5",
        "--ga-population-size",
        "10",
        "--ga-generations",
        "5",
        "--json",
    ]));
    let runs = v["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    let best = v["best"].as_u64().unwrap() as usize;
    let best_cost = runs[best]["final_cost"].as_f64().unwrap();
    assert!(runs
        .iter()
        .all(|r| r["final_cost"].as_f64().unwrap() >= best_cost));
}

#[test]
fn test_solve_table_output() {
    let out = run(&["solve", "-n", "2", "-S", "9"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("steepest_ascent"));
    assert!(Regex::new(r"Solved \d+/1 trial").unwrap().is_match(&stdout));
    assert!(stdout.contains("Best final grid"));
}

#[test]
fn test_invalid_grid_is_reported() {
    let ctx = TestContext::new();
    let out = run(&["evaluate", "-g", ctx.bad_path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not a permutation"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_is_reported() {
    let out = run(&[
        "solve",
        "-s",
        "simulated_annealing",
        "-n",
        "2",
        "--sa-cooling-rates",
        "0.9,0.9",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("sa-cooling-rates"), "stderr: {}", stderr);
}
