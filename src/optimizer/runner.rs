use super::Strategy;
use crate::cube::CubeState;
use crate::error::{MagicCubeError, McResult};
use crate::recorder::RunRecord;
use crate::scorer::CostModel;
use fastrand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

pub struct TrialOptions {
    pub trials: usize,
    pub size: usize,
    // Trial i runs with seed + i; entropy-seeded when absent
    pub seed: Option<u64>,
    // Shared start grid; each trial draws its own random grid when absent
    pub start: Option<CubeState>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrialSummary {
    pub runs: Vec<RunRecord>,
    // Index into `runs`
    pub best: usize,
}

impl TrialSummary {
    pub fn best_run(&self) -> &RunRecord {
        &self.runs[self.best]
    }

    pub fn solved_count(&self) -> usize {
        self.runs.iter().filter(|r| r.is_solved()).count()
    }
}

/// Runs independent trials of `strategy` in parallel.
///
/// Each trial owns its Rng and start cube; results come back in trial
/// order and the best is the first run with the lowest final cost.
pub fn run_trials(
    strategy: &dyn Strategy,
    model: &CostModel,
    options: TrialOptions,
) -> McResult<TrialSummary> {
    if options.trials == 0 {
        return Err(MagicCubeError::Config(
            "trials must be at least 1".to_string(),
        ));
    }
    if let Some(start) = &options.start {
        model.check_cube(start)?;
    }

    info!(
        "Running {} trial(s) of {} on a {}-cube",
        options.trials,
        strategy.kind(),
        options.size
    );

    let runs: Vec<RunRecord> = (0..options.trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = match options.seed {
                Some(s) => Rng::with_seed(s.wrapping_add(i as u64)),
                None => Rng::new(),
            };
            let start = match &options.start {
                Some(cube) => cube.clone(),
                None => CubeState::random(options.size, &mut rng)?,
            };
            strategy.run(model, start, &mut rng)
        })
        .collect::<McResult<Vec<_>>>()?;

    let mut best = 0;
    for (i, run) in runs.iter().enumerate() {
        if run.final_cost < runs[best].final_cost {
            best = i;
        }
    }
    info!(
        "Best of {} trial(s): #{} with cost {:.2}",
        runs.len(),
        best,
        runs[best].final_cost
    );
    Ok(TrialSummary { runs, best })
}
