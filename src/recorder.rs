use crate::cube::{coord_of, Coord, CubeState};
use crate::optimizer::neighbors::CandidateKind;
use crate::optimizer::StrategyKind;
use crate::scorer::{CostModel, Objective};
use serde::Serialize;
use std::time::Instant;
use strum_macros::Display;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Cost reached zero.
    Solved,
    /// No neighbor improves the current state.
    LocalOptimum,
    /// Iteration or generation limit hit.
    BudgetExhausted,
    /// Sideways budget spent with no improving neighbor.
    PlateauExhausted,
    /// The same pair was accepted too many times in a row.
    RepeatedSwap,
    /// Temperature dropped to the configured minimum.
    TemperatureFloor,
}

/// One accepted swap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveRecord {
    pub iteration: usize,
    pub first: usize,
    pub second: usize,
    // Objective value after the move
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance: Option<f64>,
}

impl MoveRecord {
    pub fn coords(&self, size: usize) -> (Coord, Coord) {
        (coord_of(size, self.first), coord_of(size, self.second))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwapCounter {
    pub attempts: usize,
    pub improvements: usize,
}

impl SwapCounter {
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.improvements as f64 / self.attempts as f64
        }
    }
}

/// Candidate effectiveness per origin, kept by the sideways-move climber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwapStats {
    pub within_line: SwapCounter,
    pub cross_line: SwapCounter,
    pub random: SwapCounter,
    pub exhaustive: SwapCounter,
}

impl SwapStats {
    pub fn counter_mut(&mut self, kind: CandidateKind) -> &mut SwapCounter {
        match kind {
            CandidateKind::WithinLine => &mut self.within_line,
            CandidateKind::CrossLine => &mut self.cross_line,
            CandidateKind::Random => &mut self.random,
            CandidateKind::Exhaustive => &mut self.exhaustive,
        }
    }

    pub fn record(&mut self, kind: CandidateKind, improved: bool) {
        let c = self.counter_mut(kind);
        c.attempts += 1;
        if improved {
            c.improvements += 1;
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub strategy: StrategyKind,
    pub objective: Objective,
    pub size: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub violations: usize,
    pub weighted_cost: f64,
    pub iterations: usize,
    pub termination: Termination,
    pub duration_secs: f64,
    pub moves: Vec<MoveRecord>,
    pub cost_history: Vec<f64>,
    pub generations: Vec<GenerationStats>,
    pub iterations_per_restart: Vec<usize>,
    pub stuck_count: usize,
    pub sideways_moves: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_stats: Option<SwapStats>,
    pub final_cube: CubeState,
}

impl RunRecord {
    pub fn is_solved(&self) -> bool {
        self.violations == 0
    }
}

/// Accumulates the trace of one run. The first `cost_history` entry is the
/// starting cost; each iteration or generation appends one more.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    strategy: StrategyKind,
    objective: Objective,
    size: usize,
    started: Instant,
    initial_cost: f64,
    moves: Vec<MoveRecord>,
    cost_history: Vec<f64>,
    generations: Vec<GenerationStats>,
    iterations_per_restart: Vec<usize>,
    stuck_count: usize,
    sideways_moves: usize,
    swap_stats: Option<SwapStats>,
}

impl RunRecorder {
    pub fn start(strategy: StrategyKind, objective: Objective, size: usize, initial_cost: f64) -> Self {
        Self {
            strategy,
            objective,
            size,
            started: Instant::now(),
            initial_cost,
            moves: Vec::new(),
            cost_history: vec![initial_cost],
            generations: Vec::new(),
            iterations_per_restart: Vec::new(),
            stuck_count: 0,
            sideways_moves: 0,
            swap_stats: None,
        }
    }

    /// Empty trace sharing this recorder's clock and initial cost, for one
    /// leg of a multi-leg run.
    pub fn fork(&self, leg_start_cost: f64) -> Self {
        Self {
            started: self.started,
            cost_history: vec![leg_start_cost],
            ..Self::start(self.strategy, self.objective, self.size, self.initial_cost)
        }
    }

    pub fn record_move(&mut self, iteration: usize, first: usize, second: usize, cost: f64) {
        self.moves.push(MoveRecord {
            iteration,
            first,
            second,
            cost,
            acceptance: None,
        });
    }

    pub fn record_accepted(
        &mut self,
        iteration: usize,
        first: usize,
        second: usize,
        cost: f64,
        acceptance: f64,
    ) {
        self.moves.push(MoveRecord {
            iteration,
            first,
            second,
            cost,
            acceptance: Some(acceptance),
        });
    }

    pub fn record_cost(&mut self, cost: f64) {
        self.cost_history.push(cost);
    }

    /// Generation stats replace the per-iteration trace; the first
    /// generation's best becomes the first history entry.
    pub fn record_generation(&mut self, generation: usize, best: f64, mean: f64) {
        if generation == 0 {
            self.cost_history.clear();
        }
        self.generations.push(GenerationStats {
            generation,
            best,
            mean,
        });
        self.cost_history.push(best);
    }

    pub fn set_restarts(&mut self, iterations_per_restart: Vec<usize>) {
        self.iterations_per_restart = iterations_per_restart;
    }

    pub fn mark_stuck(&mut self) {
        self.stuck_count += 1;
    }

    pub fn stuck_count(&self) -> usize {
        self.stuck_count
    }

    pub fn mark_sideways(&mut self) {
        self.sideways_moves += 1;
    }

    pub fn set_swap_stats(&mut self, stats: SwapStats) {
        self.swap_stats = Some(stats);
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }

    pub fn finish(
        self,
        model: &CostModel,
        final_cube: CubeState,
        final_cost: f64,
        iterations: usize,
        termination: Termination,
    ) -> RunRecord {
        let violations = model.violation_count(&final_cube);
        let weighted_cost = model.weighted_cost(&final_cube);
        RunRecord {
            strategy: self.strategy,
            objective: self.objective,
            size: self.size,
            initial_cost: self.initial_cost,
            final_cost,
            violations,
            weighted_cost,
            iterations,
            termination,
            duration_secs: self.started.elapsed().as_secs_f64(),
            moves: self.moves,
            cost_history: self.cost_history,
            generations: self.generations,
            iterations_per_restart: self.iterations_per_restart,
            stuck_count: self.stuck_count,
            sideways_moves: self.sideways_moves,
            swap_stats: self.swap_stats,
            final_cube,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_starts_with_initial_cost() {
        let mut rec = RunRecorder::start(StrategyKind::SteepestAscent, Objective::Violations, 3, 40.0);
        rec.record_move(1, 0, 5, 38.0);
        rec.record_cost(38.0);
        assert_eq!(rec.cost_history(), &[40.0, 38.0]);
        assert_eq!(rec.moves()[0].acceptance, None);
    }

    #[test]
    fn test_generation_stats_replace_history() {
        let mut rec = RunRecorder::start(StrategyKind::Genetic, Objective::Weighted, 3, 500.0);
        rec.record_generation(0, 300.0, 420.0);
        rec.record_generation(1, 280.0, 390.0);
        assert_eq!(rec.cost_history(), &[300.0, 280.0]);
    }

    #[test]
    fn test_move_coords() {
        let m = MoveRecord {
            iteration: 0,
            first: 0,
            second: 26,
            cost: 0.0,
            acceptance: Some(1.0),
        };
        let (a, b) = m.coords(3);
        assert_eq!(a, Coord::new(0, 0, 0));
        assert_eq!(b, Coord::new(2, 2, 2));
    }

    #[test]
    fn test_swap_stats_rates() {
        let mut stats = SwapStats::default();
        stats.record(CandidateKind::WithinLine, true);
        stats.record(CandidateKind::WithinLine, false);
        stats.record(CandidateKind::Random, false);
        assert_eq!(stats.within_line.attempts, 2);
        assert!((stats.within_line.success_rate() - 0.5).abs() < 1e-12);
        assert_eq!(stats.random.success_rate(), 0.0);
        assert_eq!(stats.cross_line.success_rate(), 0.0);
    }
}
