use super::crossover::{block_crossover, ordered_crossover};
use super::mutation::{repair_duplicates, swap_mutation};
use super::{Strategy, StrategyKind};
use crate::config::{CrossoverKind, GeneticParams};
use crate::cube::CubeState;
use crate::error::{MagicCubeError, McResult};
use crate::recorder::{RunRecord, RunRecorder, Termination};
use crate::scorer::{engine, CostModel, Objective};
use fastrand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

/// Generational GA over flattened permutations.
pub struct GeneticAlgorithm {
    params: GeneticParams,
}

impl GeneticAlgorithm {
    pub fn new(params: GeneticParams) -> Self {
        Self { params }
    }

    fn initial_population(&self, start: &CubeState, rng: &mut Rng) -> McResult<Vec<Vec<u32>>> {
        let p = &self.params;
        if p.seed_from_start {
            return Ok(vec![start.values().to_vec(); p.population_size]);
        }
        (0..p.population_size)
            .map(|_| CubeState::random(start.size(), rng).map(CubeState::into_values))
            .collect()
    }

    fn breed(
        &self,
        size: usize,
        population: &[Vec<u32>],
        fitness: &[f64],
        rng: &mut Rng,
    ) -> McResult<Vec<u32>> {
        let p = &self.params;
        let a = &population[tournament(fitness, p.tournament_size, rng)];
        let b = &population[tournament(fitness, p.tournament_size, rng)];
        let mut child = match p.crossover {
            CrossoverKind::Ordered => ordered_crossover(a, b, rng),
            CrossoverKind::Block => block_crossover(size, a, b, rng),
        };
        if rng.f64() < p.mutation_rate {
            swap_mutation(&mut child, rng);
        }
        repair_duplicates(&mut child)?;
        Ok(child)
    }
}

/// Samples `k` individuals with replacement; the first with the lowest
/// fitness wins.
pub fn tournament(fitness: &[f64], k: usize, rng: &mut Rng) -> usize {
    let mut best = rng.usize(..fitness.len());
    for _ in 1..k {
        let i = rng.usize(..fitness.len());
        if fitness[i] < fitness[best] {
            best = i;
        }
    }
    best
}

fn evaluate(model: &CostModel, population: &[Vec<u32>], objective: Objective) -> Vec<f64> {
    population
        .par_iter()
        .map(|values| {
            let (_, totals) = engine::score_full(model, values);
            model.cost_of(&totals, objective)
        })
        .collect()
}

impl Strategy for GeneticAlgorithm {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Genetic
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let p = &self.params;
        if p.generations == 0 {
            return Err(MagicCubeError::Config(
                "ga-generations must be at least 1".to_string(),
            ));
        }
        let objective = p.objective;
        let size = start.size();
        let initial = model.cost(&start, objective);
        let mut recorder = RunRecorder::start(self.kind(), objective, size, initial);

        let mut population = self.initial_population(&start, rng)?;
        let mut best_values = start.into_values();
        let mut best_cost = f64::INFINITY;
        let mut generation = 0;

        info!(
            "Genetic: population {}, {} generations, {} crossover",
            p.population_size, p.generations, p.crossover
        );

        let termination = loop {
            // 1. Evaluate
            let fitness = evaluate(model, &population, objective);
            let mut gen_best = 0;
            for (i, &f) in fitness.iter().enumerate() {
                if f < fitness[gen_best] {
                    gen_best = i;
                }
            }
            let mean = fitness.iter().sum::<f64>() / fitness.len() as f64;
            recorder.record_generation(generation, fitness[gen_best], mean);
            debug!(
                "Generation {}: best {:.2}, mean {:.2}",
                generation, fitness[gen_best], mean
            );

            if fitness[gen_best] < best_cost {
                best_cost = fitness[gen_best];
                best_values = population[gen_best].clone();
                info!("Generation {}: new best {:.2}", generation, best_cost);
            }

            if best_cost == 0.0 {
                break Termination::Solved;
            }
            if generation + 1 >= p.generations {
                generation += 1;
                break Termination::BudgetExhausted;
            }

            // 2. Breed
            let mut next = Vec::with_capacity(p.population_size);
            if p.elitism {
                next.push(best_values.clone());
            }
            while next.len() < p.population_size {
                next.push(self.breed(size, &population, &fitness, rng)?);
            }
            population = next;
            generation += 1;
        };

        info!(
            "Genetic: {} after {} generations, best {:.2}",
            termination, generation, best_cost
        );
        let best = CubeState::from_permutation(size, best_values);
        Ok(recorder.finish(model, best, best_cost, generation, termination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::is_permutation;

    #[test]
    fn test_tournament_with_replacement_handles_tiny_populations() {
        let mut rng = Rng::with_seed(1);
        assert_eq!(tournament(&[5.0], 3, &mut rng), 0);
        let fitness = [3.0, 1.0];
        let picks: Vec<usize> = (0..50).map(|_| tournament(&fitness, 3, &mut rng)).collect();
        assert!(picks.contains(&1));
    }

    #[test]
    fn test_generation_stats_and_best() {
        let model = CostModel::standard(3).unwrap();
        let mut rng = Rng::with_seed(8);
        let start = CubeState::random(3, &mut rng).unwrap();
        let ga = GeneticAlgorithm::new(GeneticParams {
            population_size: 20,
            generations: 15,
            ..GeneticParams::default()
        });
        let record = ga.run(&model, start, &mut rng).unwrap();

        assert!(is_permutation(record.final_cube.values()));
        assert_eq!(record.generations.len(), record.cost_history.len());
        let min_best = record
            .generations
            .iter()
            .map(|g| g.best)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(record.final_cost, min_best);
        for g in &record.generations {
            assert!(g.best <= g.mean);
        }
        // Elitism keeps the best individual, so generation bests never rise
        for pair in record.generations.windows(2) {
            assert!(pair[1].best <= pair[0].best);
        }
    }

    #[test]
    fn test_zero_generations_rejected() {
        let model = CostModel::standard(3).unwrap();
        let mut rng = Rng::with_seed(3);
        let start = CubeState::random(3, &mut rng).unwrap();
        let ga = GeneticAlgorithm::new(GeneticParams {
            generations: 0,
            ..GeneticParams::default()
        });
        assert!(matches!(
            ga.run(&model, start, &mut rng),
            Err(MagicCubeError::Config(_))
        ));
    }

    #[test]
    fn test_block_crossover_children_are_repaired() {
        let model = CostModel::standard(3).unwrap();
        let mut rng = Rng::with_seed(44);
        let start = CubeState::random(3, &mut rng).unwrap();
        let ga = GeneticAlgorithm::new(GeneticParams {
            population_size: 12,
            generations: 10,
            crossover: CrossoverKind::Block,
            mutation_rate: 0.5,
            ..GeneticParams::default()
        });
        let record = ga.run(&model, start, &mut rng).unwrap();
        assert!(is_permutation(record.final_cube.values()));
    }
}
