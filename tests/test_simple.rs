use gaengine::{
    elitism::StandardElitism,
    error::Result,
    evaluation::{EvaluationMode, FitnessEvaluator},
    evolution::{AlgorithmOptions, GeneticAlgorithmBuilder},
    operators::{PhenotypeCrossover, PhenotypeMutation},
    phenotype::Phenotype,
    rng::RandomNumberGenerator,
    scaling::SigmaScaling,
    selection::{FitnessProportionateSelection, TournamentSelection},
    strategy::SimpleStrategy,
    termination::{FitnessTargetTerminator, GenerationCountTerminator},
};

#[derive(Clone, Copy, Debug)]
struct XCoordinate {
    x: f64,
}

impl XCoordinate {
    fn new(x: f64) -> Self {
        Self { x }
    }
}

impl Phenotype for XCoordinate {
    fn crossover(&mut self, other: &Self) {
        self.x = (self.x + other.x) / 2.0;
    }

    fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
        self.x += rng.gen_range_f64(-1.0, 1.0);
    }
}

/// Distance to a target coordinate; smaller is better.
struct DistanceToTarget {
    target: f64,
}

impl FitnessEvaluator<XCoordinate> for DistanceToTarget {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Minimize
    }

    fn evaluate_fitness(&self, phenotype: &XCoordinate) -> Result<f64> {
        Ok((phenotype.x - self.target).abs())
    }
}

/// Closeness to a target coordinate; larger is better.
struct Closeness {
    target: f64,
}

impl FitnessEvaluator<XCoordinate> for Closeness {
    fn evaluate_fitness(&self, phenotype: &XCoordinate) -> Result<f64> {
        Ok(1.0 / (1.0 + (phenotype.x - self.target).abs()))
    }
}

fn seed_far_away(rng: &mut RandomNumberGenerator) -> XCoordinate {
    XCoordinate::new(rng.gen_range_f64(20.0, 40.0))
}

#[test]
fn test_simple_strategy_approaches_target() {
    let mut algorithm = GeneticAlgorithmBuilder::new()
        .with_options(AlgorithmOptions::new(30, 1))
        .with_strategy(SimpleStrategy::new())
        .with_evaluator(DistanceToTarget { target: 2.0 })
        .with_selection(TournamentSelection::new(3).unwrap())
        .with_crossover(PhenotypeCrossover::new(0.9).unwrap())
        .with_mutation(PhenotypeMutation::new(0.5).unwrap())
        .with_elitism(StandardElitism::new(0.1).unwrap())
        .with_terminator(GenerationCountTerminator::new(200))
        .with_seeder(seed_far_away)
        .with_seed(7)
        .build()
        .unwrap();

    algorithm.run().unwrap();
    let final_best = algorithm.best_entity().unwrap().raw_fitness().unwrap();

    assert_eq!(algorithm.generation(), 200);
    // Seeds start at least 18 away from the target.
    assert!(final_best < 5.0, "best distance {final_best}");
    assert_eq!(algorithm.environment().populations()[0].len(), 30);
}

#[test]
fn test_fitness_target_stops_early() {
    let mut algorithm = GeneticAlgorithmBuilder::new()
        .with_options(AlgorithmOptions::new(40, 1))
        .with_evaluator(Closeness { target: 0.0 })
        .with_selection(FitnessProportionateSelection::new())
        .with_crossover(PhenotypeCrossover::new(0.9).unwrap())
        .with_mutation(PhenotypeMutation::new(0.3).unwrap())
        .with_elitism(StandardElitism::new(0.05).unwrap())
        .with_scaling(SigmaScaling::new(2.0).unwrap())
        .with_terminator(FitnessTargetTerminator::new(0.5))
        .with_seeder(|rng: &mut RandomNumberGenerator| XCoordinate::new(rng.gen_range_f64(-3.0, 3.0)))
        .with_seed(11)
        .build()
        .unwrap();

    let last_generation = algorithm.run().unwrap();
    let best = algorithm.best_entity().unwrap().raw_fitness().unwrap();

    assert!(best >= 0.5);
    assert_eq!(last_generation, algorithm.generation());
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed: u64| {
        let mut algorithm = GeneticAlgorithmBuilder::new()
            .with_options(AlgorithmOptions::new(16, 2))
            .with_evaluator(DistanceToTarget { target: -4.0 })
            .with_selection(TournamentSelection::default())
            .with_crossover(PhenotypeCrossover::new(0.7).unwrap())
            .with_mutation(PhenotypeMutation::new(0.4).unwrap())
            .with_terminator(GenerationCountTerminator::new(25))
            .with_seeder(seed_far_away)
            .with_seed(seed)
            .build()
            .unwrap();
        algorithm.run().unwrap();
        algorithm.best_entity().unwrap().phenotype().x
    };

    assert_eq!(run(3), run(3));
}
