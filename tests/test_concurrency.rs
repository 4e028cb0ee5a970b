use marmoset::{
    alphabet::Alphabet,
    breeding::Breeder,
    error::GeneticError,
    evolution::{
        Challenge, EvolutionLauncher, EvolutionOptions, ExecutionMode, GenerationEngine,
        NoStatus, TargetDistance,
    },
    genome::{random_population, Genome},
    pool::WORKER_THREAD_PREFIX,
    rng::RandomNumberGenerator,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

// Panics whenever it is scored on a pool worker, so every partition has to be
// recovered on the calling thread.
struct WorkerAllergic {
    inner: TargetDistance,
}

impl Challenge for WorkerAllergic {
    fn score(&self, genome: &Genome) -> f64 {
        let on_worker = std::thread::current()
            .name()
            .is_some_and(|name| name.starts_with(WORKER_THREAD_PREFIX));
        if on_worker {
            panic!("scoring is not allowed on workers");
        }
        self.inner.score(genome)
    }
}

// Scores normally for a fixed number of calls, then panics everywhere.
struct FailAfter {
    inner: TargetDistance,
    remaining: AtomicUsize,
}

impl Challenge for FailAfter {
    fn score(&self, genome: &Genome) -> f64 {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            panic!("challenge exhausted");
        }
        self.inner.score(genome)
    }
}

#[test]
fn test_odd_population_keeps_size() {
    let engine = GenerationEngine::new(
        Arc::new(TargetDistance::new(Genome::from("odd"))),
        Breeder::new(Alphabet::printable().clone(), 0.87, 0.25),
        ExecutionMode::Concurrent { workers: 4 },
    )
    .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(11);

    for size in [1, 3, 9, 29] {
        let population = random_population(size, 3, Alphabet::printable(), &mut rng);
        let next = engine.advance(&population, &mut rng).unwrap();
        assert_eq!(next.population.len(), size);
    }
}

#[test]
fn test_failed_partitions_are_recovered() {
    let options = EvolutionOptions::builder()
        .population_size(10)
        .execution_mode(ExecutionMode::Concurrent { workers: 2 })
        .max_generations(100_000)
        .build();
    let challenge = WorkerAllergic {
        inner: TargetDistance::new(Genome::from("AB")),
    };
    let mut launcher =
        EvolutionLauncher::with_challenge(2, Alphabet::new("AB").unwrap(), options, challenge)
            .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(42);

    let result = launcher.evolve(&mut rng, &mut NoStatus).unwrap();

    assert_eq!(result.genome, Genome::from("AB"));
    assert_eq!(result.failed_tasks, 0);
    // Five pairs over two workers give two partitions per generation
    assert_eq!(result.recovered_tasks, 2 * result.generation);
}

#[test]
fn test_lost_partitions_are_backfilled() {
    let population = random_population(
        9,
        5,
        Alphabet::printable(),
        &mut RandomNumberGenerator::from_seed(8),
    );
    // Fitness statistics score every member twice before breeding starts
    let challenge = FailAfter {
        inner: TargetDistance::new(Genome::from("lost!")),
        remaining: AtomicUsize::new(population.len() * 2),
    };
    let engine = GenerationEngine::new(
        Arc::new(challenge),
        Breeder::new(Alphabet::printable().clone(), 0.87, 0.25),
        ExecutionMode::Concurrent { workers: 3 },
    )
    .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(9);

    let next = engine.advance(&population, &mut rng).unwrap();

    assert_eq!(next.population.len(), population.len());
    assert_eq!(next.tasks, 3);
    assert_eq!(next.failed_tasks, 3);
    assert_eq!(next.recovered_tasks, 0);
    assert!(next
        .population
        .iter()
        .all(|genome| population.contains(genome)));
}

#[test]
fn test_generation_with_every_task_lost_fails() {
    let options = EvolutionOptions::builder()
        .population_size(9)
        .execution_mode(ExecutionMode::Concurrent { workers: 3 })
        .build();
    let challenge = FailAfter {
        inner: TargetDistance::new(Genome::from("lost!")),
        remaining: AtomicUsize::new(9 * 2),
    };
    let mut launcher =
        EvolutionLauncher::with_challenge(5, Alphabet::printable().clone(), options, challenge)
            .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(4);

    let result = launcher.evolve(&mut rng, &mut NoStatus);

    assert!(matches!(result, Err(GeneticError::Worker(_))));
    assert_eq!(launcher.generation(), 0);
}

#[test]
fn test_invalid_concurrency_rejected() {
    let options = EvolutionOptions::builder()
        .execution_mode(ExecutionMode::Concurrent { workers: 0 })
        .build();

    assert!(matches!(
        EvolutionLauncher::new("AB", Alphabet::new("AB").unwrap(), options),
        Err(GeneticError::Configuration(_))
    ));
}
