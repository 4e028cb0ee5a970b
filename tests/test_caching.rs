use marmoset::{
    alphabet::Alphabet,
    caching::CachedChallenge,
    evolution::{Challenge, EvolutionLauncher, EvolutionOptions, NoStatus, TargetDistance},
    genome::Genome,
    rng::RandomNumberGenerator,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

// Define a challenge that tracks the number of evaluations
#[derive(Debug, Clone)]
struct CostlyChallenge {
    inner: TargetDistance,
    // Use Arc<AtomicUsize> to track evaluations across clones
    evaluations: Arc<AtomicUsize>,
}

impl CostlyChallenge {
    fn new(target: &str) -> Self {
        Self {
            inner: TargetDistance::new(Genome::from(target)),
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn get_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl Challenge for CostlyChallenge {
    fn score(&self, genome: &Genome) -> f64 {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.inner.score(genome)
    }
}

fn run_with_capacity(capacity: usize) -> (Vec<Genome>, f64) {
    let options = EvolutionOptions::builder()
        .population_size(20)
        .cache_capacity(capacity)
        .build();
    let mut launcher =
        EvolutionLauncher::new("cache me", Alphabet::printable().clone(), options).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(21);

    let mut best = f64::MAX;
    for _ in 0..40 {
        best = launcher.step(&mut rng).unwrap().score;
    }
    assert!(launcher.challenge().cache_size() <= capacity);

    (launcher.population().to_vec(), best)
}

#[test]
fn test_eviction_does_not_change_results() {
    // A tiny cache is cleared many times per generation
    let evicting = run_with_capacity(3);
    let roomy = run_with_capacity(1_000_000);

    assert_eq!(evicting, roomy);
}

#[test]
fn test_cache_avoids_repeated_evaluations() {
    let challenge = CostlyChallenge::new("AB");
    let counter = challenge.clone();
    let options = EvolutionOptions::builder()
        .population_size(10)
        .max_generations(100_000)
        .build();
    let mut launcher = EvolutionLauncher::with_challenge(
        2,
        Alphabet::new("AB").unwrap(),
        options,
        CachedChallenge::new(challenge),
    )
    .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(42);

    launcher.evolve(&mut rng, &mut NoStatus).unwrap();

    // Only four distinct genomes exist over a two letter alphabet
    assert!(counter.get_evaluations() <= 4);
    assert!(launcher.challenge().cache_size() <= 4);
}

#[test]
fn test_cleared_cache_recomputes_same_scores() {
    let challenge = CostlyChallenge::new("banana");
    let cached = CachedChallenge::with_capacity(challenge.clone(), 2);
    let genomes = [
        Genome::from("banana"),
        Genome::from("bandit"),
        Genome::from("cabana"),
    ];

    let first: Vec<f64> = genomes.iter().map(|g| cached.score(g)).collect();
    cached.clear_cache();
    let second: Vec<f64> = genomes.iter().map(|g| cached.score(g)).collect();

    assert_eq!(first, second);
    assert_eq!(first[0], 0.0);
    assert_eq!(challenge.get_evaluations(), 6);
    assert!(cached.cache_size() <= 2);
}
