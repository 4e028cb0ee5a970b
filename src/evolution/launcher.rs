use std::sync::Arc;

use tracing::{debug, info};

use super::{
    engine::GenerationEngine,
    options::EvolutionOptions,
    status::StatusReporter,
    Challenge, TargetDistance,
};
use crate::{
    alphabet::Alphabet,
    breeding::Breeder,
    caching::CachedChallenge,
    error::{GeneticError, OptionExt, Result},
    genome::{random_population, Genome},
    rng::RandomNumberGenerator,
};

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    /// No population exists yet.
    Initializing,
    /// Generations are being produced.
    Running,
    /// The best genome scores zero; the run is over.
    Converged,
}

/// The best genome of a run so far, with its score and the generation that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    pub genome: Genome,
    pub score: f64,
    pub generation: usize,
    /// Worker partitions recovered by a retry during the run.
    pub recovered_tasks: usize,
    /// Worker partitions lost and backfilled during the run.
    pub failed_tasks: usize,
}

/// Drives generations until a genome matches the target.
///
/// The launcher owns the current population and the best genome seen so far.
/// Each [`step`](Self::step) replaces the population with the engine's next
/// generation and keeps the best only if the new generation strictly improves
/// on it, so the best score never increases.
///
/// # Example
///
/// ```rust
/// use marmoset::{
///     alphabet::Alphabet,
///     evolution::{status::NoStatus, EvolutionLauncher, EvolutionOptions},
///     rng::RandomNumberGenerator,
/// };
///
/// let options = EvolutionOptions::builder().population_size(10).build();
/// let mut launcher = EvolutionLauncher::new("AB", Alphabet::new("AB").unwrap(), options).unwrap();
/// let mut rng = RandomNumberGenerator::from_seed(1);
///
/// let result = launcher.evolve(&mut rng, &mut NoStatus).unwrap();
/// assert_eq!(result.genome.to_string(), "AB");
/// assert_eq!(result.score, 0.0);
/// ```
pub struct EvolutionLauncher<C = CachedChallenge<TargetDistance>>
where
    C: Challenge,
{
    engine: GenerationEngine<C>,
    options: EvolutionOptions,
    alphabet: Alphabet,
    genome_length: usize,
    state: EvolutionState,
    generation: usize,
    population: Vec<Genome>,
    best: Option<EvolutionResult>,
    recovered_tasks: usize,
    failed_tasks: usize,
}

impl EvolutionLauncher {
    /// Creates a launcher that evolves genomes toward `target`, scored by a
    /// cached squared code distance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid, the target is
    /// empty, or the target uses characters outside `alphabet`.
    pub fn new(target: &str, alphabet: Alphabet, options: EvolutionOptions) -> Result<Self> {
        let target = Genome::parse(target, &alphabet)?;
        let challenge = CachedChallenge::with_capacity(
            TargetDistance::new(target.clone()),
            options.get_cache_capacity(),
        );

        Self::with_challenge(target.len(), alphabet, options, challenge)
    }
}

impl<C> EvolutionLauncher<C>
where
    C: Challenge + 'static,
{
    /// Creates a launcher around any challenge whose perfect score is zero.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the options are invalid or
    /// `genome_length` is zero.
    pub fn with_challenge(
        genome_length: usize,
        alphabet: Alphabet,
        options: EvolutionOptions,
        challenge: C,
    ) -> Result<Self> {
        options.validate()?;
        if genome_length == 0 {
            return Err(GeneticError::Configuration(
                "Target cannot be empty".to_string(),
            ));
        }

        let breeder = Breeder::new(
            alphabet.clone(),
            options.get_crossover_probability(),
            options.get_mutation_probability(),
        );
        let engine = GenerationEngine::new(
            Arc::new(challenge),
            breeder,
            options.get_execution_mode(),
        )?;

        Ok(Self {
            engine,
            options,
            alphabet,
            genome_length,
            state: EvolutionState::Initializing,
            generation: 0,
            population: Vec::new(),
            best: None,
            recovered_tasks: 0,
            failed_tasks: 0,
        })
    }

    pub fn state(&self) -> EvolutionState {
        self.state
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn best(&self) -> Option<&EvolutionResult> {
        self.best.as_ref()
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn challenge(&self) -> &C {
        self.engine.challenge()
    }

    /// Creates a fresh random population and resets the run.
    pub fn initialize(&mut self, rng: &mut RandomNumberGenerator) {
        self.population = random_population(
            self.options.get_population_size(),
            self.genome_length,
            &self.alphabet,
            rng,
        );
        self.generation = 0;
        self.best = None;
        self.recovered_tasks = 0;
        self.failed_tasks = 0;
        self.state = EvolutionState::Running;

        info!(
            population = self.population.len(),
            genome_length = self.genome_length,
            concurrent = self.engine.is_concurrent(),
            "Evolution initialized"
        );
    }

    /// Runs one generation and returns the best genome so far.
    ///
    /// Initializes the run first if needed.
    ///
    /// # Errors
    ///
    /// Returns an evolution error if the run has already converged, and a
    /// worker error if every concurrent task of the generation was lost.
    pub fn step(&mut self, rng: &mut RandomNumberGenerator) -> Result<&EvolutionResult> {
        match self.state {
            EvolutionState::Converged => {
                return Err(GeneticError::Evolution(format!(
                    "Run already converged at generation {}",
                    self.generation
                )))
            }
            EvolutionState::Initializing => self.initialize(rng),
            EvolutionState::Running => {}
        }

        let next = self.engine.advance(&self.population, rng)?;
        if next.tasks > 0 && next.failed_tasks == next.tasks {
            return Err(GeneticError::Worker(format!(
                "All {} generation tasks failed at generation {}",
                next.tasks,
                self.generation + 1
            )));
        }

        self.generation += 1;
        self.population = next.population;
        self.recovered_tasks += next.recovered_tasks;
        self.failed_tasks += next.failed_tasks;

        let (genome, score) = best_of(&self.population, self.engine.challenge())
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;

        let improved = self.best.as_ref().map_or(true, |best| score < best.score);
        if improved {
            self.best = Some(EvolutionResult {
                genome: genome.clone(),
                score,
                generation: self.generation,
                recovered_tasks: 0,
                failed_tasks: 0,
            });
        }

        let best = self
            .best
            .as_mut()
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
        best.recovered_tasks = self.recovered_tasks;
        best.failed_tasks = self.failed_tasks;

        debug!(
            generation = self.generation,
            generation_best = score,
            best = best.score,
            "Generation complete"
        );

        if best.score == 0.0 {
            self.state = EvolutionState::Converged;
            info!(
                generation = self.generation,
                genome = %best.genome,
                "Evolution converged"
            );
        }

        Ok(&*best)
    }

    /// Runs generations until the target is matched, reporting the best genome
    /// after each one.
    ///
    /// # Errors
    ///
    /// Returns `MaxAttemptsReached` if a generation cap is configured and hit
    /// before convergence, after reporting the best genome found. Reporter and
    /// engine errors are propagated.
    pub fn evolve<R>(
        &mut self,
        rng: &mut RandomNumberGenerator,
        reporter: &mut R,
    ) -> Result<EvolutionResult>
    where
        R: StatusReporter + ?Sized,
    {
        if self.state == EvolutionState::Initializing {
            self.initialize(rng);
        }

        while self.state != EvolutionState::Converged {
            if let Some(max) = self.options.get_max_generations() {
                if self.generation >= max {
                    if let Some(best) = &self.best {
                        reporter.finish(best)?;
                    }
                    return Err(GeneticError::MaxAttemptsReached(format!(
                        "No exact match after {} generations",
                        max
                    )));
                }
            }

            let best = self.step(rng)?.genome.clone();
            reporter.update(self.generation, &best)?;
        }

        let result = self.best.clone().ok_or_else_genetic(|| {
            GeneticError::Evolution("Converged without a best genome".to_string())
        })?;
        reporter.finish(&result)?;

        Ok(result)
    }
}

/// Returns the lowest-scoring genome, keeping the earliest on ties.
fn best_of<'a, C>(population: &'a [Genome], challenge: &C) -> Option<(&'a Genome, f64)>
where
    C: Challenge + ?Sized,
{
    let mut members = population.iter();
    let first = members.next()?;

    Some(members.fold((first, challenge.score(first)), |(best, best_score), genome| {
        let score = challenge.score(genome);
        if score < best_score {
            (genome, score)
        } else {
            (best, best_score)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::options::ExecutionMode;
    use crate::evolution::status::NoStatus;

    fn binary_options() -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(10)
            .mutation_probability(0.2)
            .build()
    }

    #[test]
    fn test_best_of_keeps_earliest_on_ties() {
        let challenge = TargetDistance::new(Genome::from("B"));
        let population = vec![Genome::from("A"), Genome::from("C"), Genome::from("D")];

        let (best, score) = best_of(&population, &challenge).unwrap();

        assert_eq!(best, &population[0]);
        assert_eq!(score, 1.0);
        assert!(best_of(&[], &challenge).is_none());
    }

    #[test]
    fn test_state_transitions() {
        let alphabet = Alphabet::new("AB").unwrap();
        let mut launcher = EvolutionLauncher::new("AB", alphabet, binary_options()).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(3);

        assert_eq!(launcher.state(), EvolutionState::Initializing);
        assert!(launcher.best().is_none());

        launcher.initialize(&mut rng);
        assert_eq!(launcher.state(), EvolutionState::Running);
        assert_eq!(launcher.generation(), 0);
        assert_eq!(launcher.population().len(), 10);

        while launcher.state() != EvolutionState::Converged {
            launcher.step(&mut rng).unwrap();
            assert!(launcher.generation() < 10_000);
        }

        assert_eq!(launcher.best().unwrap().genome, Genome::from("AB"));
        assert!(matches!(
            launcher.step(&mut rng),
            Err(GeneticError::Evolution(_))
        ));
    }

    #[test]
    fn test_step_initializes_lazily() {
        let alphabet = Alphabet::new("AB").unwrap();
        let mut launcher = EvolutionLauncher::new("ABBA", alphabet, binary_options()).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(8);

        let best = launcher.step(&mut rng).unwrap().clone();

        assert_eq!(best.generation, 1);
        assert_eq!(launcher.generation(), 1);
        assert_eq!(launcher.population().len(), 10);
    }

    #[test]
    fn test_new_rejects_bad_configuration() {
        let alphabet = Alphabet::new("AB").unwrap();

        assert!(matches!(
            EvolutionLauncher::new("", alphabet.clone(), binary_options()),
            Err(GeneticError::Configuration(_))
        ));
        assert!(matches!(
            EvolutionLauncher::new("ABC", alphabet.clone(), binary_options()),
            Err(GeneticError::Configuration(_))
        ));
        assert!(matches!(
            EvolutionLauncher::new(
                "AB",
                alphabet,
                EvolutionOptions::builder().population_size(0).build()
            ),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_generation_cap() {
        let options = EvolutionOptions::builder()
            .population_size(4)
            .max_generations(3)
            .build();
        let mut launcher = EvolutionLauncher::new(
            "Monkeys typing on typewriters",
            Alphabet::printable().clone(),
            options,
        )
        .unwrap();
        let mut rng = RandomNumberGenerator::from_seed(12);

        let result = launcher.evolve(&mut rng, &mut NoStatus);

        assert!(matches!(result, Err(GeneticError::MaxAttemptsReached(_))));
        assert_eq!(launcher.generation(), 3);
    }

    #[test]
    fn test_concurrent_launcher_converges() {
        let options = EvolutionOptions::builder()
            .population_size(10)
            .mutation_probability(0.2)
            .execution_mode(ExecutionMode::Concurrent { workers: 2 })
            .max_generations(10_000)
            .build();
        let mut launcher =
            EvolutionLauncher::new("BA", Alphabet::new("AB").unwrap(), options).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(5);

        let result = launcher.evolve(&mut rng, &mut NoStatus).unwrap();

        assert_eq!(result.genome, Genome::from("BA"));
        assert_eq!(result.failed_tasks, 0);
        assert_eq!(launcher.state(), EvolutionState::Converged);
    }
}
