//! # Breeding
//!
//! Reproduction operators: single-point crossover, a one-position mutation
//! that walks a character code by one step, and [`Breeder::create_children`],
//! which applies them with configured probabilities.
//!
//! ```rust
//! use marmoset::{
//!     alphabet::Alphabet, breeding::Breeder, genome::Genome, rng::RandomNumberGenerator,
//! };
//!
//! let breeder = Breeder::new(Alphabet::printable().clone(), 0.87, 0.25);
//! let mut rng = RandomNumberGenerator::from_seed(3);
//!
//! let (first, second) =
//!     breeder.create_children(&Genome::from("monkey"), &Genome::from("typist"), &mut rng);
//! assert_eq!(first.len(), 6);
//! assert_eq!(second.len(), 6);
//! ```

use crate::{alphabet::Alphabet, genome::Genome, rng::RandomNumberGenerator};

/// Swaps the suffixes of two parents after a cut point drawn from `[1, len - 1]`.
///
/// Genomes shorter than two characters have no internal cut point and are
/// returned unchanged.
///
/// # Panics
///
/// Panics if the parents differ in length.
pub fn crossover(a: &Genome, b: &Genome, rng: &mut RandomNumberGenerator) -> (Genome, Genome) {
    assert_eq!(a.len(), b.len(), "crossover parents must share a length");

    let length = a.len();
    if length < 2 {
        return (a.clone(), b.clone());
    }

    let cut = 1 + rng.gen_index(length - 1);
    let (a_head, a_tail) = a.genes().split_at(cut);
    let (b_head, b_tail) = b.genes().split_at(cut);

    (
        Genome::from_genes([a_head, b_tail].concat()),
        Genome::from_genes([b_head, a_tail].concat()),
    )
}

/// Copies `genome` and moves the character at one random position to its
/// neighbour above or below in the alphabet (see [`Alphabet::step`]).
pub fn mutate(genome: &Genome, alphabet: &Alphabet, rng: &mut RandomNumberGenerator) -> Genome {
    if genome.is_empty() {
        return genome.clone();
    }

    let mut genes = genome.genes().to_vec();
    let position = rng.gen_index(genes.len());
    let upward = rng.chance(0.5);
    genes[position] = alphabet.step(genes[position], upward);

    Genome::from_genes(genes)
}

/// Applies crossover and mutation with fixed probabilities.
#[derive(Debug, Clone)]
pub struct Breeder {
    alphabet: Alphabet,
    crossover_probability: f64,
    mutation_probability: f64,
}

impl Breeder {
    pub fn new(alphabet: Alphabet, crossover_probability: f64, mutation_probability: f64) -> Self {
        Self {
            alphabet,
            crossover_probability,
            mutation_probability,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Produces two children from two parents.
    ///
    /// The parents are crossed over with the crossover probability, otherwise
    /// copied. Each child is then mutated independently with the mutation
    /// probability.
    pub fn create_children(
        &self,
        first: &Genome,
        second: &Genome,
        rng: &mut RandomNumberGenerator,
    ) -> (Genome, Genome) {
        let (first, second) = if rng.chance(self.crossover_probability) {
            crossover(first, second, rng)
        } else {
            (first.clone(), second.clone())
        };

        (self.maybe_mutate(first, rng), self.maybe_mutate(second, rng))
    }

    fn maybe_mutate(&self, child: Genome, rng: &mut RandomNumberGenerator) -> Genome {
        if rng.chance(self.mutation_probability) {
            mutate(&child, &self.alphabet, rng)
        } else {
            child
        }
    }
}
