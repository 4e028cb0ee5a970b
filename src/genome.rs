//! # Genome
//!
//! A genome is an immutable, fixed-length string of alphabet characters. It is
//! cheap to clone: clones share the same storage, which lets a generation copy
//! unchanged parents forward and lets the fitness cache key on them without
//! duplicating bytes.
//!
//! ```rust
//! use marmoset::{alphabet::Alphabet, genome::random_population, rng::RandomNumberGenerator};
//!
//! let mut rng = RandomNumberGenerator::from_seed(5);
//! let population = random_population(4, 12, Alphabet::printable(), &mut rng);
//!
//! assert_eq!(population.len(), 4);
//! assert!(population.iter().all(|genome| genome.len() == 12));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::{
    alphabet::Alphabet,
    error::{GeneticError, Result},
    rng::RandomNumberGenerator,
};

/// A candidate string. Equality and hashing are by content.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Genome {
    genes: Arc<[u8]>,
}

impl Genome {
    /// Wraps raw character codes as a genome.
    pub fn from_genes(genes: Vec<u8>) -> Self {
        Self {
            genes: genes.into(),
        }
    }

    /// Builds a genome from text, checking every character against `alphabet`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a character the alphabet lacks.
    pub fn parse(text: &str, alphabet: &Alphabet) -> Result<Self> {
        if let Some(c) = text
            .chars()
            .find(|c| !c.is_ascii() || !alphabet.contains(*c as u8))
        {
            return Err(GeneticError::Configuration(format!(
                "Character {:?} is not part of the alphabet",
                c
            )));
        }
        Ok(Self::from(text))
    }

    /// Generates a genome of `length` characters drawn independently from `alphabet`.
    pub fn random(length: usize, alphabet: &Alphabet, rng: &mut RandomNumberGenerator) -> Self {
        Self::from_genes((0..length).map(|_| alphabet.random_char(rng)).collect())
    }

    pub fn genes(&self) -> &[u8] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl From<&str> for Genome {
    fn from(text: &str) -> Self {
        Self::from_genes(text.as_bytes().to_vec())
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.genes))
    }
}

impl fmt::Debug for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genome({:?})", String::from_utf8_lossy(&self.genes))
    }
}

/// Produces `count` independent random genomes of `length` characters each.
pub fn random_population(
    count: usize,
    length: usize,
    alphabet: &Alphabet,
    rng: &mut RandomNumberGenerator,
) -> Vec<Genome> {
    (0..count)
        .map(|_| Genome::random(length, alphabet, rng))
        .collect()
}
