//! Roulette wheel (fitness proportionate) parent selection for a minimising
//! score.
//!
//! Each member's weight is `max_fitness - fitness`, where `max_fitness` is the
//! worst score in the population plus one. The offset keeps every member,
//! including the worst, selectable.

use crate::error::{GeneticError, OptionExt, Result};
use crate::evolution::Challenge;
use crate::genome::Genome;
use crate::rng::RandomNumberGenerator;

/// Aggregate statistics of a population, computed once per generation and
/// shared by every selection in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    /// Worst score in the population plus one.
    pub max_fitness: f64,
    /// Sum of `max_fitness - fitness` over the population.
    pub total_weight: f64,
}

impl FitnessStats {
    /// Computes the statistics for `population`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyPopulation` if there is nothing to select from.
    pub fn compute<C: Challenge + ?Sized>(population: &[Genome], challenge: &C) -> Result<Self> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let max_fitness = population
            .iter()
            .map(|genome| challenge.score(genome))
            .fold(0.0, f64::max)
            + 1.0;

        let total_weight = population
            .iter()
            .map(|genome| max_fitness - challenge.score(genome))
            .sum();

        Ok(Self {
            max_fitness,
            total_weight,
        })
    }

    /// Selection weight of a member with the given score.
    pub fn weight(&self, fitness: f64) -> f64 {
        self.max_fitness - fitness
    }
}

/// Draws one parent from `population`, favouring low scores.
///
/// Walks the population in order, subtracting each member's weight from a
/// uniform draw over `[0, total_weight)` and returning the member at which the
/// remainder falls below that member's weight. Rounding can exhaust the walk;
/// the last member is returned in that case.
///
/// # Errors
///
/// Returns `EmptyPopulation` if `population` is empty.
pub fn select_parent<'a, C: Challenge + ?Sized>(
    population: &'a [Genome],
    stats: &FitnessStats,
    challenge: &C,
    rng: &mut RandomNumberGenerator,
) -> Result<&'a Genome> {
    let last = population
        .last()
        .ok_or_else_genetic(|| GeneticError::EmptyPopulation)?;
    let mut remainder = rng.gen_float() * stats.total_weight;

    for genome in population {
        let weight = stats.weight(challenge.score(genome));
        if remainder < weight {
            return Ok(genome);
        }
        remainder -= weight;
    }

    // If we get here, it's due to floating-point errors, so return the last individual
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::TargetDistance;

    fn population(members: &[&str]) -> Vec<Genome> {
        members.iter().map(|m| Genome::from(*m)).collect()
    }

    #[test]
    fn test_compute_stats() {
        let challenge = TargetDistance::new(Genome::from("AA"));
        // Scores: 0, 1, 4
        let population = population(&["AA", "AB", "AC"]);

        let stats = FitnessStats::compute(&population, &challenge).unwrap();

        assert_eq!(stats.max_fitness, 5.0);
        assert_eq!(stats.total_weight, 5.0 + 4.0 + 1.0);
        assert_eq!(stats.weight(4.0), 1.0);
    }

    #[test]
    fn test_compute_stats_empty_population() {
        let challenge = TargetDistance::new(Genome::from("AA"));
        let result = FitnessStats::compute(&[], &challenge);

        assert!(matches!(result, Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_worst_member_is_still_selectable() {
        let challenge = TargetDistance::new(Genome::from("A"));
        // Scores 0 and 4, weights 5 and 1
        let population = population(&["A", "C"]);
        let stats = FitnessStats::compute(&population, &challenge).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let picked_worst = (0..1_000)
            .map(|_| select_parent(&population, &stats, &challenge, &mut rng).unwrap())
            .any(|genome| genome == &population[1]);

        assert!(stats.weight(challenge.score(&population[1])) > 0.0);
        assert!(picked_worst);
    }

    #[test]
    fn test_selection_follows_weights() {
        let challenge = TargetDistance::new(Genome::from("mmmm"));
        let mut members = vec!["mmmm"];
        members.extend(["~~~~", "!!!!", "~!~!", "!~!~", "~~!!", "!!~~", "~!!~", "!~~!", "zz!!"]);
        let population = population(&members);
        let stats = FitnessStats::compute(&population, &challenge).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let trials = 20_000;
        let hits = (0..trials)
            .filter(|_| {
                select_parent(&population, &stats, &challenge, &mut rng).unwrap() == &population[0]
            })
            .count();

        let expected = stats.weight(0.0) / stats.total_weight;
        let observed = hits as f64 / trials as f64;
        assert!(
            (observed - expected).abs() < 0.02,
            "observed {} expected {}",
            observed,
            expected
        );
    }

    #[test]
    fn test_select_from_empty_population() {
        let challenge = TargetDistance::new(Genome::from("A"));
        let stats = FitnessStats {
            max_fitness: 1.0,
            total_weight: 1.0,
        };
        let mut rng = RandomNumberGenerator::new();

        let result = select_parent(&[], &stats, &challenge, &mut rng);
        assert!(matches!(result, Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_exhausted_walk_falls_back_to_last() {
        let challenge = TargetDistance::new(Genome::from("A"));
        let population = population(&["A", "B", "C"]);
        // Overstated total forces the walk past every member
        let stats = FitnessStats {
            max_fitness: 5.0,
            total_weight: 1e9,
        };
        let mut rng = RandomNumberGenerator::from_seed(1);

        let mut fell_through = false;
        for _ in 0..100 {
            let genome = select_parent(&population, &stats, &challenge, &mut rng).unwrap();
            fell_through |= genome == &population[2];
        }

        assert!(fell_through);
    }
}
