use crate::genome::Genome;

/// Scores a genome. Lower is better and `0.0` means the genome is a perfect
/// answer.
pub trait Challenge: Send + Sync {
    fn score(&self, genome: &Genome) -> f64;
}

/// Squared character-code distance to a fixed target.
#[derive(Debug, Clone)]
pub struct TargetDistance {
    target: Genome,
}

impl TargetDistance {
    pub fn new(target: Genome) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &Genome {
        &self.target
    }
}

impl Challenge for TargetDistance {
    /// # Panics
    ///
    /// Panics if `genome` and the target differ in length.
    fn score(&self, genome: &Genome) -> f64 {
        assert_eq!(
            genome.len(),
            self.target.len(),
            "genome length must match the target length"
        );

        genome
            .genes()
            .iter()
            .zip(self.target.genes())
            .map(|(&g, &t)| {
                let delta = g as f64 - t as f64;
                delta * delta
            })
            .sum()
    }
}
