//! # Status Reporting
//!
//! The launcher pushes the best genome found so far after every generation
//! and signals the end of a run. How that is shown is up to the reporter.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::evolution::EvolutionResult;
use crate::genome::Genome;

/// Receives progress from a running evolution.
pub trait StatusReporter {
    /// Called after every generation with the best genome so far.
    fn update(&mut self, generation: usize, best: &Genome) -> Result<()>;

    /// Called once when the run stops.
    fn finish(&mut self, _result: &EvolutionResult) -> Result<()> {
        Ok(())
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatus;

impl StatusReporter for NoStatus {
    fn update(&mut self, _generation: usize, _best: &Genome) -> Result<()> {
        Ok(())
    }
}

/// Writes a one-line status (generation, generations per second, best genome)
/// to a terminal or any other writer.
///
/// Updates are throttled to one redraw per interval; the final status is
/// always written.
#[derive(Debug)]
pub struct ConsoleStatus<W: Write> {
    output: W,
    started: Instant,
    last_draw: Option<Instant>,
    redraw_interval: Duration,
}

impl<W: Write> ConsoleStatus<W> {
    pub fn new(output: W) -> Self {
        Self::with_redraw_interval(output, Duration::from_secs(1))
    }

    pub fn with_redraw_interval(output: W, redraw_interval: Duration) -> Self {
        Self {
            output,
            started: Instant::now(),
            last_draw: None,
            redraw_interval,
        }
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn generations_per_second(&self, generation: usize) -> u64 {
        let elapsed = self.started.elapsed().as_secs();
        if elapsed == 0 {
            0
        } else {
            generation as u64 / elapsed
        }
    }

    fn draw(&mut self, generation: usize, best: &Genome) -> Result<()> {
        // Line breaks inside a genome would tear the status line apart
        let best = best.to_string().replace(['\n', '\r'], " ");
        writeln!(
            self.output,
            "generation {:>10} | {:>8} gen/s | {}",
            generation,
            self.generations_per_second(generation),
            best
        )?;
        self.output.flush()?;
        self.last_draw = Some(Instant::now());
        Ok(())
    }
}

impl<W: Write> StatusReporter for ConsoleStatus<W> {
    fn update(&mut self, generation: usize, best: &Genome) -> Result<()> {
        let due = self
            .last_draw
            .map_or(true, |last| last.elapsed() >= self.redraw_interval);

        if due {
            self.draw(generation, best)?;
        }
        Ok(())
    }

    fn finish(&mut self, result: &EvolutionResult) -> Result<()> {
        self.draw(result.generation, &result.genome)
    }
}
