//! Marmoset CLI - evolve a random string into a target phrase.

use std::io;

use clap::{builder::FalseyValueParser, Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use marmoset::{
    alphabet::Alphabet,
    error::Result,
    evolution::{
        options::DEFAULT_WORKERS, ConsoleStatus, EvolutionLauncher, EvolutionOptions,
        ExecutionMode,
    },
    rng::RandomNumberGenerator,
};

const DEFAULT_TARGET: &str = "Hello, World!";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve toward the target (the default)
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Phrase to evolve toward
    #[arg(default_value = DEFAULT_TARGET)]
    target: String,

    /// How generations are bred; concurrent when ASYNC is set
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Select concurrent mode
    #[arg(long = "async", env = "ASYNC", value_parser = FalseyValueParser::new())]
    concurrent: bool,

    /// Worker threads in concurrent mode
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Population size
    #[arg(long, default_value_t = EvolutionOptions::default().get_population_size())]
    population: usize,

    /// Crossover probability
    #[arg(long, default_value_t = EvolutionOptions::default().get_crossover_probability())]
    crossover: f64,

    /// Mutation probability
    #[arg(long, default_value_t = EvolutionOptions::default().get_mutation_probability())]
    mutation: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many generations
    #[arg(long)]
    max_generations: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    #[value(alias = "sync")]
    Synchronous,
    #[value(alias = "async")]
    Concurrent,
}

impl Cli {
    fn into_run_args(self) -> RunArgs {
        match self.command {
            Some(Command::Run(args)) => args,
            None => self.run,
        }
    }
}

impl RunArgs {
    fn options(&self) -> EvolutionOptions {
        let fallback = if self.concurrent {
            Mode::Concurrent
        } else {
            Mode::Synchronous
        };
        let execution_mode = match self.mode.unwrap_or(fallback) {
            Mode::Synchronous => ExecutionMode::Sequential,
            Mode::Concurrent => ExecutionMode::Concurrent {
                workers: self.workers,
            },
        };

        let builder = EvolutionOptions::builder()
            .population_size(self.population)
            .crossover_probability(self.crossover)
            .mutation_probability(self.mutation)
            .execution_mode(execution_mode);

        match self.max_generations {
            Some(max_generations) => builder.max_generations(max_generations).build(),
            None => builder.build(),
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let options = args.options();
    let mut launcher =
        EvolutionLauncher::new(&args.target, Alphabet::printable().clone(), options)?;
    let mut rng = args
        .seed
        .map_or_else(RandomNumberGenerator::new, RandomNumberGenerator::from_seed);
    let mut status = ConsoleStatus::new(io::stderr());

    let result = launcher.evolve(&mut rng, &mut status)?;

    info!(
        generation = result.generation,
        recovered_tasks = result.recovered_tasks,
        failed_tasks = result.failed_tasks,
        "Target reached"
    );
    println!("{}", result.genome);
    Ok(())
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marmoset=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let args = Cli::parse().into_run_args();

    if let Err(e) = run(args) {
        error!(error = %e, "Evolution failed");
        std::process::exit(1);
    }
}
