//! Connect Four against a Monte Carlo Tree Search engine.
//!
//! ## Usage
//!
//! - `connect-four-mcts` - Show a demo
//! - `connect-four-mcts text` - Start the text protocol on stdin/stdout
//! - `connect-four-mcts selfplay` - Let the engine play both sides
//! - `connect-four-mcts demo` - Run the MCTS demo

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fastrand::Rng;

use connect_four_mcts::config::SearchConfig;
use connect_four_mcts::connect_four::ConnectFour;
use connect_four_mcts::constants::DEFAULT_BUDGET_SECS;
use connect_four_mcts::game::Game;
use connect_four_mcts::mcts::{BestPlayPolicy, MonteCarlo, SearchBudget};
use connect_four_mcts::protocol::TextProtocol;
use connect_four_mcts::session::Session;

/// Connect Four against a Monte Carlo Tree Search engine
#[derive(Parser)]
#[command(name = "connect-four-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seconds of search per engine move
    #[arg(long, global = true, default_value_t = DEFAULT_BUDGET_SECS)]
    budget: f64,

    /// Search a fixed number of iterations per move instead of a time budget
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: Option<u64>,

    /// Seed for the engine's random playouts
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Move selection policy: max (win rate) or robust (visits)
    #[arg(long, global = true, default_value = "max")]
    policy: BestPlayPolicy,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the text protocol server on stdin/stdout
    Text,
    /// Let the engine play a whole game against itself
    Selfplay,
    /// Run a simple demo of the engine
    Demo,
}

impl Cli {
    fn search_budget(&self) -> Result<SearchBudget> {
        let budget = match self.iterations {
            Some(n) => SearchBudget::Iterations(n),
            None => SearchBudget::from_secs_f64(self.budget)?,
        };
        Ok(budget)
    }

    fn rng(&self) -> Rng {
        match self.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        }
    }

    fn session(&self) -> Result<Session<ConnectFour>> {
        let session = Session::new(ConnectFour::new(), SearchConfig::default(), self.rng())
            .with_budget(self.search_budget()?)?
            .with_policy(self.policy);
        Ok(session)
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Text) => {
            let mut protocol = TextProtocol::new(cli.session()?);
            protocol.run().context("text protocol i/o failed")?;
        }
        Some(Commands::Selfplay) => run_selfplay(&cli)?,
        Some(Commands::Demo) | None => run_demo(&cli)?,
    }
    Ok(())
}

fn run_selfplay(cli: &Cli) -> Result<()> {
    let mut session = cli.session()?;
    println!("Self-play, {} per move\n", session.budget());

    while !session.outcome().is_terminal() {
        session.auto().context("engine move failed")?;
        println!("{}", session.state().board());
    }

    println!("Result: {}", session.outcome());
    Ok(())
}

fn run_demo(cli: &Cli) -> Result<()> {
    println!("Connect Four MCTS\n");

    let game = ConnectFour::new();
    let mut mcts = MonteCarlo::with_rng(game, SearchConfig::default(), cli.rng());

    let state = game.play_column(&game.start(), 3)?;
    println!("After the first move in the centre column:");
    println!("{}", state.board());

    let budget = cli.search_budget()?;
    println!("Searching for {budget}...");
    let report = mcts.run(&state, budget)?;
    println!(
        "{} iterations, {} draws, {} nodes in {:.2}s",
        report.iterations,
        report.draws,
        report.nodes,
        report.elapsed.as_secs_f64()
    );

    let stats = mcts.stats(&state)?;
    println!("{stats}");

    let best = mcts.best_play(&state, cli.policy)?;
    println!("Best reply ({}): column {}", cli.policy, best.col + 1);

    let next = game.next_state(&state, &best)?;
    println!("{}", next.board());
    Ok(())
}
