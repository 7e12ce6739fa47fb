use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gofer::input::CommandSource;
use gofer::integration::{GoferConfig, Orchestrator};
use gofer::journal::{ConsoleJournal, SharedJournal};
use gofer::launch::SystemDesktop;
use gofer::speech::{ConsoleSynthesizer, Synthesizer};

#[derive(Parser)]
#[command(name = "gofer")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Dispatch a single command and exit
    Once {
        /// The command text, e.g. "remind me in 5 minutes to stretch"
        line: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gofer=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GoferConfig::load(path)?,
        None => match GoferConfig::default_path().filter(|p| p.exists()) {
            Some(path) => GoferConfig::load(&path)?,
            None => GoferConfig::default(),
        },
    };

    info!("Starting gofer assistant");

    match cli.command {
        Some(Command::Once { line }) => run_once(config, line.join(" ")),
        None => run_interactive(config),
    }

    Ok(())
}

/// Interactive session: stdin lines are typed commands, closing stdin or
/// a quit command ends the session.
fn run_interactive(config: GoferConfig) {
    let journal: SharedJournal = Arc::new(ConsoleJournal);

    let orchestrator = Orchestrator::start(
        config,
        journal,
        || Ok(Box::new(ConsoleSynthesizer) as Box<dyn Synthesizer>),
        Arc::new(SystemDesktop),
        None,
    );

    let submitter = orchestrator.submitter();
    let stop = orchestrator.stop_signal();

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        submitter.submit(line, CommandSource::Typed);
                    }
                }
                Err(_) => break,
            }
        }
        // stdin is gone; end the session on the next poll
        stop.store(true, Ordering::SeqCst);
    });

    orchestrator.run();
}

/// Dispatch one command line, let feedback drain, and exit.
fn run_once(config: GoferConfig, line: String) {
    let journal: SharedJournal = Arc::new(ConsoleJournal);

    let orchestrator = Orchestrator::start(
        config,
        journal,
        || Ok(Box::new(ConsoleSynthesizer) as Box<dyn Synthesizer>),
        Arc::new(SystemDesktop),
        None,
    );

    orchestrator.submitter().submit(line, CommandSource::Typed);
    let _ = orchestrator.drain_once();
    orchestrator.shutdown();
}
