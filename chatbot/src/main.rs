//! Interactive learning chatbot.
//!
//! Answers by keyword, and when it doesn't understand, offers to learn a new
//! intent. Everything it learns is kept in a JSON store between runs.
//!
//! ```bash
//! cargo run -p chatbot -- --store intenciones.json
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` to see match decisions.

mod cli;
mod repl;

use anyhow::{Context, Result};
use chatbot_core::{ChatSession, LoadSource};
use clap::Parser;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;
use repl::Controller;

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = cli.session_config();
    let store_path = config.store_path.clone();
    let mut session = ChatSession::open(config).with_context(|| {
        format!(
            "failed to open intent store {} (run with --reset-corrupt to start over)",
            store_path.display()
        )
    })?;

    if cli.list {
        for (name, intent) in session.store().iter() {
            println!(
                "{name}: {} keywords, {} responses",
                intent.keywords().len(),
                intent.responses().len()
            );
        }
        return Ok(());
    }

    if let LoadSource::Quarantined { quarantined } = session.load_source() {
        println!(
            "The intent store could not be parsed and has been moved to {}. Starting fresh.",
            quarantined.display()
        );
    }

    if let Some(path) = session.store_path() {
        tracing::info!(store = %path.display(), "starting chat session");
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Controller::new(stdin.lock(), stdout.lock())
        .run(&mut session)
        .context("terminal I/O failed")?;

    Ok(())
}
