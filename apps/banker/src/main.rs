//! banker - deadlock-avoiding resource allocator simulation
//!
//! Builds a ledger from the command line and configuration, spawns one
//! consumer actor per configured consumer, and renders every committed
//! state change until Ctrl-C or the requested duration elapses.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use banker_config::{assign_maxima, Config};
use banker_consumer::{ActorTiming, ConsumerPool, RequestStrategy, UniformStrategy};
use banker_events::EventReceiver;
use banker_resources::{Allocator, Ledger};
use banker_types::ResourceVector;
use clap::Parser;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting banker v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);
    config.validate()?;

    let capacity = ResourceVector::new(cli.capacity.clone());
    let maxima = assign_maxima(
        &capacity,
        config.simulation.consumers,
        &config.demand,
        config.simulation.seed,
    )?;
    let ledger = Ledger::new(capacity, maxima)?;

    let (event_sender, mut event_receiver) = banker_events::channel();
    let allocator = Arc::new(Allocator::new(ledger).with_event_sender(event_sender.clone()));
    allocator.announce()?;

    let renderer = OutputRenderer::new(config.output.json, config.output.color);
    let mut event_handler = EventHandler::new(renderer);

    let timing = ActorTiming {
        hold: config.simulation.hold(),
        pause: config.simulation.pause(),
    };
    let seed = config.simulation.seed;
    let pool = ConsumerPool::spawn(
        Arc::clone(&allocator),
        timing,
        Some(event_sender),
        |id| -> Box<dyn RequestStrategy> {
            match seed {
                Some(seed) => Box::new(UniformStrategy::seeded(
                    seed.wrapping_add(id.index() as u64 + 1),
                )),
                None => Box::new(UniformStrategy::from_entropy()),
            }
        },
    )?;

    let reason = run_until_stopped(cli.duration, &mut event_receiver, &mut event_handler).await?;
    info!(%reason, "stopping consumers");

    let reports = pool.shutdown(reason).await?;

    // Drain whatever the consumers emitted while stopping
    while let Ok(message) = event_receiver.try_recv() {
        event_handler.handle_event(&message)?;
    }
    event_handler.finish()?;

    match allocator.inspect(Ledger::check_invariants)? {
        Ok(()) => info!("ledger consistent at shutdown"),
        Err(violation) => warn!(%violation, "ledger inconsistent at shutdown"),
    }

    event_handler.renderer().render_reports(&reports)?;
    info!("Simulation finished");
    Ok(())
}

/// Handle events until Ctrl-C or `duration` seconds have passed
///
/// Returns the reason the run ended.
async fn run_until_stopped(
    duration: Option<u64>,
    event_receiver: &mut EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<String, CliError> {
    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                return Ok("interrupted".to_string());
            }

            () = &mut deadline => {
                return Ok("duration elapsed".to_string());
            }

            message = event_receiver.recv() => {
                match message {
                    Some(message) => event_handler.handle_event(&message)?,
                    None => return Ok("event channel closed".to_string()),
                }
            }
        }
    }
}

/// Apply command line overrides on top of file and environment settings
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(consumers) = cli.consumers {
        config.simulation.consumers = consumers;
    }
    if let Some(hold_ms) = cli.hold_ms {
        config.simulation.hold_ms = hold_ms;
    }
    if let Some(pause_ms) = cli.pause_ms {
        config.simulation.pause_ms = pause_ms;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if cli.global.json {
        config.output.json = true;
    }
    if let Some(color) = cli.global.color {
        config.output.color = color;
    }
}

/// Initialize tracing/logging
///
/// Logs always go to stderr so stdout carries only rendered output.
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(debug_enabled)
            .init();
    }
}
