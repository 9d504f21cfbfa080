// src/logging.rs
// =============================================================================
// This module sets up logging with the `tracing` ecosystem.
//
// - Log lines go to stderr, so the report on stdout stays clean (and the
//   --json output stays valid JSON)
// - RUST_LOG wins when it is set (e.g. RUST_LOG=redirect_guard=trace)
// - Otherwise each -v raises the level: warn -> info -> debug -> trace
// =============================================================================

use std::io;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

// Maps the number of -v flags to a log level
pub fn level_for_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

// Installs the global tracing subscriber
//
// Should be called once at startup, before anything logs.
pub fn init_logging(verbose: u8) {
    let level = level_for_verbosity(verbose);

    // Build filter from RUST_LOG env or the level picked by -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .compact()
            .with_target(verbose > 1)
            .with_writer(io::stderr),
    );

    // A subscriber may already be set (e.g. by tests); keep that one
    let _ = tracing::subscriber::set_global_default(subscriber);
}
