// ============================================================================
// Matchbook Binary
// Reads orders from stdin, writes executed trades to stdout
// ============================================================================

use matchbook::interfaces::LoggingEventHandler;
use matchbook::prelude::*;
use matchbook::session;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only trade lines.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mut engine = MatchingEngine::with_event_handler(Arc::new(LoggingEventHandler));

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    match session::run(&mut engine, stdin, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "session aborted");
            ExitCode::FAILURE
        },
    }
}
