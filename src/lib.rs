//! Library root for `reply-bot`.
//!
//! Reply-bot is the core of a desktop manager for a keyword-triggered chat
//! bot:
//! - A JSON-backed response store mapping keywords to text/image/audio replies
//! - A media library for the files behind image and audio responses
//! - A log relay moving feed lines from the worker thread to the polling shell
//! - A background worker running the messaging client's event loop
//!
//! The chat transport itself is an opaque collaborator. The architecture is
//! built around extensible traits that allow for different implementations
//! of each service; the in-tree messenger is a console loopback.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod relay;
pub mod runtime;
pub mod service;
pub mod worker;

use std::time::Duration;

use base::{config::Config, types::Void};
use relay::{LogDrain, LogRelay};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Wires the runtime around the given relay, starts the worker, then plays
/// the shell's role: poll the drain on the configured interval and print the
/// feed until Ctrl-C, then stop the worker cooperatively.
pub async fn start(config: Config, relay: LogRelay, mut drain: LogDrain) -> Void {
    info!("Starting reply-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config, relay)?;

    // Start the worker.
    let worker = runtime.start()?;

    let poll = Duration::from_millis(runtime.config.poll_interval_ms);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(poll) => {
                while let Some(line) = drain.drain_one() {
                    println!("{line}");
                }
            }
        }
    }

    info!("Shutting down ...");
    worker.stop();

    // Flush whatever the worker said on the way out.
    while let Some(line) = drain.drain_one() {
        println!("{line}");
    }

    Ok(())
}
