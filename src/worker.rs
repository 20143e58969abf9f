//! Background worker thread for the messaging client.
//!
//! The client's event loop runs on its own OS thread with a current-thread
//! tokio runtime, keeping the shell's thread free to poll and render. The
//! worker talks back exclusively through the log relay; it never touches
//! shell state. Stopping is cooperative: the client observes [`StopFlag`]
//! and winds down on its own.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use tokio::sync::watch;
use tracing::{error, info};

use crate::{
    base::types::Res,
    relay::{LogLine, LogRelay},
    service::messenger::{GenericMessengerClient, MessengerClient},
};

/// Bound on runtime teardown; a wedged blocking read must not hang the join.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Cooperative stop signal shared with the messaging client.
#[derive(Clone)]
pub struct StopFlag {
    tx: watch::Sender<bool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self {
            tx: watch::channel(false).0,
        }
    }

    /// Signals every observer; idempotent.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `stop` has been called, immediately if it already was.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for StopFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to the spawned messenger worker.
pub struct Worker {
    stop: StopFlag,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawns the worker thread and starts the client's event loop.
    ///
    /// A failing client is reported once as a `system` feed line and the
    /// worker is then considered stopped; there is no automatic restart.
    pub fn spawn(messenger: MessengerClient, relay: LogRelay) -> Res<Self> {
        let stop = StopFlag::new();
        let running = Arc::new(AtomicBool::new(true));

        let handle = thread::Builder::new().name("messenger-worker".into()).spawn({
            let stop = stop.clone();
            let running = Arc::clone(&running);
            move || {
                run_worker(messenger, relay, stop);
                running.store(false, Ordering::SeqCst);
            }
        })?;

        info!("Messenger worker started.");

        Ok(Self {
            stop,
            running,
            handle: Some(handle),
        })
    }

    /// Whether the worker thread is still alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signals the stop flag and joins the thread.
    pub fn stop(mut self) {
        self.stop.stop();

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }

        info!("Messenger worker stopped.");
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Dropping without an explicit `stop()` still signals the client;
        // the thread winds down on its own.
        self.stop.stop();
    }
}

fn run_worker(messenger: MessengerClient, relay: LogRelay, stop: StopFlag) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("Failed to build the worker runtime: {err}");
            relay.enqueue(LogLine::system(format!("messenger failed to start: {err}")));
            return;
        }
    };

    let result = runtime.block_on(messenger.run(stop));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(err) = result {
        error!("Messenger client failed: {err:#}");
        relay.enqueue(LogLine::system(format!("messenger stopped with error: {err:#}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stopped_resolves_immediately_after_stop() {
        let flag = StopFlag::new();
        assert!(!flag.is_stopped());

        flag.stop();
        assert!(flag.is_stopped());
        flag.stopped().await;
    }

    #[tokio::test]
    async fn stopped_wakes_a_waiting_observer() {
        let flag = StopFlag::new();
        let observer = flag.clone();

        let waiter = tokio::spawn(async move { observer.stopped().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        flag.stop();

        waiter.await.unwrap();
    }
}
